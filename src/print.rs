//! Print fulfillment hand-off: payment instructions plus a chat deep link.

use reqwest::Url;

use crate::config::PrintConfig;
use crate::error::MemoriaError;

const NUMBER_REQUIRED: &str =
    "[print] whatsapp_number must be set to the operator's number (digits only)";

/// Everything the customer needs to order a print from the operator.
#[derive(Debug, Clone)]
pub struct PrintOrder {
    whatsapp_number: String,
    message: String,
    price: String,
    paper: String,
    payment_method: String,
    payee: Option<String>,
    payment_qr_url: Option<String>,
}

impl PrintOrder {
    /// Build the order from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Config`] if no operator number is configured
    /// or it contains anything but digits.
    pub fn from_config(config: &PrintConfig) -> Result<Self, MemoriaError> {
        let number: String = config
            .whatsapp_number
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| !matches!(c, ' ' | '+' | '-' | '(' | ')'))
            .collect();
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(MemoriaError::Config(NUMBER_REQUIRED.into()));
        }
        Ok(Self {
            whatsapp_number: number,
            message: config.message.clone(),
            price: config.price.clone(),
            paper: config.paper.clone(),
            payment_method: config.payment_method.clone(),
            payee: config.payee.clone(),
            payment_qr_url: config.payment_qr_url.clone(),
        })
    }

    /// Click-to-chat link with the pre-filled message.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Config`] if the link cannot be built.
    pub fn whatsapp_url(&self) -> Result<Url, MemoriaError> {
        let base = format!("https://wa.me/{}", self.whatsapp_number);
        Url::parse_with_params(&base, [("text", &self.message)])
            .map_err(|e| MemoriaError::Config(format!("Invalid print link: {e}")))
    }

    /// One-line offer shown next to a finished composite.
    #[must_use]
    pub fn offer(&self) -> String {
        let Self { price, paper, .. } = self;
        format!("Print this image for only {price} on {paper}.")
    }

    /// The two-step instructions: pay, then send image and voucher.
    ///
    /// # Errors
    ///
    /// Returns an error if the chat link cannot be built.
    pub fn instructions(&self, image_path: Option<&str>) -> Result<String, MemoriaError> {
        let mut step1 = format!("Step 1: Pay {} with {}.", self.price, self.payment_method);
        if let Some(ref payee) = self.payee {
            let number = &self.whatsapp_number;
            step1.push_str(&format!("\n        Payee: {payee} ({number})"));
        }
        if let Some(ref qr) = self.payment_qr_url {
            step1.push_str(&format!("\n        QR code: {qr}"));
        }

        let image = match image_path {
            Some(path) => format!("your image ({path})"),
            None => "your image".to_string(),
        };
        let step2 = format!(
            "Step 2: Send {image} together with your payment voucher on WhatsApp:\n        {}",
            self.whatsapp_url()?
        );
        Ok(format!("{}\n{step1}\n{step2}", self.offer()))
    }
}
