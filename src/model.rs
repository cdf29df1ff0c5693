//! Model name resolution for the Gemini image models.

/// Short name aliases for the image-capable Gemini models.
const ALIASES: &[(&str, &str)] = &[
    ("nano-banana", "gemini-3.1-flash-image-preview"),
    ("nano-banana-pro", "gemini-3-pro-image-preview"),
    ("nano-banana-2.5", "gemini-2.5-flash-image"),
];

/// Model used when neither the config nor the command line names one.
pub const DEFAULT_MODEL: &str = "nano-banana";

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or_else(|| name.to_string(), |(_, full)| (*full).to_string())
}

/// Check that a resolved model belongs to the Gemini family.
///
/// # Errors
///
/// Returns an error naming the model otherwise.
pub fn validate_model(model: &str) -> Result<(), String> {
    if model.starts_with("gemini") {
        Ok(())
    } else {
        Err(format!(
            "Unsupported model '{model}'. Expected a 'gemini-*' image model or an alias."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_aliases() {
        for (alias, full) in ALIASES {
            assert_eq!(resolve_model(alias), *full);
        }
        assert!(resolve_model("nano-banana").starts_with("gemini-3.1"));
    }

    #[test]
    fn exact_name_passthrough() {
        let exact = "gemini-2.5-flash-image";
        assert_eq!(resolve_model(exact), exact);
    }

    #[test]
    fn non_gemini_rejected() {
        assert!(validate_model("gemini-2.5-flash-image").is_ok());
        assert!(validate_model("gpt-image-1").is_err());
        assert!(validate_model(&resolve_model(DEFAULT_MODEL)).is_ok());
    }
}
