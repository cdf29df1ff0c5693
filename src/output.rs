//! Download file naming and saving the composite to disk.

use std::path::{Path, PathBuf};

use crate::error::MemoriaError;
use crate::ports::CompositeImage;

/// Download name for a composite: `memoria_<name>.png`.
///
/// The name is lowercased and each whitespace run becomes one underscore;
/// path separators are dropped. An empty name gives `memoria.png`.
#[must_use]
pub fn download_filename(name: &str) -> String {
    let slug = name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| !matches!(c, '/' | '\\' | ':' | '\0'))
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if slug.is_empty() {
        "memoria.png".to_string()
    } else {
        format!("memoria_{slug}.png")
    }
}

/// Resolve the output path: use explicit path or the download name.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>, name: &str) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(download_filename(name)), PathBuf::from)
}

/// Save the composite, converting when the path's extension asks for a
/// different format than the payload carries.
///
/// # Errors
///
/// Returns an error if decoding, conversion or the write fails.
pub fn save_image(image: &CompositeImage, output_path: &Path) -> Result<(), MemoriaError> {
    let bytes = image.decode()?;
    let target = image::ImageFormat::from_path(output_path).ok();

    match target {
        Some(format) if format.to_mime_type() != image.mime_type => {
            let decoded = image::load_from_memory(&bytes).map_err(|e| {
                MemoriaError::ImageConversion(format!("Failed to decode image: {e}"))
            })?;
            decoded.save_with_format(output_path, format).map_err(|e| {
                let path = output_path.display();
                MemoriaError::ImageConversion(format!("Failed to save {path}: {e}"))
            })
        }
        _ => std::fs::write(output_path, bytes).map_err(MemoriaError::Io),
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;

    use super::*;
    use crate::photo::tests::solid_png;

    #[test]
    fn filename_from_name() {
        assert_eq!(download_filename("Ana"), "memoria_ana.png");
        assert_eq!(download_filename("  Ana  María "), "memoria_ana_maría.png");
        assert_eq!(download_filename("José\tLuis"), "memoria_josé_luis.png");
    }

    #[test]
    fn filename_without_name() {
        assert_eq!(download_filename(""), "memoria.png");
        assert_eq!(download_filename("   "), "memoria.png");
        assert_eq!(download_filename("/"), "memoria.png");
    }

    #[test]
    fn filename_drops_separators() {
        let name = download_filename("../etc/passwd");
        assert_eq!(name, "memoria_..etcpasswd.png");
    }

    #[test]
    fn resolve_explicit_and_default() {
        let explicit = resolve_output_path(Some("out.jpg"), "Ana");
        assert_eq!(explicit, PathBuf::from("out.jpg"));
        let derived = resolve_output_path(None, "Ana");
        assert_eq!(derived, PathBuf::from("memoria_ana.png"));
    }

    #[test]
    fn save_png_as_is_and_convert_to_jpeg() {
        let dir = std::env::temp_dir().join("memoria_output_test");
        std::fs::create_dir_all(&dir).unwrap();
        let png = solid_png([10, 200, 30], 4);
        let image = CompositeImage::png(base64::engine::general_purpose::STANDARD.encode(&png));

        let png_path = dir.join("same.png");
        save_image(&image, &png_path).unwrap();
        assert_eq!(std::fs::read(&png_path).unwrap(), png);

        let jpg_path = dir.join("converted.jpg");
        save_image(&image, &jpg_path).unwrap();
        let jpg = std::fs::read(&jpg_path).unwrap();
        assert_eq!(&jpg[..3], &[0xFF, 0xD8, 0xFF]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
