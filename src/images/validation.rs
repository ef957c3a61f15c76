//! Checks applied to every uploaded file before it reaches storage.

use thiserror::Error;

pub const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/webp", "image/jpeg", "image/jpg", "image/png"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageValidationError {
    #[error("File must be an image")]
    NotAnImage,
    #[error("Unsupported image type '{0}'. Use WebP, JPEG or PNG")]
    UnsupportedType(String),
    #[error("Image is larger than {max_mb} MB")]
    TooLarge { max_mb: usize },
    #[error("File is empty")]
    Empty,
}

/// Validates the declared content type and size of an upload.
pub fn validate_image(
    content_type: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(), ImageValidationError> {
    let content_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !content_type.starts_with("image/") {
        return Err(ImageValidationError::NotAnImage);
    }
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(ImageValidationError::UnsupportedType(content_type));
    }
    if bytes.is_empty() {
        return Err(ImageValidationError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(ImageValidationError::TooLarge {
            max_mb: max_bytes / (1024 * 1024),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_MB: usize = 5 * 1024 * 1024;

    #[test]
    fn accepts_supported_types() {
        for content_type in ALLOWED_CONTENT_TYPES {
            assert!(validate_image(content_type, b"img", FIVE_MB).is_ok());
        }
        assert!(validate_image("IMAGE/PNG; charset=binary", b"img", FIVE_MB).is_ok());
    }

    #[test]
    fn rejects_non_images_and_unsupported_images() {
        assert_eq!(
            validate_image("application/pdf", b"%PDF", FIVE_MB),
            Err(ImageValidationError::NotAnImage)
        );
        assert!(matches!(
            validate_image("image/gif", b"GIF89a", FIVE_MB),
            Err(ImageValidationError::UnsupportedType(_))
        ));
    }

    #[test]
    fn enforces_size_limit() {
        let big = vec![0u8; FIVE_MB + 1];
        assert_eq!(
            validate_image("image/webp", &big, FIVE_MB),
            Err(ImageValidationError::TooLarge { max_mb: 5 })
        );
        assert_eq!(
            validate_image("image/webp", &[], FIVE_MB),
            Err(ImageValidationError::Empty)
        );
    }
}
