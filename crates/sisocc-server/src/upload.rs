//! Photo attachment handling for the creation endpoint.
//!
//! Photos arrive as parts of the multipart form. Each accepted part is
//! written under the configured upload directory with a random hex-prefixed
//! filename; only the filename is stored on the occurrence. Serving the
//! files back is left to the static file layer in front of this service.

use axum::body::Bytes;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::UploadSection;
use crate::error::ApiError;

/// MIME types accepted for photo parts.
const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Whether a part's content type is an accepted image format.
pub fn accepted_image(content_type: &str) -> bool {
    IMAGE_MIME_TYPES.contains(&content_type)
}

/// Build the stored filename for an uploaded photo.
///
/// A random hex prefix keeps concurrent uploads of identically named
/// files apart; the original name survives only as a sanitized suffix.
pub fn stored_filename(original: &str) -> String {
    let safe: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}-{safe}", Uuid::new_v4().simple())
}

/// Validate one photo part and write it to disk.
///
/// Returns the stored filename on success.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when the content type is not an
/// image or the part exceeds the size limit, and [`ApiError::Internal`]
/// when the file cannot be written.
pub async fn save_photo(
    config: &UploadSection,
    original_name: &str,
    content_type: &str,
    data: &Bytes,
) -> Result<String, ApiError> {
    if !accepted_image(content_type) {
        return Err(ApiError::Validation(format!(
            "unsupported photo type {content_type:?}; images only"
        )));
    }
    if data.len() > config.max_bytes {
        return Err(ApiError::Validation(format!(
            "photo {original_name:?} exceeds the {} byte limit",
            config.max_bytes
        )));
    }

    let filename = stored_filename(original_name);
    let path = std::path::Path::new(&config.directory).join(&filename);

    tokio::fs::create_dir_all(&config.directory)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, directory = config.directory, "upload dir unavailable");
            ApiError::Internal(String::from("photo storage unavailable"))
        })?;

    let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
        tracing::error!(error = %e, path = %path.display(), "photo create failed");
        ApiError::Internal(String::from("photo storage unavailable"))
    })?;
    file.write_all(data).await.map_err(|e| {
        tracing::error!(error = %e, path = %path.display(), "photo write failed");
        ApiError::Internal(String::from("photo storage unavailable"))
    })?;

    tracing::debug!(filename, bytes = data.len(), "photo stored");
    Ok(filename)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn image_types_are_accepted() {
        assert!(accepted_image("image/jpeg"));
        assert!(accepted_image("image/png"));
        assert!(accepted_image("image/webp"));
        assert!(!accepted_image("application/pdf"));
        assert!(!accepted_image("text/html"));
    }

    #[test]
    fn stored_names_are_prefixed_and_sanitized() {
        let name = stored_filename("street flood (1).jpg");
        assert!(name.ends_with("street_flood__1_.jpg"));
        // 32 hex chars plus the separator
        assert_eq!(name.len(), 32 + 1 + "street_flood__1_.jpg".len());

        let other = stored_filename("street flood (1).jpg");
        assert_ne!(name, other);
    }

    #[tokio::test]
    async fn oversized_photo_is_rejected() {
        let config = UploadSection {
            max_bytes: 8,
            ..UploadSection::default()
        };
        let data = Bytes::from_static(b"0123456789");
        let err = save_photo(&config, "big.png", "image/png", &data)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn non_image_part_is_rejected() {
        let config = UploadSection::default();
        let data = Bytes::from_static(b"%PDF-1.4");
        let err = save_photo(&config, "doc.pdf", "application/pdf", &data)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
