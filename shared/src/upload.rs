use thiserror::Error;

pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Raster image types the endpoint accepts; any `video/*` type is allowed.
pub const IMAGE_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MediaKind {
    Image,
    Video,
}

fn size_mb(size: &u64) -> f64 {
    *size as f64 / (1024.0 * 1024.0)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("File too large ({:.1} MB). Max size: 100 MB.", size_mb(.size))]
    TooLarge { size: u64 },
    #[error("Unsupported file type: '{mime}'. Please upload a common image or video format.")]
    Unsupported { mime: String },
}

/// Boundary check before a file enters the session; everything beyond the
/// declared MIME type is the endpoint's problem.
pub fn validate_upload(mime: &str, size: u64) -> Result<MediaKind, UploadError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    if IMAGE_MIME_TYPES.contains(&mime) {
        return Ok(MediaKind::Image);
    }
    if mime.starts_with("video/") {
        return Ok(MediaKind::Video);
    }
    Err(UploadError::Unsupported {
        mime: if mime.is_empty() {
            "Unknown".to_string()
        } else {
            mime.to_string()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_image_types() {
        assert_eq!(validate_upload("image/png", 1024), Ok(MediaKind::Image));
        assert_eq!(validate_upload("image/webp", 1024), Ok(MediaKind::Image));
    }

    #[test]
    fn accepts_any_video_type() {
        assert_eq!(validate_upload("video/mp4", 1024), Ok(MediaKind::Video));
        assert_eq!(validate_upload("video/x-matroska", 1024), Ok(MediaKind::Video));
    }

    #[test]
    fn rejects_oversized_files() {
        let size = MAX_UPLOAD_BYTES + 1;
        assert_eq!(
            validate_upload("image/png", size),
            Err(UploadError::TooLarge { size })
        );
    }

    #[test]
    fn rejects_unknown_types() {
        assert!(matches!(
            validate_upload("application/pdf", 10),
            Err(UploadError::Unsupported { .. })
        ));
        assert!(matches!(
            validate_upload("", 10),
            Err(UploadError::Unsupported { mime }) if mime == "Unknown"
        ));
    }
}
