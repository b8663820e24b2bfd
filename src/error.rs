use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Response error: {0}")]
    Response(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input error: {0}")]
    Input(String),
    #[error("interrupted")]
    Interrupted,
}

impl From<base64::DecodeError> for ImageGenError {
    fn from(e: base64::DecodeError) -> Self {
        ImageGenError::Decode(e.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for ImageGenError {
    fn from(e: rustyline::error::ReadlineError) -> Self {
        ImageGenError::Input(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImageGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_and_decode_conversions() {
        let err: ImageGenError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert_eq!(err.to_string(), "I/O error: read-only");

        let err: ImageGenError = base64::DecodeError::InvalidLength.into();
        assert!(matches!(err, ImageGenError::Decode(_)));
    }

    #[test]
    fn test_display() {
        let err = ImageGenError::Api {
            status: 429,
            message: "Rate limit reached".into(),
        };
        assert_eq!(err.to_string(), "API error (429): Rate limit reached");
        assert_eq!(ImageGenError::Interrupted.to_string(), "interrupted");
    }
}
