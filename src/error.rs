use thiserror::Error;

pub type Result<T> = std::result::Result<T, WidgetLabError>;

#[derive(Debug, Error)]
pub enum WidgetLabError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Translation error: {0}")]
    Translation(String),
    #[error("Icon error: {0}")]
    Icon(String),
    #[error("Error: {0}")]
    Generic(String),
}

impl From<String> for WidgetLabError {
    fn from(error: String) -> Self {
        WidgetLabError::Generic(error)
    }
}

impl From<&str> for WidgetLabError {
    fn from(error: &str) -> Self {
        WidgetLabError::Generic(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WidgetLabError::from("boom");
        assert_eq!(err.to_string(), "Error: boom");

        let err = WidgetLabError::Translation("missing namespace".to_string());
        assert_eq!(err.to_string(), "Translation error: missing namespace");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: WidgetLabError = io.into();
        assert!(matches!(err, WidgetLabError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
