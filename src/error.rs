use thiserror::Error;

/// Main error type for OralGen
#[derive(Error, Debug)]
pub enum OralgenError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Watcher setup or event errors
    #[error("Watch error: {0}")]
    Watch(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using OralgenError
pub type Result<T> = std::result::Result<T, OralgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OralgenError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: OralgenError = json_err.into();
        assert!(matches!(err, OralgenError::Json(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: OralgenError = io_err.into();
        assert!(matches!(err, OralgenError::Io(_)));
    }
}
