//! Error types for geoviz crates.

use thiserror::Error;

/// Result type alias using VizError.
pub type VizResult<T> = Result<T, VizError>;

/// Primary error type for configuration and parsing failures.
///
/// Geometry operations never fail; errors only surface where caller-provided
/// configuration is parsed.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl VizError {
    /// Create an InvalidColor error.
    pub fn invalid_color(input: impl Into<String>) -> Self {
        Self::InvalidColor(input.into())
    }
}

impl From<std::io::Error> for VizError {
    fn from(err: std::io::Error) -> Self {
        VizError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VizError {
    fn from(err: serde_json::Error) -> Self {
        VizError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            VizError::invalid_color("#12").to_string(),
            "Invalid color: #12"
        );

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert_eq!(VizError::from(io).to_string(), "I/O error: no such file");

        let json = serde_json::from_str::<u32>("x").unwrap_err();
        let err = VizError::from(json);
        assert!(matches!(err, VizError::Json(_)));
        assert!(err.to_string().starts_with("JSON error: "));
    }
}
