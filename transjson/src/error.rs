/// Error types for translation requests and backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// The request is malformed or names an unsupported language/module
    InvalidRequest(String),
    /// A language code failed format validation
    InvalidLocale(String),
    /// Backend configuration is missing or unusable
    ConfigError(String),
    /// The backend reported an error or returned malformed output
    TranslationError(String),
    /// The backend answered with a placeholder instead of a translation
    Sentinel(String),
    /// Transport failure talking to an HTTP backend
    NetworkError(String),
    /// An external translation process failed
    ProcessError(String),
    /// A single attempt exceeded its time budget
    Timeout(u64),
    /// Staging or file I/O failure
    Io(String),
    /// General error with context
    Other(String),
}

impl TranslateError {
    /// Whether this error came from the caller rather than a backend
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslateError::InvalidRequest(_) | TranslateError::InvalidLocale(_)
        )
    }

    /// Whether repeating the same call could succeed
    ///
    /// Configuration problems (bad API key, bad locale) fail the same way
    /// every time, so the orchestrator moves on to the next backend instead.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            TranslateError::InvalidRequest(_)
                | TranslateError::InvalidLocale(_)
                | TranslateError::ConfigError(_)
        )
    }
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::InvalidRequest(msg) => write!(f, "{}", msg),
            TranslateError::InvalidLocale(msg) => write!(f, "Invalid locale: {}", msg),
            TranslateError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            TranslateError::TranslationError(msg) => write!(f, "Translation error: {}", msg),
            TranslateError::Sentinel(value) => {
                write!(f, "Backend returned placeholder value {:?}", value)
            }
            TranslateError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            TranslateError::ProcessError(msg) => write!(f, "Process error: {}", msg),
            TranslateError::Timeout(ms) => write!(f, "Attempt timed out after {}ms", ms),
            TranslateError::Io(msg) => write!(f, "I/O error: {}", msg),
            TranslateError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslateError::NetworkError(format!("request timed out: {}", err))
        } else {
            TranslateError::NetworkError(err.to_string())
        }
    }
}

impl From<std::io::Error> for TranslateError {
    fn from(err: std::io::Error) -> Self {
        TranslateError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(err: serde_json::Error) -> Self {
        TranslateError::TranslationError(format!("malformed JSON: {}", err))
    }
}

/// Result type for translation operations
pub type TranslateResult<T> = Result<T, TranslateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(TranslateError::InvalidRequest("x".into()).is_client_error());
        assert!(TranslateError::InvalidLocale("x".into()).is_client_error());
        assert!(!TranslateError::Timeout(10).is_client_error());
        assert!(!TranslateError::NetworkError("down".into()).is_client_error());
    }

    #[test]
    fn test_retryable() {
        assert!(TranslateError::Timeout(10).is_retryable());
        assert!(TranslateError::Sentinel("--".into()).is_retryable());
        assert!(TranslateError::NetworkError("reset".into()).is_retryable());
        assert!(!TranslateError::ConfigError("bad key".into()).is_retryable());
        assert!(!TranslateError::InvalidLocale("x".into()).is_retryable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            TranslateError::InvalidRequest("Provide 'data'".into()).to_string(),
            "Provide 'data'"
        );
        assert_eq!(
            TranslateError::Timeout(250).to_string(),
            "Attempt timed out after 250ms"
        );
        assert!(
            TranslateError::Sentinel("--".into())
                .to_string()
                .contains("\"--\"")
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: TranslateError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, TranslateError::Io(msg) if msg.contains("missing")));
    }
}
