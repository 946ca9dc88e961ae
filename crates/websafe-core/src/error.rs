//! Error types for WebSafe

/// Result type alias using WebSafe's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for WebSafe operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Feature derivation errors (recovered locally by the extractor)
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Network probe errors (redirect or content fetch)
    #[error("probe error: {0}")]
    Probe(String),

    /// Model oracle errors (not loaded, malformed output)
    #[error("oracle error: {0}")]
    Oracle(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Request URL rejected before extraction
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a new probe error
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Create a new oracle error
    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::Oracle(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new invalid URL error
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error came from the model oracle
    pub fn is_oracle(&self) -> bool {
        matches!(self, Self::Oracle(_))
    }
}
