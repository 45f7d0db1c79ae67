use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Throttled: {0}")]
    Throttled(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// A batched write left some of the aggregate's items unwritten.
    #[error("Partial write for partner {partner_id}: {written} written, {unprocessed} unprocessed")]
    PartialWrite {
        partner_id: String,
        written: usize,
        unprocessed: usize,
    },
    #[error("Transaction too large: {items} items exceeds the limit of {limit}")]
    TransactionTooLarge { items: usize, limit: usize },
}

impl RepositoryError {
    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Throttled(_) | Self::PartialWrite { .. }
        )
    }

    /// Prefixes the message with the operation and the aggregate it ran on.
    ///
    /// Variants that already name their aggregate are returned unchanged.
    pub fn with_context(self, operation: &str, id: &str) -> Self {
        let prefix = |message: String| format!("{operation} {id}: {message}");
        match self {
            Self::ConnectionFailed(message) => Self::ConnectionFailed(prefix(message)),
            Self::Throttled(message) => Self::Throttled(prefix(message)),
            Self::QueryFailed(message) => Self::QueryFailed(prefix(message)),
            Self::Serialization(message) => Self::Serialization(prefix(message)),
            Self::InvalidData(message) => Self::InvalidData(prefix(message)),
            other => other,
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
