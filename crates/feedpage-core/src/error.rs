use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Failed to resolve identifiers from '{index}': {message}")]
    Resolution { index: String, message: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error means the store cannot be reached at all
    pub fn is_store_unavailable(&self) -> bool {
        match self {
            Error::StoreUnavailable(_) => true,
            Error::Redis(e) => is_connectivity_error(e),
            _ => false,
        }
    }

    /// Re-label a failed index read as a resolution failure.
    ///
    /// Connectivity failures keep their identity so the boundary can still
    /// tell "store is down" apart from "index is unreadable".
    pub fn into_resolution(self, index: &str) -> Self {
        match self {
            Error::StoreUnavailable(_) | Error::Resolution { .. } | Error::Validation(_) => self,
            Error::Redis(ref e) if is_connectivity_error(e) => Error::StoreUnavailable(e.to_string()),
            other => Error::Resolution {
                index: index.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Check if a Redis error stems from the connection rather than the command
pub(crate) fn is_connectivity_error(err: &redis::RedisError) -> bool {
    err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_resolution_keeps_validation() {
        let err = Error::Validation("page must be >= 1".into()).into_resolution("rss_feed");
        assert!(matches!(err, Error::Validation(_)));
        assert!(!err.is_store_unavailable());
    }

    #[test]
    fn test_into_resolution_keeps_unavailable() {
        let err = Error::StoreUnavailable("connection refused".into()).into_resolution("rss_feed");
        assert!(err.is_store_unavailable());
    }

    #[test]
    fn test_into_resolution_wraps_other_errors() {
        let err = Error::Other("WRONGTYPE".into()).into_resolution("rss_feed");
        match err {
            Error::Resolution { index, message } => {
                assert_eq!(index, "rss_feed");
                assert_eq!(message, "WRONGTYPE");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
