//! Document store error types.

/// Errors that can occur while talking to the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Store returned an error response
    #[error("Store error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to decode a response or a stored document
    #[error("Failed to decode document: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Document does not exist
    #[error("Document not found: {path}")]
    NotFound { path: String },

    /// Document already exists
    #[error("Document already exists: {path}")]
    AlreadyExists { path: String },

    /// Document or field cannot be represented by the store
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Subscription producer stopped
    #[error("Subscription closed")]
    Closed,
}

impl StoreError {
    /// Whether retrying the same request may succeed.
    ///
    pub fn is_retriable(&self) -> bool {
        match self {
            StoreError::HttpRequest(_) | StoreError::Closed => true,
            StoreError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let error = StoreError::NotFound {
            path: "storages/team".to_string(),
        };
        assert!(error.to_string().contains("storages/team"));

        let error = StoreError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(error.to_string().contains("503"));
        assert!(error.to_string().contains("unavailable"));
    }

    #[test]
    fn test_retriable_errors() {
        assert!(StoreError::Api {
            status: 503,
            message: String::new()
        }
        .is_retriable());
        assert!(StoreError::Api {
            status: 429,
            message: String::new()
        }
        .is_retriable());
        assert!(!StoreError::Api {
            status: 400,
            message: String::new()
        }
        .is_retriable());
        assert!(!StoreError::NotFound {
            path: String::new()
        }
        .is_retriable());
        assert!(!StoreError::InvalidDocument(String::new()).is_retriable());
    }
}
