//! Error types for the REST boundary.

/// Error returned by the transport layer, classified by origin.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response with a server-supplied message.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, timeout, or body transfer failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx body that does not parse as the expected type.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The human-readable message for a read failure. Server-supplied text
    /// when present, generic otherwise.
    pub fn read_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            _ => "Failed to fetch data".to_string(),
        }
    }

    /// The human-readable message for a write failure.
    pub fn write_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            _ => "Operation failed".to_string(),
        }
    }

    /// HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for transport operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_passthrough() {
        let err = ApiError::Status {
            status: 409,
            message: "Vehicle ID already exists".into(),
        };
        assert_eq!(err.read_message(), "Vehicle ID already exists");
        assert_eq!(err.write_message(), "Vehicle ID already exists");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_generic_fallbacks() {
        let err = ApiError::Decode(serde_json::from_str::<i32>("oops").unwrap_err());
        assert_eq!(err.read_message(), "Failed to fetch data");
        assert_eq!(err.write_message(), "Operation failed");
        assert_eq!(err.status(), None);
    }
}
