use relay_config::ConfigurationError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Relay is unrecoverable after a failed init: {0}")]
    Unrecoverable(String),

    #[error("Delivery to stream '{stream}' failed: {error}")]
    Delivery { stream: String, error: String },
}

impl RelayError {
    /// Check if this is a connection-related error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            RelayError::Connection(_) | RelayError::Unrecoverable(_)
        )
    }

    /// Delivery errors are absorbed by `relay()`; everything else reaches the caller
    pub fn is_delivery_error(&self) -> bool {
        matches!(self, RelayError::Delivery { .. })
    }

    /// Create a connection failed error
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        RelayError::Connection(msg.into())
    }

    /// Create a delivery failed error
    pub fn delivery_failed(stream: impl Into<String>, msg: impl Into<String>) -> Self {
        RelayError::Delivery {
            stream: stream.into(),
            error: msg.into(),
        }
    }

    pub fn not_initialized(stream: impl Into<String>) -> Self {
        Self::delivery_failed(stream, "relay is not initialized")
    }
}
