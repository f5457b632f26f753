/// Error types for the gateway core
use aws_smithy_types::error::display::DisplayErrorContext;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Key does not exist: {0}")]
    MissingKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflicting update in progress: {0}")]
    Conflict(String),

    #[error("Upstream throttled request: {0}")]
    Throttled(String),

    #[error("Upstream error in {operation}: {message}")]
    Upstream {
        operation: String,
        message: String,
        /// Full error-context chain, only surfaced to clients in debug mode
        detail: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Determines if an error is retriable
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::Throttled(_) => true,
            Self::Validation(_) => false,
            Self::MissingKey(_) => false,
            Self::NotFound(_) => false,
            Self::Upstream { .. } => false,
            Self::Config(_) => false,
        }
    }

    /// Wraps any upstream SDK failure, keeping its full context chain
    pub fn upstream<E>(operation: &str, err: E) -> Self
    where
        E: std::error::Error,
    {
        Self::Upstream {
            operation: operation.to_string(),
            message: DisplayErrorContext(&err).to_string(),
            detail: format!("{:?}", err),
        }
    }

    /// Diagnostic detail for upstream failures
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Upstream { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
