//! Error types for the cloudwire core.

/// Core error type for configuration and runtime bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A configuration value could not be interpreted.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
