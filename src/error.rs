use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from reading seed or config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed tree JSON.
    #[error("Tree parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The tracing subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),

    /// The child loader failed for a node.
    #[error("Failed to load children of {id}: {reason}")]
    Load { id: String, reason: String },
}
