//! Error types for the pill-buddy service.

use thiserror::Error;

/// Unified error type for the service.
#[derive(Debug, Error)]
pub enum PillBuddyError {
    /// Catalog could not be loaded
    #[error("Data load error: {0}")]
    DataLoad(#[from] crate::catalog::DataLoadError),

    /// Configuration is unreadable or invalid
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Tool-related error
    #[error("Tool error: {0}")]
    Tool(#[from] crate::tool::ToolError),

    /// Response shaping error
    #[error("Shaping error: {0}")]
    Shaping(#[from] crate::lookup::ShapingError),

    /// Service client error
    #[error("Client error: {0}")]
    Client(#[from] crate::service::ClientError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = PillBuddyError> = std::result::Result<T, E>;
