//! Common error types for the web player engine

use thiserror::Error;

/// Common result type for webplay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the webplay crates
///
/// The resolution engine itself never returns these: unresolvable media,
/// missing transcode settings and malformed URLs all degrade to fallbacks.
/// Errors only surface while loading configuration, playlists or the catalog.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration file
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Malformed JSON playlist or payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
