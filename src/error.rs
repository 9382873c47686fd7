//! Error types for the Zotero client.

/// Errors that can occur when talking to Zotero's local surfaces.
#[derive(Debug, thiserror::Error)]
pub enum ZoteroError {
    /// HTTP request failed (network-level, not an API status).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Zotero returned an error status code.
    #[error("Zotero API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The Zotero desktop application is not reachable.
    #[error("Cannot connect to Zotero: {0}. Ensure Zotero desktop is running with the local API enabled")]
    NotRunning(String),

    /// A request exceeded its timeout.
    #[error("Request to Zotero timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The zotero.sqlite database could not be located on disk.
    #[error("{0}")]
    DatabaseNotFound(String),

    /// SQLite-level failure while reading the local database.
    #[error("Local database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Item type has no bibliographic identity (attachment, note).
    #[error("Cannot generate a citation for item type '{0}'")]
    UnsupportedItemType(String),

    /// Malformed caller input, rejected before any I/O.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to parse a response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for Results using [`ZoteroError`].
pub type Result<T> = std::result::Result<T, ZoteroError>;
