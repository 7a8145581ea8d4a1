//! Common error types used throughout reelvault.
//!
//! One unified error enum covers the whole upload/streaming taxonomy so
//! route handlers can map any failure to an HTTP status in one place.

/// Common error type for reelvault.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The upload was rejected before any work was done (bad content type,
    /// oversize payload, missing file field).
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// No live upload session with the given ID (expired, finalized,
    /// canceled, or never existed).
    #[error("Upload session not found: {0}")]
    SessionNotFound(String),

    /// The requested catalog entry or backing file was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request did not carry a Range header. Streaming is range-only.
    #[error("Range header required")]
    RangeRequired,

    /// The Range header was malformed or outside the file bounds.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A durable storage write or delete failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new InvalidUpload error.
    pub fn invalid_upload<S: Into<String>>(msg: S) -> Self {
        Self::InvalidUpload(msg.into())
    }

    /// Create a new SessionNotFound error.
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        Self::SessionNotFound(id.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new InvalidRange error.
    pub fn invalid_range<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create a new Storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code this error maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidUpload(_) | Self::RangeRequired => 400,
            Self::SessionNotFound(_) | Self::NotFound(_) => 404,
            Self::InvalidRange(_) => 416,
            Self::Storage(_) | Self::Database(_) | Self::Io(_) | Self::Internal(_) => 500,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
