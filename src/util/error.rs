//! Error types for the synchronization engine.
//!
//! Only caller-facing failures live here. Conditions that degrade a single
//! snapshot (unsupported node types, incomplete fragments, stale reads) are
//! reported as [`Diagnostic`]s and never surface as `Err`.

use std::fmt;
use thiserror::Error;

/// Main error type for scenesync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested hash was never registered with the array cache (or was swept)
    #[error("Array not cached: {0}")]
    ArrayNotCached(String),

    /// Attempted to hash an array with no elements
    #[error("Cannot digest empty array: {0}")]
    EmptyArray(String),

    /// Configuration could not be interpreted
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Zip container error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed base64 text
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result type alias for scenesync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable conditions met while walking a scene.
///
/// Used as the `kind` field of traversal trace events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    /// No serializer registered for a class name.
    UnsupportedType,
    /// A composite node's required children did not all serialize.
    IncompleteFragment,
    /// A cached array was served after its source changed.
    StaleCacheRead,
    /// Dataset without point coordinates.
    MissingPoints,
    /// Dataset without the scalar field it needs.
    MissingScalars,
    /// A node kind lacks an accessor the serializer asked for.
    MissingAccessor,
}

impl Diagnostic {
    pub const fn name(self) -> &'static str {
        match self {
            Self::UnsupportedType => "unsupported-type",
            Self::IncompleteFragment => "incomplete-fragment",
            Self::StaleCacheRead => "stale-cache-read",
            Self::MissingPoints => "missing-points",
            Self::MissingScalars => "missing-scalars",
            Self::MissingAccessor => "missing-accessor",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
