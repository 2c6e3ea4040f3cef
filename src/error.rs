use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a capture file from being parsed at all.
/// Record-level problems never surface here; they land in `ParsedBatch::errors`.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported top-level JSON in {} (expected object or array, got {kind})", path.display())]
    UnsupportedTopLevel { path: PathBuf, kind: &'static str },
}

/// Why a builder refused a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing identifier (tried {0})")]
    MissingIdentifier(String),

    #[error("field `{0}` is not a scalar")]
    InvalidField(String),
}
