//! Error types for template rendering, codec resolution and result decoding.

use std::fmt;

use thiserror::Error;

/// Which side of the registry a lookup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecSide {
    Read,
    Write,
}

impl fmt::Display for CodecSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecSide::Read => write!(f, "read"),
            CodecSide::Write => write!(f, "write"),
        }
    }
}

/// Errors raised by sqlweave.
#[derive(Debug, Error)]
pub enum Error {
    /// No codec registered for the requested type.
    #[error("no {side} codec registered for type `{type_name}`")]
    NoCodec {
        side: CodecSide,
        type_name: &'static str,
    },

    /// Batch holes in one template disagree on their row count.
    #[error("batch size mismatch: template has {expected} rows, hole has {actual}")]
    BatchSizeMismatch { expected: usize, actual: usize },

    /// A single-statement builder was given a template with batch holes.
    #[error("template has batch holes; render it with a batch builder")]
    BatchHoles,

    /// A codec bound or rendered a different number of columns than it declared.
    #[error("arity mismatch: expected {expected} columns, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A map-shaped read saw the same key twice.
    #[error("duplicate key in map result: {0}")]
    DuplicateKey(String),

    /// Two decoded columns resolved to the same label.
    #[error("duplicate column label `{0}`")]
    DuplicateLabel(String),

    /// A non-nullable codec read NULL.
    #[error("unexpected NULL in column {column} for non-nullable `{type_name}`")]
    UnexpectedNull {
        column: usize,
        type_name: &'static str,
    },

    /// Stored value has the wrong storage class for the codec.
    #[error("column {column}: cannot decode {found} as `{expected}`")]
    TypeMismatch {
        column: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// Stored value does not fit the target type.
    #[error("value {value} out of range for `{type_name}`")]
    OutOfRange {
        type_name: &'static str,
        value: String,
    },

    /// Stored value has the right class but unparseable content.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Column index outside the current row.
    #[error("column {index} out of range (row has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    /// Row accessed while the cursor is before the first row or past the last.
    #[error("cursor is not positioned on a row")]
    NoCurrentRow,

    /// `first` on an empty result.
    #[error("no rows returned")]
    NotFound,

    /// Backend does not offer an optional capability.
    #[error("unsupported by backend: {0}")]
    Unsupported(&'static str),

    /// Failure reported by the underlying data source.
    #[error("backend error: {message}")]
    Backend {
        message: String,
        /// Set by the backend for failures worth re-running (lock contention and the like).
        transient: bool,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Build a backend error without an underlying source.
    pub fn backend(message: impl Into<String>, transient: bool) -> Self {
        Error::Backend {
            message: message.into(),
            transient,
            source: None,
        }
    }

    /// Whether re-running the whole unit of work may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Backend { transient: true, .. })
    }
}

/// Result type for sqlweave operations.
pub type Result<T> = std::result::Result<T, Error>;
