use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by [`Error::Io`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{op} {path}: not found")]
    NotFound { op: &'static str, path: String },

    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The destination holds a full copy but the source could not be removed.
    /// Both objects now exist.
    #[error("move {src} -> {dst}: copy succeeded, source delete failed: {source}")]
    MoveIncomplete {
        src: String,
        dst: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn not_found(op: &'static str, path: impl Into<String>) -> Self {
        Error::NotFound {
            op,
            path: path.into(),
        }
    }

    pub fn io(op: &'static str, path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Io {
            op,
            path: path.into(),
            source: source.into(),
        }
    }

    /// Map a std I/O error, keeping `ErrorKind::NotFound` distinct.
    pub fn from_io(op: &'static str, path: impl Into<String>, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Error::not_found(op, path)
        } else {
            Error::io(op, path, err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_move_incomplete(&self) -> bool {
        matches!(self, Error::MoveIncomplete { .. })
    }
}
