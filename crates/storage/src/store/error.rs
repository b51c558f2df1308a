#![forbid(unsafe_code)]

use crate::fs::FileStorageError;
use mb_core::DocumentError;

#[derive(Debug)]
pub enum StoreError {
    Storage {
        op: &'static str,
        path: String,
        source: FileStorageError,
    },
    Corrupt {
        path: String,
        detail: String,
    },
    InvalidDocument(DocumentError),
    InvalidInput(&'static str),
    UnknownBranch,
}

impl StoreError {
    pub(crate) fn storage(
        op: &'static str,
        path: impl Into<String>,
        source: FileStorageError,
    ) -> Self {
        Self::Storage {
            op,
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage { op, path, source } => write!(f, "{op} ({path}): {source}"),
            Self::Corrupt { path, detail } => write!(f, "corrupt document ({path}): {detail}"),
            Self::InvalidDocument(err) => write!(f, "invalid document: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::UnknownBranch => write!(f, "unknown branch"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage { source, .. } => Some(source),
            Self::InvalidDocument(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DocumentError> for StoreError {
    fn from(value: DocumentError) -> Self {
        Self::InvalidDocument(value)
    }
}
