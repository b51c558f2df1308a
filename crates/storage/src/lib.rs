#![forbid(unsafe_code)]

pub mod fs;
mod store;

pub use fs::{FileStats, FileStorage, FileStorageError, LocalFileStorage};
pub use store::{
    DocumentRef, DocumentRepository, DocumentSelector, IndexMetadata, IndexUpdateOutcome,
    StoreError, TagIndexStore, update_index,
};
