#![forbid(unsafe_code)]

mod error;
mod index;
mod repository;
mod update;

pub use error::StoreError;
pub use index::{IndexMetadata, TagIndexStore};
pub use repository::DocumentRepository;
pub use update::{IndexUpdateOutcome, update_index};

use mb_core::{Document, DocumentId, DocumentPath, DocumentType};

/// Lightweight projection of a document, sufficient to locate and re-load it.
/// Holders must not assume the backing file still exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRef {
    pub id: DocumentId,
    pub path: DocumentPath,
    pub doc_type: DocumentType,
    pub title: String,
    pub last_modified_ms: i64,
}

impl DocumentRef {
    pub fn of(document: &Document) -> Self {
        Self {
            id: document.id().clone(),
            path: document.path().clone(),
            doc_type: document.doc_type(),
            title: document.title().to_string(),
            last_modified_ms: document.last_modified_ms(),
        }
    }
}

/// How a caller names the document a delete/remove targets. Resolved to a
/// canonical path once, at the store boundary.
#[derive(Clone, Debug)]
pub enum DocumentSelector {
    ById(DocumentId),
    ByPath(DocumentPath),
    ByValue(Box<Document>),
}

impl DocumentSelector {
    pub fn for_document(document: &Document) -> Self {
        Self::ByValue(Box::new(document.clone()))
    }
}
