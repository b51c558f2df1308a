#![forbid(unsafe_code)]

use super::{DocumentRepository, StoreError};
use mb_core::time::ts_ms_to_rfc3339;
use mb_core::{Scope, Tag};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexUpdateOutcome {
    pub scope: String,
    pub tags: Vec<Tag>,
    pub document_count: usize,
    pub full_rebuild: bool,
    pub updated_at: String,
}

/// Refreshes a scope's index from the documents actually on disk: a full
/// rebuild discards prior index state, an incremental update upserts every
/// scanned document and leaves entries for since-deleted documents to the
/// next rebuild. A named branch must exist before any listing work starts.
pub fn update_index(
    repo: &mut DocumentRepository,
    scope: &Scope,
    full_rebuild: bool,
) -> Result<IndexUpdateOutcome, StoreError> {
    if let Scope::Branch(branch) = scope {
        if !repo.branch_exists(branch)? {
            return Err(StoreError::UnknownBranch);
        }
    }

    let document_count = if full_rebuild {
        repo.rebuild_from_scan(scope)?.len()
    } else {
        repo.ensure_index(scope)?;
        let documents = repo.scan_documents(scope)?;
        for document in &documents {
            repo.index_store().add_to_index(scope, document)?;
        }
        repo.index_store().save_index(scope)?;
        documents.len()
    };

    let tags = repo.index_store().tag_vocabulary(scope)?;
    let metadata = repo.index_store().metadata(scope)?;
    Ok(IndexUpdateOutcome {
        scope: scope.label().to_string(),
        tags,
        document_count,
        full_rebuild,
        updated_at: ts_ms_to_rfc3339(metadata.updated_at_ms),
    })
}
