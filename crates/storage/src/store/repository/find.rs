#![forbid(unsafe_code)]

use super::{DocumentRepository, LoadOutcome};
use crate::store::{DocumentRef, DocumentSelector, StoreError};
use mb_core::{Document, DocumentId, DocumentPath, DocumentType, Scope, Tag};
use tracing::warn;

impl DocumentRepository {
    /// Looks one document up by its path. An index entry whose backing file
    /// is gone is index drift, not an error: the stale entry is removed and
    /// the result is `None`. An index miss falls back to a direct file
    /// probe, inserting the document into the index when the probe succeeds.
    pub fn find_by_path(
        &mut self,
        scope: &Scope,
        path: &DocumentPath,
    ) -> Result<Option<Document>, StoreError> {
        self.ensure_index(scope)?;

        if self.index_store().find_by_path(scope, path)?.is_some() {
            return match self.load_document(scope, path) {
                LoadOutcome::Loaded(document) => Ok(Some(document)),
                LoadOutcome::Missing => {
                    self.heal_remove(scope, path)?;
                    Ok(None)
                }
                LoadOutcome::Unreadable(detail) => Err(StoreError::Corrupt {
                    path: path.as_str().to_string(),
                    detail,
                }),
                LoadOutcome::Failed(err) => {
                    Err(StoreError::storage("read document", path.as_str(), err))
                }
            };
        }

        match self.load_document(scope, path) {
            LoadOutcome::Loaded(document) => {
                self.index_store().add_to_index(scope, &document)?;
                self.index_store().save_index(scope)?;
                Ok(Some(document))
            }
            LoadOutcome::Missing => Ok(None),
            LoadOutcome::Unreadable(detail) => Err(StoreError::Corrupt {
                path: path.as_str().to_string(),
                detail,
            }),
            LoadOutcome::Failed(err) => {
                Err(StoreError::storage("read document", path.as_str(), err))
            }
        }
    }

    /// Scans every scope for the id (ids are not scope-qualified in storage)
    /// and returns the first match together with its scope.
    pub fn find_by_id(
        &mut self,
        id: &DocumentId,
    ) -> Result<Option<(Scope, Document)>, StoreError> {
        for scope in self.scopes()? {
            self.ensure_index(&scope)?;
            let Some(reference) = self.index_store().find_by_id(&scope, id)? else {
                continue;
            };
            match self.load_document(&scope, &reference.path) {
                LoadOutcome::Loaded(document) => return Ok(Some((scope, document))),
                LoadOutcome::Missing | LoadOutcome::Unreadable(_) => {
                    self.heal_remove(&scope, &reference.path)?;
                }
                LoadOutcome::Failed(err) => {
                    warn!(path = reference.path.as_str(), %err, "skipping unavailable document");
                }
            }
        }
        Ok(None)
    }

    /// AND/OR tag search. References whose backing file went away are
    /// dropped from the result and pruned from the index; one bad document
    /// never fails the whole call.
    pub fn find_by_tags(
        &mut self,
        scope: &Scope,
        tags: &[Tag],
        match_all: bool,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_index(scope)?;
        let references = self.index_store().find_by_tags(scope, tags, match_all)?;
        self.load_references(scope, references)
    }

    pub fn find_by_type(
        &mut self,
        scope: &Scope,
        doc_type: DocumentType,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_index(scope)?;
        let references = self.index_store().find_by_type(scope, doc_type)?;
        self.load_references(scope, references)
    }

    /// Index check first; a stale hit counts as absent (and is pruned), an
    /// index miss falls back to a direct file probe.
    pub fn exists(&mut self, scope: &Scope, path: &DocumentPath) -> Result<bool, StoreError> {
        self.ensure_index(scope)?;
        let abs = self.document_abs_path(scope, path);
        let on_disk = self
            .files()
            .file_exists(&abs)
            .map_err(|err| StoreError::storage("stat document", path.as_str(), err))?;

        if self.index_store().find_by_path(scope, path)?.is_some() && !on_disk {
            self.heal_remove(scope, path)?;
            return Ok(false);
        }
        Ok(on_disk)
    }

    /// Bulk load for search/list results, degrading per the non-fatal
    /// failure policy and persisting any index repairs it made.
    pub(crate) fn load_references(
        &mut self,
        scope: &Scope,
        references: Vec<DocumentRef>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::with_capacity(references.len());
        let mut healed = false;
        for reference in references {
            match self.load_document(scope, &reference.path) {
                LoadOutcome::Loaded(document) => documents.push(document),
                LoadOutcome::Missing => {
                    warn!(path = reference.path.as_str(), "pruning stale index entry");
                    let selector = DocumentSelector::ByPath(reference.path.clone());
                    self.index_store().remove_from_index(scope, &selector)?;
                    healed = true;
                }
                LoadOutcome::Unreadable(detail) => {
                    warn!(path = reference.path.as_str(), detail, "pruning unreadable document");
                    let selector = DocumentSelector::ByPath(reference.path.clone());
                    self.index_store().remove_from_index(scope, &selector)?;
                    healed = true;
                }
                LoadOutcome::Failed(err) => {
                    warn!(path = reference.path.as_str(), %err, "skipping unavailable document");
                }
            }
        }
        if healed {
            self.index_store().save_index(scope)?;
        }
        Ok(documents)
    }

    pub(crate) fn heal_remove(
        &mut self,
        scope: &Scope,
        path: &DocumentPath,
    ) -> Result<(), StoreError> {
        warn!(path = path.as_str(), "pruning stale index entry");
        let selector = DocumentSelector::ByPath(path.clone());
        self.index_store().remove_from_index(scope, &selector)?;
        self.index_store().save_index(scope)
    }
}
