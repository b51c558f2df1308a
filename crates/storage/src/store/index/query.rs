#![forbid(unsafe_code)]

use super::TagIndexStore;
use crate::store::{DocumentRef, StoreError};
use mb_core::{DocumentId, DocumentPath, DocumentType, Scope, Tag};
use std::collections::BTreeSet;

impl TagIndexStore {
    pub fn find_by_id(
        &mut self,
        scope: &Scope,
        id: &DocumentId,
    ) -> Result<Option<DocumentRef>, StoreError> {
        let index = self.ensure(scope)?;
        Ok(index
            .documents
            .values()
            .find(|reference| &reference.id == id)
            .cloned())
    }

    pub fn find_by_path(
        &mut self,
        scope: &Scope,
        path: &DocumentPath,
    ) -> Result<Option<DocumentRef>, StoreError> {
        let index = self.ensure(scope)?;
        Ok(index.documents.get(path.as_str()).cloned())
    }

    /// Tag search. OR mode is the union of the queried buckets; AND mode is
    /// the commutative intersection across every queried bucket, so a queried
    /// tag with no bucket empties the result regardless of its position.
    /// Results are deduplicated by path and path-sorted.
    pub fn find_by_tags(
        &mut self,
        scope: &Scope,
        tags: &[Tag],
        match_all: bool,
    ) -> Result<Vec<DocumentRef>, StoreError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }
        let index = self.ensure(scope)?;

        let mut selected: Option<BTreeSet<String>> = None;
        for tag in tags {
            let bucket = index.tags.get(tag.as_str()).cloned().unwrap_or_default();
            selected = Some(match selected {
                None => bucket,
                Some(acc) if match_all => acc.intersection(&bucket).cloned().collect(),
                Some(acc) => acc.union(&bucket).cloned().collect(),
            });
            if match_all && selected.as_ref().is_some_and(BTreeSet::is_empty) {
                break;
            }
        }

        let paths = selected.unwrap_or_default();
        Ok(paths
            .iter()
            .filter_map(|path| index.documents.get(path).cloned())
            .collect())
    }

    pub fn find_by_type(
        &mut self,
        scope: &Scope,
        doc_type: DocumentType,
    ) -> Result<Vec<DocumentRef>, StoreError> {
        let index = self.ensure(scope)?;
        let paths = index
            .types
            .get(doc_type.as_str())
            .cloned()
            .unwrap_or_default();
        Ok(paths
            .iter()
            .filter_map(|path| index.documents.get(path).cloned())
            .collect())
    }

    pub fn list_all(&mut self, scope: &Scope) -> Result<Vec<DocumentRef>, StoreError> {
        let index = self.ensure(scope)?;
        Ok(index.documents.values().cloned().collect())
    }

    /// Every tag currently carrying at least one document, sorted.
    pub fn tag_vocabulary(&mut self, scope: &Scope) -> Result<Vec<Tag>, StoreError> {
        let index = self.ensure(scope)?;
        let mut out = Vec::with_capacity(index.tags.len());
        for raw in index.tags.keys() {
            let tag = Tag::try_new(raw.as_str())
                .map_err(|_| StoreError::InvalidInput("index contains an invalid tag"))?;
            out.push(tag);
        }
        Ok(out)
    }
}
