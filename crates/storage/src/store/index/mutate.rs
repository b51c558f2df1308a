#![forbid(unsafe_code)]

use super::TagIndexStore;
use crate::store::{DocumentRef, DocumentSelector, StoreError};
use mb_core::{Document, Scope};

impl TagIndexStore {
    /// Incremental upsert. Prior bucket entries for the document's path are
    /// pruned first, so tags the document no longer carries do not linger
    /// until the next full rebuild.
    pub fn add_to_index(&mut self, scope: &Scope, document: &Document) -> Result<(), StoreError> {
        let index = self.ensure(scope)?;
        index.remove_path(document.path().as_str());
        index.insert(DocumentRef::of(document), document.tags());
        index.touch(false);
        Ok(())
    }

    /// Removes every trace of the selected document: its projection, its tag
    /// bucket entries and its type bucket entry. Returns the removed
    /// projection, if any.
    pub fn remove_from_index(
        &mut self,
        scope: &Scope,
        selector: &DocumentSelector,
    ) -> Result<Option<DocumentRef>, StoreError> {
        let path = match self.resolve_selector(scope, selector)? {
            Some(path) => path,
            None => return Ok(None),
        };
        let index = self.ensure(scope)?;
        let removed = index.remove_path(&path);
        if removed.is_some() {
            index.touch(false);
        }
        Ok(removed)
    }

    /// Resolves a selector to the indexed document path, without mutating.
    pub(crate) fn resolve_selector(
        &mut self,
        scope: &Scope,
        selector: &DocumentSelector,
    ) -> Result<Option<String>, StoreError> {
        match selector {
            DocumentSelector::ByPath(path) => Ok(Some(path.as_str().to_string())),
            DocumentSelector::ByValue(document) => Ok(Some(document.path().as_str().to_string())),
            DocumentSelector::ById(id) => Ok(self
                .find_by_id(scope, id)?
                .map(|reference| reference.path.as_str().to_string())),
        }
    }
}
