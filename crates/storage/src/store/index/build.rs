#![forbid(unsafe_code)]

use super::{TagIndex, TagIndexStore};
use crate::store::{DocumentRef, StoreError};
use mb_core::{Document, Scope};

impl TagIndexStore {
    /// Makes sure a persisted (possibly empty) index record exists and is
    /// loadable for the scope.
    pub fn initialize_index(&mut self, scope: &Scope) -> Result<(), StoreError> {
        let path = self.index_path(scope);
        let present = self
            .files()
            .file_exists(&path)
            .map_err(|err| StoreError::storage("stat index", path.display().to_string(), err))?;
        if present && self.load_index(scope)? {
            return Ok(());
        }
        self.ensure(scope)?;
        self.save_index(scope)
    }

    /// Full rebuild: discards any existing index for the scope and
    /// reconstructs it from exactly the given document set. A document with
    /// N tags lands in N tag buckets. In-memory until `save_index`.
    pub fn build_index(&mut self, scope: &Scope, documents: &[Document]) -> Result<(), StoreError> {
        let mut index = TagIndex::new(scope.label());
        for document in documents {
            index.insert(DocumentRef::of(document), document.tags());
        }
        index.touch(true);
        self.replace(scope, index);
        Ok(())
    }
}
