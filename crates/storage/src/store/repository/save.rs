#![forbid(unsafe_code)]

use super::DocumentRepository;
use crate::store::{DocumentSelector, StoreError};
use mb_core::{Document, DocumentPath, Scope};

impl DocumentRepository {
    /// Serializes and writes the document, then updates the index. The file
    /// write must succeed before the index is touched: a crash mid-save can
    /// leave a written file the index does not know about (healed on next
    /// read) but never a phantom index entry pointing at nothing.
    pub fn save(&mut self, scope: &Scope, document: &Document) -> Result<(), StoreError> {
        let abs = self.document_abs_path(scope, document.path());
        if let Some(parent) = abs.parent() {
            self.files().create_directory(parent).map_err(|err| {
                StoreError::storage("create document dir", parent.display().to_string(), err)
            })?;
        }
        self.files()
            .write_file(&abs, &document.to_text(true))
            .map_err(|err| StoreError::storage("write document", document.path().as_str(), err))?;

        self.ensure_index(scope)?;
        self.index_store().add_to_index(scope, document)?;
        self.index_store().save_index(scope)
    }

    /// Resolves the selector to a path, removes it from the index, then
    /// deletes the file. Returns whether a file was actually removed.
    pub fn delete(
        &mut self,
        scope: &Scope,
        selector: &DocumentSelector,
    ) -> Result<bool, StoreError> {
        self.ensure_index(scope)?;
        let resolved = self.index_store().resolve_selector(scope, selector)?;
        let Some(raw) = resolved else {
            // An id that no scope index knows about names nothing to delete.
            return Ok(false);
        };
        let path = DocumentPath::try_new(raw).map_err(mb_core::DocumentError::from)?;

        let removed = self
            .index_store()
            .remove_from_index(scope, &DocumentSelector::ByPath(path.clone()))?;
        if removed.is_some() {
            self.index_store().save_index(scope)?;
        }

        let abs = self.document_abs_path(scope, &path);
        self.files()
            .delete_file(&abs)
            .map_err(|err| StoreError::storage("delete document", path.as_str(), err))
    }
}
