#![forbid(unsafe_code)]

use super::DocumentRepository;
use crate::store::StoreError;
use mb_core::{Document, DocumentPath, Scope};
use tracing::warn;

impl DocumentRepository {
    /// Index-backed listing of every document in the scope. A missing or
    /// unusable index triggers a full directory scan that also rebuilds the
    /// index, so repeated listings amortize the repair.
    pub fn list_all(&mut self, scope: &Scope) -> Result<Vec<Document>, StoreError> {
        self.ensure_index(scope)?;
        let references = self.index_store().list_all(scope)?;
        self.load_references(scope, references)
    }

    /// Scans the scope directory for parseable documents, skipping files
    /// that are not well-formed documents. An absent directory is an empty
    /// scope, not an error.
    pub(crate) fn scan_documents(&mut self, scope: &Scope) -> Result<Vec<Document>, StoreError> {
        let dir = self.scope_dir(scope);
        let exists = self
            .files()
            .directory_exists(&dir)
            .map_err(|err| StoreError::storage("stat scope dir", dir.display().to_string(), err))?;
        if !exists {
            return Ok(Vec::new());
        }

        let entries = self
            .files()
            .list_files(&dir)
            .map_err(|err| StoreError::storage("scan scope dir", dir.display().to_string(), err))?;

        let mut documents = Vec::new();
        for entry in entries {
            let raw = entry.to_string_lossy().replace('\\', "/");
            let Ok(path) = DocumentPath::try_new(raw.as_str()) else {
                warn!(file = raw, "skipping unrepresentable file name");
                continue;
            };
            if path.extension() != Some("json") {
                continue;
            }
            let abs = self.document_abs_path(scope, &path);
            let text = match self.files().read_file(&abs) {
                Ok(text) => text,
                Err(err) if err.is_not_found() => continue,
                Err(err) => {
                    warn!(file = raw, %err, "skipping unreadable file during scan");
                    continue;
                }
            };
            match Document::from_text(&text, path) {
                Ok(document) => documents.push(document),
                Err(err) => {
                    warn!(file = raw, %err, "skipping unparseable file during scan");
                }
            }
        }
        Ok(documents)
    }

    /// Full self-repair: scan the authoritative files, rebuild the scope's
    /// index from them and persist it.
    pub(crate) fn rebuild_from_scan(&mut self, scope: &Scope) -> Result<Vec<Document>, StoreError> {
        let documents = self.scan_documents(scope)?;
        self.index_store().build_index(scope, &documents)?;
        self.index_store().save_index(scope)?;
        Ok(documents)
    }
}
