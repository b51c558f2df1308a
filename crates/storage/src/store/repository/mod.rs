#![forbid(unsafe_code)]

mod find;
mod list;
mod save;

use super::{StoreError, TagIndexStore};
use crate::fs::{FileStorage, FileStorageError};
use mb_core::{BranchName, Document, DocumentPath, Scope};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

const GLOBAL_DIR: &str = "global";
const BRANCHES_DIR: &str = "branches";

/// Translates between `Document` entities and their on-disk JSON files
/// within one memory bank, keeping the tag index synchronized. The files are
/// authoritative; every read path treats "index says yes, storage says no"
/// as a normal case and repairs the index in place.
pub struct DocumentRepository {
    files: Arc<dyn FileStorage>,
    root: PathBuf,
    index: TagIndexStore,
}

/// Result of loading one indexed reference's backing file.
pub(crate) enum LoadOutcome {
    Loaded(Document),
    Missing,
    Unreadable(String),
    Failed(FileStorageError),
}

impl DocumentRepository {
    pub fn open(files: Arc<dyn FileStorage>, root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        files
            .create_directory(&root)
            .map_err(|err| StoreError::storage("create bank root", root.display().to_string(), err))?;
        let index = TagIndexStore::new(Arc::clone(&files), root.clone());
        Ok(Self { files, root, index })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_store(&mut self) -> &mut TagIndexStore {
        &mut self.index
    }

    pub fn branch_exists(&self, branch: &BranchName) -> Result<bool, StoreError> {
        let dir = self.root.join(BRANCHES_DIR).join(branch.safe_name());
        self.files
            .directory_exists(&dir)
            .map_err(|err| StoreError::storage("stat branch dir", dir.display().to_string(), err))
    }

    /// Every scope with a document directory: global first, then branches in
    /// sorted order. Branch names are reconstructed from their
    /// filesystem-safe form (first hyphen back to the namespace separator).
    pub fn scopes(&self) -> Result<Vec<Scope>, StoreError> {
        let mut out = vec![Scope::Global];
        let branches_dir = self.root.join(BRANCHES_DIR);
        let exists = self.files.directory_exists(&branches_dir).map_err(|err| {
            StoreError::storage("stat branches dir", branches_dir.display().to_string(), err)
        })?;
        if !exists {
            return Ok(out);
        }
        let entries = self.files.list_directories(&branches_dir).map_err(|err| {
            StoreError::storage("list branches", branches_dir.display().to_string(), err)
        })?;
        for entry in entries {
            let safe = entry.to_string_lossy().to_string();
            let raw = safe.replacen('-', "/", 1);
            match BranchName::try_new(raw) {
                Ok(branch) => out.push(Scope::Branch(branch)),
                Err(_) => warn!(dir = safe, "skipping unrecognized branch directory"),
            }
        }
        Ok(out)
    }

    pub(crate) fn scope_dir(&self, scope: &Scope) -> PathBuf {
        match scope {
            Scope::Global => self.root.join(GLOBAL_DIR),
            Scope::Branch(branch) => self.root.join(BRANCHES_DIR).join(branch.safe_name()),
        }
    }

    pub(crate) fn document_abs_path(&self, scope: &Scope, path: &DocumentPath) -> PathBuf {
        self.scope_dir(scope).join(path.as_str())
    }

    /// Makes the scope's index usable: loads the persisted record, or, when
    /// none is usable (absent or corrupt), rebuilds it from a directory scan.
    pub(crate) fn ensure_index(&mut self, scope: &Scope) -> Result<(), StoreError> {
        if self.index.is_loaded(scope) {
            return Ok(());
        }
        if self.index.load_index(scope)? {
            return Ok(());
        }
        self.rebuild_from_scan(scope)?;
        Ok(())
    }

    pub(crate) fn load_document(&self, scope: &Scope, path: &DocumentPath) -> LoadOutcome {
        let abs = self.document_abs_path(scope, path);
        match self.files.read_file(&abs) {
            Ok(text) => match Document::from_text(&text, path.clone()) {
                Ok(document) => LoadOutcome::Loaded(document),
                Err(err) => LoadOutcome::Unreadable(err.to_string()),
            },
            Err(err) if err.is_not_found() => LoadOutcome::Missing,
            Err(err) => LoadOutcome::Failed(err),
        }
    }

    pub(crate) fn files(&self) -> &Arc<dyn FileStorage> {
        &self.files
    }
}
