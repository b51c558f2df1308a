#![forbid(unsafe_code)]

mod build;
mod mutate;
mod persist;
mod query;

use super::{DocumentRef, StoreError};
use crate::fs::FileStorage;
use mb_core::time::now_ms_i64;
use mb_core::{Scope, Tag};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

pub const INDEX_SCHEMA: &str = "tag_index_v1";
const INDEX_DIR: &str = "indexes";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexMetadata {
    pub updated_at_ms: i64,
    pub document_count: usize,
    pub tag_count: usize,
    pub full_rebuild: bool,
    pub context: String,
}

/// One scope's index, in memory. The document files are authoritative; this
/// structure is a rebuildable cache over them.
#[derive(Clone, Debug)]
pub(crate) struct TagIndex {
    context: String,
    updated_at_ms: i64,
    full_rebuild: bool,
    /// path -> projection; includes documents with no tags at all.
    documents: BTreeMap<String, DocumentRef>,
    /// tag -> paths carrying it.
    tags: BTreeMap<String, BTreeSet<String>>,
    /// type -> paths; derived, rebuilt on load, never persisted.
    types: BTreeMap<String, BTreeSet<String>>,
}

impl TagIndex {
    pub(crate) fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            updated_at_ms: now_ms_i64(),
            full_rebuild: false,
            documents: BTreeMap::new(),
            tags: BTreeMap::new(),
            types: BTreeMap::new(),
        }
    }

    pub(crate) fn metadata(&self) -> IndexMetadata {
        IndexMetadata {
            updated_at_ms: self.updated_at_ms,
            document_count: self.documents.len(),
            tag_count: self.tags.len(),
            full_rebuild: self.full_rebuild,
            context: self.context.clone(),
        }
    }

    pub(crate) fn insert(&mut self, reference: DocumentRef, tags: &[Tag]) {
        let path = reference.path.as_str().to_string();
        for tag in tags {
            self.tags
                .entry(tag.as_str().to_string())
                .or_default()
                .insert(path.clone());
        }
        self.types
            .entry(reference.doc_type.as_str().to_string())
            .or_default()
            .insert(path.clone());
        self.documents.insert(path, reference);
    }

    pub(crate) fn remove_path(&mut self, path: &str) -> Option<DocumentRef> {
        let removed = self.documents.remove(path)?;
        self.tags.retain(|_, bucket| {
            bucket.remove(path);
            !bucket.is_empty()
        });
        self.types.retain(|_, bucket| {
            bucket.remove(path);
            !bucket.is_empty()
        });
        Some(removed)
    }

    pub(crate) fn touch(&mut self, full_rebuild: bool) {
        self.updated_at_ms = now_ms_i64();
        self.full_rebuild = full_rebuild;
    }
}

/// Per-scope tag/document index engine with durable persistence. Mutations
/// stay in memory until `save_index`; loading is lazy and a missing or
/// unreadable record degrades to an empty index rather than an error.
pub struct TagIndexStore {
    files: Arc<dyn FileStorage>,
    root: PathBuf,
    cache: HashMap<String, TagIndex>,
}

impl TagIndexStore {
    pub fn new(files: Arc<dyn FileStorage>, root: impl Into<PathBuf>) -> Self {
        Self {
            files,
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    pub fn is_loaded(&self, scope: &Scope) -> bool {
        self.cache.contains_key(&scope.key())
    }

    pub(crate) fn files(&self) -> &Arc<dyn FileStorage> {
        &self.files
    }

    pub(crate) fn index_dir(&self) -> PathBuf {
        self.root.join(INDEX_DIR)
    }

    pub(crate) fn index_path(&self, scope: &Scope) -> PathBuf {
        self.index_dir().join(format!("{}.json", scope.key()))
    }

    /// Cache entry for the scope, loading the on-disk record on first touch
    /// and falling back to an empty index when no usable record exists.
    pub(crate) fn ensure(&mut self, scope: &Scope) -> Result<&mut TagIndex, StoreError> {
        if !self.is_loaded(scope) {
            let _ = self.load_index(scope)?;
        }
        Ok(self
            .cache
            .entry(scope.key())
            .or_insert_with(|| TagIndex::new(scope.label())))
    }

    pub(crate) fn replace(&mut self, scope: &Scope, index: TagIndex) {
        self.cache.insert(scope.key(), index);
    }

    pub fn metadata(&mut self, scope: &Scope) -> Result<IndexMetadata, StoreError> {
        Ok(self.ensure(scope)?.metadata())
    }
}
