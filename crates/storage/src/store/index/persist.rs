#![forbid(unsafe_code)]

use super::{INDEX_SCHEMA, TagIndex, TagIndexStore};
use crate::store::{DocumentRef, StoreError};
use mb_core::time::{rfc3339_to_ts_ms, ts_ms_to_rfc3339};
use mb_core::{DocumentId, DocumentPath, DocumentType, Scope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Serialize, Deserialize)]
struct IndexRecord {
    schema: String,
    metadata: RecordMetadata,
    documents: BTreeMap<String, RecordRef>,
    index: BTreeMap<String, Vec<String>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordMetadata {
    updated_at: String,
    document_count: usize,
    tag_count: usize,
    full_rebuild: bool,
    context: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordRef {
    id: String,
    path: String,
    document_type: String,
    title: String,
    last_modified: String,
}

impl TagIndexStore {
    /// (Re)populates the in-memory index for the scope from the backing
    /// store. Returns `false` when no usable record exists: absent files and
    /// unreadable records both degrade to "not loaded" so callers can fall
    /// back to a scan-rebuild. Only infrastructure failures are errors.
    pub fn load_index(&mut self, scope: &Scope) -> Result<bool, StoreError> {
        let path = self.index_path(scope);
        let text = match self.files().read_file(&path) {
            Ok(text) => text,
            Err(err) if err.is_not_found() => return Ok(false),
            Err(err) => {
                return Err(StoreError::storage(
                    "read index",
                    path.display().to_string(),
                    err,
                ));
            }
        };
        match parse_record(&text, scope) {
            Some(index) => {
                self.replace(scope, index);
                Ok(true)
            }
            None => {
                warn!(path = %path.display(), "discarding unreadable index record");
                Ok(false)
            }
        }
    }

    /// Persists the scope's in-memory index, creating the index directory as
    /// needed. An untouched scope persists as an empty record.
    pub fn save_index(&mut self, scope: &Scope) -> Result<(), StoreError> {
        let dir = self.index_dir();
        self.files()
            .create_directory(&dir)
            .map_err(|err| StoreError::storage("create index dir", dir.display().to_string(), err))?;

        let index = self.ensure(scope)?;
        let record = to_record(index);
        let text = serde_json::to_string_pretty(&record)
            .map_err(|_| StoreError::InvalidInput("index record failed to serialize"))?;

        let path = self.index_path(scope);
        self.files()
            .write_file(&path, &text)
            .map_err(|err| StoreError::storage("write index", path.display().to_string(), err))
    }
}

fn to_record(index: &TagIndex) -> IndexRecord {
    let metadata = index.metadata();
    IndexRecord {
        schema: INDEX_SCHEMA.to_string(),
        metadata: RecordMetadata {
            updated_at: ts_ms_to_rfc3339(metadata.updated_at_ms),
            document_count: metadata.document_count,
            tag_count: metadata.tag_count,
            full_rebuild: metadata.full_rebuild,
            context: metadata.context,
        },
        documents: index
            .documents
            .iter()
            .map(|(path, reference)| {
                (
                    path.clone(),
                    RecordRef {
                        id: reference.id.as_str().to_string(),
                        path: reference.path.as_str().to_string(),
                        document_type: reference.doc_type.as_str().to_string(),
                        title: reference.title.clone(),
                        last_modified: ts_ms_to_rfc3339(reference.last_modified_ms),
                    },
                )
            })
            .collect(),
        index: index
            .tags
            .iter()
            .map(|(tag, bucket)| (tag.clone(), bucket.iter().cloned().collect()))
            .collect(),
    }
}

/// `None` means the record is unusable and should be treated as absent.
fn parse_record(text: &str, scope: &Scope) -> Option<TagIndex> {
    let record: IndexRecord = serde_json::from_str(text).ok()?;
    if record.schema != INDEX_SCHEMA {
        return None;
    }

    let mut index = TagIndex::new(record.metadata.context);
    for (_, raw) in record.documents {
        let reference = parse_ref(&raw)?;
        index.insert(reference, &[]);
    }
    for (tag, bucket) in record.index {
        for path in bucket {
            // Entries pointing outside the documents map are stale; drop them.
            if !index.documents.contains_key(&path) {
                warn!(scope = scope.label(), tag, path, "dropping stale index entry");
                continue;
            }
            index.tags.entry(tag.clone()).or_default().insert(path);
        }
    }
    index.updated_at_ms = rfc3339_to_ts_ms(&record.metadata.updated_at)?;
    index.full_rebuild = record.metadata.full_rebuild;
    Some(index)
}

fn parse_ref(raw: &RecordRef) -> Option<DocumentRef> {
    Some(DocumentRef {
        id: DocumentId::try_new(raw.id.as_str()).ok()?,
        path: DocumentPath::try_new(raw.path.as_str()).ok()?,
        doc_type: DocumentType::parse(&raw.document_type)?,
        title: raw.title.clone(),
        last_modified_ms: rfc3339_to_ts_ms(&raw.last_modified)?,
    })
}
