#![forbid(unsafe_code)]

use crate::ids::{DocumentId, DocumentIdError};
use crate::paths::{DocumentPath, DocumentPathError};
use crate::tags::{Tag, TagError};
use crate::time::{now_ms_i64, rfc3339_to_ts_ms, ts_ms_to_rfc3339};
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;

pub const DOCUMENT_SCHEMA: &str = "memory_document_v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentType {
    ProjectBrief,
    ProductContext,
    ActiveContext,
    SystemPatterns,
    TechContext,
    Progress,
    Generic,
}

impl DocumentType {
    pub const ALL: &'static [DocumentType] = &[
        DocumentType::ProjectBrief,
        DocumentType::ProductContext,
        DocumentType::ActiveContext,
        DocumentType::SystemPatterns,
        DocumentType::TechContext,
        DocumentType::Progress,
        DocumentType::Generic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::ProjectBrief => "project_brief",
            DocumentType::ProductContext => "product_context",
            DocumentType::ActiveContext => "active_context",
            DocumentType::SystemPatterns => "system_patterns",
            DocumentType::TechContext => "tech_context",
            DocumentType::Progress => "progress",
            DocumentType::Generic => "generic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str() == value.trim())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldKind {
    Text,
    List,
}

impl FieldKind {
    fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::List => "array",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::List => value.is_array(),
        }
    }
}

fn required_fields(doc_type: DocumentType) -> &'static [(&'static str, FieldKind)] {
    match doc_type {
        DocumentType::ProjectBrief => &[("summary", FieldKind::Text), ("goals", FieldKind::List)],
        DocumentType::ProductContext => &[("overview", FieldKind::Text)],
        DocumentType::ActiveContext => &[("focus", FieldKind::Text)],
        DocumentType::SystemPatterns => &[("patterns", FieldKind::List)],
        DocumentType::TechContext => &[("stack", FieldKind::List)],
        DocumentType::Progress => &[("done", FieldKind::List), ("pending", FieldKind::List)],
        DocumentType::Generic => &[],
    }
}

/// Checks that a content payload has the shape its document type requires.
/// `generic` accepts any non-empty object.
pub fn validate_content(doc_type: DocumentType, content: &Value) -> Result<(), DocumentError> {
    let Some(object) = content.as_object() else {
        return Err(DocumentError::ContentShape {
            doc_type: doc_type.as_str(),
            detail: "content must be a JSON object".to_string(),
        });
    };
    if doc_type == DocumentType::Generic {
        if object.is_empty() {
            return Err(DocumentError::ContentShape {
                doc_type: doc_type.as_str(),
                detail: "generic content must not be empty".to_string(),
            });
        }
        return Ok(());
    }
    for (field, kind) in required_fields(doc_type) {
        match object.get(*field) {
            None => {
                return Err(DocumentError::ContentShape {
                    doc_type: doc_type.as_str(),
                    detail: format!("missing required field '{field}'"),
                });
            }
            Some(value) if !kind.matches(value) => {
                return Err(DocumentError::ContentShape {
                    doc_type: doc_type.as_str(),
                    detail: format!("field '{field}' must be a {}", kind.as_str()),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentError {
    InvalidId(DocumentIdError),
    InvalidPath(DocumentPathError),
    InvalidTag(TagError),
    EmptyTitle,
    UnknownType(String),
    ContentShape {
        doc_type: &'static str,
        detail: String,
    },
    MalformedText(String),
    MissingField(&'static str),
    FieldShape {
        field: &'static str,
        expected: &'static str,
    },
    SchemaMismatch {
        found: String,
    },
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(err) => write!(f, "invalid document id: {}", err.message()),
            Self::InvalidPath(err) => write!(f, "invalid document path: {}", err.message()),
            Self::InvalidTag(err) => write!(f, "invalid tag: {}", err.message()),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::UnknownType(found) => write!(f, "unknown document type '{found}'"),
            Self::ContentShape { doc_type, detail } => {
                write!(f, "content does not match type '{doc_type}': {detail}")
            }
            Self::MalformedText(detail) => write!(f, "malformed document text: {detail}"),
            Self::MissingField(field) => write!(f, "missing field '{field}'"),
            Self::FieldShape { field, expected } => {
                write!(f, "field '{field}' must be a {expected}")
            }
            Self::SchemaMismatch { found } => {
                write!(f, "unsupported document schema '{found}' (expected {DOCUMENT_SCHEMA})")
            }
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<DocumentIdError> for DocumentError {
    fn from(value: DocumentIdError) -> Self {
        Self::InvalidId(value)
    }
}

impl From<DocumentPathError> for DocumentError {
    fn from(value: DocumentPathError) -> Self {
        Self::InvalidPath(value)
    }
}

impl From<TagError> for DocumentError {
    fn from(value: TagError) -> Self {
        Self::InvalidTag(value)
    }
}

#[derive(Clone, Debug)]
pub struct DocumentInit {
    pub id: Option<DocumentId>,
    pub path: DocumentPath,
    pub title: String,
    pub doc_type: DocumentType,
    pub tags: Vec<Tag>,
    pub content: Value,
}

/// A versioned structured document. Mutators are copy-on-write: they return
/// a new instance, bump `version` by one and refresh `last_modified` — except
/// when the requested change is semantically empty, in which case the current
/// value is returned unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    path: DocumentPath,
    title: String,
    doc_type: DocumentType,
    tags: Vec<Tag>,
    content: Value,
    created_at_ms: i64,
    last_modified_ms: i64,
    version: i64,
}

impl Document {
    pub fn create(init: DocumentInit) -> Result<Self, DocumentError> {
        let DocumentInit {
            id,
            path,
            title,
            doc_type,
            tags,
            content,
        } = init;
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(DocumentError::EmptyTitle);
        }
        validate_content(doc_type, &content)?;
        let now = now_ms_i64();
        Ok(Self {
            id: id.unwrap_or_else(DocumentId::generate),
            path,
            title,
            doc_type,
            tags: dedupe_tags(tags),
            content,
            created_at_ms: now,
            last_modified_ms: now,
            version: 1,
        })
    }

    pub fn from_text(raw: &str, path: DocumentPath) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| DocumentError::MalformedText(err.to_string()))?;
        Self::from_value(value, path)
    }

    pub fn from_value(value: Value, path: DocumentPath) -> Result<Self, DocumentError> {
        let object = value
            .as_object()
            .ok_or(DocumentError::MalformedText("not a JSON object".to_string()))?;

        let schema = require_str(object, "schema")?;
        if schema != DOCUMENT_SCHEMA {
            return Err(DocumentError::SchemaMismatch {
                found: schema.to_string(),
            });
        }
        let metadata = object
            .get("metadata")
            .ok_or(DocumentError::MissingField("metadata"))?
            .as_object()
            .ok_or(DocumentError::FieldShape {
                field: "metadata",
                expected: "object",
            })?;
        let content = object
            .get("content")
            .ok_or(DocumentError::MissingField("content"))?
            .clone();

        let id = DocumentId::try_new(require_str(metadata, "id")?)?;
        let title = require_str(metadata, "title")?.trim().to_string();
        if title.is_empty() {
            return Err(DocumentError::EmptyTitle);
        }
        let type_raw = require_str(metadata, "documentType")?;
        let doc_type = DocumentType::parse(type_raw)
            .ok_or_else(|| DocumentError::UnknownType(type_raw.to_string()))?;

        let tags_value = metadata
            .get("tags")
            .ok_or(DocumentError::MissingField("tags"))?
            .as_array()
            .ok_or(DocumentError::FieldShape {
                field: "tags",
                expected: "array",
            })?;
        let mut tags = Vec::with_capacity(tags_value.len());
        for entry in tags_value {
            let raw = entry.as_str().ok_or(DocumentError::FieldShape {
                field: "tags",
                expected: "array",
            })?;
            tags.push(Tag::try_new(raw)?);
        }

        let last_modified_ms = require_ts(metadata, "lastModified")?;
        let created_at_ms = require_ts(metadata, "createdAt")?;
        let version = metadata
            .get("version")
            .ok_or(DocumentError::MissingField("version"))?
            .as_i64()
            .filter(|v| *v >= 1)
            .ok_or(DocumentError::FieldShape {
                field: "version",
                expected: "positive integer",
            })?;

        validate_content(doc_type, &content)?;

        Ok(Self {
            id,
            path,
            title,
            doc_type,
            tags: dedupe_tags(tags),
            content,
            created_at_ms,
            last_modified_ms,
            version,
        })
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn doc_type(&self) -> DocumentType {
        self.doc_type
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    pub fn last_modified_ms(&self) -> i64 {
        self.last_modified_ms
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    pub fn with_content(&self, content: Value) -> Result<Self, DocumentError> {
        validate_content(self.doc_type, &content)?;
        if content == self.content {
            return Ok(self.clone());
        }
        let mut next = self.clone();
        next.content = content;
        next.bump();
        Ok(next)
    }

    pub fn with_title(&self, title: impl Into<String>) -> Result<Self, DocumentError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(DocumentError::EmptyTitle);
        }
        if title == self.title {
            return Ok(self.clone());
        }
        let mut next = self.clone();
        next.title = title;
        next.bump();
        Ok(next)
    }

    pub fn with_path(&self, path: DocumentPath) -> Self {
        if path == self.path {
            return self.clone();
        }
        let mut next = self.clone();
        next.path = path;
        next.bump();
        next
    }

    pub fn with_tag(&self, tag: Tag) -> Self {
        if self.has_tag(&tag) {
            return self.clone();
        }
        let mut next = self.clone();
        next.tags.push(tag);
        next.tags.sort();
        next.bump();
        next
    }

    pub fn without_tag(&self, tag: &Tag) -> Self {
        if !self.has_tag(tag) {
            return self.clone();
        }
        let mut next = self.clone();
        next.tags.retain(|candidate| candidate != tag);
        next.bump();
        next
    }

    pub fn with_tags(&self, tags: Vec<Tag>) -> Self {
        let tags = dedupe_tags(tags);
        if tags == self.tags {
            return self.clone();
        }
        let mut next = self.clone();
        next.tags = tags;
        next.bump();
        next
    }

    pub fn serialize(&self) -> Value {
        json!({
            "schema": DOCUMENT_SCHEMA,
            "metadata": {
                "id": self.id.as_str(),
                "title": self.title,
                "documentType": self.doc_type.as_str(),
                "path": self.path.as_str(),
                "tags": self.tags.iter().map(Tag::as_str).collect::<Vec<_>>(),
                "lastModified": ts_ms_to_rfc3339(self.last_modified_ms),
                "createdAt": ts_ms_to_rfc3339(self.created_at_ms),
                "version": self.version,
            },
            "content": self.content,
        })
    }

    pub fn to_text(&self, pretty: bool) -> String {
        let value = self.serialize();
        if pretty {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        }
    }

    fn bump(&mut self) {
        self.version += 1;
        self.last_modified_ms = now_ms_i64();
    }
}

fn dedupe_tags(tags: Vec<Tag>) -> Vec<Tag> {
    let set: BTreeSet<Tag> = tags.into_iter().collect();
    set.into_iter().collect()
}

fn require_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, DocumentError> {
    object
        .get(field)
        .ok_or(DocumentError::MissingField(field))?
        .as_str()
        .ok_or(DocumentError::FieldShape {
            field,
            expected: "string",
        })
}

fn require_ts(object: &Map<String, Value>, field: &'static str) -> Result<i64, DocumentError> {
    let raw = object
        .get(field)
        .ok_or(DocumentError::MissingField(field))?
        .as_str()
        .ok_or(DocumentError::FieldShape {
            field,
            expected: "RFC 3339 string",
        })?;
    rfc3339_to_ts_ms(raw).ok_or(DocumentError::FieldShape {
        field,
        expected: "RFC 3339 string",
    })
}
