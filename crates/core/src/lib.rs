#![forbid(unsafe_code)]

pub mod document;
pub mod ids;
pub mod paths;
pub mod scope;
pub mod tags;
pub mod time;

pub use document::{Document, DocumentError, DocumentInit, DocumentType, validate_content};
pub use ids::DocumentId;
pub use paths::DocumentPath;
pub use scope::{BranchName, BranchNamespace, Scope};
pub use tags::{Tag, normalize_tags};
