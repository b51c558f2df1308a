#![forbid(unsafe_code)]

use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, DocumentIdError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DocumentIdError::Empty);
        }
        let parsed = Uuid::parse_str(trimmed).map_err(|_| DocumentIdError::InvalidFormat)?;
        Ok(Self(parsed.hyphenated().to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentIdError {
    Empty,
    InvalidFormat,
}

impl DocumentIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "document id must not be empty",
            Self::InvalidFormat => "document id must be a UUID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_validation() {
        assert_eq!(DocumentId::try_new("").unwrap_err(), DocumentIdError::Empty);
        assert_eq!(
            DocumentId::try_new("not-a-uuid").unwrap_err(),
            DocumentIdError::InvalidFormat
        );
        assert!(DocumentId::try_new("6c84fb90-12c4-11e1-840d-7b25c5ee775a").is_ok());
    }

    #[test]
    fn document_id_is_normalized_to_lowercase_hyphenated() {
        let id = DocumentId::try_new("6C84FB90-12C4-11E1-840D-7B25C5EE775A").expect("valid uuid");
        assert_eq!(id.as_str(), "6c84fb90-12c4-11e1-840d-7b25c5ee775a");
    }

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        assert!(DocumentId::try_new(a.as_str()).is_ok());
    }
}
