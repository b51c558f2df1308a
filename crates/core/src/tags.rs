#![forbid(unsafe_code)]

use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Display form with the leading marker, e.g. `#api`.
    pub fn display(&self) -> String {
        format!("#{}", self.0)
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, TagError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TagError::Empty);
        }
        if trimmed.len() > 64 {
            return Err(TagError::TooLong);
        }
        for (index, ch) in trimmed.chars().enumerate() {
            if matches!(ch, 'a'..='z' | '0'..='9' | '-') {
                continue;
            }
            return Err(TagError::InvalidChar { ch, index });
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagError {
    Empty,
    TooLong,
    InvalidChar { ch: char, index: usize },
}

impl TagError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "tag must not be empty",
            Self::TooLong => "tag is too long",
            Self::InvalidChar { .. } => "tag must match [a-z0-9-]+",
        }
    }
}

/// Parses, dedupes and sorts a raw tag list; blank entries are skipped.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<Tag>, TagError> {
    let mut out = BTreeSet::new();
    for tag in tags {
        if tag.trim().is_empty() {
            continue;
        }
        out.insert(Tag::try_new(tag.as_str())?);
    }
    Ok(out.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_validation() {
        assert_eq!(Tag::try_new("").unwrap_err(), TagError::Empty);
        assert_eq!(Tag::try_new("   ").unwrap_err(), TagError::Empty);
        assert_eq!(
            Tag::try_new("Has Space").unwrap_err(),
            TagError::InvalidChar { ch: 'H', index: 0 }
        );
        assert_eq!(
            Tag::try_new("caps-X").unwrap_err(),
            TagError::InvalidChar { ch: 'X', index: 5 }
        );
        assert!(Tag::try_new("api-v2").is_ok());
        assert!(Tag::try_new("  api  ").is_ok());
    }

    #[test]
    fn display_form_has_marker() {
        let tag = Tag::try_new("api").expect("valid tag");
        assert_eq!(tag.display(), "#api");
    }

    #[test]
    fn normalize_tags_dedupes_and_sorts() {
        let out = normalize_tags(&[
            "zeta".to_string(),
            "api".to_string(),
            "zeta".to_string(),
            "".to_string(),
        ])
        .expect("valid tags");
        let values: Vec<&str> = out.iter().map(Tag::as_str).collect();
        assert_eq!(values, vec!["api", "zeta"]);

        assert_eq!(
            normalize_tags(&["bad tag".to_string()]).unwrap_err(),
            TagError::InvalidChar { ch: ' ', index: 3 }
        );
    }
}
