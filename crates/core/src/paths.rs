#![forbid(unsafe_code)]

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath(String);

impl DocumentPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, DocumentPathError> {
        let value = value.into();
        let normalized = normalize_path(&value)?;
        Ok(Self(normalized))
    }

    /// Directory portion without trailing slash; empty string for a bare file name.
    pub fn directory(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    pub fn file_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => Some(&name[idx + 1..]),
            _ => None,
        }
    }

    pub fn base_name(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }

    /// The same path in the other supported format: `.md` <-> `.json`.
    /// Returns `None` for any other extension.
    pub fn alternate_format(&self) -> Option<Self> {
        let swapped = match self.extension() {
            Some("md") => "json",
            Some("json") => "md",
            _ => return None,
        };
        let directory = self.directory();
        let stem = self.base_name();
        let path = if directory.is_empty() {
            format!("{stem}.{swapped}")
        } else {
            format!("{directory}/{stem}.{swapped}")
        };
        Some(Self(path))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentPathError {
    Empty,
    Absolute,
    Traversal,
    ContainsControl,
}

impl DocumentPathError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "path must not be empty",
            Self::Absolute => "path must be relative",
            Self::Traversal => "path must not contain '..' segments",
            Self::ContainsControl => "path contains control characters",
        }
    }
}

fn normalize_path(value: &str) -> Result<String, DocumentPathError> {
    let value = value.trim().replace('\\', "/");
    if value.is_empty() {
        return Err(DocumentPathError::Empty);
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(DocumentPathError::ContainsControl);
    }
    if value.starts_with('/') || has_drive_prefix(&value) {
        return Err(DocumentPathError::Absolute);
    }

    let mut segments = Vec::new();
    for segment in value.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(DocumentPathError::Traversal),
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(DocumentPathError::Empty);
    }
    Ok(segments.join("/"))
}

fn has_drive_prefix(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_validation() {
        assert_eq!(
            DocumentPath::try_new("").unwrap_err(),
            DocumentPathError::Empty
        );
        assert_eq!(
            DocumentPath::try_new("  ").unwrap_err(),
            DocumentPathError::Empty
        );
        assert_eq!(
            DocumentPath::try_new("/etc/passwd").unwrap_err(),
            DocumentPathError::Absolute
        );
        assert_eq!(
            DocumentPath::try_new("C:/windows").unwrap_err(),
            DocumentPathError::Absolute
        );
        assert_eq!(
            DocumentPath::try_new("notes/../secret.json").unwrap_err(),
            DocumentPathError::Traversal
        );
        assert!(DocumentPath::try_new("notes/a.json").is_ok());
    }

    #[test]
    fn path_is_normalized() {
        let path = DocumentPath::try_new(".\\notes//sub/./a.json").expect("valid path");
        assert_eq!(path.as_str(), "notes/sub/a.json");

        let trailing = DocumentPath::try_new("notes/").expect("valid path");
        assert_eq!(trailing.as_str(), "notes");
    }

    #[test]
    fn derived_parts() {
        let path = DocumentPath::try_new("notes/sub/a.json").expect("valid path");
        assert_eq!(path.directory(), "notes/sub");
        assert_eq!(path.file_name(), "a.json");
        assert_eq!(path.extension(), Some("json"));
        assert_eq!(path.base_name(), "a");

        let bare = DocumentPath::try_new("README").expect("valid path");
        assert_eq!(bare.directory(), "");
        assert_eq!(bare.file_name(), "README");
        assert_eq!(bare.extension(), None);
        assert_eq!(bare.base_name(), "README");

        let dotfile = DocumentPath::try_new(".gitignore").expect("valid path");
        assert_eq!(dotfile.extension(), None);
        assert_eq!(dotfile.base_name(), ".gitignore");
    }

    #[test]
    fn alternate_format_swaps_markdown_and_json() {
        let json = DocumentPath::try_new("notes/a.json").expect("valid path");
        assert_eq!(
            json.alternate_format().map(|p| p.into_string()),
            Some("notes/a.md".to_string())
        );

        let md = DocumentPath::try_new("a.md").expect("valid path");
        assert_eq!(
            md.alternate_format().map(|p| p.into_string()),
            Some("a.json".to_string())
        );

        let txt = DocumentPath::try_new("a.txt").expect("valid path");
        assert!(txt.alternate_format().is_none());
    }
}
