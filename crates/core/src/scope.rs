#![forbid(unsafe_code)]

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchNamespace {
    Feature,
    Fix,
}

impl BranchNamespace {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchNamespace::Feature => "feature",
            BranchNamespace::Fix => "fix",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, BranchNameError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BranchNameError::Empty);
        }
        if trimmed.len() > 200 {
            return Err(BranchNameError::TooLong);
        }
        if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(BranchNameError::InvalidChar);
        }
        let Some((namespace, rest)) = trimmed.split_once('/') else {
            return Err(BranchNameError::MissingSeparator);
        };
        if namespace.is_empty() {
            return Err(BranchNameError::Empty);
        }
        if rest.is_empty() {
            return Err(BranchNameError::EmptyRest);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Unrecognized prefixes fall back to `feature`; the raw name is preserved.
    pub fn namespace(&self) -> BranchNamespace {
        match self.0.split_once('/').map(|(ns, _)| ns) {
            Some("fix") => BranchNamespace::Fix,
            _ => BranchNamespace::Feature,
        }
    }

    /// Part after the first separator, e.g. `login` for `feature/login`.
    pub fn display_name(&self) -> &str {
        match self.0.split_once('/') {
            Some((_, rest)) => rest,
            None => &self.0,
        }
    }

    /// Filesystem-safe form: every separator replaced with a hyphen.
    pub fn safe_name(&self) -> String {
        self.0.replace('/', "-")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchNameError {
    Empty,
    TooLong,
    MissingSeparator,
    EmptyRest,
    InvalidChar,
}

impl BranchNameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "branch name must not be empty",
            Self::TooLong => "branch name is too long",
            Self::MissingSeparator => "branch name must be of the form <namespace>/<name>",
            Self::EmptyRest => "branch name must have a non-empty part after '/'",
            Self::InvalidChar => "branch name contains whitespace or control characters",
        }
    }
}

/// The unit of storage and index isolation: the global bank or one branch bank.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Branch(BranchName),
}

impl Scope {
    pub fn branch(name: impl Into<String>) -> Result<Self, BranchNameError> {
        Ok(Self::Branch(BranchName::try_new(name)?))
    }

    /// Storage key used to address this scope's directory and index record.
    pub fn key(&self) -> String {
        match self {
            Scope::Global => "global".to_string(),
            Scope::Branch(name) => name.safe_name(),
        }
    }

    /// Human-readable label used in index metadata and update reports.
    pub fn label(&self) -> &str {
        match self {
            Scope::Global => "global",
            Scope::Branch(name) => name.as_str(),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global)
    }
}
