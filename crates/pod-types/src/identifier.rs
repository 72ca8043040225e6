use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Absolute identifier of a resource in the pod.
///
/// Containers are identifiers ending in `/`; documents are everything else.
/// The hierarchy is purely syntactic: the parent of an identifier is found
/// by truncating its last path segment, never by asking a store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceIdentifier {
    path: String,
}

impl ResourceIdentifier {
    /// Wrap a string without validation.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Parse and validate an identifier.
    ///
    /// Accepts absolute URLs (`scheme://authority/...`) and absolute paths
    /// (`/...`). Fragments and whitespace are rejected.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Err(TypeError::InvalidIdentifier(s.into(), "empty identifier"));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidIdentifier(s.into(), "contains whitespace"));
        }
        if s.contains('#') {
            return Err(TypeError::InvalidIdentifier(s.into(), "contains a fragment"));
        }
        let absolute = match s.find("://") {
            Some(idx) => idx > 0 && s[idx + 3..].contains('/'),
            None => s.starts_with('/'),
        };
        if !absolute {
            return Err(TypeError::InvalidIdentifier(
                s.into(),
                "must be an absolute URL with a path or an absolute path",
            ));
        }
        Ok(Self::new(s))
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Containers end with the path separator.
    pub fn is_container(&self) -> bool {
        self.path.ends_with('/')
    }

    /// The parent container, or `None` for a root.
    ///
    /// `http://x/a/b` → `http://x/a/`, `http://x/a/` → `http://x/`,
    /// `http://x/` → `None`.
    pub fn parent(&self) -> Option<ResourceIdentifier> {
        let trimmed = self.path.strip_suffix('/').unwrap_or(&self.path);
        let floor = self.path.find("://").map(|idx| idx + 3).unwrap_or(0);
        let slash = trimmed.rfind('/')?;
        if slash < floor {
            return None;
        }
        Some(Self::new(&trimmed[..=slash]))
    }

    /// Last path segment, including the trailing `/` for containers.
    pub fn name(&self) -> &str {
        let trimmed = self.path.strip_suffix('/').unwrap_or(&self.path);
        let start = trimmed.rfind('/').map(|idx| idx + 1).unwrap_or(0);
        &self.path[start..]
    }

    /// Child identifier `self + name`. `self` should be a container.
    pub fn join(&self, name: &str) -> ResourceIdentifier {
        if self.is_container() {
            Self::new(format!("{}{name}", self.path))
        } else {
            Self::new(format!("{}/{name}", self.path))
        }
    }

    /// Returns `true` if `self` is `other` or lies below it.
    pub fn starts_with(&self, other: &ResourceIdentifier) -> bool {
        self.path.starts_with(&other.path)
    }

    /// Append a raw suffix (e.g. `.acl`).
    pub fn with_suffix(&self, suffix: &str) -> ResourceIdentifier {
        Self::new(format!("{}{suffix}", self.path))
    }

    /// Remove a raw suffix, if present.
    pub fn strip_suffix(&self, suffix: &str) -> Option<ResourceIdentifier> {
        self.path.strip_suffix(suffix).map(Self::new)
    }
}

impl fmt::Debug for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceIdentifier({})", self.path)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl FromStr for ResourceIdentifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for ResourceIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ResourceIdentifier {
    fn as_ref(&self) -> &str {
        &self.path
    }
}
