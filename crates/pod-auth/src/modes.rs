use std::fmt;
use std::str::FromStr;

use pod_rdf::vocab::acl;
use serde::{Deserialize, Serialize};

/// A WAC access mode.
///
/// Declaration order is the order modes are listed in `WAC-Allow`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    Write,
    Append,
    Control,
}

impl AccessMode {
    pub const ALL: [AccessMode; 4] = [
        AccessMode::Read,
        AccessMode::Write,
        AccessMode::Append,
        AccessMode::Control,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Append => "append",
            Self::Control => "control",
        }
    }

    pub fn iri(&self) -> &'static str {
        match self {
            Self::Read => acl::READ,
            Self::Write => acl::WRITE,
            Self::Append => acl::APPEND,
            Self::Control => acl::CONTROL,
        }
    }

    /// Mode named by an `acl:mode` object.
    pub fn from_iri(iri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.iri() == iri)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown access mode: {s}"))
    }
}

/// Resolved modes for one agent on one resource.
///
/// Write implies append: inserting [`AccessMode::Write`] also grants
/// [`AccessMode::Append`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionSet {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub control: bool,
}

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self::of(&AccessMode::ALL)
    }

    pub fn of(modes: &[AccessMode]) -> Self {
        let mut set = Self::empty();
        for mode in modes {
            set.insert(*mode);
        }
        set
    }

    pub fn insert(&mut self, mode: AccessMode) {
        match mode {
            AccessMode::Read => self.read = true,
            AccessMode::Write => {
                self.write = true;
                self.append = true;
            }
            AccessMode::Append => self.append = true,
            AccessMode::Control => self.control = true,
        }
    }

    pub fn contains(&self, mode: AccessMode) -> bool {
        match mode {
            AccessMode::Read => self.read,
            AccessMode::Write => self.write,
            AccessMode::Append => self.append,
            AccessMode::Control => self.control,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modes().next().is_none()
    }

    /// Granted modes in `WAC-Allow` order.
    pub fn modes(&self) -> impl Iterator<Item = AccessMode> + '_ {
        AccessMode::ALL.into_iter().filter(|mode| self.contains(*mode))
    }

    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        PermissionSet {
            read: self.read || other.read,
            write: self.write || other.write,
            append: self.append || other.append,
            control: self.control || other.control,
        }
    }

    pub fn intersect(&self, other: &PermissionSet) -> PermissionSet {
        PermissionSet {
            read: self.read && other.read,
            write: self.write && other.write,
            append: self.append && other.append,
            control: self.control && other.control,
        }
    }

    /// Whether every mode in `required` is granted.
    pub fn covers(&self, required: &PermissionSet) -> bool {
        required.modes().all(|mode| self.contains(mode))
    }
}

impl From<AccessMode> for PermissionSet {
    fn from(mode: AccessMode) -> Self {
        Self::of(&[mode])
    }
}

impl FromIterator<AccessMode> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = AccessMode>>(iter: I) -> Self {
        let mut set = Self::empty();
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

/// Space-separated modes, e.g. `read write append`.
impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.modes().map(|mode| mode.as_str()).collect();
        f.write_str(&names.join(" "))
    }
}
