use serde::{Deserialize, Serialize};

/// A named entry point.
///
/// A single string is a path to one source file. A list is a vendor bundle:
/// every request in it is resolved like an import and becomes an entry module
/// of the same chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntrySpec {
    Path(String),
    Many(Vec<String>),
}

impl EntrySpec {
    /// Module requests declared by this entry, in declaration order.
    pub fn requests(&self) -> Vec<&str> {
        match self {
            EntrySpec::Path(path) => vec![path.as_str()],
            EntrySpec::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// True for list-style entries (vendor bundles).
    pub fn is_vendor(&self) -> bool {
        matches!(self, EntrySpec::Many(_))
    }
}

impl From<&str> for EntrySpec {
    fn from(path: &str) -> Self {
        EntrySpec::Path(path.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for EntrySpec {
    fn from(items: [&str; N]) -> Self {
        EntrySpec::Many(items.iter().map(|s| s.to_string()).collect())
    }
}
