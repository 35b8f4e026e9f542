//! Namespaced identifiers (`namespace:path`) for item and entity types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace applied to identifiers written without one.
pub const DEFAULT_NAMESPACE: &str = "core";

/// A parsed `namespace:path` identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName {
    namespace: String,
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("empty namespace in '{0}'")]
    EmptyNamespace(String),
    #[error("empty path in '{0}'")]
    EmptyPath(String),
    #[error("invalid character {ch:?} in namespace of '{name}'")]
    InvalidNamespaceChar { name: String, ch: char },
    #[error("invalid character {ch:?} in path of '{name}'")]
    InvalidPathChar { name: String, ch: char },
}

fn valid_namespace_char(ch: char) -> bool {
    matches!(ch, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn valid_path_char(ch: char) -> bool {
    valid_namespace_char(ch) || ch == '/'
}

impl ResourceName {
    /// Parse `namespace:path`, or a bare `path` in [`DEFAULT_NAMESPACE`].
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let (namespace, path) = match raw.split_once(':') {
            Some((ns, path)) => {
                if ns.is_empty() {
                    return Err(NameError::EmptyNamespace(raw.to_string()));
                }
                (ns, path)
            }
            None => (DEFAULT_NAMESPACE, raw),
        };

        if path.is_empty() {
            return Err(NameError::EmptyPath(raw.to_string()));
        }
        if let Some(ch) = namespace.chars().find(|&c| !valid_namespace_char(c)) {
            return Err(NameError::InvalidNamespaceChar {
                name: raw.to_string(),
                ch,
            });
        }
        // A second ':' lands in the path and is rejected here.
        if let Some(ch) = path.chars().find(|&c| !valid_path_char(c)) {
            return Err(NameError::InvalidPathChar {
                name: raw.to_string(),
                ch,
            });
        }

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ResourceName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceName> for String {
    fn from(value: ResourceName) -> Self {
        value.to_string()
    }
}
