//! Locating, reading, and resolving names in content files.
//!
//! A content file is addressed by its base name (`items`, `recipes`,
//! `server`, ...) and may be written as RON, TOML, or JSON. The extension
//! picks the parser. Finding the same base name in two formats is an error
//! rather than a silent preference.
//!
//! Every failure carries the path of the file it came from, so a
//! [`DataFile`] hands out the name helpers as well as the parsers.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use workbench_core::name::{NameError, ResourceName};
use workbench_core::registry::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("no '{base}' file (.ron, .toml, .json) in {dir}")]
    MissingRequired { base: String, dir: PathBuf },

    #[error("{path}: extension is not .ron, .toml, or .json")]
    UnknownExtension { path: PathBuf },

    #[error("both {first} and {second} exist; keep one")]
    AmbiguousFormat { first: PathBuf, second: PathBuf },

    #[error("{path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("{path}: '{name}' is not a valid name: {source}")]
    InvalidName {
        path: PathBuf,
        name: String,
        source: NameError,
    },

    /// A recipe, override, or similar refers to something never defined.
    #[error("{path}: no {expected_kind} named '{name}'")]
    UnresolvedRef {
        path: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("{path}: '{name}' is defined twice")]
    DuplicateName { path: PathBuf, name: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Content file syntax, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Probe order when locating a file by base name.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DataLoadError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Self::ALL
            .into_iter()
            .find(|format| Some(format.extension()) == ext)
            .ok_or_else(|| DataLoadError::UnknownExtension {
                path: path.to_path_buf(),
            })
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// One content file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    path: PathBuf,
    format: Format,
}

impl fmt::Display for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl DataFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, DataLoadError> {
        let path = path.into();
        let format = Format::from_path(&path)?;
        Ok(Self { path, format })
    }

    /// Look for `dir/{base}.{ron,toml,json}`. `Ok(None)` when absent.
    pub fn locate(dir: &Path, base: &str) -> Result<Option<Self>, DataLoadError> {
        let mut found: Option<Self> = None;
        for format in Format::ALL {
            let path = dir.join(format!("{base}.{}", format.extension()));
            if !path.is_file() {
                continue;
            }
            if let Some(first) = found {
                return Err(DataLoadError::AmbiguousFormat {
                    first: first.path,
                    second: path,
                });
            }
            found = Some(Self { path, format });
        }
        Ok(found)
    }

    /// Like [`DataFile::locate`], but absence is an error.
    pub fn require(dir: &Path, base: &str) -> Result<Self, DataLoadError> {
        Self::locate(dir, base)?.ok_or_else(|| DataLoadError::MissingRequired {
            base: base.to_string(),
            dir: dir.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Deserialize the whole file as `T`.
    pub fn read<T: DeserializeOwned>(&self) -> Result<T, DataLoadError> {
        let content = std::fs::read_to_string(&self.path)?;
        self.format
            .parse(&content)
            .map_err(|detail| self.parse_error(detail))
    }

    /// Deserialize a list. RON and JSON files hold the list at top level.
    /// TOML cannot, so there the list lives under `toml_key`
    /// (`[[items]]`, `[[recipes]]`, ...).
    pub fn read_list<T: DeserializeOwned>(&self, toml_key: &str) -> Result<Vec<T>, DataLoadError> {
        if self.format != Format::Toml {
            return self.read();
        }
        let mut table: toml::Table = self.read()?;
        let list = table
            .remove(toml_key)
            .ok_or_else(|| self.parse_error(format!("expected a top-level `{toml_key}` array")))?;
        list.try_into()
            .map_err(|e: toml::de::Error| self.parse_error(e.to_string()))
    }

    fn parse_error(&self, detail: String) -> DataLoadError {
        DataLoadError::Parse {
            path: self.path.clone(),
            detail,
        }
    }

    // -- Names --

    /// Parse a name written in this file.
    pub fn name(&self, raw: &str) -> Result<ResourceName, DataLoadError> {
        ResourceName::parse(raw).map_err(|source| DataLoadError::InvalidName {
            path: self.path.clone(),
            name: raw.to_string(),
            source,
        })
    }

    /// Resolve a name this file refers to against definitions loaded so far.
    pub fn resolve<'m, V>(
        &self,
        defined: &'m HashMap<ResourceName, V>,
        name: &ResourceName,
        expected_kind: &'static str,
    ) -> Result<&'m V, DataLoadError> {
        defined.get(name).ok_or_else(|| self.unresolved(name, expected_kind))
    }

    pub fn unresolved(&self, name: &ResourceName, expected_kind: &'static str) -> DataLoadError {
        DataLoadError::UnresolvedRef {
            path: self.path.clone(),
            name: name.to_string(),
            expected_kind,
        }
    }

    /// Fail if this file defines `name` a second time.
    pub fn ensure_unique<V>(
        &self,
        defined: &HashMap<ResourceName, V>,
        name: &ResourceName,
    ) -> Result<(), DataLoadError> {
        if defined.contains_key(name) {
            return Err(DataLoadError::DuplicateName {
                path: self.path.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
