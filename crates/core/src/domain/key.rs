// Object Key Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Separators treated as equivalent when comparing keys segment-wise
const SEPARATORS: [char; 2] = ['/', '\\'];

/// S3 object key
///
/// Keys from a listing or a key file are kept verbatim (`new`); keys built
/// from local paths are `/`-separated (`parse`, `from_relative_path`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Key exactly as written; only the empty string is rejected
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DomainError::InvalidKey("empty key".to_string()));
        }
        Ok(Self(raw))
    }

    /// Parse a raw key, normalising Windows separators to `/`
    pub fn parse(raw: impl AsRef<str>) -> Result<Self> {
        Self::new(raw.as_ref().replace('\\', "/"))
    }

    /// Build a key from a path relative to the backup root
    ///
    /// Every component must be valid UTF-8. `.` components are dropped and
    /// `..` or absolute components are rejected, since they cannot name an
    /// object below the root.
    pub fn from_relative_path(path: &Path) -> Result<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| DomainError::InvalidPath(path.to_string_lossy().into()))?;
                    segments.push(part);
                }
                Component::CurDir => {}
                _ => return Err(DomainError::InvalidPath(path.to_string_lossy().into())),
            }
        }

        if segments.is_empty() {
            return Err(DomainError::InvalidPath(path.to_string_lossy().into()));
        }

        Self::parse(segments.join("/"))
    }

    /// Prepend a prefix, inserting exactly one `/` between prefix and key
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches(SEPARATORS);
        if prefix.is_empty() {
            return self.clone();
        }
        Self(format!("{}/{}", prefix.replace('\\', "/"), self.0))
    }

    /// Key split on `/` and `\`, so `a\b` and `a/b` compare equal
    pub fn segments(&self) -> Vec<&str> {
        self.0.split(SEPARATORS).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parsed key file (`objects.txt`): one key per line, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyList {
    pub keys: Vec<ObjectKey>,
    /// Blank lines encountered and ignored
    pub skipped_blank: usize,
}

impl KeyList {
    /// Parse key file contents
    ///
    /// Lines are trimmed; blank lines are skipped. Keys are otherwise taken
    /// verbatim, and duplicates are kept, so a key listed twice is restored twice.
    pub fn parse(text: &str) -> Self {
        let mut list = KeyList::default();
        for line in text.lines() {
            let line = line.trim();
            match ObjectKey::new(line) {
                Ok(key) => list.keys.push(key),
                Err(_) => list.skipped_blank += 1,
            }
        }
        list
    }

    /// Render keys as key file contents (trailing newline included)
    pub fn render(keys: &[ObjectKey]) -> String {
        let mut out = String::with_capacity(keys.iter().map(|k| k.as_str().len() + 1).sum());
        for key in keys {
            out.push_str(key.as_str());
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
