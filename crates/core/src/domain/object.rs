// Listed Object Domain Model

use super::key::ObjectKey;
use super::storage::StorageClass;
use serde::{Deserialize, Serialize};

/// One entry of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: ObjectKey,
    pub size: i64,
    /// Raw storage class as reported by S3 (absent means STANDARD)
    pub storage_class: Option<String>,
}

impl ObjectSummary {
    pub fn new(key: ObjectKey, size: i64, storage_class: Option<String>) -> Self {
        Self {
            key,
            size,
            storage_class,
        }
    }

    /// Parsed storage class; unknown values yield `None`
    pub fn storage_class(&self) -> Option<StorageClass> {
        match self.storage_class.as_deref() {
            None => Some(StorageClass::Standard),
            Some(raw) => raw.parse().ok(),
        }
    }
}
