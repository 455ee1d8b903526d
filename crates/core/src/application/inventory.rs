// Inventory Use Case
// Lists bucket keys and reads/writes the key file consumed by restore

use crate::domain::{KeyList, ObjectKey, ObjectSummary, StorageClass};
use crate::error::Result;
use crate::port::ObjectStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Which listed objects make it into the key file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageClassFilter {
    #[default]
    All,
    /// Only objects that need a restore before they can be read
    Archived,
    Exactly(StorageClass),
}

impl StorageClassFilter {
    pub fn matches(&self, object: &ObjectSummary) -> bool {
        match self {
            StorageClassFilter::All => true,
            StorageClassFilter::Archived => object
                .storage_class()
                .map(|class| class.requires_restore())
                .unwrap_or(false),
            StorageClassFilter::Exactly(expected) => object.storage_class() == Some(*expected),
        }
    }
}

/// Inventory Service
pub struct InventoryService {
    store: Arc<dyn ObjectStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Collect keys under `prefix` in listing order
    pub async fn collect(&self, prefix: &str, filter: StorageClassFilter) -> Result<Vec<ObjectKey>> {
        let objects = self.store.list_objects(prefix).await?;
        let listed = objects.len();

        let keys: Vec<ObjectKey> = objects
            .into_iter()
            .filter(|object| filter.matches(object))
            .map(|object| object.key)
            .collect();

        info!(listed, selected = keys.len(), filter = ?filter, "Collected object keys");
        Ok(keys)
    }
}

/// Write keys to a key file, one per line
pub async fn write_key_file(path: &Path, keys: &[ObjectKey]) -> Result<()> {
    tokio::fs::write(path, KeyList::render(keys)).await?;
    debug!(path = ?path, keys = keys.len(), "Key file written");
    Ok(())
}

/// Read a key file
pub async fn read_key_file(path: &Path) -> Result<KeyList> {
    let text = tokio::fs::read_to_string(path).await?;
    let list = KeyList::parse(&text);
    debug!(path = ?path, keys = list.len(), skipped_blank = list.skipped_blank, "Key file read");
    Ok(list)
}
