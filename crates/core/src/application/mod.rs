// Application Layer - Use Cases

pub mod backup;
pub mod inventory;
pub mod restore;

// Re-exports
pub use backup::{BackupReport, BackupService};
pub use inventory::{read_key_file, write_key_file, InventoryService, StorageClassFilter};
pub use restore::{RestoreReport, RestoreService};
