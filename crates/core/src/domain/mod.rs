// Domain Layer - Pure types for keys, storage classes and restore requests

pub mod error;
pub mod key;
pub mod object;
pub mod restore;
pub mod storage;

// Re-exports
pub use error::DomainError;
pub use key::{KeyList, ObjectKey};
pub use object::ObjectSummary;
pub use restore::{RestoreDays, RestoreRequest, RestoreTier};
pub use storage::{ServerSideEncryption, StorageClass};
