// Port Layer - Interfaces for external dependencies

pub mod object_store;
pub mod time_provider;

// Re-exports
pub use object_store::{ObjectStore, RestoreStatus, StoreError, UploadOptions};
pub use time_provider::{SystemTimeProvider, TimeProvider};
