// Object Store Port
// Abstraction over the remote bucket (AWS SDK or aws CLI)

use crate::domain::{
    ObjectKey, ObjectSummary, RestoreRequest, ServerSideEncryption, StorageClass,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Outcome of a successful restore request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestoreStatus {
    /// The service accepted the request
    Requested,
    /// The service reports a restore already running for this key
    AlreadyInProgress,
}

/// Per-upload settings, fixed for a whole backup run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub storage_class: StorageClass,
    pub encryption: ServerSideEncryption,
}

/// Object store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to retrieve data from server: {0}")]
    ListFailed(String),

    #[error("S3 upload failed for {key}: {message}")]
    UploadFailed { key: String, message: String },

    #[error("Restore request failed for {key}: {message}")]
    RestoreFailed { key: String, message: String },

    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),
}

/// Object Store trait
///
/// Implementations:
/// - S3ObjectStore: aws-sdk-s3 client
/// - AwsCliObjectStore: shells out to the `aws` program
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every object under `prefix` (empty prefix lists the whole bucket)
    ///
    /// Implementations follow continuation tokens until the listing is complete.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError>;

    /// Upload a local file under `key`
    ///
    /// # Errors
    /// - StoreError::ReadFailed if the local file cannot be opened
    /// - StoreError::UploadFailed if the service rejects the write
    async fn upload_file(
        &self,
        path: &Path,
        key: &ObjectKey,
        options: &UploadOptions,
    ) -> Result<(), StoreError>;

    /// Ask the service to rehydrate an archived object
    async fn restore_object(
        &self,
        key: &ObjectKey,
        request: &RestoreRequest,
    ) -> Result<RestoreStatus, StoreError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{BTreeMap, HashSet};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Recorded upload
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct UploadCall {
        pub path: PathBuf,
        pub key: ObjectKey,
        pub options: UploadOptions,
    }

    /// Recorded restore request
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RestoreCall {
        pub key: ObjectKey,
        pub request: RestoreRequest,
    }

    #[derive(Default)]
    struct State {
        objects: BTreeMap<String, ObjectSummary>,
        uploads: Vec<UploadCall>,
        restores: Vec<RestoreCall>,
        failing_keys: HashSet<String>,
        in_progress_keys: HashSet<String>,
        list_error: Option<String>,
    }

    /// In-memory object store for testing
    ///
    /// Uploaded files become listable objects. Restores are recorded in call order.
    #[derive(Default)]
    pub struct InMemoryObjectStore {
        state: Mutex<State>,
    }

    impl InMemoryObjectStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed the store with existing objects
        pub fn with_objects<I, S>(keys: I, storage_class: StorageClass) -> Self
        where
            I: IntoIterator<Item = S>,
            S: AsRef<str>,
        {
            let store = Self::new();
            {
                let mut state = store.state.lock().unwrap();
                for key in keys {
                    let key = ObjectKey::new(key.as_ref()).unwrap();
                    state.objects.insert(
                        key.as_str().to_string(),
                        ObjectSummary::new(key, 0, Some(storage_class.as_str().to_string())),
                    );
                }
            }
            store
        }

        /// Make restore and upload calls for this key fail
        pub fn fail_key(&self, key: impl Into<String>) {
            self.state.lock().unwrap().failing_keys.insert(key.into());
        }

        /// Report restores for this key as already in progress
        pub fn mark_in_progress(&self, key: impl Into<String>) {
            self.state.lock().unwrap().in_progress_keys.insert(key.into());
        }

        /// Make listing fail
        pub fn fail_listing(&self, message: impl Into<String>) {
            self.state.lock().unwrap().list_error = Some(message.into());
        }

        pub fn uploads(&self) -> Vec<UploadCall> {
            self.state.lock().unwrap().uploads.clone()
        }

        pub fn restores(&self) -> Vec<RestoreCall> {
            self.state.lock().unwrap().restores.clone()
        }

        pub fn object_keys(&self) -> Vec<String> {
            self.state.lock().unwrap().objects.keys().cloned().collect()
        }
    }

    #[async_trait]
    impl ObjectStore for InMemoryObjectStore {
        async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
            let state = self.state.lock().unwrap();
            if let Some(message) = &state.list_error {
                return Err(StoreError::ListFailed(message.clone()));
            }
            Ok(state
                .objects
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(_, summary)| summary.clone())
                .collect())
        }

        async fn upload_file(
            &self,
            path: &Path,
            key: &ObjectKey,
            options: &UploadOptions,
        ) -> Result<(), StoreError> {
            let size = std::fs::metadata(path)
                .map_err(|e| StoreError::ReadFailed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
                .len() as i64;

            let mut state = self.state.lock().unwrap();
            if state.failing_keys.contains(key.as_str()) {
                return Err(StoreError::UploadFailed {
                    key: key.to_string(),
                    message: "mock failure".to_string(),
                });
            }
            state.uploads.push(UploadCall {
                path: path.to_path_buf(),
                key: key.clone(),
                options: *options,
            });
            state.objects.insert(
                key.as_str().to_string(),
                ObjectSummary::new(
                    key.clone(),
                    size,
                    Some(options.storage_class.as_str().to_string()),
                ),
            );
            Ok(())
        }

        async fn restore_object(
            &self,
            key: &ObjectKey,
            request: &RestoreRequest,
        ) -> Result<RestoreStatus, StoreError> {
            let mut state = self.state.lock().unwrap();
            state.restores.push(RestoreCall {
                key: key.clone(),
                request: *request,
            });

            if state.failing_keys.contains(key.as_str()) {
                return Err(StoreError::RestoreFailed {
                    key: key.to_string(),
                    message: "NoSuchKey".to_string(),
                });
            }
            if state.in_progress_keys.contains(key.as_str()) {
                return Ok(RestoreStatus::AlreadyInProgress);
            }
            Ok(RestoreStatus::Requested)
        }
    }
}
