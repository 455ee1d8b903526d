// S3 ObjectStore implementation

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tracing::{debug, info};

use backup_core::domain::{ObjectKey, ObjectSummary, RestoreRequest};
use backup_core::port::{ObjectStore, RestoreStatus, StoreError, UploadOptions};

use crate::mapping;

/// Connection settings for the S3 adapter
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Alternative endpoint (S3-compatible services, localstack)
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

impl S3Settings {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

/// aws-sdk-s3 backed object store
///
/// Credentials come from the default provider chain (env, profile, IMDS).
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Load shared AWS config and build a client for `settings.bucket`
    pub async fn connect(settings: S3Settings) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style);
        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        info!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = ?settings.endpoint_url,
            "S3 client configured"
        );

        Self {
            client: Client::from_conf(builder.build()),
            bucket: settings.bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_prefix((!prefix.is_empty()).then(|| prefix.to_string()))
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        let mut page_count = 0usize;

        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|e| StoreError::ListFailed(DisplayErrorContext(&e).to_string()))?;
            page_count += 1;

            for object in page.contents() {
                // Listing entries always carry a key; skip anything malformed
                let Some(key) = object.key().and_then(|k| ObjectKey::new(k).ok()) else {
                    continue;
                };
                objects.push(ObjectSummary::new(
                    key,
                    object.size().unwrap_or(0),
                    object.storage_class().map(|c| c.as_str().to_string()),
                ));
            }
        }

        debug!(bucket = %self.bucket, pages = page_count, objects = objects.len(), "Listing complete");
        Ok(objects)
    }

    async fn upload_file(
        &self,
        path: &Path,
        key: &ObjectKey,
        options: &UploadOptions,
    ) -> Result<(), StoreError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StoreError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(mapping::normalise_key(key.as_str()))
            .body(body)
            .storage_class(mapping::storage_class(options.storage_class))
            .server_side_encryption(mapping::encryption(options.encryption))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| StoreError::UploadFailed {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })
    }

    async fn restore_object(
        &self,
        key: &ObjectKey,
        request: &RestoreRequest,
    ) -> Result<RestoreStatus, StoreError> {
        let restore_request =
            mapping::restore_request(request).map_err(|e| StoreError::RestoreFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let result = self
            .client
            .restore_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .restore_request(restore_request)
            .send()
            .await;

        match result {
            Ok(_) => Ok(RestoreStatus::Requested),
            Err(e) if mapping::is_restore_in_progress(e.code()) => {
                Ok(RestoreStatus::AlreadyInProgress)
            }
            Err(e) => Err(StoreError::RestoreFailed {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            }),
        }
    }
}
