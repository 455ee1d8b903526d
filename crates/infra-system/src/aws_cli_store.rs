// aws CLI ObjectStore implementation
// reason: tokio::process for async child management, serde for the CLI's JSON output
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use backup_core::domain::{ObjectKey, ObjectSummary, RestoreRequest};
use backup_core::port::{ObjectStore, RestoreStatus, StoreError, TimeProvider, UploadOptions};

/// Marker the CLI prints on stderr when a restore is already running
const RESTORE_IN_PROGRESS_MARKER: &str = "RestoreAlreadyInProgress";

/// Environment variables passed through to the child besides `AWS_*`
const DEFAULT_ENV_ALLOWLIST: [&str; 3] = ["PATH", "HOME", "USER"];

/// Settings for the CLI adapter
#[derive(Debug, Clone)]
pub struct AwsCliSettings {
    /// Program to run (usually `aws`)
    pub program: String,
    /// Arguments placed before every subcommand (e.g. `--profile prod`)
    pub leading_args: Vec<String>,
    pub bucket: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    /// Per-invocation timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    pub env_allowlist: Vec<String>,
}

impl AwsCliSettings {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            program: "aws".to_string(),
            leading_args: Vec::new(),
            bucket: bucket.into(),
            region: region.into(),
            endpoint_url: None,
            timeout: None,
            env_allowlist: DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListOutput {
    #[serde(default)]
    contents: Vec<ListedObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedObject {
    key: String,
    #[serde(default)]
    size: i64,
    storage_class: Option<String>,
}

/// Object store that shells out to the `aws` command-line tool
///
/// Every call spawns one child process and waits for it; stdout/stderr are
/// captured. The child's environment is rebuilt from an allowlist.
pub struct AwsCliObjectStore {
    settings: AwsCliSettings,
    time_provider: Arc<dyn TimeProvider>,
}

impl AwsCliObjectStore {
    pub fn new(settings: AwsCliSettings, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            settings,
            time_provider,
        }
    }

    /// Allowlisted variables plus every `AWS_*` variable
    fn filter_env(&self, env: &HashMap<String, String>) -> HashMap<String, String> {
        env.iter()
            .filter(|(k, _)| self.settings.env_allowlist.contains(k) || k.starts_with("AWS_"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Region/endpoint flags shared by every subcommand
    fn global_args(&self) -> Vec<String> {
        let mut args = self.settings.leading_args.clone();
        args.push("--region".to_string());
        args.push(self.settings.region.clone());
        if let Some(endpoint) = &self.settings.endpoint_url {
            args.push("--endpoint-url".to_string());
            args.push(endpoint.clone());
        }
        args
    }

    fn restore_args(&self, key: &ObjectKey, request: &RestoreRequest) -> Vec<String> {
        let mut args = self.global_args();
        args.extend([
            "s3api".to_string(),
            "restore-object".to_string(),
            "--bucket".to_string(),
            self.settings.bucket.clone(),
            "--key".to_string(),
            key.to_string(),
            "--restore-request".to_string(),
            request.to_api_json().to_string(),
        ]);
        args
    }

    fn list_args(&self, prefix: &str) -> Vec<String> {
        let mut args = self.global_args();
        args.extend([
            "s3api".to_string(),
            "list-objects-v2".to_string(),
            "--bucket".to_string(),
            self.settings.bucket.clone(),
        ]);
        if !prefix.is_empty() {
            args.push("--prefix".to_string());
            args.push(prefix.to_string());
        }
        args.push("--output".to_string());
        args.push("json".to_string());
        args
    }

    fn upload_args(&self, path: &Path, key: &ObjectKey, options: &UploadOptions) -> Vec<String> {
        let mut args = self.global_args();
        args.extend([
            "s3".to_string(),
            "cp".to_string(),
            path.display().to_string(),
            format!("s3://{}/{}", self.settings.bucket, key),
            "--storage-class".to_string(),
            options.storage_class.to_string(),
            "--sse".to_string(),
            options.encryption.to_string(),
            "--only-show-errors".to_string(),
        ]);
        args
    }

    /// Spawn the CLI and wait for its output
    async fn run(&self, args: &[String]) -> Result<std::process::Output, StoreError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let filtered_env = self.filter_env(&env);
        let start_time = self.time_provider.now_millis();

        debug!(program = %self.settings.program, args = ?args, "Spawning aws CLI");

        let child = Command::new(&self.settings.program)
            .args(args)
            .env_clear()
            .envs(&filtered_env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| StoreError::SpawnFailed(format!("{}: {}", self.settings.program, e)))?;

        let output = match self.settings.timeout {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => return Err(StoreError::Timeout(limit.as_millis() as u64)),
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| StoreError::SpawnFailed(e.to_string()))?;

        debug!(
            exit_code = ?output.status.code(),
            duration_ms = self.time_provider.now_millis() - start_time,
            "aws CLI finished"
        );

        Ok(output)
    }
}

fn stderr_message(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("aws exited with status {:?}", output.status.code())
    } else {
        stderr
    }
}

fn parse_listing(stdout: &[u8]) -> Result<Vec<ObjectSummary>, StoreError> {
    // Empty buckets can produce no output at all
    if stdout.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }

    let listing: ListOutput = serde_json::from_slice(stdout)
        .map_err(|e| StoreError::ListFailed(format!("unreadable aws output: {}", e)))?;

    Ok(listing
        .contents
        .into_iter()
        .filter_map(|object| {
            ObjectKey::new(&object.key)
                .ok()
                .map(|key| ObjectSummary::new(key, object.size, object.storage_class))
        })
        .collect())
}

#[async_trait]
impl ObjectStore for AwsCliObjectStore {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        let output = self.run(&self.list_args(prefix)).await?;
        if !output.status.success() {
            return Err(StoreError::ListFailed(stderr_message(&output)));
        }
        let objects = parse_listing(&output.stdout)?;
        info!(bucket = %self.settings.bucket, objects = objects.len(), "Listing complete");
        Ok(objects)
    }

    async fn upload_file(
        &self,
        path: &Path,
        key: &ObjectKey,
        options: &UploadOptions,
    ) -> Result<(), StoreError> {
        tokio::fs::metadata(path)
            .await
            .map_err(|e| StoreError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let output = self.run(&self.upload_args(path, key, options)).await?;
        if !output.status.success() {
            return Err(StoreError::UploadFailed {
                key: key.to_string(),
                message: stderr_message(&output),
            });
        }
        Ok(())
    }

    async fn restore_object(
        &self,
        key: &ObjectKey,
        request: &RestoreRequest,
    ) -> Result<RestoreStatus, StoreError> {
        let output = self.run(&self.restore_args(key, request)).await?;
        if output.status.success() {
            return Ok(RestoreStatus::Requested);
        }

        let message = stderr_message(&output);
        if message.contains(RESTORE_IN_PROGRESS_MARKER) {
            return Ok(RestoreStatus::AlreadyInProgress);
        }
        Err(StoreError::RestoreFailed {
            key: key.to_string(),
            message,
        })
    }
}
