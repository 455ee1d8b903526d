// Command handlers: wire adapters into core services

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use backup_core::application::{
    read_key_file, write_key_file, BackupService, InventoryService, RestoreService,
    StorageClassFilter,
};
use backup_core::domain::{
    KeyList, RestoreDays, RestoreRequest, RestoreTier, ServerSideEncryption, StorageClass,
};
use backup_core::port::{ObjectStore, SystemTimeProvider, TimeProvider, UploadOptions};
use backup_infra_s3::{S3ObjectStore, S3Settings};
use backup_infra_system::{AwsCliObjectStore, AwsCliSettings};

use crate::args::{Backend, ConnectionArgs};
use crate::output;

/// Build the object store selected by `--backend`
pub async fn build_store(
    connection: &ConnectionArgs,
    bucket: &str,
    time_provider: Arc<dyn TimeProvider>,
) -> Arc<dyn ObjectStore> {
    match connection.backend {
        Backend::Sdk => {
            let settings = S3Settings {
                bucket: bucket.to_string(),
                region: connection.region.clone(),
                endpoint_url: connection.endpoint_url.clone(),
                force_path_style: connection.force_path_style,
            };
            Arc::new(S3ObjectStore::connect(settings).await)
        }
        Backend::Cli => {
            let mut settings = AwsCliSettings::new(bucket, connection.region.clone());
            settings.program = connection.aws_cli.clone();
            settings.leading_args = connection.aws_cli_args.clone();
            settings.endpoint_url = connection.endpoint_url.clone();
            settings.timeout = connection.timeout_secs.map(Duration::from_secs);
            info!(program = %settings.program, "Using aws CLI backend");
            Arc::new(AwsCliObjectStore::new(settings, time_provider))
        }
    }
}

/// Tilde-expand a user supplied path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path
        .to_str()
        .with_context(|| format!("Could not parse path {:?}", path))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).into_owned()))
}

pub struct BackupArgs {
    pub path: PathBuf,
    pub storage_class: StorageClass,
    pub encryption: ServerSideEncryption,
    pub prefix: String,
    pub dry_run: bool,
}

/// Returns whether every file was handled
pub async fn backup(store: Arc<dyn ObjectStore>, args: BackupArgs) -> Result<bool> {
    let root = expand_path(&args.path)?;
    let options = UploadOptions {
        storage_class: args.storage_class,
        encryption: args.encryption,
    };

    let report = BackupService::new(store, Arc::new(SystemTimeProvider), options)
        .prefix(args.prefix)
        .dry_run(args.dry_run)
        .run(&root)
        .await
        .with_context(|| format!("Failed to sync {}", root.display()))?;

    output::print_backup(&report, args.dry_run);
    Ok(report.is_success())
}

pub async fn list(
    store: Arc<dyn ObjectStore>,
    prefix: &str,
    filter: StorageClassFilter,
    destination: &str,
) -> Result<()> {
    let keys = InventoryService::new(store)
        .collect(prefix, filter)
        .await
        .context("Failed to fetch objects")?;

    if destination == "-" {
        print!("{}", KeyList::render(&keys));
        return Ok(());
    }

    let path = expand_path(Path::new(destination))?;
    write_key_file(&path, &keys)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    output::print_listed(keys.len(), &path.display().to_string());
    Ok(())
}

/// Returns whether every restore request succeeded
pub async fn restore(
    store: Arc<dyn ObjectStore>,
    input: &Path,
    days: RestoreDays,
    tier: RestoreTier,
    dry_run: bool,
) -> Result<bool> {
    let input = expand_path(input)?;
    let key_list = read_key_file(&input)
        .await
        .with_context(|| format!("Failed to read key file {}", input.display()))?;

    if key_list.skipped_blank > 0 {
        warn!(lines = key_list.skipped_blank, "Ignored blank lines in key file");
    }

    let report = RestoreService::new(
        store,
        Arc::new(SystemTimeProvider),
        RestoreRequest::new(days, tier),
    )
    .dry_run(dry_run)
    .restore_all(&key_list.keys)
    .await;

    output::print_restore(&report, dry_run);
    Ok(report.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use backup_core::port::object_store::mocks::InMemoryObjectStore;

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        assert_eq!(
            expand_path(Path::new("/var/data")).unwrap(),
            PathBuf::from("/var/data")
        );
    }

    #[tokio::test]
    async fn test_restore_reads_key_file_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("objects.txt");
        std::fs::write(&input, "a\n\nb\n").unwrap();

        let store = Arc::new(InMemoryObjectStore::new());
        store.fail_key("b");

        let ok = restore(
            store.clone(),
            &input,
            RestoreDays::default(),
            RestoreTier::Bulk,
            false,
        )
        .await
        .unwrap();

        assert!(!ok);
        let restored: Vec<String> = store.restores().iter().map(|r| r.key.to_string()).collect();
        assert_eq!(restored, vec!["a", "b"]);
    }
}
