// Command-line arguments
// Every global option can also come from a BACKUP_* environment variable

use backup_core::domain::{RestoreDays, RestoreTier, ServerSideEncryption, StorageClass};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "eu-west-2";
pub const DEFAULT_KEY_FILE: &str = "objects.txt";

#[derive(Parser, Debug)]
#[command(name = "backup-rs")]
#[command(about = "Back up directories to S3 and batch-restore archived objects", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// How requests reach S3
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// aws-sdk-s3 client
    Sdk,
    /// External `aws` command-line tool
    Cli,
}

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// AWS region
    #[arg(short, long, global = true, env = "BACKUP_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Backend used to talk to S3
    #[arg(long, global = true, env = "BACKUP_BACKEND", value_enum, default_value_t = Backend::Sdk)]
    pub backend: Backend,

    /// Custom S3 endpoint (S3-compatible services, localstack)
    #[arg(long, global = true, env = "BACKUP_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Use path-style addressing (sdk backend)
    #[arg(long, global = true, env = "BACKUP_FORCE_PATH_STYLE")]
    pub force_path_style: bool,

    /// aws program used by the cli backend
    #[arg(long, global = true, env = "BACKUP_AWS_CLI", default_value = "aws")]
    pub aws_cli: String,

    /// Extra argument passed to every aws invocation (repeatable), e.g. --aws-cli-arg=--profile=prod
    #[arg(long = "aws-cli-arg", global = true, allow_hyphen_values = true)]
    pub aws_cli_args: Vec<String>,

    /// Timeout for each aws invocation in seconds (cli backend)
    #[arg(long, global = true, env = "BACKUP_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload every file under PATH that is not yet in the bucket
    Backup {
        /// Directory to back up
        path: PathBuf,

        /// Bucket to store data in
        #[arg(short, long, env = "BACKUP_BUCKET")]
        bucket: String,

        /// The storage class for the individual files
        #[arg(short, long, default_value = "DEEP_ARCHIVE")]
        storage_class: StorageClass,

        /// The encryption used by the individual files (AES256 or aws:kms)
        #[arg(short, long, default_value = "AES256")]
        encryption: ServerSideEncryption,

        /// Key prefix every uploaded file is stored under
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Only report what would be uploaded
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the bucket's object keys to a key file
    List {
        /// Bucket to list
        #[arg(short, long, env = "BACKUP_BUCKET")]
        bucket: String,

        /// Only list keys under this prefix
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Only keep objects that need a restore (GLACIER, DEEP_ARCHIVE)
        #[arg(long, conflicts_with = "storage_class")]
        archived: bool,

        /// Only keep objects in this storage class
        #[arg(short, long)]
        storage_class: Option<StorageClass>,

        /// Output file, or - for stdout
        #[arg(short, long, default_value = DEFAULT_KEY_FILE)]
        output: String,
    },

    /// Request a Glacier restore for every key in a key file
    Restore {
        /// Bucket holding the archived objects
        #[arg(short, long, env = "BACKUP_BUCKET")]
        bucket: String,

        /// Key file, one object key per line
        #[arg(short, long, default_value = DEFAULT_KEY_FILE)]
        input: PathBuf,

        /// Days the restored copy stays available
        #[arg(short, long, default_value = "7")]
        days: RestoreDays,

        /// Retrieval tier: Standard, Bulk or Expedited
        #[arg(short, long, default_value = "Standard")]
        tier: RestoreTier,

        /// Only report which keys would be restored
        #[arg(long)]
        dry_run: bool,
    },
}

impl Commands {
    pub fn bucket(&self) -> &str {
        match self {
            Commands::Backup { bucket, .. }
            | Commands::List { bucket, .. }
            | Commands::Restore { bucket, .. } => bucket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_defaults() {
        let cli = Cli::try_parse_from(["backup-rs", "restore", "--bucket", "vault"]).unwrap();
        match cli.command {
            Commands::Restore {
                bucket,
                input,
                days,
                tier,
                dry_run,
            } => {
                assert_eq!(bucket, "vault");
                assert_eq!(input, PathBuf::from("objects.txt"));
                assert_eq!(days.get(), 7);
                assert_eq!(tier, RestoreTier::Standard);
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.connection.backend, Backend::Sdk);
    }

    #[test]
    fn test_backup_parses_domain_values() {
        let cli = Cli::try_parse_from([
            "backup-rs",
            "backup",
            "~/Pictures",
            "-b",
            "vault",
            "--storage-class",
            "GLACIER",
            "--encryption",
            "aws:kms",
            "--backend",
            "cli",
        ])
        .unwrap();
        match cli.command {
            Commands::Backup {
                storage_class,
                encryption,
                ..
            } => {
                assert_eq!(storage_class, StorageClass::Glacier);
                assert_eq!(encryption, ServerSideEncryption::AwsKms);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.connection.backend, Backend::Cli);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Cli::try_parse_from([
            "backup-rs", "backup", ".", "-b", "v", "--storage-class", "COLD"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["backup-rs", "restore", "-b", "v", "--days", "0"]).is_err());
        assert!(Cli::try_parse_from(["backup-rs", "restore", "-b", "v", "--tier", "Fast"]).is_err());
    }

    #[test]
    fn test_non_numeric_days_are_echoed_back() {
        let err = Cli::try_parse_from(["backup-rs", "restore", "-b", "v", "--days", "thirty"])
            .unwrap_err()
            .to_string();
        assert!(err.contains("Invalid restore days: thirty"), "{}", err);
    }

    #[test]
    fn test_list_archived_conflicts_with_storage_class() {
        assert!(Cli::try_parse_from([
            "backup-rs", "list", "-b", "v", "--archived", "--storage-class", "GLACIER"
        ])
        .is_err());
    }

    #[test]
    fn test_aws_cli_args_accept_flags() {
        let cli = Cli::try_parse_from([
            "backup-rs",
            "restore",
            "-b",
            "v",
            "--aws-cli-arg=--profile=prod",
        ])
        .unwrap();
        assert_eq!(cli.connection.aws_cli_args, vec!["--profile=prod"]);
    }
}
