// backup-rs Infrastructure - System Adapters
// Implements: ObjectStore by spawning the external `aws` CLI

pub mod aws_cli_store;

pub use aws_cli_store::{AwsCliObjectStore, AwsCliSettings};
