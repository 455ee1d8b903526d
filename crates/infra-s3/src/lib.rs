// backup-rs Infrastructure - S3 Adapter
// Implements: ObjectStore over aws-sdk-s3

mod client;
mod mapping;

pub use client::{S3ObjectStore, S3Settings};
