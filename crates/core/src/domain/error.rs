// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Could not parse path: {0}")]
    InvalidPath(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Invalid storage class: {0}")]
    InvalidStorageClass(String),

    #[error("Invalid server side encryption: {0}")]
    InvalidServerSideEncryption(String),

    #[error("Invalid restore tier: {0} (expected Standard, Bulk or Expedited)")]
    InvalidRestoreTier(String),

    #[error("Invalid restore days: {0} (expected {min}..={max})", min = super::restore::RestoreDays::MIN, max = super::restore::RestoreDays::MAX)]
    InvalidRestoreDays(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
