// Restore Request Domain Model

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Glacier retrieval tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestoreTier {
    #[default]
    Standard,
    Bulk,
    Expedited,
}

impl RestoreTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreTier::Standard => "Standard",
            RestoreTier::Bulk => "Bulk",
            RestoreTier::Expedited => "Expedited",
        }
    }
}

impl std::fmt::Display for RestoreTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestoreTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(RestoreTier::Standard),
            "bulk" => Ok(RestoreTier::Bulk),
            "expedited" => Ok(RestoreTier::Expedited),
            _ => Err(DomainError::InvalidRestoreTier(s.to_string())),
        }
    }
}

/// Number of days the restored copy stays readable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct RestoreDays(i32);

impl RestoreDays {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 365;

    pub fn new(days: i64) -> Result<Self, DomainError> {
        if !(Self::MIN..=Self::MAX).contains(&days) {
            return Err(DomainError::InvalidRestoreDays(days.to_string()));
        }
        Ok(Self(days as i32))
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

impl Default for RestoreDays {
    fn default() -> Self {
        Self(7)
    }
}

impl TryFrom<i64> for RestoreDays {
    type Error = DomainError;

    fn try_from(days: i64) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<RestoreDays> for i32 {
    fn from(days: RestoreDays) -> Self {
        days.0
    }
}

impl FromStr for RestoreDays {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days: i64 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidRestoreDays(s.to_string()))?;
        Self::new(days)
    }
}

impl std::fmt::Display for RestoreDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed argument template applied to every key of a restore batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRequest {
    pub days: RestoreDays,
    pub tier: RestoreTier,
}

impl RestoreRequest {
    pub fn new(days: RestoreDays, tier: RestoreTier) -> Self {
        Self { days, tier }
    }

    /// JSON document accepted by `aws s3api restore-object --restore-request`
    pub fn to_api_json(&self) -> serde_json::Value {
        serde_json::json!({
            "Days": self.days.get(),
            "GlacierJobParameters": { "Tier": self.tier.as_str() },
        })
    }
}
