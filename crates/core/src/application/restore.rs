// Restore Use Case
// One restore request per key, sequentially, in key file order

use crate::domain::{ObjectKey, RestoreRequest};
use crate::port::{ObjectStore, RestoreStatus, TimeProvider};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Summary of a restore batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub requested: usize,
    pub already_in_progress: usize,
    /// Failed keys with the store's message, in input order
    pub failed: Vec<(ObjectKey, String)>,
    /// Keys that would have been requested (dry run only)
    pub planned: usize,
    pub elapsed_ms: i64,
}

impl RestoreReport {
    pub fn total(&self) -> usize {
        self.requested + self.already_in_progress + self.failed.len() + self.planned
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Restore Service
///
/// Failures never stop the batch: each key is attempted exactly once and the
/// outcome recorded in the report.
pub struct RestoreService {
    store: Arc<dyn ObjectStore>,
    time_provider: Arc<dyn TimeProvider>,
    request: RestoreRequest,
    dry_run: bool,
}

impl RestoreService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        time_provider: Arc<dyn TimeProvider>,
        request: RestoreRequest,
    ) -> Self {
        Self {
            store,
            time_provider,
            request,
            dry_run: false,
        }
    }

    /// Log each key instead of sending requests
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Issue one restore request per key, in order
    pub async fn restore_all(&self, keys: &[ObjectKey]) -> RestoreReport {
        let start = self.time_provider.now_millis();
        let mut report = RestoreReport::default();

        info!(
            keys = keys.len(),
            days = %self.request.days,
            tier = %self.request.tier,
            dry_run = self.dry_run,
            "Starting restore batch"
        );

        for (index, key) in keys.iter().enumerate() {
            if self.dry_run {
                info!(key = %key, position = index + 1, "Would request restore");
                report.planned += 1;
                continue;
            }

            match self.store.restore_object(key, &self.request).await {
                Ok(RestoreStatus::Requested) => {
                    info!(key = %key, position = index + 1, "Restore requested");
                    report.requested += 1;
                }
                Ok(RestoreStatus::AlreadyInProgress) => {
                    warn!(key = %key, position = index + 1, "Restore already in progress");
                    report.already_in_progress += 1;
                }
                Err(e) => {
                    error!(key = %key, position = index + 1, error = %e, "Restore request failed");
                    report.failed.push((key.clone(), e.to_string()));
                }
            }
        }

        report.elapsed_ms = self.time_provider.now_millis() - start;

        info!(
            requested = report.requested,
            already_in_progress = report.already_in_progress,
            failed = report.failed.len(),
            elapsed_ms = report.elapsed_ms,
            "Restore batch finished"
        );

        report
    }
}
