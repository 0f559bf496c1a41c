//! Business logic services

pub mod equipment;
pub mod notify;
pub mod reconciliation;
pub mod transactions;

use std::sync::Arc;

use crate::{config::FinesConfig, store::Store};

use notify::NotificationSink;

/// Bounded retry count for commits that hit a persistence conflict
pub(crate) const COMMIT_ATTEMPTS: u32 = 3;

/// Base backoff between conflict retries, grows linearly per attempt
pub(crate) const RETRY_BACKOFF_MS: u64 = 25;

/// Re-run a full read-compute-commit cycle while it fails with a
/// persistence conflict, up to [`COMMIT_ATTEMPTS`] tries with a linear
/// backoff. Any other error surfaces immediately.
macro_rules! retry_on_conflict {
    ($attempt:expr) => {{
        let mut attempts = 0u32;
        loop {
            match $attempt {
                Err($crate::error::AppError::Conflict(msg))
                    if attempts + 1 < $crate::services::COMMIT_ATTEMPTS =>
                {
                    attempts += 1;
                    tracing::warn!(
                        "Commit conflict (attempt {}), retrying: {}",
                        attempts,
                        msg
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(
                        $crate::services::RETRY_BACKOFF_MS * attempts as u64,
                    ))
                    .await;
                }
                other => break other,
            }
        }
    }};
}

pub(crate) use retry_on_conflict;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub transactions: transactions::TransactionsService,
    pub reconciliation: reconciliation::ReconciliationService,
}

impl Services {
    /// Create all services over the given store and notification sink
    pub fn new(
        store: Arc<dyn Store>,
        sink: Arc<dyn NotificationSink>,
        fines: FinesConfig,
    ) -> Self {
        Self {
            equipment: equipment::EquipmentService::new(store.clone()),
            transactions: transactions::TransactionsService::new(
                store.clone(),
                sink,
                fines.clone(),
            ),
            reconciliation: reconciliation::ReconciliationService::new(store, fines),
        }
    }
}
