//! Periodic reconciliation of transaction status and fines

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    config::FinesConfig,
    domain::{calculate_fine, derive_status},
    error::AppResult,
    store::{Store, WriteBatch},
};

use super::retry_on_conflict;

/// Re-derives status and fine for every live, non-terminal transaction.
///
/// A sweep only ages transactions (`Ongoing` -> `Overdue`) and refreshes
/// fines; it never touches inventory or the archive. A transaction leaves the
/// active set exclusively through return processing or deletion. Running a
/// sweep twice with the same `now` and no intervening writes updates nothing
/// the second time.
#[derive(Clone)]
pub struct ReconciliationService {
    store: Arc<dyn Store>,
    fines: FinesConfig,
}

impl ReconciliationService {
    pub fn new(store: Arc<dyn Store>, fines: FinesConfig) -> Self {
        Self { store, fines }
    }

    /// Run one sweep against `now`; returns how many transactions changed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let updated = retry_on_conflict!(self.try_sweep(now).await)?;
        if updated > 0 {
            tracing::info!("Reconciliation sweep updated {} transaction(s)", updated);
        } else {
            tracing::debug!("Reconciliation sweep found nothing to update");
        }
        Ok(updated)
    }

    async fn try_sweep(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let transactions = self.store.list_sweepable_transactions().await?;

        let mut batch = WriteBatch::default();
        let mut updated = 0u64;
        for mut txn in transactions {
            let derived = derive_status(&txn.items, txn.due_date, txn.status, now);
            let fine_amount = calculate_fine(txn.due_date, now, self.fines.per_day_rate);
            if derived == txn.status && fine_amount == txn.fine_amount {
                continue;
            }
            txn.status = derived;
            txn.fine_amount = fine_amount;
            txn.updated_at = now;
            batch.update_transactions.push(txn);
            updated += 1;
        }

        if !batch.is_empty() {
            self.store.commit(batch).await?;
        }
        Ok(updated)
    }

    /// Loop forever, sweeping on the configured cadence.
    pub async fn run(self, interval_minutes: u64, run_at_startup: bool) {
        let period = std::time::Duration::from_secs(interval_minutes.max(1) * 60);
        let mut interval = tokio::time::interval(period);
        if !run_at_startup {
            // Skip the immediate first tick
            interval.tick().await;
        }
        loop {
            interval.tick().await;
            if let Err(e) = self.sweep(Utc::now()).await {
                tracing::error!("Reconciliation sweep failed: {}", e);
            }
        }
    }
}
