//! Borrow transaction lifecycle service
//!
//! Every lifecycle operation runs as one read-compute-commit cycle: read the
//! transaction and a batch of every equipment row it touches, derive the new
//! state through the pure domain functions, then hand a single write batch to
//! the store. A persistence conflict rolls the whole cycle back and retries
//! it from the read.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    config::FinesConfig,
    domain::{calculate_fine, days_overdue, derive_status, InventoryLedger},
    error::{AppError, AppResult},
    models::{
        enums::{FineStatus, TransactionStatus},
        fine::Fine,
        notification::Notification,
        record::Record,
        transaction::{BorrowedItem, CreateTransaction, ItemReturn, Transaction},
    },
    services::notify::{
        approval_notification, denial_notification, return_receipt_notification,
        NotificationSink,
    },
    store::{Store, WriteBatch},
};

use super::retry_on_conflict;

#[derive(Clone)]
pub struct TransactionsService {
    store: Arc<dyn Store>,
    sink: Arc<dyn NotificationSink>,
    fines: FinesConfig,
}

impl TransactionsService {
    pub fn new(
        store: Arc<dyn Store>,
        sink: Arc<dyn NotificationSink>,
        fines: FinesConfig,
    ) -> Self {
        Self { store, sink, fines }
    }

    /// Create a borrow transaction and reserve inventory for every line.
    ///
    /// Inventory is held from the moment of request: reservation happens for
    /// self-service requests and staff-created transactions alike. The write
    /// is all-or-nothing, so a failed line leaves no partial reservation.
    pub async fn create(&self, input: CreateTransaction) -> AppResult<Transaction> {
        if input.items.is_empty() {
            return Err(AppError::Validation(
                "A transaction needs at least one item".to_string(),
            ));
        }
        let txn = retry_on_conflict!(self.try_create(&input).await)?;
        tracing::info!(
            "Created transaction {} ({}) for student {}",
            txn.transaction_id,
            txn.status,
            txn.student_id
        );
        Ok(txn)
    }

    /// Approve a pending request, starting the loan clock now.
    pub async fn approve(&self, id: Uuid) -> AppResult<Transaction> {
        let (txn, notifications) = retry_on_conflict!(self.try_approve(id).await)?;
        self.deliver(notifications).await;
        tracing::info!("Approved transaction {}", txn.transaction_id);
        Ok(txn)
    }

    /// Deny a pending request, releasing its reservation. Leaves no record.
    pub async fn deny(&self, id: Uuid) -> AppResult<()> {
        let (txn, notifications) = retry_on_conflict!(self.try_deny(id).await)?;
        self.deliver(notifications).await;
        tracing::info!("Denied transaction {}", txn.transaction_id);
        Ok(())
    }

    /// Process returns for a transaction, item by item.
    ///
    /// `returns` maps item ids to their new absolute return state. Inventory
    /// is released by the increment over what was already returned, never the
    /// full amount, so repeated partial completions cannot double-release.
    /// A fully returned transaction is archived and its live row deleted in
    /// the same commit. Returns the resulting status.
    pub async fn complete(
        &self,
        id: Uuid,
        returns: &HashMap<Uuid, ItemReturn>,
    ) -> AppResult<TransactionStatus> {
        let (status, notifications) = retry_on_conflict!(self.try_complete(id, returns).await)?;
        self.deliver(notifications).await;
        Ok(status)
    }

    /// Administrative removal of a live transaction.
    ///
    /// Releases the unreturned remainder of every item and deletes the
    /// transaction without archival.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let txn = retry_on_conflict!(self.try_delete(id).await)?;
        tracing::info!("Deleted transaction {}", txn.transaction_id);
        Ok(())
    }

    /// List live transactions, optionally filtered by status.
    pub async fn get_by_status(
        &self,
        status: Option<TransactionStatus>,
    ) -> AppResult<Vec<Transaction>> {
        self.store.list_transactions(status).await
    }

    /// List a student's live transactions.
    pub async fn get_by_student(&self, student_id: i32) -> AppResult<Vec<Transaction>> {
        self.store
            .get_user(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", student_id)))?;
        self.store.list_transactions_by_student(student_id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Transaction> {
        self.required(id).await
    }

    // --- one attempt of each read-compute-commit cycle ---

    async fn try_create(&self, input: &CreateTransaction) -> AppResult<Transaction> {
        let user = self
            .store
            .get_user(input.student_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {} not found", input.student_id))
            })?;

        let mut ledger = self.load_ledger_for(
            input.items.iter().map(|line| line.equipment_id),
        )
        .await?;

        let now = Utc::now();
        let mut items = Vec::with_capacity(input.items.len());
        let mut total_price = Decimal::ZERO;
        for line in &input.items {
            let equipment = ledger.get(line.equipment_id)?;
            let (item_name, price) = (equipment.name.clone(), equipment.price_per_unit);
            ledger.reserve(line.equipment_id, line.quantity)?;
            total_price += price * Decimal::from(line.quantity);
            items.push(BorrowedItem {
                id: Uuid::new_v4(),
                equipment_id: line.equipment_id,
                item_name,
                quantity: line.quantity,
                price_per_quantity: price,
                returned: false,
                returned_quantity: 0,
                damaged_quantity: 0,
                lost_quantity: 0,
                damage_notes: None,
            });
        }

        let status = if input.staff_created {
            TransactionStatus::Ongoing
        } else {
            TransactionStatus::Request
        };

        let txn = Transaction {
            id: Uuid::new_v4(),
            transaction_id: Transaction::display_id(now),
            student_id: user.id,
            student_name: user.full_name(),
            student_email: user.email.clone(),
            items,
            borrowed_date: now,
            due_date: input.due_date,
            status,
            total_price,
            fine_amount: Decimal::ZERO,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        let mut batch = WriteBatch::default();
        batch.insert_transactions.push(txn.clone());
        batch.update_equipment = ledger.into_updates();
        self.store.commit(batch).await?;
        Ok(txn)
    }

    async fn try_approve(&self, id: Uuid) -> AppResult<(Transaction, Vec<Notification>)> {
        let mut txn = self.required(id).await?;
        if txn.status != TransactionStatus::Request {
            return Err(AppError::InvalidState(format!(
                "Transaction {} is {}; only a Request can be approved",
                txn.transaction_id, txn.status
            )));
        }

        let now = Utc::now();
        txn.status = TransactionStatus::Ongoing;
        txn.borrowed_date = now;
        txn.updated_at = now;

        let notification = approval_notification(&txn, now);
        let mut batch = WriteBatch::default();
        batch.update_transactions.push(txn.clone());
        batch.insert_notifications.push(notification.clone());
        self.store.commit(batch).await?;
        Ok((txn, vec![notification]))
    }

    async fn try_deny(&self, id: Uuid) -> AppResult<(Transaction, Vec<Notification>)> {
        let txn = self.required(id).await?;
        if txn.status != TransactionStatus::Request {
            return Err(AppError::InvalidState(format!(
                "Transaction {} is {}; only a Request can be denied",
                txn.transaction_id, txn.status
            )));
        }

        let mut ledger = self.load_ledger_for(
            txn.items.iter().map(|item| item.equipment_id),
        )
        .await?;
        for item in &txn.items {
            ledger.release(item.equipment_id, item.outstanding_quantity())?;
        }

        let notification = denial_notification(&txn, Utc::now());
        let mut batch = WriteBatch::default();
        batch.delete_transactions.push((txn.id, txn.version));
        batch.update_equipment = ledger.into_updates();
        batch.insert_notifications.push(notification.clone());
        self.store.commit(batch).await?;
        Ok((txn, vec![notification]))
    }

    async fn try_complete(
        &self,
        id: Uuid,
        returns: &HashMap<Uuid, ItemReturn>,
    ) -> AppResult<(TransactionStatus, Vec<Notification>)> {
        let mut txn = self.required(id).await?;
        if txn.status == TransactionStatus::Request {
            return Err(AppError::InvalidState(format!(
                "Transaction {} is still a Request; approve or deny it first",
                txn.transaction_id
            )));
        }

        for item_id in returns.keys() {
            if !txn.items.iter().any(|item| item.id == *item_id) {
                return Err(AppError::NotFound(format!(
                    "Item {} is not part of transaction {}",
                    item_id, txn.transaction_id
                )));
            }
        }

        let mut ledger = self.load_ledger_for(
            txn.items.iter().map(|item| item.equipment_id),
        )
        .await?;

        let now = Utc::now();
        for item in &mut txn.items {
            let Some(entry) = returns.get(&item.id) else {
                continue;
            };
            if entry.quantity > item.quantity {
                return Err(AppError::InvalidReturnQuantity(format!(
                    "Item '{}': cannot return {} of {} borrowed",
                    item.item_name, entry.quantity, item.quantity
                )));
            }
            if entry.checked && entry.quantity == 0 {
                return Err(AppError::InvalidReturnQuantity(format!(
                    "Item '{}': checked in with zero quantity",
                    item.item_name
                )));
            }
            if entry.quantity < item.returned_quantity {
                return Err(AppError::InvalidReturnQuantity(format!(
                    "Item '{}': {} already returned, cannot lower to {}",
                    item.item_name, item.returned_quantity, entry.quantity
                )));
            }

            // Release exactly the units newly returned in this call
            let newly_returned = entry.quantity - item.returned_quantity;
            if newly_returned > 0 {
                ledger.release(item.equipment_id, newly_returned)?;
            }

            item.returned_quantity = entry.quantity;
            item.returned = entry.checked;
            if let Some(damaged) = entry.damaged_quantity {
                item.damaged_quantity = damaged;
            }
            if let Some(lost) = entry.lost_quantity {
                item.lost_quantity = lost;
            }
            if let Some(ref notes) = entry.damage_notes {
                item.damage_notes = Some(notes.clone());
            }
        }

        let days_late = days_overdue(txn.due_date, now);
        let fine_amount = calculate_fine(txn.due_date, now, self.fines.per_day_rate);
        let derived = derive_status(&txn.items, txn.due_date, txn.status, now);

        let mut batch = WriteBatch::default();
        batch.update_equipment = ledger.into_updates();
        let mut notifications = Vec::new();

        if derived.is_terminal() {
            // Archival and deletion of the live transaction share the commit
            batch.insert_records.push(Record {
                id: Uuid::new_v4(),
                transaction_id: txn.transaction_id.clone(),
                student_id: txn.student_id,
                student_name: txn.student_name.clone(),
                student_email: txn.student_email.clone(),
                items: txn.items.clone(),
                borrowed_date: txn.borrowed_date,
                due_date: txn.due_date,
                returned_date: now,
                completed_date: now,
                final_status: derived.as_str().to_string(),
                total_price: txn.total_price,
                fine_amount,
                archived_at: now,
            });

            if derived == TransactionStatus::CompleteOverdue && fine_amount > Decimal::ZERO {
                batch.insert_fines.push(Fine {
                    id: Uuid::new_v4(),
                    transaction_id: txn.transaction_id.clone(),
                    student_id: txn.student_id,
                    student_name: txn.student_name.clone(),
                    student_email: txn.student_email.clone(),
                    fine_type: "overdue".to_string(),
                    amount: fine_amount,
                    reason: format!("Equipment returned {} day(s) past the due date", days_late),
                    days_overdue: days_late,
                    status: FineStatus::Unpaid.as_str().to_string(),
                    created_at: now,
                });
            }

            let notification =
                return_receipt_notification(&txn, derived, fine_amount, days_late, now);
            batch.insert_notifications.push(notification.clone());
            notifications.push(notification);
            batch.delete_transactions.push((txn.id, txn.version));

            tracing::info!(
                "Archived transaction {} as {}",
                txn.transaction_id,
                derived
            );
        } else {
            txn.status = derived;
            txn.fine_amount = fine_amount;
            txn.updated_at = now;
            batch.update_transactions.push(txn.clone());
        }

        self.store.commit(batch).await?;
        Ok((derived, notifications))
    }

    async fn try_delete(&self, id: Uuid) -> AppResult<Transaction> {
        let txn = self.required(id).await?;

        let mut ledger = self.load_ledger_for(
            txn.items.iter().map(|item| item.equipment_id),
        )
        .await?;
        for item in &txn.items {
            let outstanding = item.outstanding_quantity();
            if outstanding > 0 {
                ledger.release(item.equipment_id, outstanding)?;
            }
        }

        let mut batch = WriteBatch::default();
        batch.delete_transactions.push((txn.id, txn.version));
        batch.update_equipment = ledger.into_updates();
        self.store.commit(batch).await?;
        Ok(txn)
    }

    // --- helpers ---

    async fn required(&self, id: Uuid) -> AppResult<Transaction> {
        self.store
            .get_transaction(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))
    }

    /// Batch-read every referenced equipment row once and wrap it in a ledger
    async fn load_ledger_for(
        &self,
        equipment_ids: impl Iterator<Item = i32>,
    ) -> AppResult<InventoryLedger> {
        let mut ids: Vec<i32> = equipment_ids.collect();
        ids.sort_unstable();
        ids.dedup();
        let batch = self.store.get_equipment_batch(&ids).await?;
        Ok(InventoryLedger::new(batch))
    }

    /// Fire-and-forget delivery of committed notifications
    async fn deliver(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            if let Err(e) = self.sink.deliver(&notification).await {
                tracing::warn!(
                    "Failed to deliver {} notification for {}: {}",
                    notification.notification_type,
                    notification.transaction_id,
                    e
                );
            }
        }
    }
}
