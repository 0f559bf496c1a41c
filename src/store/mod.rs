//! Storage port for persisted collections
//!
//! Services depend on the [`Store`] trait rather than a concrete database
//! handle. Reads return rows stamped with the version observed; all writes of
//! a lifecycle operation travel together in a [`WriteBatch`] that either
//! commits fully or not at all.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        enums::TransactionStatus,
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        fine::Fine,
        notification::Notification,
        record::Record,
        transaction::Transaction,
        user::User,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// All writes of one atomic lifecycle commit.
///
/// Updated and deleted rows carry the version observed when they were read;
/// the store applies them compare-and-swap style and rejects the whole batch
/// with a conflict if any version moved underneath, so no partial write can
/// ever land.
#[derive(Debug, Default)]
pub struct WriteBatch {
    pub insert_transactions: Vec<Transaction>,
    pub update_transactions: Vec<Transaction>,
    /// Transaction id plus the version observed at read time
    pub delete_transactions: Vec<(Uuid, i64)>,
    pub update_equipment: Vec<Equipment>,
    pub insert_records: Vec<Record>,
    pub insert_fines: Vec<Fine>,
    pub insert_notifications: Vec<Notification>,
}

impl WriteBatch {
    pub fn is_empty(&self) -> bool {
        self.insert_transactions.is_empty()
            && self.update_transactions.is_empty()
            && self.delete_transactions.is_empty()
            && self.update_equipment.is_empty()
            && self.insert_records.is_empty()
            && self.insert_fines.is_empty()
            && self.insert_notifications.is_empty()
    }
}

/// Port over the persisted collections
#[async_trait]
pub trait Store: Send + Sync {
    // --- equipment ---

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>>;

    async fn get_equipment(&self, id: i32) -> AppResult<Option<Equipment>>;

    /// Batch-read every referenced equipment row in one round trip
    async fn get_equipment_batch(&self, ids: &[i32]) -> AppResult<Vec<Equipment>>;

    async fn insert_equipment(&self, data: &CreateEquipment) -> AppResult<Equipment>;

    /// Update descriptive fields only; quantity counters move exclusively
    /// through lifecycle commits
    async fn update_equipment_details(
        &self,
        id: i32,
        data: &UpdateEquipment,
    ) -> AppResult<Equipment>;

    async fn delete_equipment(&self, id: i32) -> AppResult<()>;

    // --- users ---

    async fn get_user(&self, id: i32) -> AppResult<Option<User>>;

    // --- transactions ---

    async fn get_transaction(&self, id: Uuid) -> AppResult<Option<Transaction>>;

    /// List live transactions, optionally filtered by status
    async fn list_transactions(
        &self,
        status: Option<TransactionStatus>,
    ) -> AppResult<Vec<Transaction>>;

    async fn list_transactions_by_student(&self, student_id: i32)
        -> AppResult<Vec<Transaction>>;

    /// Live transactions the reconciliation sweep re-evaluates
    async fn list_sweepable_transactions(&self) -> AppResult<Vec<Transaction>>;

    // --- archive ---

    async fn list_records(&self) -> AppResult<Vec<Record>>;

    async fn list_fines(&self) -> AppResult<Vec<Fine>>;

    async fn list_notifications(&self) -> AppResult<Vec<Notification>>;

    // --- atomic commit ---

    /// Apply every write in the batch atomically, or none of them.
    ///
    /// Returns `AppError::Conflict` when any guarded row's version no longer
    /// matches; callers retry their full read-compute-commit cycle.
    async fn commit(&self, batch: WriteBatch) -> AppResult<()>;
}
