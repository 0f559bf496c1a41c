//! In-memory store used by the test suite and local demos

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentCondition, EquipmentStatus, TransactionStatus},
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        fine::Fine,
        notification::Notification,
        record::Record,
        transaction::Transaction,
        user::User,
    },
};

use super::{Store, WriteBatch};

#[derive(Default)]
struct Collections {
    equipment: HashMap<i32, Equipment>,
    next_equipment_id: i32,
    users: HashMap<i32, User>,
    transactions: HashMap<Uuid, Transaction>,
    records: Vec<Record>,
    fines: Vec<Fine>,
    notifications: Vec<Notification>,
}

/// Store keeping every collection behind one mutex, which makes the commit
/// batch trivially atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a borrower (the memory store has no account management)
    pub fn seed_user(&self, user: User) {
        let mut inner = self.inner.lock().unwrap();
        inner.users.insert(user.id, user);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner.equipment.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_equipment(&self, id: i32) -> AppResult<Option<Equipment>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.equipment.get(&id).cloned())
    }

    async fn get_equipment_batch(&self, ids: &[i32]) -> AppResult<Vec<Equipment>> {
        let inner = self.inner.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| inner.equipment.get(id).cloned())
            .collect())
    }

    async fn insert_equipment(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_equipment_id += 1;
        let equipment = Equipment {
            id: inner.next_equipment_id,
            name: data.name.clone(),
            total_quantity: data.total_quantity,
            available_quantity: data.total_quantity,
            borrowed_quantity: 0,
            price_per_unit: data.price_per_unit,
            condition: data.condition.unwrap_or(EquipmentCondition::Good.into()),
            status: EquipmentStatus::Active.into(),
            notes: data.notes.clone(),
            crea_date: Some(Utc::now()),
            modif_date: None,
            version: 0,
        };
        inner.equipment.insert(equipment.id, equipment.clone());
        Ok(equipment)
    }

    async fn update_equipment_details(
        &self,
        id: i32,
        data: &UpdateEquipment,
    ) -> AppResult<Equipment> {
        let mut inner = self.inner.lock().unwrap();
        let equipment = inner
            .equipment
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;

        if let Some(ref name) = data.name {
            equipment.name = name.clone();
        }
        if let Some(price) = data.price_per_unit {
            equipment.price_per_unit = price;
        }
        if let Some(condition) = data.condition {
            equipment.condition = condition;
        }
        if let Some(status) = data.status {
            equipment.status = status;
        }
        if let Some(ref notes) = data.notes {
            equipment.notes = Some(notes.clone());
        }
        equipment.modif_date = Some(Utc::now());
        equipment.version += 1;
        Ok(equipment.clone())
    }

    async fn delete_equipment(&self, id: i32) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .equipment
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    async fn get_user(&self, id: i32) -> AppResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).cloned())
    }

    async fn get_transaction(&self, id: Uuid) -> AppResult<Option<Transaction>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.transactions.get(&id).cloned())
    }

    async fn list_transactions(
        &self,
        status: Option<TransactionStatus>,
    ) -> AppResult<Vec<Transaction>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .transactions
            .values()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.created_at);
        Ok(rows)
    }

    async fn list_transactions_by_student(
        &self,
        student_id: i32,
    ) -> AppResult<Vec<Transaction>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .transactions
            .values()
            .filter(|t| t.student_id == student_id)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.created_at);
        Ok(rows)
    }

    async fn list_sweepable_transactions(&self) -> AppResult<Vec<Transaction>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .transactions
            .values()
            .filter(|t| t.status.is_sweepable())
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.created_at);
        Ok(rows)
    }

    async fn list_records(&self) -> AppResult<Vec<Record>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.records.clone())
    }

    async fn list_fines(&self) -> AppResult<Vec<Fine>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.fines.clone())
    }

    async fn list_notifications(&self) -> AppResult<Vec<Notification>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.notifications.clone())
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();

        // Validate every version guard before applying anything
        for txn in &batch.update_transactions {
            match inner.transactions.get(&txn.id) {
                Some(stored) if stored.version == txn.version => {}
                _ => {
                    return Err(AppError::Conflict(format!(
                        "Transaction {} changed concurrently",
                        txn.id
                    )))
                }
            }
        }
        for (id, version) in &batch.delete_transactions {
            match inner.transactions.get(id) {
                Some(stored) if stored.version == *version => {}
                _ => {
                    return Err(AppError::Conflict(format!(
                        "Transaction {} changed concurrently",
                        id
                    )))
                }
            }
        }
        for equipment in &batch.update_equipment {
            match inner.equipment.get(&equipment.id) {
                Some(stored) if stored.version == equipment.version => {}
                _ => {
                    return Err(AppError::Conflict(format!(
                        "Equipment {} changed concurrently",
                        equipment.id
                    )))
                }
            }
        }

        // Apply; the single lock makes the whole batch atomic
        for txn in batch.insert_transactions {
            inner.transactions.insert(txn.id, txn);
        }
        for mut txn in batch.update_transactions {
            txn.version += 1;
            inner.transactions.insert(txn.id, txn);
        }
        for (id, _) in batch.delete_transactions {
            inner.transactions.remove(&id);
        }
        for mut equipment in batch.update_equipment {
            equipment.version += 1;
            inner.equipment.insert(equipment.id, equipment);
        }
        inner.records.extend(batch.insert_records);
        inner.fines.extend(batch.insert_fines);
        inner.notifications.extend(batch.insert_notifications);

        Ok(())
    }
}
