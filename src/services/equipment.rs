//! Equipment management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::equipment::{CreateEquipment, Equipment, UpdateEquipment},
    store::Store,
};

#[derive(Clone)]
pub struct EquipmentService {
    store: Arc<dyn Store>,
}

impl EquipmentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// List all equipment
    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.store.list_equipment().await
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        self.store
            .get_equipment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Register new equipment; all units start on the shelf
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.store.insert_equipment(data).await
    }

    /// Update descriptive fields; quantity counters never move through here
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.store.update_equipment_details(id, data).await
    }

    /// Delete equipment, refused while any unit is in a borrower's hands
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let equipment = self.get_by_id(id).await?;
        if equipment.borrowed_quantity > 0 {
            return Err(AppError::InvalidState(format!(
                "Equipment '{}' has {} unit(s) on loan",
                equipment.name, equipment.borrowed_quantity
            )));
        }
        self.store.delete_equipment(id).await
    }
}
