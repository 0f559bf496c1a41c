//! Inventory ledger over per-equipment quantity counters

use std::collections::HashMap;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::equipment::Equipment,
};

/// In-memory view of the equipment rows one lifecycle operation touches.
///
/// Built from a single batch read, mutated only through [`reserve`] and
/// [`release`], then drained into the commit batch. Counter mutation never
/// happens anywhere else, so the conservation invariant
/// (`available + borrowed == total`, both non-negative) is enforced centrally.
///
/// [`reserve`]: InventoryLedger::reserve
/// [`release`]: InventoryLedger::release
pub struct InventoryLedger {
    equipment: HashMap<i32, Equipment>,
    touched: Vec<i32>,
}

impl InventoryLedger {
    /// Build a ledger from a batch of equipment rows read inside the
    /// operation's read-compute-commit cycle.
    pub fn new(batch: Vec<Equipment>) -> Self {
        Self {
            equipment: batch.into_iter().map(|e| (e.id, e)).collect(),
            touched: Vec::new(),
        }
    }

    /// Look up an equipment row loaded into this ledger.
    pub fn get(&self, equipment_id: i32) -> AppResult<&Equipment> {
        self.equipment.get(&equipment_id).ok_or_else(|| {
            AppError::NotFound(format!("Equipment {} not found", equipment_id))
        })
    }

    /// Move `quantity` units from the shelf into a borrower's hands.
    pub fn reserve(&mut self, equipment_id: i32, quantity: i32) -> AppResult<()> {
        if quantity <= 0 {
            return Err(AppError::InvalidQuantity(format!(
                "Reserve quantity must be positive, got {}",
                quantity
            )));
        }

        let equipment = self.get_mut(equipment_id)?;
        if equipment.available_quantity < quantity {
            return Err(AppError::InsufficientInventory(format!(
                "Equipment '{}' has {} available, {} requested",
                equipment.name, equipment.available_quantity, quantity
            )));
        }

        equipment.available_quantity -= quantity;
        equipment.borrowed_quantity += quantity;
        self.mark_touched(equipment_id);
        Ok(())
    }

    /// Move `quantity` units from a borrower's hands back onto the shelf.
    pub fn release(&mut self, equipment_id: i32, quantity: i32) -> AppResult<()> {
        if quantity <= 0 {
            return Err(AppError::InvalidQuantity(format!(
                "Release quantity must be positive, got {}",
                quantity
            )));
        }

        let equipment = self.get_mut(equipment_id)?;
        if equipment.borrowed_quantity < quantity {
            return Err(AppError::InvalidQuantity(format!(
                "Equipment '{}' has {} borrowed, cannot release {}",
                equipment.name, equipment.borrowed_quantity, quantity
            )));
        }

        equipment.borrowed_quantity -= quantity;
        equipment.available_quantity += quantity;
        self.mark_touched(equipment_id);
        Ok(())
    }

    /// Drain the rows whose counters moved, stamped for the commit batch.
    pub fn into_updates(self) -> Vec<Equipment> {
        let now = Utc::now();
        let mut equipment = self.equipment;
        self.touched
            .into_iter()
            .filter_map(|id| equipment.remove(&id))
            .map(|mut e| {
                e.modif_date = Some(now);
                e
            })
            .collect()
    }

    fn get_mut(&mut self, equipment_id: i32) -> AppResult<&mut Equipment> {
        self.equipment.get_mut(&equipment_id).ok_or_else(|| {
            AppError::NotFound(format!("Equipment {} not found", equipment_id))
        })
    }

    fn mark_touched(&mut self, equipment_id: i32) {
        if !self.touched.contains(&equipment_id) {
            self.touched.push(equipment_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn microscope(available: i32, borrowed: i32) -> Equipment {
        Equipment {
            id: 1,
            name: "Microscope".to_string(),
            total_quantity: available + borrowed,
            available_quantity: available,
            borrowed_quantity: borrowed,
            price_per_unit: Decimal::from(500),
            condition: 1,
            status: 0,
            notes: None,
            crea_date: None,
            modif_date: None,
            version: 0,
        }
    }

    fn conservation_holds(e: &Equipment) -> bool {
        e.available_quantity >= 0
            && e.borrowed_quantity >= 0
            && e.available_quantity + e.borrowed_quantity == e.total_quantity
    }

    #[test]
    fn reserve_moves_units_to_borrowed() {
        let mut ledger = InventoryLedger::new(vec![microscope(3, 0)]);
        ledger.reserve(1, 3).unwrap();

        let updates = ledger.into_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].available_quantity, 0);
        assert_eq!(updates[0].borrowed_quantity, 3);
        assert!(conservation_holds(&updates[0]));
    }

    #[test]
    fn release_is_the_inverse_of_reserve() {
        let mut ledger = InventoryLedger::new(vec![microscope(0, 3)]);
        ledger.release(1, 3).unwrap();

        let updates = ledger.into_updates();
        assert_eq!(updates[0].available_quantity, 3);
        assert_eq!(updates[0].borrowed_quantity, 0);
        assert!(conservation_holds(&updates[0]));
    }

    #[test]
    fn reserve_refuses_to_overdraw() {
        let mut ledger = InventoryLedger::new(vec![microscope(2, 0)]);
        let err = ledger.reserve(1, 3).unwrap_err();
        assert!(matches!(err, AppError::InsufficientInventory(_)));
        // Nothing touched after the refusal
        assert!(ledger.into_updates().is_empty());
    }

    #[test]
    fn release_refuses_to_drive_borrowed_negative() {
        let mut ledger = InventoryLedger::new(vec![microscope(3, 1)]);
        let err = ledger.release(1, 2).unwrap_err();
        assert!(matches!(err, AppError::InvalidQuantity(_)));
    }

    #[test]
    fn zero_and_negative_quantities_are_rejected() {
        let mut ledger = InventoryLedger::new(vec![microscope(3, 1)]);
        assert!(matches!(
            ledger.reserve(1, 0).unwrap_err(),
            AppError::InvalidQuantity(_)
        ));
        assert!(matches!(
            ledger.release(1, -2).unwrap_err(),
            AppError::InvalidQuantity(_)
        ));
    }

    #[test]
    fn unknown_equipment_is_not_found() {
        let mut ledger = InventoryLedger::new(vec![microscope(3, 0)]);
        assert!(matches!(
            ledger.reserve(99, 1).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn untouched_rows_are_not_written_back() {
        let mut other = microscope(5, 0);
        other.id = 2;
        let mut ledger = InventoryLedger::new(vec![microscope(3, 0), other]);
        ledger.reserve(1, 1).unwrap();

        let updates = ledger.into_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, 1);
    }

    #[test]
    fn repeated_moves_accumulate_on_one_row() {
        let mut ledger = InventoryLedger::new(vec![microscope(5, 0)]);
        ledger.reserve(1, 2).unwrap();
        ledger.reserve(1, 1).unwrap();
        ledger.release(1, 1).unwrap();

        let updates = ledger.into_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].available_quantity, 3);
        assert_eq!(updates[0].borrowed_quantity, 2);
        assert!(conservation_holds(&updates[0]));
    }
}
