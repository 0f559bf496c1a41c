//! Pure domain logic: status derivation, fine calculation, inventory ledger

pub mod fine;
pub mod ledger;
pub mod status;

pub use fine::{calculate_fine, days_overdue};
pub use ledger::InventoryLedger;
pub use status::derive_status;
