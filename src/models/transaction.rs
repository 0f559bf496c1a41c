//! Borrow transaction model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::TransactionStatus;

/// One equipment line inside a transaction
///
/// `quantity` is immutable after creation; `returned_quantity` only grows,
/// through return processing. Invariant: `returned_quantity <= quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowedItem {
    pub id: Uuid,
    pub equipment_id: i32,
    pub item_name: String,
    /// Units borrowed on this line
    pub quantity: i32,
    pub price_per_quantity: Decimal,
    /// Whether the borrower has checked this line in
    pub returned: bool,
    /// Units handed back so far (absolute, not an increment)
    pub returned_quantity: i32,
    pub damaged_quantity: i32,
    pub lost_quantity: i32,
    pub damage_notes: Option<String>,
}

impl BorrowedItem {
    /// Fully returned: checked in and every unit handed back
    pub fn is_fully_returned(&self) -> bool {
        self.returned && self.returned_quantity == self.quantity
    }

    /// Units still in the borrower's hands
    pub fn outstanding_quantity(&self) -> i32 {
        self.quantity - self.returned_quantity
    }
}

/// A live borrow transaction
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Stored primary key
    pub id: Uuid,
    /// Human-readable display identifier (`TXN-YYYYMMDD-######`); not unique
    /// under high creation rates, never used as a key
    pub transaction_id: String,
    pub student_id: i32,
    pub student_name: String,
    pub student_email: String,
    pub items: Vec<BorrowedItem>,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: TransactionStatus,
    /// Sum of `price_per_quantity * quantity` over items, fixed at creation
    pub total_price: Decimal,
    pub fine_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped on every committed write
    #[serde(skip)]
    pub version: i64,
}

impl Transaction {
    /// Build the display identifier from the creation instant
    pub fn display_id(created_at: DateTime<Utc>) -> String {
        format!(
            "TXN-{}-{:06}",
            created_at.format("%Y%m%d"),
            created_at.timestamp_millis().rem_euclid(1_000_000)
        )
    }
}

/// One requested equipment line in a create call
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BorrowLine {
    pub equipment_id: i32,
    pub quantity: i32,
}

/// Create transaction input
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTransaction {
    pub student_id: i32,
    pub items: Vec<BorrowLine>,
    pub due_date: DateTime<Utc>,
    /// Staff-created transactions start `Ongoing`; self-service ones start
    /// `Request` and wait for approval
    #[serde(default)]
    pub staff_created: bool,
}

/// Per-item return state supplied to return processing
///
/// `quantity` is the new absolute returned total for the line, not an
/// increment. Damage and loss fields annotate the line without touching
/// inventory counters.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ItemReturn {
    pub checked: bool,
    pub quantity: i32,
    pub damaged_quantity: Option<i32>,
    pub lost_quantity: Option<i32>,
    pub damage_notes: Option<String>,
}
