//! Archived borrow record model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::transaction::BorrowedItem;

/// Immutable archive of a completed transaction
///
/// Written once when a transaction reaches a terminal status, in the same
/// commit that deletes the live transaction. Never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Record {
    pub id: Uuid,
    /// Display identifier of the source transaction
    pub transaction_id: String,
    pub student_id: i32,
    pub student_name: String,
    pub student_email: String,
    pub items: Vec<BorrowedItem>,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: DateTime<Utc>,
    pub completed_date: DateTime<Utc>,
    /// `Complete` or `Complete and Overdue`
    pub final_status: String,
    pub total_price: Decimal,
    pub fine_amount: Decimal,
    pub archived_at: DateTime<Utc>,
}
