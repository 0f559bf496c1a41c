//! Overdue fine model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A fine levied when an overdue transaction is completed
///
/// Created only alongside archival; payment transitions happen in an external
/// workflow and are out of scope here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Fine {
    pub id: Uuid,
    /// Display identifier of the source transaction
    pub transaction_id: String,
    pub student_id: i32,
    pub student_name: String,
    pub student_email: String,
    pub fine_type: String,
    pub amount: Decimal,
    pub reason: String,
    pub days_overdue: i64,
    /// `unpaid` until an external payment workflow says otherwise
    pub status: String,
    pub created_at: DateTime<Utc>,
}
