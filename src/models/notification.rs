//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Structured notification record
///
/// Persisted in the same commit as the lifecycle change that triggered it;
/// delivery through the sink is fire-and-forget afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub user_id: i32,
    /// `approval`, `denial` or `return`
    pub notification_type: String,
    /// Display identifier of the related transaction
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
}
