//! Equipment model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Equipment record
///
/// `available_quantity + borrowed_quantity == total_quantity` holds at rest;
/// the counters only move through the inventory ledger, never through the
/// update endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    /// Equipment name / description
    pub name: String,
    /// Units owned in total
    pub total_quantity: i32,
    /// Units currently on the shelf
    pub available_quantity: i32,
    /// Units currently in borrowers' hands
    pub borrowed_quantity: i32,
    /// Replacement price per unit
    pub price_per_unit: Decimal,
    /// Condition (0=new, 1=good, 2=fair, 3=damaged)
    pub condition: i16,
    /// Status (0=active, 1=maintenance, 2=retired)
    pub status: i16,
    pub notes: Option<String>,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
    /// Optimistic concurrency counter, bumped on every committed write
    #[serde(skip)]
    pub version: i64,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0))]
    pub total_quantity: i32,
    pub price_per_unit: Decimal,
    /// Condition (0=new, 1=good, 2=fair, 3=damaged)
    pub condition: Option<i16>,
    pub notes: Option<String>,
}

/// Update equipment request
///
/// Quantity counters are deliberately absent: they move only through the
/// lifecycle operations.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub price_per_unit: Option<Decimal>,
    pub condition: Option<i16>,
    pub status: Option<i16>,
    pub notes: Option<String>,
}
