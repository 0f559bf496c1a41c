//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

// ---------------------------------------------------------------------------
// TransactionStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a borrow transaction
///
/// `Request` is a pre-lifecycle hold state: inventory is reserved but due-date
/// aging never applies until the request is approved. `Complete` and
/// `Complete and Overdue` are terminal; a transaction reaching them is archived
/// and removed from the live collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TransactionStatus {
    Request,
    Ongoing,
    Overdue,
    Incomplete,
    #[serde(rename = "Incomplete and Overdue")]
    IncompleteOverdue,
    Complete,
    #[serde(rename = "Complete and Overdue")]
    CompleteOverdue,
}

impl TransactionStatus {
    /// Canonical wire/display label
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Request => "Request",
            TransactionStatus::Ongoing => "Ongoing",
            TransactionStatus::Overdue => "Overdue",
            TransactionStatus::Incomplete => "Incomplete",
            TransactionStatus::IncompleteOverdue => "Incomplete and Overdue",
            TransactionStatus::Complete => "Complete",
            TransactionStatus::CompleteOverdue => "Complete and Overdue",
        }
    }

    /// Terminal statuses cause archival and removal of the live transaction
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Complete | TransactionStatus::CompleteOverdue
        )
    }

    /// Statuses the reconciliation sweep re-evaluates
    pub fn is_sweepable(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Ongoing
                | TransactionStatus::Overdue
                | TransactionStatus::Incomplete
                | TransactionStatus::IncompleteOverdue
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Request" => Ok(TransactionStatus::Request),
            "Ongoing" => Ok(TransactionStatus::Ongoing),
            "Overdue" => Ok(TransactionStatus::Overdue),
            "Incomplete" => Ok(TransactionStatus::Incomplete),
            "Incomplete and Overdue" => Ok(TransactionStatus::IncompleteOverdue),
            "Complete" => Ok(TransactionStatus::Complete),
            "Complete and Overdue" => Ok(TransactionStatus::CompleteOverdue),
            other => Err(AppError::Validation(format!(
                "Unknown transaction status '{}'",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// EquipmentCondition
// ---------------------------------------------------------------------------

/// Equipment condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum EquipmentCondition {
    New = 0,
    Good = 1,
    Fair = 2,
    Damaged = 3,
}

impl From<i16> for EquipmentCondition {
    fn from(v: i16) -> Self {
        match v {
            0 => EquipmentCondition::New,
            1 => EquipmentCondition::Good,
            2 => EquipmentCondition::Fair,
            3 => EquipmentCondition::Damaged,
            _ => EquipmentCondition::Good,
        }
    }
}

impl From<EquipmentCondition> for i16 {
    fn from(c: EquipmentCondition) -> Self {
        c as i16
    }
}

impl std::fmt::Display for EquipmentCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EquipmentCondition::New => "New",
            EquipmentCondition::Good => "Good",
            EquipmentCondition::Fair => "Fair",
            EquipmentCondition::Damaged => "Damaged",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

/// Equipment status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum EquipmentStatus {
    Active = 0,
    Maintenance = 1,
    Retired = 2,
}

impl From<i16> for EquipmentStatus {
    fn from(v: i16) -> Self {
        match v {
            0 => EquipmentStatus::Active,
            1 => EquipmentStatus::Maintenance,
            2 => EquipmentStatus::Retired,
            _ => EquipmentStatus::Active,
        }
    }
}

impl From<EquipmentStatus> for i16 {
    fn from(s: EquipmentStatus) -> Self {
        s as i16
    }
}

// ---------------------------------------------------------------------------
// FineStatus
// ---------------------------------------------------------------------------

/// Payment status of a levied fine
///
/// Fines are written as `Unpaid`; payment and waiver transitions belong to an
/// external payment workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FineStatus {
    Unpaid,
    Paid,
    Waived,
}

impl FineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FineStatus::Unpaid => "unpaid",
            FineStatus::Paid => "paid",
            FineStatus::Waived => "waived",
        }
    }
}

impl std::str::FromStr for FineStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(FineStatus::Unpaid),
            "paid" => Ok(FineStatus::Paid),
            "waived" => Ok(FineStatus::Waived),
            other => Err(AppError::Validation(format!(
                "Unknown fine status '{}'",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

/// Kind of notification emitted by a lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Approval,
    Denial,
    Return,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Approval => "approval",
            NotificationType::Denial => "denial",
            NotificationType::Return => "return",
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approval" => Ok(NotificationType::Approval),
            "denial" => Ok(NotificationType::Denial),
            "return" => Ok(NotificationType::Return),
            other => Err(AppError::Validation(format!(
                "Unknown notification type '{}'",
                other
            ))),
        }
    }
}
