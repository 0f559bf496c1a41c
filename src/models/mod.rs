//! Data models for Labtrack

pub mod enums;
pub mod equipment;
pub mod fine;
pub mod notification;
pub mod record;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use enums::{EquipmentCondition, EquipmentStatus, FineStatus, NotificationType, TransactionStatus};
pub use equipment::Equipment;
pub use fine::Fine;
pub use notification::Notification;
pub use record::Record;
pub use transaction::{BorrowedItem, Transaction};
pub use user::User;
