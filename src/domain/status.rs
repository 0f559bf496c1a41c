//! Status derivation for borrow transactions

use chrono::{DateTime, Utc};

use crate::models::{enums::TransactionStatus, transaction::BorrowedItem};

/// Derive a transaction's status from its items' return state, the due date
/// and the current status.
///
/// Rules, in priority order:
/// 1. A `Request` stays a `Request`: requests never auto-age.
/// 2. All items fully returned -> `Complete` (`and Overdue` past due).
/// 3. Any item partially or at all returned -> `Incomplete` (`and Overdue`
///    past due).
/// 4. Otherwise -> `Ongoing`, or `Overdue` past due.
///
/// Pure and deterministic; no side effects.
pub fn derive_status(
    items: &[BorrowedItem],
    due_date: DateTime<Utc>,
    current_status: TransactionStatus,
    now: DateTime<Utc>,
) -> TransactionStatus {
    if current_status == TransactionStatus::Request {
        return TransactionStatus::Request;
    }

    let is_overdue = now > due_date;
    let all_returned = items.iter().all(|i| i.is_fully_returned());
    let any_returned = items.iter().any(|i| i.returned_quantity > 0);

    if all_returned {
        if is_overdue {
            TransactionStatus::CompleteOverdue
        } else {
            TransactionStatus::Complete
        }
    } else if any_returned {
        if is_overdue {
            TransactionStatus::IncompleteOverdue
        } else {
            TransactionStatus::Incomplete
        }
    } else if is_overdue {
        TransactionStatus::Overdue
    } else {
        TransactionStatus::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn item(quantity: i32, returned_quantity: i32, returned: bool) -> BorrowedItem {
        BorrowedItem {
            id: Uuid::new_v4(),
            equipment_id: 1,
            item_name: "Oscilloscope".to_string(),
            quantity,
            price_per_quantity: Decimal::from(100),
            returned,
            returned_quantity,
            damaged_quantity: 0,
            lost_quantity: 0,
            damage_notes: None,
        }
    }

    #[test]
    fn request_never_auto_ages() {
        let now = Utc::now();
        let due = now - Duration::days(30);
        let items = vec![item(3, 3, true)];

        let status = derive_status(&items, due, TransactionStatus::Request, now);
        assert_eq!(status, TransactionStatus::Request);
    }

    #[test]
    fn all_returned_before_due_is_complete() {
        let now = Utc::now();
        let due = now + Duration::days(1);
        let items = vec![item(3, 3, true), item(2, 2, true)];

        let status = derive_status(&items, due, TransactionStatus::Ongoing, now);
        assert_eq!(status, TransactionStatus::Complete);
    }

    #[test]
    fn all_returned_after_due_is_complete_and_overdue() {
        let now = Utc::now();
        let due = now - Duration::hours(1);
        let items = vec![item(3, 3, true)];

        let status = derive_status(&items, due, TransactionStatus::Overdue, now);
        assert_eq!(status, TransactionStatus::CompleteOverdue);
    }

    #[test]
    fn partial_return_is_incomplete() {
        let now = Utc::now();
        let due = now + Duration::days(1);
        let items = vec![item(5, 2, false)];

        let status = derive_status(&items, due, TransactionStatus::Ongoing, now);
        assert_eq!(status, TransactionStatus::Incomplete);
    }

    #[test]
    fn partial_return_past_due_is_incomplete_and_overdue() {
        let now = Utc::now();
        let due = now - Duration::days(2);
        let items = vec![item(5, 2, false), item(1, 0, false)];

        let status = derive_status(&items, due, TransactionStatus::Incomplete, now);
        assert_eq!(status, TransactionStatus::IncompleteOverdue);
    }

    #[test]
    fn one_line_fully_returned_still_incomplete_overall() {
        let now = Utc::now();
        let due = now + Duration::days(1);
        let items = vec![item(2, 2, true), item(3, 0, false)];

        let status = derive_status(&items, due, TransactionStatus::Ongoing, now);
        assert_eq!(status, TransactionStatus::Incomplete);
    }

    #[test]
    fn nothing_returned_ages_to_overdue() {
        let now = Utc::now();
        let due = now - Duration::milliseconds(1);
        let items = vec![item(3, 0, false)];

        let status = derive_status(&items, due, TransactionStatus::Ongoing, now);
        assert_eq!(status, TransactionStatus::Overdue);
    }

    #[test]
    fn nothing_returned_before_due_stays_ongoing() {
        let now = Utc::now();
        let items = vec![item(3, 0, false)];

        let status = derive_status(&items, now, TransactionStatus::Ongoing, now);
        assert_eq!(status, TransactionStatus::Ongoing);
    }

    #[test]
    fn returned_flag_without_full_quantity_is_not_complete() {
        let now = Utc::now();
        let due = now + Duration::days(1);
        // Checked in but a unit is missing
        let items = vec![item(3, 2, true)];

        let status = derive_status(&items, due, TransactionStatus::Ongoing, now);
        assert_eq!(status, TransactionStatus::Incomplete);
    }
}
