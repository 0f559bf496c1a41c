//! Overdue fine calculation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

const MS_PER_DAY: i64 = 86_400_000;

/// Whole days the reference date lies past the due date, rounded up.
///
/// Any started day counts as a full day: one millisecond past the due date is
/// one day overdue. This ceiling is a hard contract, not an approximation.
pub fn days_overdue(due_date: DateTime<Utc>, reference_date: DateTime<Utc>) -> i64 {
    if reference_date <= due_date {
        return 0;
    }
    let elapsed_ms = (reference_date - due_date).num_milliseconds();
    (elapsed_ms + MS_PER_DAY - 1) / MS_PER_DAY
}

/// Fine owed at `reference_date` for a transaction due at `due_date`.
pub fn calculate_fine(
    due_date: DateTime<Utc>,
    reference_date: DateTime<Utc>,
    per_day_rate: Decimal,
) -> Decimal {
    Decimal::from(days_overdue(due_date, reference_date)) * per_day_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rate() -> Decimal {
        Decimal::from(10)
    }

    #[test]
    fn no_fine_before_due_date() {
        let due = Utc::now();
        let reference = due - Duration::days(3);
        assert_eq!(calculate_fine(due, reference, rate()), Decimal::ZERO);
    }

    #[test]
    fn no_fine_exactly_at_due_date() {
        let due = Utc::now();
        assert_eq!(calculate_fine(due, due, rate()), Decimal::ZERO);
        assert_eq!(days_overdue(due, due), 0);
    }

    #[test]
    fn one_millisecond_late_counts_as_a_full_day() {
        let due = Utc::now();
        let reference = due + Duration::milliseconds(1);
        assert_eq!(days_overdue(due, reference), 1);
        assert_eq!(calculate_fine(due, reference, rate()), rate());
    }

    #[test]
    fn twenty_five_hours_late_counts_as_two_days() {
        let due = Utc::now();
        let reference = due + Duration::hours(25);
        assert_eq!(days_overdue(due, reference), 2);
        assert_eq!(calculate_fine(due, reference, rate()), Decimal::from(20));
    }

    #[test]
    fn exactly_one_day_late_is_one_day() {
        let due = Utc::now();
        let reference = due + Duration::days(1);
        assert_eq!(days_overdue(due, reference), 1);
    }

    #[test]
    fn fine_scales_with_rate() {
        let due = Utc::now();
        let reference = due + Duration::days(4);
        let per_day = Decimal::new(250, 2); // 2.50
        assert_eq!(
            calculate_fine(due, reference, per_day),
            Decimal::from(4) * per_day
        );
    }
}
