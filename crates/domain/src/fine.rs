// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Date;

/// The outcome of assessing a returned loan against its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineAssessment {
    /// Whole days past the due date. Zero for an on-time return.
    pub days_overdue: u32,
    /// The fine owed in whole currency units. Zero for an on-time return.
    pub amount: u32,
}

impl FineAssessment {
    /// Returns true when the return incurred a fine.
    #[must_use]
    pub const fn is_fined(&self) -> bool {
        self.amount > 0
    }
}

/// Assesses the fine for a loan returned on `return_date` against `due_date`.
///
/// The fine is `days_overdue * daily_rate`. A return on or before the due
/// date owes nothing; a return the day after the due date owes one day.
///
/// # Arguments
///
/// * `due_date` - The loan's due date
/// * `return_date` - The date the item came back
/// * `daily_rate` - The fine per overdue day, in whole currency units
#[must_use]
pub fn assess_fine(due_date: Date, return_date: Date, daily_rate: u32) -> FineAssessment {
    let days_overdue: u32 = days_overdue(due_date, return_date);
    FineAssessment {
        days_overdue,
        amount: days_overdue.saturating_mul(daily_rate),
    }
}

/// Whole days between the due date and a later date, clamped at zero.
#[must_use]
pub fn days_overdue(due_date: Date, as_of: Date) -> u32 {
    let days: i64 = (as_of - due_date).whole_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_on_time_return_owes_nothing() {
        let assessment: FineAssessment =
            assess_fine(date!(2026 - 03 - 15), date!(2026 - 03 - 15), 10);
        assert_eq!(assessment.days_overdue, 0);
        assert_eq!(assessment.amount, 0);
        assert!(!assessment.is_fined());
    }

    #[test]
    fn test_early_return_owes_nothing() {
        let assessment: FineAssessment =
            assess_fine(date!(2026 - 03 - 15), date!(2026 - 03 - 10), 10);
        assert_eq!(assessment.days_overdue, 0);
        assert_eq!(assessment.amount, 0);
    }

    #[test]
    fn test_one_day_late_owes_one_rate() {
        let assessment: FineAssessment =
            assess_fine(date!(2026 - 03 - 15), date!(2026 - 03 - 16), 10);
        assert_eq!(assessment.days_overdue, 1);
        assert_eq!(assessment.amount, 10);
        assert!(assessment.is_fined());
    }

    #[test]
    fn test_fine_scales_with_days_and_rate() {
        let assessment: FineAssessment =
            assess_fine(date!(2026 - 03 - 15), date!(2026 - 03 - 22), 25);
        assert_eq!(assessment.days_overdue, 7);
        assert_eq!(assessment.amount, 175);
    }

    #[test]
    fn test_days_overdue_clamps_at_zero() {
        assert_eq!(days_overdue(date!(2026 - 03 - 15), date!(2026 - 01 - 01)), 0);
    }
}
