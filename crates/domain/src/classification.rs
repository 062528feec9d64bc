// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{Loan, LoanStatus};
use time::Date;

/// How far ahead of the due date a loan counts as due soon, in days.
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

/// The effective standing of a loan as seen on a given day.
///
/// Overdue is never stored. A loan record only knows whether it is issued
/// or returned; anything past its due date is classified as overdue at
/// read time, so the answer is always current without a background sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanClassification {
    /// Open and not yet past its due date.
    Issued,
    /// Open and past its due date.
    Overdue,
    /// Closed.
    Returned,
}

impl LoanClassification {
    /// Returns the lowercase string form of the classification.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Overdue => "overdue",
            Self::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies a loan as of `today`.
///
/// A loan due today is still `Issued`; it becomes `Overdue` the day after
/// its due date.
#[must_use]
pub fn classify_loan(loan: &Loan, today: Date) -> LoanClassification {
    match loan.status {
        LoanStatus::Returned => LoanClassification::Returned,
        LoanStatus::Issued => {
            if today > loan.due_date {
                LoanClassification::Overdue
            } else {
                LoanClassification::Issued
            }
        }
    }
}

/// Returns true when `due_date` falls within the due-soon window: today
/// through three days from today, inclusive.
#[must_use]
pub fn is_due_soon(due_date: Date, today: Date) -> bool {
    let days_until_due: i64 = (due_date - today).whole_days();
    (0..=DUE_SOON_WINDOW_DAYS).contains(&days_until_due)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MembershipNumber, SerialNumber};
    use time::macros::date;

    fn open_loan(due_date: Date) -> Loan {
        Loan::new(
            1,
            SerialNumber::new("SN-100"),
            MembershipNumber::new("LIB0001"),
            date!(2026 - 03 - 01),
            due_date,
            None,
        )
    }

    #[test]
    fn test_open_loan_before_due_date_is_issued() {
        let loan: Loan = open_loan(date!(2026 - 03 - 10));
        assert_eq!(
            classify_loan(&loan, date!(2026 - 03 - 05)),
            LoanClassification::Issued
        );
    }

    #[test]
    fn test_open_loan_on_due_date_is_still_issued() {
        let loan: Loan = open_loan(date!(2026 - 03 - 10));
        assert_eq!(
            classify_loan(&loan, date!(2026 - 03 - 10)),
            LoanClassification::Issued
        );
    }

    #[test]
    fn test_open_loan_past_due_date_is_overdue() {
        let loan: Loan = open_loan(date!(2026 - 03 - 10));
        assert_eq!(
            classify_loan(&loan, date!(2026 - 03 - 11)),
            LoanClassification::Overdue
        );
    }

    #[test]
    fn test_returned_loan_is_never_overdue() {
        let mut loan: Loan = open_loan(date!(2026 - 03 - 10));
        loan.status = LoanStatus::Returned;
        loan.return_date = Some(date!(2026 - 03 - 20));
        assert_eq!(
            classify_loan(&loan, date!(2026 - 03 - 25)),
            LoanClassification::Returned
        );
    }

    #[test]
    fn test_due_soon_window_boundaries() {
        let due: Date = date!(2026 - 03 - 10);
        assert!(is_due_soon(due, date!(2026 - 03 - 10)));
        assert!(is_due_soon(due, date!(2026 - 03 - 07)));
        assert!(!is_due_soon(due, date!(2026 - 03 - 06)));
        // Past the due date the loan is overdue, not due soon.
        assert!(!is_due_soon(due, date!(2026 - 03 - 11)));
    }
}
