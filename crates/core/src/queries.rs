// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::state::State;
use libris_domain::{Book, Loan, LoanClassification, MembershipNumber, classify_loan};
use std::str::FromStr;
use time::Date;

/// A read-time filter over the loan list.
///
/// Overdue is a classification, not a stored status, so the overdue filter
/// is evaluated against the due dates as of the query date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoanFilter {
    /// Every loan, open or closed.
    #[default]
    All,
    /// Open loans, whether or not they are past due.
    Open,
    /// Open loans past their due date as of the query date.
    Overdue,
    /// Closed loans.
    Returned,
}

impl FromStr for LoanFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "open" | "issued" => Ok(Self::Open),
            "overdue" => Ok(Self::Overdue),
            "returned" => Ok(Self::Returned),
            _ => Err(format!(
                "Unknown loan filter '{s}'. Must be 'all', 'open', 'overdue', or 'returned'"
            )),
        }
    }
}

/// Returns the loans matching a filter as of `today`, in loan-id order.
#[must_use]
pub fn filter_loans(state: &State, filter: LoanFilter, today: Date) -> Vec<&Loan> {
    state
        .loans
        .iter()
        .filter(|loan| match filter {
            LoanFilter::All => true,
            LoanFilter::Open => loan.is_open(),
            LoanFilter::Overdue => classify_loan(loan, today) == LoanClassification::Overdue,
            LoanFilter::Returned => !loan.is_open(),
        })
        .collect()
}

/// Returns every loan belonging to a member, open and closed, in loan-id
/// order.
#[must_use]
pub fn loans_for_member<'a>(
    state: &'a State,
    membership_number: &MembershipNumber,
) -> Vec<&'a Loan> {
    state
        .loans
        .iter()
        .filter(|loan| loan.membership_number == *membership_number)
        .collect()
}

/// Returns the catalog items with at least one copy on the shelf.
#[must_use]
pub fn available_books(state: &State) -> Vec<&Book> {
    state
        .books
        .iter()
        .filter(|book| book.has_available_copy())
        .collect()
}
