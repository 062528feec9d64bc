// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod classification;
mod dates;
mod error;
mod fine;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use classification::{DUE_SOON_WINDOW_DAYS, LoanClassification, classify_loan, is_due_soon};
pub use dates::{compute_end_date, parse_iso_date};
pub use error::DomainError;
pub use fine::{FineAssessment, assess_fine, days_overdue};
pub use types::{
    Book, Loan, LoanStatus, MAX_LOAN_DAYS, MediaKind, Member, MemberStatus, MembershipDuration,
    MembershipNumber, SerialNumber,
};
pub use validation::{
    validate_book_fields, validate_loan_window, validate_member_eligible, validate_member_fields,
    validate_membership_number_unique, validate_serial_unique,
};
