// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{MemberStatus, MembershipNumber, SerialNumber};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Serial number is empty or invalid.
    InvalidSerial(String),
    /// Title is empty or invalid.
    InvalidTitle(String),
    /// Author is empty or invalid.
    InvalidAuthor(String),
    /// Copy count is invalid.
    InvalidCopyCount {
        /// The invalid count value.
        count: u32,
    },
    /// Available-copy count exceeds total copies.
    InvalidAvailableCopies {
        /// The available count.
        available: u32,
        /// The total copy count.
        copies: u32,
    },
    /// Total copies cannot drop below the number currently checked out.
    CopiesBelowCheckedOut {
        /// The requested total copy count.
        requested: u32,
        /// The number of copies currently out with members.
        checked_out: u32,
    },
    /// Member name is empty or invalid.
    InvalidName(String),
    /// Member email is empty or invalid.
    InvalidEmail(String),
    /// Membership duration string is not recognized.
    InvalidDuration(String),
    /// Member status string is not recognized.
    InvalidMemberStatus(String),
    /// Media kind string is not recognized.
    InvalidMediaKind(String),
    /// A catalog item with this serial number already exists.
    DuplicateSerial {
        /// The duplicate serial number.
        serial: SerialNumber,
    },
    /// A member with this membership number already exists.
    DuplicateMembershipNumber {
        /// The duplicate membership number.
        membership_number: MembershipNumber,
    },
    /// Catalog item does not exist.
    BookNotFound {
        /// The serial number.
        serial: String,
    },
    /// Member does not exist.
    MemberNotFound {
        /// The membership number.
        membership_number: String,
    },
    /// Loan does not exist.
    LoanNotFound {
        /// The loan identifier.
        loan_id: i64,
    },
    /// Member is not eligible to borrow.
    MemberNotActive {
        /// The membership number.
        membership_number: String,
        /// The member's actual status.
        status: MemberStatus,
    },
    /// No copy of the item is on the shelf.
    NoCopiesAvailable {
        /// The serial number.
        serial: String,
    },
    /// The loan window exceeds the permitted maximum.
    LoanPeriodTooLong {
        /// The requested window in days.
        days: i64,
        /// The maximum permitted window in days.
        max: i64,
    },
    /// The due date precedes the issue date.
    DueDateBeforeIssueDate {
        /// The issue date.
        issue_date: time::Date,
        /// The due date.
        due_date: time::Date,
    },
    /// The issue date is in the past.
    IssueDateInPast {
        /// The requested issue date.
        issue_date: time::Date,
        /// The current date.
        today: time::Date,
    },
    /// The loan has already been returned.
    LoanAlreadyReturned {
        /// The loan identifier.
        loan_id: i64,
    },
    /// The loan carries no fine to pay.
    NoFineDue {
        /// The loan identifier.
        loan_id: i64,
    },
    /// The loan's fine has already been paid.
    FineAlreadyPaid {
        /// The loan identifier.
        loan_id: i64,
    },
    /// The payment confirmation checkbox was not ticked.
    PaymentNotConfirmed,
    /// The membership has already been cancelled.
    MembershipAlreadyCancelled {
        /// The membership number.
        membership_number: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSerial(msg) => write!(f, "Invalid serial number: {msg}"),
            Self::InvalidTitle(msg) => write!(f, "Invalid title: {msg}"),
            Self::InvalidAuthor(msg) => write!(f, "Invalid author: {msg}"),
            Self::InvalidCopyCount { count } => {
                write!(f, "Invalid copy count: {count}. Must be at least 1")
            }
            Self::InvalidAvailableCopies { available, copies } => {
                write!(
                    f,
                    "Available copies ({available}) cannot exceed total copies ({copies})"
                )
            }
            Self::CopiesBelowCheckedOut {
                requested,
                checked_out,
            } => {
                write!(
                    f,
                    "Cannot set copies to {requested}: {checked_out} copies are checked out"
                )
            }
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidDuration(value) => {
                write!(
                    f,
                    "Invalid membership duration: '{value}'. Must be '6months', '1year', or '2years'"
                )
            }
            Self::InvalidMemberStatus(value) => {
                write!(
                    f,
                    "Invalid member status: '{value}'. Must be 'active', 'expired', or 'cancelled'"
                )
            }
            Self::InvalidMediaKind(value) => {
                write!(
                    f,
                    "Invalid media kind: '{value}'. Must be 'book' or 'movie'"
                )
            }
            Self::DuplicateSerial { serial } => {
                write!(
                    f,
                    "A catalog item with serial number '{}' already exists",
                    serial.value()
                )
            }
            Self::DuplicateMembershipNumber { membership_number } => {
                write!(
                    f,
                    "A member with membership number '{}' already exists",
                    membership_number.value()
                )
            }
            Self::BookNotFound { serial } => {
                write!(f, "Catalog item with serial number '{serial}' not found")
            }
            Self::MemberNotFound { membership_number } => {
                write!(
                    f,
                    "Member with membership number '{membership_number}' not found"
                )
            }
            Self::LoanNotFound { loan_id } => write!(f, "Loan {loan_id} not found"),
            Self::MemberNotActive {
                membership_number,
                status,
            } => {
                write!(
                    f,
                    "Member '{membership_number}' cannot borrow: membership is {status}"
                )
            }
            Self::NoCopiesAvailable { serial } => {
                write!(f, "No copies of '{serial}' are available for issue")
            }
            Self::LoanPeriodTooLong { days, max } => {
                write!(
                    f,
                    "Loan period of {days} days exceeds the maximum of {max} days"
                )
            }
            Self::DueDateBeforeIssueDate {
                issue_date,
                due_date,
            } => {
                write!(
                    f,
                    "Due date {due_date} is before the issue date {issue_date}"
                )
            }
            Self::IssueDateInPast { issue_date, today } => {
                write!(
                    f,
                    "Issue date {issue_date} is in the past (today is {today})"
                )
            }
            Self::LoanAlreadyReturned { loan_id } => {
                write!(f, "Loan {loan_id} has already been returned")
            }
            Self::NoFineDue { loan_id } => {
                write!(f, "Loan {loan_id} has no outstanding fine")
            }
            Self::FineAlreadyPaid { loan_id } => {
                write!(f, "The fine for loan {loan_id} has already been paid")
            }
            Self::PaymentNotConfirmed => {
                write!(f, "Fine payment requires explicit confirmation")
            }
            Self::MembershipAlreadyCancelled { membership_number } => {
                write!(
                    f,
                    "Membership '{membership_number}' has already been cancelled"
                )
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
