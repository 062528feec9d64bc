// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// The longest permitted loan window, in days, from issue date to due date.
pub const MAX_LOAN_DAYS: i64 = 15;

/// Represents a catalog item's serial number.
///
/// Serial numbers are the sole identifier for a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerialNumber {
    /// The serial number value.
    value: String,
}

impl SerialNumber {
    /// Creates a new `SerialNumber`.
    ///
    /// Serial numbers are normalized to uppercase to ensure case-insensitive
    /// uniqueness.
    ///
    /// # Arguments
    ///
    /// * `value` - The serial number value (will be normalized to uppercase)
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.trim().to_uppercase(),
        }
    }

    /// Returns the serial number value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Represents a member's membership number.
///
/// Membership numbers are generated at registration time and are the sole
/// identifier for a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipNumber {
    /// The membership number value (e.g., "LIB0042").
    value: String,
}

impl MembershipNumber {
    /// Creates a new `MembershipNumber`.
    ///
    /// # Arguments
    ///
    /// * `value` - The membership number value (will be normalized to uppercase)
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.trim().to_uppercase(),
        }
    }

    /// Returns the membership number value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for MembershipNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Represents the kind of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A printed book.
    #[default]
    Book,
    /// A movie (DVD or similar).
    Movie,
}

impl MediaKind {
    /// Converts this media kind to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Movie => "movie",
        }
    }
}

impl FromStr for MediaKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(Self::Book),
            "movie" => Ok(Self::Movie),
            _ => Err(DomainError::InvalidMediaKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a catalog item: a book or movie the library owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// The serial number (unique within the catalog).
    pub serial: SerialNumber,
    /// The title.
    pub title: String,
    /// The author (or director for movies).
    pub author: String,
    /// Optional genre classification.
    pub genre: Option<String>,
    /// The kind of item (book or movie).
    pub kind: MediaKind,
    /// Total copies owned by the library.
    pub copies: u32,
    /// Copies currently on the shelf.
    ///
    /// Invariant: `0 <= available_copies <= copies`. Availability moves by
    /// exactly one on issue and return, and only through the guarded
    /// `take_copy` / `restore_copy` methods.
    pub available_copies: u32,
}

impl Book {
    /// Creates a new `Book` with all copies available.
    ///
    /// # Arguments
    ///
    /// * `serial` - The serial number
    /// * `title` - The title
    /// * `author` - The author
    /// * `genre` - Optional genre
    /// * `kind` - The media kind
    /// * `copies` - Total copies owned
    #[must_use]
    pub const fn new(
        serial: SerialNumber,
        title: String,
        author: String,
        genre: Option<String>,
        kind: MediaKind,
        copies: u32,
    ) -> Self {
        Self {
            serial,
            title,
            author,
            genre,
            kind,
            copies,
            available_copies: copies,
        }
    }

    /// Returns whether at least one copy is on the shelf.
    #[must_use]
    pub const fn has_available_copy(&self) -> bool {
        self.available_copies > 0
    }

    /// Removes one copy from the shelf for an issue.
    ///
    /// This is a defensive guard, not an error path: if no copy is
    /// available the call silently does nothing and returns `false`.
    /// Callers that need a hard failure must check availability first.
    pub const fn take_copy(&mut self) -> bool {
        if self.available_copies == 0 {
            return false;
        }
        self.available_copies -= 1;
        true
    }

    /// Restores one copy to the shelf after a return.
    ///
    /// Silently does nothing and returns `false` if availability is already
    /// at the total copy count.
    pub const fn restore_copy(&mut self) -> bool {
        if self.available_copies >= self.copies {
            return false;
        }
        self.available_copies += 1;
        true
    }
}

/// Represents a membership duration choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MembershipDuration {
    /// Six calendar months.
    #[default]
    SixMonths,
    /// One calendar year.
    OneYear,
    /// Two calendar years.
    TwoYears,
}

impl MembershipDuration {
    /// Returns the number of calendar months this duration spans.
    #[must_use]
    pub const fn months(&self) -> u32 {
        match self {
            Self::SixMonths => 6,
            Self::OneYear => 12,
            Self::TwoYears => 24,
        }
    }

    /// Converts this duration to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SixMonths => "6months",
            Self::OneYear => "1year",
            Self::TwoYears => "2years",
        }
    }
}

impl FromStr for MembershipDuration {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "6months" => Ok(Self::SixMonths),
            "1year" => Ok(Self::OneYear),
            "2years" => Ok(Self::TwoYears),
            _ => Err(DomainError::InvalidDuration(s.to_string())),
        }
    }
}

impl std::fmt::Display for MembershipDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a member's account status.
///
/// Status transitions are explicit update actions. No background process
/// recomputes status from the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Membership is in good standing.
    #[default]
    Active,
    /// Membership lapsed past its end date.
    Expired,
    /// Membership was cancelled by an explicit action.
    Cancelled,
}

impl MemberStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidMemberStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a library member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The membership number (unique, generated at registration).
    pub membership_number: MembershipNumber,
    /// The member's name (informational, not unique).
    pub name: String,
    /// The member's email address.
    pub email: String,
    /// The date the membership began.
    pub start_date: Date,
    /// The duration chosen at registration (or last extension).
    pub duration: MembershipDuration,
    /// The date the membership ends.
    ///
    /// Invariant: fully determined by `start_date` and `duration` at
    /// creation time (and recomputed only by an explicit extension). It is
    /// never re-derived on read.
    pub end_date: Date,
    /// The account status.
    pub status: MemberStatus,
}

impl Member {
    /// Creates a new active `Member`, computing the end date from the start
    /// date and duration.
    ///
    /// # Arguments
    ///
    /// * `membership_number` - The generated membership number
    /// * `name` - The member's name
    /// * `email` - The member's email address
    /// * `start_date` - The membership start date
    /// * `duration` - The membership duration
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DateArithmeticOverflow` if the end date cannot
    /// be represented.
    pub fn new(
        membership_number: MembershipNumber,
        name: String,
        email: String,
        start_date: Date,
        duration: MembershipDuration,
    ) -> Result<Self, DomainError> {
        let end_date: Date = crate::dates::compute_end_date(start_date, duration)?;
        Ok(Self {
            membership_number,
            name,
            email,
            start_date,
            duration,
            end_date,
            status: MemberStatus::Active,
        })
    }
}

/// Represents the stored status of a loan.
///
/// Only `Issued` and `Returned` are ever stored. Overdue-ness is a read-time
/// classification computed from the due date, never a persisted state. See
/// [`crate::classify_loan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// The item is out with a member.
    #[default]
    Issued,
    /// The item has been returned. Terminal.
    Returned,
}

impl LoanStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a borrow/return transaction for one copy of a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// The loan identifier, assigned by the transaction engine at creation.
    pub loan_id: i64,
    /// The serial number of the borrowed item.
    pub serial: SerialNumber,
    /// The membership number of the borrower.
    pub membership_number: MembershipNumber,
    /// The date the item was issued.
    pub issue_date: Date,
    /// The date the item is due back. At most [`MAX_LOAN_DAYS`] after issue.
    pub due_date: Date,
    /// The date the item came back, once returned.
    pub return_date: Option<Date>,
    /// The stored status. `Returned` is terminal.
    pub status: LoanStatus,
    /// The fine assessed at return time, in whole currency units.
    ///
    /// Invariant: set exactly once, by the return operation, from the daily
    /// rate configured at that moment. Later rate changes never alter it.
    /// An on-time return leaves this `None`; "no fine" is represented as
    /// absence, not as a stored zero.
    pub fine: Option<u32>,
    /// Whether the fine has been paid. Set only by the fine-payment action,
    /// and `None` whenever `fine` is.
    pub fine_paid: Option<bool>,
    /// Free-form remarks captured at issue time.
    pub remarks: Option<String>,
}

impl Loan {
    /// Creates a new issued `Loan` with no fine.
    ///
    /// # Arguments
    ///
    /// * `loan_id` - The loan identifier
    /// * `serial` - The serial number of the borrowed item
    /// * `membership_number` - The borrower's membership number
    /// * `issue_date` - The issue date
    /// * `due_date` - The due date
    /// * `remarks` - Optional free-form remarks
    #[must_use]
    pub const fn new(
        loan_id: i64,
        serial: SerialNumber,
        membership_number: MembershipNumber,
        issue_date: Date,
        due_date: Date,
        remarks: Option<String>,
    ) -> Self {
        Self {
            loan_id,
            serial,
            membership_number,
            issue_date,
            due_date,
            return_date: None,
            status: LoanStatus::Issued,
            fine: None,
            fine_paid: None,
            remarks,
        }
    }

    /// Returns whether this loan is still open (not yet returned).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.status, LoanStatus::Issued)
    }
}
