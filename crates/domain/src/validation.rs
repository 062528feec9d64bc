// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{
    Book, MAX_LOAN_DAYS, Member, MemberStatus, MembershipNumber, SerialNumber,
};
use time::Date;

/// Validates the fields of a catalog item.
///
/// # Arguments
///
/// * `book` - The catalog item to validate
///
/// # Errors
///
/// Returns a `DomainError` if the serial, title, or author is empty, if the
/// copy count is zero, or if the available count exceeds the total.
pub fn validate_book_fields(book: &Book) -> Result<(), DomainError> {
    if book.serial.value().is_empty() {
        return Err(DomainError::InvalidSerial(String::from(
            "Serial number cannot be empty",
        )));
    }

    if book.title.trim().is_empty() {
        return Err(DomainError::InvalidTitle(String::from(
            "Title cannot be empty",
        )));
    }

    if book.author.trim().is_empty() {
        return Err(DomainError::InvalidAuthor(String::from(
            "Author cannot be empty",
        )));
    }

    if book.copies == 0 {
        return Err(DomainError::InvalidCopyCount { count: book.copies });
    }

    if book.available_copies > book.copies {
        return Err(DomainError::InvalidAvailableCopies {
            available: book.available_copies,
            copies: book.copies,
        });
    }

    Ok(())
}

/// Validates that a serial number is not already present in the catalog.
///
/// # Arguments
///
/// * `books` - The existing catalog items
/// * `serial` - The serial number to check
///
/// # Errors
///
/// Returns `DomainError::DuplicateSerial` if any existing item carries the
/// serial number.
pub fn validate_serial_unique(books: &[Book], serial: &SerialNumber) -> Result<(), DomainError> {
    if books.iter().any(|b| b.serial == *serial) {
        return Err(DomainError::DuplicateSerial {
            serial: serial.clone(),
        });
    }

    Ok(())
}

/// Validates the fields of a member.
///
/// # Arguments
///
/// * `member` - The member to validate
///
/// # Errors
///
/// Returns a `DomainError` if the name is empty or the email is not
/// plausibly an email address.
pub fn validate_member_fields(member: &Member) -> Result<(), DomainError> {
    if member.name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }

    let email: &str = member.email.trim();
    if email.is_empty() {
        return Err(DomainError::InvalidEmail(String::from(
            "Email cannot be empty",
        )));
    }

    // Deliberately shallow: anything with text around an '@' passes.
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(DomainError::InvalidEmail(format!(
            "'{email}' is not a valid email address"
        )));
    }

    Ok(())
}

/// Validates that a membership number is not already registered.
///
/// # Arguments
///
/// * `members` - The existing members
/// * `membership_number` - The membership number to check
///
/// # Errors
///
/// Returns `DomainError::DuplicateMembershipNumber` if any existing member
/// carries the number.
pub fn validate_membership_number_unique(
    members: &[Member],
    membership_number: &MembershipNumber,
) -> Result<(), DomainError> {
    if members
        .iter()
        .any(|m| m.membership_number == *membership_number)
    {
        return Err(DomainError::DuplicateMembershipNumber {
            membership_number: membership_number.clone(),
        });
    }

    Ok(())
}

/// Validates a requested loan window against the issue rules.
///
/// The due date must not precede the issue date, the window must not exceed
/// [`MAX_LOAN_DAYS`], and the issue date must not be in the past.
///
/// # Arguments
///
/// * `issue_date` - The requested issue date
/// * `due_date` - The requested due date
/// * `today` - The current date
///
/// # Errors
///
/// Returns a `DomainError` describing the first rule the window breaks.
pub fn validate_loan_window(
    issue_date: Date,
    due_date: Date,
    today: Date,
) -> Result<(), DomainError> {
    if due_date < issue_date {
        return Err(DomainError::DueDateBeforeIssueDate {
            issue_date,
            due_date,
        });
    }

    let days: i64 = (due_date - issue_date).whole_days();
    if days > MAX_LOAN_DAYS {
        return Err(DomainError::LoanPeriodTooLong {
            days,
            max: MAX_LOAN_DAYS,
        });
    }

    if issue_date < today {
        return Err(DomainError::IssueDateInPast { issue_date, today });
    }

    Ok(())
}

/// Validates that a member is eligible to borrow.
///
/// Only members whose stored status is `Active` may borrow. Expired and
/// cancelled memberships are refused regardless of their end date.
///
/// # Arguments
///
/// * `member` - The member to check
///
/// # Errors
///
/// Returns `DomainError::MemberNotActive` if the member's status is not
/// `Active`.
pub fn validate_member_eligible(member: &Member) -> Result<(), DomainError> {
    if member.status != MemberStatus::Active {
        return Err(DomainError::MemberNotActive {
            membership_number: member.membership_number.value().to_string(),
            status: member.status,
        });
    }

    Ok(())
}
