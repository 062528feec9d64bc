// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Book, DomainError, MediaKind, Member, MemberStatus, MembershipDuration, MembershipNumber,
    SerialNumber, validate_book_fields, validate_loan_window, validate_member_eligible,
    validate_member_fields, validate_membership_number_unique, validate_serial_unique,
};
use time::macros::date;

fn create_test_book(serial: &str) -> Book {
    Book::new(
        SerialNumber::new(serial),
        String::from("Dune"),
        String::from("Frank Herbert"),
        Some(String::from("science fiction")),
        MediaKind::Book,
        2,
    )
}

fn create_test_member(membership_number: &str) -> Member {
    Member::new(
        MembershipNumber::new(membership_number),
        String::from("Grace Hopper"),
        String::from("grace@example.com"),
        date!(2026 - 01 - 01),
        MembershipDuration::SixMonths,
    )
    .unwrap()
}

#[test]
fn test_validate_book_fields_accepts_valid_book() {
    let book: Book = create_test_book("SN-001");
    assert!(validate_book_fields(&book).is_ok());
}

#[test]
fn test_validate_book_fields_rejects_empty_serial() {
    let book: Book = create_test_book("   ");
    let result: Result<(), DomainError> = validate_book_fields(&book);
    assert!(matches!(result, Err(DomainError::InvalidSerial(_))));
}

#[test]
fn test_validate_book_fields_rejects_empty_title() {
    let mut book: Book = create_test_book("SN-001");
    book.title = String::from("  ");
    let result: Result<(), DomainError> = validate_book_fields(&book);
    assert!(matches!(result, Err(DomainError::InvalidTitle(_))));
}

#[test]
fn test_validate_book_fields_rejects_empty_author() {
    let mut book: Book = create_test_book("SN-001");
    book.author = String::new();
    let result: Result<(), DomainError> = validate_book_fields(&book);
    assert!(matches!(result, Err(DomainError::InvalidAuthor(_))));
}

#[test]
fn test_validate_book_fields_rejects_zero_copies() {
    let mut book: Book = create_test_book("SN-001");
    book.copies = 0;
    book.available_copies = 0;
    let result: Result<(), DomainError> = validate_book_fields(&book);
    assert!(matches!(
        result,
        Err(DomainError::InvalidCopyCount { count: 0 })
    ));
}

#[test]
fn test_validate_book_fields_rejects_excess_availability() {
    let mut book: Book = create_test_book("SN-001");
    book.available_copies = 5;
    let result: Result<(), DomainError> = validate_book_fields(&book);
    assert!(matches!(
        result,
        Err(DomainError::InvalidAvailableCopies {
            available: 5,
            copies: 2
        })
    ));
}

#[test]
fn test_validate_serial_unique_accepts_new_serial() {
    let books: Vec<Book> = vec![create_test_book("SN-001")];
    let serial: SerialNumber = SerialNumber::new("SN-002");
    assert!(validate_serial_unique(&books, &serial).is_ok());
}

#[test]
fn test_validate_serial_unique_rejects_duplicate_case_insensitively() {
    let books: Vec<Book> = vec![create_test_book("SN-001")];
    let serial: SerialNumber = SerialNumber::new("sn-001");
    let result: Result<(), DomainError> = validate_serial_unique(&books, &serial);
    assert!(matches!(result, Err(DomainError::DuplicateSerial { .. })));
}

#[test]
fn test_validate_member_fields_accepts_valid_member() {
    let member: Member = create_test_member("LIB0001");
    assert!(validate_member_fields(&member).is_ok());
}

#[test]
fn test_validate_member_fields_rejects_empty_name() {
    let mut member: Member = create_test_member("LIB0001");
    member.name = String::from("  ");
    let result: Result<(), DomainError> = validate_member_fields(&member);
    assert!(matches!(result, Err(DomainError::InvalidName(_))));
}

#[test]
fn test_validate_member_fields_rejects_malformed_email() {
    let mut member: Member = create_test_member("LIB0001");
    member.email = String::from("not-an-email");
    let result: Result<(), DomainError> = validate_member_fields(&member);
    assert!(matches!(result, Err(DomainError::InvalidEmail(_))));

    member.email = String::from("@example.com");
    let result: Result<(), DomainError> = validate_member_fields(&member);
    assert!(matches!(result, Err(DomainError::InvalidEmail(_))));
}

#[test]
fn test_validate_membership_number_unique_rejects_duplicate() {
    let members: Vec<Member> = vec![create_test_member("LIB0001")];
    let number: MembershipNumber = MembershipNumber::new("LIB0001");
    let result: Result<(), DomainError> = validate_membership_number_unique(&members, &number);
    assert!(matches!(
        result,
        Err(DomainError::DuplicateMembershipNumber { .. })
    ));
}

#[test]
fn test_validate_membership_number_unique_accepts_fresh_number() {
    let members: Vec<Member> = vec![create_test_member("LIB0001")];
    let number: MembershipNumber = MembershipNumber::new("LIB0002");
    assert!(validate_membership_number_unique(&members, &number).is_ok());
}

#[test]
fn test_validate_loan_window_accepts_fifteen_days() {
    let result: Result<(), DomainError> = validate_loan_window(
        date!(2026 - 03 - 01),
        date!(2026 - 03 - 16),
        date!(2026 - 03 - 01),
    );
    assert!(result.is_ok());
}

#[test]
fn test_validate_loan_window_rejects_sixteen_days() {
    let result: Result<(), DomainError> = validate_loan_window(
        date!(2026 - 03 - 01),
        date!(2026 - 03 - 17),
        date!(2026 - 03 - 01),
    );
    assert!(matches!(
        result,
        Err(DomainError::LoanPeriodTooLong { days: 16, max: 15 })
    ));
}

#[test]
fn test_validate_loan_window_rejects_due_before_issue() {
    let result: Result<(), DomainError> = validate_loan_window(
        date!(2026 - 03 - 10),
        date!(2026 - 03 - 05),
        date!(2026 - 03 - 10),
    );
    assert!(matches!(
        result,
        Err(DomainError::DueDateBeforeIssueDate { .. })
    ));
}

#[test]
fn test_validate_loan_window_rejects_past_issue_date() {
    let result: Result<(), DomainError> = validate_loan_window(
        date!(2026 - 03 - 01),
        date!(2026 - 03 - 10),
        date!(2026 - 03 - 05),
    );
    assert!(matches!(result, Err(DomainError::IssueDateInPast { .. })));
}

#[test]
fn test_validate_member_eligible_accepts_active_member() {
    let member: Member = create_test_member("LIB0001");
    assert!(validate_member_eligible(&member).is_ok());
}

#[test]
fn test_validate_member_eligible_rejects_expired_member() {
    let mut member: Member = create_test_member("LIB0001");
    member.status = MemberStatus::Expired;
    let result: Result<(), DomainError> = validate_member_eligible(&member);
    assert!(matches!(
        result,
        Err(DomainError::MemberNotActive {
            status: MemberStatus::Expired,
            ..
        })
    ));
}

#[test]
fn test_validate_member_eligible_rejects_cancelled_member() {
    let mut member: Member = create_test_member("LIB0001");
    member.status = MemberStatus::Cancelled;
    let result: Result<(), DomainError> = validate_member_eligible(&member);
    assert!(matches!(
        result,
        Err(DomainError::MemberNotActive {
            status: MemberStatus::Cancelled,
            ..
        })
    ));
}
