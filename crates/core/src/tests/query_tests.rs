// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{apply_ok, issue_to_member, seeded_state};
use crate::{
    Command, LoanFilter, Settings, State, available_books, filter_loans, loans_for_member,
};
use libris_domain::{Loan, MediaKind, MembershipNumber, SerialNumber};
use std::str::FromStr;
use time::{Date, macros::date};

/// Three loans: id 1 due 2026-03-05 (open), id 2 due 2026-03-20 (open),
/// id 3 returned.
fn state_with_mixed_loans() -> State {
    let settings: Settings = Settings::default();
    let state: State = seeded_state();
    let state: State = apply_ok(
        &state,
        &settings,
        Command::AddBook {
            serial: SerialNumber::new("SN-002"),
            title: String::from("Solaris"),
            author: String::from("Stanislaw Lem"),
            genre: None,
            kind: MediaKind::Book,
            copies: 1,
        },
    );
    let state: State = issue_to_member(&state, &settings, date!(2026 - 03 - 05));
    let state: State = issue_to_member(&state, &settings, date!(2026 - 03 - 20));
    let state: State = apply_ok(
        &state,
        &settings,
        Command::IssueBook {
            serial: SerialNumber::new("SN-002"),
            membership_number: MembershipNumber::new("LIB0001"),
            issue_date: date!(2026 - 03 - 01),
            due_date: date!(2026 - 03 - 08),
            remarks: None,
        },
    );
    apply_ok(
        &state,
        &settings,
        Command::ReturnBook {
            loan_id: 3,
            return_date: date!(2026 - 03 - 06),
        },
    )
}

#[test]
fn test_filter_all_returns_every_loan() {
    let state: State = state_with_mixed_loans();
    let loans: Vec<&Loan> = filter_loans(&state, LoanFilter::All, date!(2026 - 03 - 10));
    assert_eq!(loans.len(), 3);
}

#[test]
fn test_filter_open_excludes_returned() {
    let state: State = state_with_mixed_loans();
    let loans: Vec<&Loan> = filter_loans(&state, LoanFilter::Open, date!(2026 - 03 - 10));
    let ids: Vec<i64> = loans.iter().map(|l| l.loan_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_filter_overdue_is_evaluated_against_query_date() {
    let state: State = state_with_mixed_loans();

    // On 2026-03-10 only loan 1 (due 03-05) is past due.
    let overdue: Vec<&Loan> = filter_loans(&state, LoanFilter::Overdue, date!(2026 - 03 - 10));
    let ids: Vec<i64> = overdue.iter().map(|l| l.loan_id).collect();
    assert_eq!(ids, vec![1]);

    // A week earlier nothing is overdue; later both open loans are.
    assert!(filter_loans(&state, LoanFilter::Overdue, date!(2026 - 03 - 03)).is_empty());
    let later: Vec<&Loan> = filter_loans(&state, LoanFilter::Overdue, date!(2026 - 03 - 25));
    assert_eq!(later.len(), 2);
}

#[test]
fn test_filter_returned_only_sees_closed_loans() {
    let state: State = state_with_mixed_loans();
    let loans: Vec<&Loan> = filter_loans(&state, LoanFilter::Returned, date!(2026 - 03 - 10));
    let ids: Vec<i64> = loans.iter().map(|l| l.loan_id).collect();
    assert_eq!(ids, vec![3]);
}

#[test]
fn test_loans_for_member_includes_open_and_closed() {
    let state: State = state_with_mixed_loans();
    let loans: Vec<&Loan> = loans_for_member(&state, &MembershipNumber::new("LIB0001"));
    assert_eq!(loans.len(), 3);

    let none: Vec<&Loan> = loans_for_member(&state, &MembershipNumber::new("LIB9999"));
    assert!(none.is_empty());
}

#[test]
fn test_available_books_excludes_fully_checked_out() {
    let state: State = state_with_mixed_loans();
    // SN-001 has 0 of 2 left (both out); SN-002's single copy came back.
    let available = available_books(&state);
    let serials: Vec<&str> = available.iter().map(|b| b.serial.value()).collect();
    assert_eq!(serials, vec!["SN-002"]);
}

#[test]
fn test_loan_filter_from_str() {
    assert_eq!(LoanFilter::from_str("all").unwrap(), LoanFilter::All);
    assert_eq!(LoanFilter::from_str("open").unwrap(), LoanFilter::Open);
    assert_eq!(LoanFilter::from_str("issued").unwrap(), LoanFilter::Open);
    assert_eq!(LoanFilter::from_str("overdue").unwrap(), LoanFilter::Overdue);
    assert_eq!(
        LoanFilter::from_str("returned").unwrap(),
        LoanFilter::Returned
    );
    assert!(LoanFilter::from_str("lost").is_err());
}

#[test]
fn test_query_date_is_explicit_not_ambient() {
    let state: State = state_with_mixed_loans();
    let day_one: Date = date!(2026 - 03 - 04);
    let day_two: Date = date!(2026 - 03 - 06);

    // Same state, different query dates, different answers.
    assert!(filter_loans(&state, LoanFilter::Overdue, day_one).is_empty());
    assert_eq!(filter_loans(&state, LoanFilter::Overdue, day_two).len(), 1);
}
