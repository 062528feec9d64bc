// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{TODAY, apply_ok, create_test_actor, create_test_cause, issue_to_member, seeded_state};
use crate::{Command, CoreError, Settings, State, TransitionResult, apply};
use libris_domain::{Book, DomainError, MediaKind, SerialNumber};
use time::macros::date;

fn add_book_command(serial: &str, copies: u32) -> Command {
    Command::AddBook {
        serial: SerialNumber::new(serial),
        title: String::from("The Dispossessed"),
        author: String::from("Ursula K. Le Guin"),
        genre: None,
        kind: MediaKind::Book,
        copies,
    }
}

#[test]
fn test_add_book_appends_with_all_copies_available() {
    let settings: Settings = Settings::default();
    let result: TransitionResult = apply(
        &State::new(),
        &settings,
        add_book_command("SN-100", 3),
        create_test_actor(),
        create_test_cause(),
        TODAY,
    )
    .unwrap();

    assert_eq!(result.new_state.books.len(), 1);
    let book: &Book = &result.new_state.books[0];
    assert_eq!(book.serial.value(), "SN-100");
    assert_eq!(book.available_copies, 3);

    assert_eq!(result.audit_event.action.name, "AddBook");
    assert_eq!(result.audit_event.before.books, 0);
    assert_eq!(result.audit_event.after.books, 1);
}

#[test]
fn test_add_book_rejects_duplicate_serial_case_insensitively() {
    let settings: Settings = Settings::default();
    let state: State = seeded_state();

    let result = apply(
        &state,
        &settings,
        add_book_command("sn-001", 3),
        create_test_actor(),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::DuplicateSerial { .. }))
    ));
}

#[test]
fn test_add_book_rejects_zero_copies() {
    let settings: Settings = Settings::default();
    let result = apply(
        &State::new(),
        &settings,
        add_book_command("SN-100", 0),
        create_test_actor(),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidCopyCount {
            count: 0
        }))
    ));
}

#[test]
fn test_update_book_changes_only_provided_fields() {
    let settings: Settings = Settings::default();
    let state: State = seeded_state();

    let new_state: State = apply_ok(
        &state,
        &settings,
        Command::UpdateBook {
            serial: SerialNumber::new("SN-001"),
            title: Some(String::from("Dune Messiah")),
            author: None,
            genre: None,
            copies: None,
        },
    );

    let book: &Book = new_state.find_book(&SerialNumber::new("SN-001")).unwrap();
    assert_eq!(book.title, "Dune Messiah");
    assert_eq!(book.author, "Frank Herbert");
    assert_eq!(book.copies, 2);
}

#[test]
fn test_update_copies_preserves_checked_out_count() {
    let settings: Settings = Settings::default();
    let state: State = seeded_state();
    // One of two copies goes out, so one is checked out.
    let state: State = issue_to_member(&state, &settings, date!(2026 - 03 - 10));

    let new_state: State = apply_ok(
        &state,
        &settings,
        Command::UpdateBook {
            serial: SerialNumber::new("SN-001"),
            title: None,
            author: None,
            genre: None,
            copies: Some(5),
        },
    );

    let book: &Book = new_state.find_book(&SerialNumber::new("SN-001")).unwrap();
    assert_eq!(book.copies, 5);
    assert_eq!(book.available_copies, 4);
}

#[test]
fn test_update_copies_rejects_dropping_below_checked_out() {
    let settings: Settings = Settings::default();
    let state: State = seeded_state();
    let state: State = issue_to_member(&state, &settings, date!(2026 - 03 - 10));

    let result = apply(
        &state,
        &settings,
        Command::UpdateBook {
            serial: SerialNumber::new("SN-001"),
            title: None,
            author: None,
            genre: None,
            copies: Some(0),
        },
        create_test_actor(),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::CopiesBelowCheckedOut {
                requested: 0,
                checked_out: 1
            }
        ))
    ));
}

#[test]
fn test_update_unknown_serial_is_refused() {
    let settings: Settings = Settings::default();
    let result = apply(
        &State::new(),
        &settings,
        Command::UpdateBook {
            serial: SerialNumber::new("SN-404"),
            title: Some(String::from("Ghost")),
            author: None,
            genre: None,
            copies: None,
        },
        create_test_actor(),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::BookNotFound { .. }))
    ));
}
