// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, Settings, State, TransitionResult, apply};
use libris_audit::{Actor, Cause};
use libris_domain::{MediaKind, MembershipDuration, MembershipNumber, SerialNumber};
use time::{Date, macros::date};

pub const TODAY: Date = date!(2026 - 03 - 01);

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("admin"), String::from("admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

/// Applies a command that is expected to succeed and returns the new state.
pub fn apply_ok(state: &State, settings: &Settings, command: Command) -> State {
    let result: TransitionResult = apply(
        state,
        settings,
        command,
        create_test_actor(),
        create_test_cause(),
        TODAY,
    )
    .unwrap();
    result.new_state
}

/// A state holding one catalog item ("SN-001", two copies) and one active
/// member ("LIB0001").
pub fn seeded_state() -> State {
    let settings: Settings = Settings::default();
    let state: State = apply_ok(
        &State::new(),
        &settings,
        Command::AddBook {
            serial: SerialNumber::new("SN-001"),
            title: String::from("Dune"),
            author: String::from("Frank Herbert"),
            genre: Some(String::from("science fiction")),
            kind: MediaKind::Book,
            copies: 2,
        },
    );
    apply_ok(
        &state,
        &settings,
        Command::RegisterMember {
            membership_number: MembershipNumber::new("LIB0001"),
            name: String::from("Ada Lovelace"),
            email: String::from("ada@example.com"),
            start_date: date!(2026 - 01 - 01),
            duration: MembershipDuration::OneYear,
        },
    )
}

/// Issues one copy of "SN-001" to "LIB0001", due `due_date`. The first loan
/// issued against `seeded_state` receives id 1.
pub fn issue_to_member(state: &State, settings: &Settings, due_date: Date) -> State {
    apply_ok(
        state,
        settings,
        Command::IssueBook {
            serial: SerialNumber::new("SN-001"),
            membership_number: MembershipNumber::new("LIB0001"),
            issue_date: TODAY,
            due_date,
            remarks: None,
        },
    )
}
