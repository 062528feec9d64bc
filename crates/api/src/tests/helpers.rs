// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AuthenticatedActor, Role};
use libris::{Command, Settings, State, apply};
use libris_audit::{Actor, Cause};
use libris_domain::{MediaKind, MembershipDuration, MembershipNumber, SerialNumber};
use time::{Date, macros::date};

pub const TODAY: Date = date!(2026 - 03 - 01);

pub fn admin_actor() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("librarian"), Role::Admin, None)
}

pub fn member_actor(membership_number: &str) -> AuthenticatedActor {
    AuthenticatedActor::new(
        format!("member-{membership_number}"),
        Role::Member,
        Some(MembershipNumber::new(membership_number)),
    )
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Test request"))
}

fn apply_ok(state: &State, command: Command) -> State {
    apply(
        state,
        &Settings::default(),
        command,
        Actor::new(String::from("seed"), String::from("admin")),
        Cause::new(String::from("seed"), String::from("Seed data")),
        TODAY,
    )
    .unwrap()
    .new_state
}

/// One catalog item ("SN-001", two copies) and two members ("LIB0001",
/// "LIB0002"), seeded through the core directly so membership numbers are
/// deterministic.
pub fn seeded_state() -> State {
    let state: State = apply_ok(
        &State::new(),
        Command::AddBook {
            serial: SerialNumber::new("SN-001"),
            title: String::from("Dune"),
            author: String::from("Frank Herbert"),
            genre: Some(String::from("science fiction")),
            kind: MediaKind::Book,
            copies: 2,
        },
    );
    let state: State = apply_ok(
        &state,
        Command::RegisterMember {
            membership_number: MembershipNumber::new("LIB0001"),
            name: String::from("Ada Lovelace"),
            email: String::from("ada@example.com"),
            start_date: date!(2026 - 01 - 01),
            duration: MembershipDuration::OneYear,
        },
    );
    apply_ok(
        &state,
        Command::RegisterMember {
            membership_number: MembershipNumber::new("LIB0002"),
            name: String::from("Grace Hopper"),
            email: String::from("grace@example.com"),
            start_date: date!(2026 - 01 - 01),
            duration: MembershipDuration::OneYear,
        },
    )
}

/// Seeds a loan for "SN-001" / "LIB0001", due `due_date`, as loan id 1.
pub fn state_with_loan(due_date: Date) -> State {
    apply_ok(
        &seeded_state(),
        Command::IssueBook {
            serial: SerialNumber::new("SN-001"),
            membership_number: MembershipNumber::new("LIB0001"),
            issue_date: TODAY,
            due_date,
            remarks: None,
        },
    )
}
