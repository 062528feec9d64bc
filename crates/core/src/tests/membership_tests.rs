// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{TODAY, apply_ok, create_test_actor, create_test_cause, seeded_state};
use crate::{Command, CoreError, Settings, State, apply};
use libris_domain::{
    DomainError, Member, MemberStatus, MembershipDuration, MembershipNumber,
};
use time::macros::date;

fn register_command(membership_number: &str) -> Command {
    Command::RegisterMember {
        membership_number: MembershipNumber::new(membership_number),
        name: String::from("Grace Hopper"),
        email: String::from("grace@example.com"),
        start_date: date!(2026 - 02 - 01),
        duration: MembershipDuration::SixMonths,
    }
}

#[test]
fn test_register_member_is_active_with_computed_end_date() {
    let settings: Settings = Settings::default();
    let state: State = apply_ok(&State::new(), &settings, register_command("LIB0100"));

    assert_eq!(state.members.len(), 1);
    let member: &Member = &state.members[0];
    assert_eq!(member.status, MemberStatus::Active);
    assert_eq!(member.end_date, date!(2026 - 08 - 01));
}

#[test]
fn test_register_member_rejects_duplicate_number() {
    let settings: Settings = Settings::default();
    let state: State = seeded_state();

    let result = apply(
        &state,
        &settings,
        register_command("lib0001"),
        create_test_actor(),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::DuplicateMembershipNumber { .. }
        ))
    ));
}

#[test]
fn test_register_member_rejects_empty_name() {
    let settings: Settings = Settings::default();
    let result = apply(
        &State::new(),
        &settings,
        Command::RegisterMember {
            membership_number: MembershipNumber::new("LIB0100"),
            name: String::from("   "),
            email: String::from("grace@example.com"),
            start_date: date!(2026 - 02 - 01),
            duration: MembershipDuration::SixMonths,
        },
        create_test_actor(),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidName(_)))
    ));
}

#[test]
fn test_extend_membership_stacks_on_current_end_date() {
    let settings: Settings = Settings::default();
    // Seeded member runs 2026-01-01 through 2027-01-01.
    let state: State = seeded_state();

    let new_state: State = apply_ok(
        &state,
        &settings,
        Command::ExtendMembership {
            membership_number: MembershipNumber::new("LIB0001"),
            duration: MembershipDuration::SixMonths,
        },
    );

    let member: &Member = new_state
        .find_member(&MembershipNumber::new("LIB0001"))
        .unwrap();
    assert_eq!(member.end_date, date!(2027 - 07 - 01));
    assert_eq!(member.status, MemberStatus::Active);
}

#[test]
fn test_extend_membership_reactivates_expired_member() {
    let settings: Settings = Settings::default();
    let mut state: State = seeded_state();
    state.members[0].status = MemberStatus::Expired;

    let new_state: State = apply_ok(
        &state,
        &settings,
        Command::ExtendMembership {
            membership_number: MembershipNumber::new("LIB0001"),
            duration: MembershipDuration::OneYear,
        },
    );

    assert_eq!(new_state.members[0].status, MemberStatus::Active);
    assert_eq!(new_state.members[0].end_date, date!(2028 - 01 - 01));
}

#[test]
fn test_extend_cancelled_membership_is_refused() {
    let settings: Settings = Settings::default();
    let state: State = seeded_state();
    let state: State = apply_ok(
        &state,
        &settings,
        Command::CancelMembership {
            membership_number: MembershipNumber::new("LIB0001"),
        },
    );

    let result = apply(
        &state,
        &settings,
        Command::ExtendMembership {
            membership_number: MembershipNumber::new("LIB0001"),
            duration: MembershipDuration::OneYear,
        },
        create_test_actor(),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::MembershipAlreadyCancelled { .. }
        ))
    ));
}

#[test]
fn test_cancel_membership_is_terminal() {
    let settings: Settings = Settings::default();
    let state: State = seeded_state();
    let state: State = apply_ok(
        &state,
        &settings,
        Command::CancelMembership {
            membership_number: MembershipNumber::new("LIB0001"),
        },
    );
    assert_eq!(state.members[0].status, MemberStatus::Cancelled);

    let result = apply(
        &state,
        &settings,
        Command::CancelMembership {
            membership_number: MembershipNumber::new("LIB0001"),
        },
        create_test_actor(),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::MembershipAlreadyCancelled { .. }
        ))
    ));
}

#[test]
fn test_operations_on_unknown_member_are_refused() {
    let settings: Settings = Settings::default();
    let result = apply(
        &State::new(),
        &settings,
        Command::CancelMembership {
            membership_number: MembershipNumber::new("LIB9999"),
        },
        create_test_actor(),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::MemberNotFound { .. }))
    ));
}
