// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{TODAY, admin_actor, create_test_cause, member_actor, state_with_loan};
use crate::{
    AddBookRequest, ApiError, AuthError, AuthorizationService, IssueBookRequest,
    RegisterMemberRequest, Role, add_book, authenticate_stub, issue_book, list_loans,
    register_member,
};
use libris::{Settings, State};
use time::macros::date;

#[test]
fn test_authenticate_stub_rejects_empty_actor_id() {
    let result = authenticate_stub(String::new(), Role::Admin, None);
    assert!(matches!(
        result,
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_authenticate_stub_requires_membership_for_members() {
    let result = authenticate_stub(String::from("someone"), Role::Member, None);
    assert!(matches!(
        result,
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_member_cannot_manage_catalog() {
    let settings: Settings = Settings::default();
    let result = add_book(
        &State::new(),
        &settings,
        AddBookRequest {
            serial: String::from("SN-100"),
            title: String::from("Dune"),
            author: String::from("Frank Herbert"),
            genre: None,
            kind: String::from("book"),
            copies: 1,
        },
        &member_actor("LIB0001"),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(
        result,
        Err(ApiError::Unauthorized { ref required_role, .. }) if required_role == "Admin"
    ));
}

#[test]
fn test_member_cannot_register_members() {
    let settings: Settings = Settings::default();
    let result = register_member(
        &State::new(),
        &settings,
        RegisterMemberRequest {
            name: String::from("Eve"),
            email: String::from("eve@example.com"),
            start_date: String::from("2026-03-01"),
            duration: String::from("1year"),
        },
        &member_actor("LIB0001"),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_member_cannot_issue_books() {
    let settings: Settings = Settings::default();
    let result = issue_book(
        &State::new(),
        &settings,
        IssueBookRequest {
            serial: String::from("SN-001"),
            membership_number: String::from("LIB0001"),
            issue_date: String::from("2026-03-01"),
            due_date: String::from("2026-03-10"),
            remarks: None,
        },
        &member_actor("LIB0001"),
        create_test_cause(),
        TODAY,
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_audit_timeline_is_admin_only() {
    assert!(AuthorizationService::authorize_audit_timeline(&admin_actor()).is_ok());
    assert!(matches!(
        AuthorizationService::authorize_audit_timeline(&member_actor("LIB0001")),
        Err(AuthError::Unauthorized { ref action, .. }) if action == "audit_timeline"
    ));
}

#[test]
fn test_list_loans_scopes_members_to_their_own() {
    let state: State = state_with_loan(date!(2026 - 03 - 10));

    let admin_view = list_loans(&state, &admin_actor(), None, TODAY).unwrap();
    assert_eq!(admin_view.len(), 1);

    let own_view = list_loans(&state, &member_actor("LIB0001"), None, TODAY).unwrap();
    assert_eq!(own_view.len(), 1);
    assert_eq!(own_view[0].membership_number, "LIB0001");

    let other_view = list_loans(&state, &member_actor("LIB0002"), None, TODAY).unwrap();
    assert!(other_view.is_empty());
}

#[test]
fn test_list_loans_rejects_unknown_filter() {
    let state: State = State::new();
    let result = list_loans(&state, &admin_actor(), Some("lost"), TODAY);

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "filter"
    ));
}

#[test]
fn test_loan_view_classifies_as_of_query_date() {
    let state: State = state_with_loan(date!(2026 - 03 - 05));

    let open = list_loans(&state, &admin_actor(), None, date!(2026 - 03 - 04)).unwrap();
    assert_eq!(open[0].status, "issued");

    let overdue = list_loans(&state, &admin_actor(), None, date!(2026 - 03 - 06)).unwrap();
    assert_eq!(overdue[0].status, "overdue");
}
