// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use libris_domain::{MembershipNumber, SerialNumber};

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change:
/// a staff login, a member, or the system itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "admin", "member", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }
}

/// Represents the reason or trigger for an action.
///
/// A cause describes why a state change was initiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`IssueBook`", "`PayFine`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A compact summary of circulation state at a point in time.
///
/// Captures enough to show what a transition changed without persisting the
/// whole catalog in every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Number of catalog items.
    pub books: usize,
    /// Number of registered members.
    pub members: usize,
    /// Number of loans that are still open.
    pub open_loans: usize,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `books` - Number of catalog items
    /// * `members` - Number of registered members
    /// * `open_loans` - Number of open loans
    #[must_use]
    pub const fn new(books: usize, members: usize, open_loans: usize) -> Self {
        Self {
            books,
            members,
            open_loans,
        }
    }
}

/// The scope an audit event touches, for filtering a timeline down to one
/// item, one member, or one loan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditScope {
    /// The serial number of the catalog item involved, if any.
    pub serial: Option<SerialNumber>,
    /// The membership number of the member involved, if any.
    pub membership_number: Option<MembershipNumber>,
    /// The loan involved, if any.
    pub loan_id: Option<i64>,
}

impl AuditScope {
    /// A scope covering a single catalog item.
    #[must_use]
    pub const fn for_book(serial: SerialNumber) -> Self {
        Self {
            serial: Some(serial),
            membership_number: None,
            loan_id: None,
        }
    }

    /// A scope covering a single member.
    #[must_use]
    pub const fn for_member(membership_number: MembershipNumber) -> Self {
        Self {
            serial: None,
            membership_number: Some(membership_number),
            loan_id: None,
        }
    }

    /// A scope covering a loan together with its item and borrower.
    #[must_use]
    pub const fn for_loan(
        loan_id: i64,
        serial: SerialNumber,
        membership_number: MembershipNumber,
    ) -> Self {
        Self {
            serial: Some(serial),
            membership_number: Some(membership_number),
            loan_id: Some(loan_id),
        }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful state change must produce exactly one audit event.
/// Audit events are immutable once created and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - What the action touched (scope)
/// - The state before and after the transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// What the action touched.
    pub scope: AuditScope,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// Once created, an audit event is immutable.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `scope` - What the action touched
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        scope: AuditScope,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            actor,
            cause,
            action,
            scope,
            before,
            after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_event() -> AuditEvent {
        AuditEvent::new(
            Actor::new(String::from("admin"), String::from("admin")),
            Cause::new(String::from("req-456"), String::from("User request")),
            Action::new(String::from("IssueBook"), None),
            AuditScope::for_loan(
                1,
                SerialNumber::new("SN-001"),
                MembershipNumber::new("LIB0001"),
            ),
            StateSnapshot::new(5, 3, 0),
            StateSnapshot::new(5, 3, 1),
        )
    }

    #[test]
    fn test_actor_creation_requires_all_fields() {
        let actor: Actor = Actor::new(String::from("admin"), String::from("admin"));

        assert_eq!(actor.id, "admin");
        assert_eq!(actor.actor_type, "admin");
    }

    #[test]
    fn test_cause_creation_requires_all_fields() {
        let cause: Cause = Cause::new(String::from("req-456"), String::from("User request"));

        assert_eq!(cause.id, "req-456");
        assert_eq!(cause.description, "User request");
    }

    #[test]
    fn test_action_creation_with_details() {
        let action: Action = Action::new(
            String::from("ReturnBook"),
            Some(String::from("Returned 3 days late")),
        );

        assert_eq!(action.name, "ReturnBook");
        assert_eq!(action.details, Some(String::from("Returned 3 days late")));
    }

    #[test]
    fn test_scope_for_book_carries_only_serial() {
        let scope: AuditScope = AuditScope::for_book(SerialNumber::new("SN-001"));

        assert_eq!(scope.serial, Some(SerialNumber::new("SN-001")));
        assert_eq!(scope.membership_number, None);
        assert_eq!(scope.loan_id, None);
    }

    #[test]
    fn test_scope_for_loan_carries_all_three() {
        let scope: AuditScope = AuditScope::for_loan(
            7,
            SerialNumber::new("SN-001"),
            MembershipNumber::new("LIB0001"),
        );

        assert_eq!(scope.loan_id, Some(7));
        assert_eq!(scope.serial, Some(SerialNumber::new("SN-001")));
        assert_eq!(
            scope.membership_number,
            Some(MembershipNumber::new("LIB0001"))
        );
    }

    #[test]
    fn test_audit_event_records_state_delta() {
        let event: AuditEvent = create_test_event();

        assert_eq!(event.before.open_loans, 0);
        assert_eq!(event.after.open_loans, 1);
        assert_eq!(event.before.books, event.after.books);
    }

    #[test]
    fn test_audit_event_equality() {
        let event1: AuditEvent = create_test_event();
        let event2: AuditEvent = create_test_event();

        assert_eq!(event1, event2);
    }
}
