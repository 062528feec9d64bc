// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use libris_audit::{AuditEvent, StateSnapshot};
use libris_domain::{Book, Loan, Member, MembershipNumber, SerialNumber};

/// The complete circulation state: catalog, members, and loans.
///
/// State is an immutable value as far as transitions are concerned: `apply`
/// takes the current state by reference and returns a new one, so a failed
/// command can never leave a half-written state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// All catalog items.
    pub books: Vec<Book>,
    /// All registered members.
    pub members: Vec<Member>,
    /// All loans, open and closed.
    pub loans: Vec<Loan>,
    /// The identifier the next issued loan will receive.
    pub next_loan_id: i64,
}

impl State {
    /// Creates a new empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            books: Vec::new(),
            members: Vec::new(),
            loans: Vec::new(),
            next_loan_id: 1,
        }
    }

    /// Finds a catalog item by serial number.
    #[must_use]
    pub fn find_book(&self, serial: &SerialNumber) -> Option<&Book> {
        self.books.iter().find(|b| b.serial == *serial)
    }

    /// Finds a member by membership number.
    #[must_use]
    pub fn find_member(&self, membership_number: &MembershipNumber) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.membership_number == *membership_number)
    }

    /// Finds a loan by identifier.
    #[must_use]
    pub fn find_loan(&self, loan_id: i64) -> Option<&Loan> {
        self.loans.iter().find(|l| l.loan_id == loan_id)
    }

    /// Counts loans that are still open.
    #[must_use]
    pub fn open_loan_count(&self) -> usize {
        self.loans.iter().filter(|l| l.is_open()).count()
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(self.books.len(), self.members.len(), self.open_loan_count())
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without
/// side effects. An issue or return changes the loan list and the catalog's
/// availability in the same transition or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: State,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
