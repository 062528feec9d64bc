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

use libris::State;
use libris_domain::{
    LoanClassification, MembershipNumber, SerialNumber, classify_loan, days_overdue, is_due_soon,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use time::Date;

/// Who is looking at the notification feed.
///
/// Visibility is viewer-scoped: an admin sees notifications for every open
/// loan, a member only for their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// Library staff: sees everything.
    Admin,
    /// A member: sees only their own loans.
    Member(MembershipNumber),
}

impl Viewer {
    /// The key this viewer's read-state is stored under.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Admin => String::from("admin"),
            Self::Member(membership_number) => membership_number.value().to_string(),
        }
    }

    fn can_see(&self, membership_number: &MembershipNumber) -> bool {
        match self {
            Self::Admin => true,
            Self::Member(own) => own == membership_number,
        }
    }
}

/// The kind of a derived notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The loan is past its due date.
    Overdue,
    /// The loan is due within the next few days.
    DueSoon,
}

/// A notification derived from the loan list at read time.
///
/// Notifications are never stored. They are recomputed from the open loans
/// on every read, so they can never disagree with the loan they describe.
/// Only the read flag is persisted, keyed by the stable `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Stable identifier, derived from the loan and kind so the read flag
    /// survives re-derivation.
    pub id: String,
    /// What this notification is about.
    pub kind: NotificationKind,
    /// The loan that produced it.
    pub loan_id: i64,
    /// The serial number of the borrowed item.
    pub serial: SerialNumber,
    /// The borrower's membership number.
    pub membership_number: MembershipNumber,
    /// Human-readable message.
    pub message: String,
    /// The loan's due date.
    pub due_date: Date,
    /// Days overdue (for `Overdue`) or days until due (for `DueSoon`).
    pub days: u32,
    /// Whether this viewer has marked it read.
    pub read: bool,
}

/// Persisted read-state, keyed by viewer then notification id.
///
/// Marking is append-only: a notification once read stays read, and a
/// mark for an id that no longer derives (the loan was returned) is kept
/// harmlessly.
#[derive(Debug, Clone, Default)]
pub struct ReadStateStore {
    read: HashMap<String, HashSet<String>>,
}

impl ReadStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks one notification read for a viewer.
    pub fn mark_read(&mut self, viewer: &Viewer, notification_id: &str) {
        self.read
            .entry(viewer.key())
            .or_default()
            .insert(notification_id.to_string());
    }

    /// Marks a batch of notifications read for a viewer.
    pub fn mark_all_read<'a, I>(&mut self, viewer: &Viewer, notification_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let entry: &mut HashSet<String> = self.read.entry(viewer.key()).or_default();
        for id in notification_ids {
            entry.insert(id.to_string());
        }
    }

    /// Whether a viewer has read a notification.
    #[must_use]
    pub fn is_read(&self, viewer: &Viewer, notification_id: &str) -> bool {
        self.read
            .get(&viewer.key())
            .is_some_and(|ids| ids.contains(notification_id))
    }
}

/// Derives the notification feed for a viewer as of `today`.
///
/// Every open loan past its due date yields one overdue notification;
/// every open loan due within the next three days yields one due-soon
/// notification. Returned loans yield nothing. Overdue notifications come
/// first, most overdue at the top; due-soon notifications follow, nearest
/// deadline first. Ties break toward the older loan.
///
/// # Arguments
///
/// * `state` - The circulation state to derive from
/// * `viewer` - Who is looking
/// * `today` - The current date
/// * `read_store` - This viewer's persisted read-state
#[must_use]
pub fn derive_notifications(
    state: &State,
    viewer: &Viewer,
    today: Date,
    read_store: &ReadStateStore,
) -> Vec<Notification> {
    let mut overdue: Vec<Notification> = Vec::new();
    let mut due_soon: Vec<Notification> = Vec::new();

    for loan in &state.loans {
        if !loan.is_open() || !viewer.can_see(&loan.membership_number) {
            continue;
        }

        let title: String = state
            .find_book(&loan.serial)
            .map_or_else(|| loan.serial.value().to_string(), |b| b.title.clone());

        match classify_loan(loan, today) {
            LoanClassification::Overdue => {
                let days: u32 = days_overdue(loan.due_date, today);
                let id: String = format!("loan-{}-overdue", loan.loan_id);
                overdue.push(Notification {
                    read: read_store.is_read(viewer, &id),
                    id,
                    kind: NotificationKind::Overdue,
                    loan_id: loan.loan_id,
                    serial: loan.serial.clone(),
                    membership_number: loan.membership_number.clone(),
                    message: format!(
                        "'{title}' was due {} and is {days} day(s) overdue",
                        loan.due_date
                    ),
                    due_date: loan.due_date,
                    days,
                });
            }
            LoanClassification::Issued if is_due_soon(loan.due_date, today) => {
                let days: u32 =
                    u32::try_from((loan.due_date - today).whole_days().max(0)).unwrap_or(u32::MAX);
                let id: String = format!("loan-{}-due-soon", loan.loan_id);
                due_soon.push(Notification {
                    read: read_store.is_read(viewer, &id),
                    id,
                    kind: NotificationKind::DueSoon,
                    loan_id: loan.loan_id,
                    serial: loan.serial.clone(),
                    membership_number: loan.membership_number.clone(),
                    message: format!("'{title}' is due {} ({days} day(s) left)", loan.due_date),
                    due_date: loan.due_date,
                    days,
                });
            }
            _ => {}
        }
    }

    overdue.sort_by(|a, b| b.days.cmp(&a.days).then(a.loan_id.cmp(&b.loan_id)));
    due_soon.sort_by(|a, b| a.days.cmp(&b.days).then(a.loan_id.cmp(&b.loan_id)));

    overdue.extend(due_soon);
    overdue
}
