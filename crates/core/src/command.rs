// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use libris_domain::{MediaKind, MembershipDuration, MembershipNumber, SerialNumber};
use time::Date;

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new item to the catalog.
    AddBook {
        /// The serial number (must be unique in the catalog).
        serial: SerialNumber,
        /// The title.
        title: String,
        /// The author (or director).
        author: String,
        /// Optional genre.
        genre: Option<String>,
        /// The media kind.
        kind: MediaKind,
        /// Total copies owned.
        copies: u32,
    },
    /// Update an existing catalog item. `None` fields are left unchanged.
    UpdateBook {
        /// The serial number of the item to update.
        serial: SerialNumber,
        /// New title, if changing.
        title: Option<String>,
        /// New author, if changing.
        author: Option<String>,
        /// New genre, if changing.
        genre: Option<String>,
        /// New total copy count, if changing. Availability moves by the
        /// same delta so the checked-out count is preserved.
        copies: Option<u32>,
    },
    /// Register a new member.
    RegisterMember {
        /// The generated membership number.
        membership_number: MembershipNumber,
        /// The member's name.
        name: String,
        /// The member's email address.
        email: String,
        /// The membership start date.
        start_date: Date,
        /// The membership duration.
        duration: MembershipDuration,
    },
    /// Extend a membership by a further duration from its current end date.
    ExtendMembership {
        /// The membership number.
        membership_number: MembershipNumber,
        /// The duration to extend by.
        duration: MembershipDuration,
    },
    /// Cancel a membership. Terminal for the member.
    CancelMembership {
        /// The membership number.
        membership_number: MembershipNumber,
    },
    /// Issue one copy of an item to a member.
    IssueBook {
        /// The serial number of the item.
        serial: SerialNumber,
        /// The borrower's membership number.
        membership_number: MembershipNumber,
        /// The issue date.
        issue_date: Date,
        /// The due date.
        due_date: Date,
        /// Optional free-form remarks.
        remarks: Option<String>,
    },
    /// Close an open loan, assessing any overdue fine.
    ReturnBook {
        /// The loan to close.
        loan_id: i64,
        /// The date the item came back.
        return_date: Date,
    },
    /// Record payment of a loan's fine.
    PayFine {
        /// The loan whose fine is being paid.
        loan_id: i64,
        /// Whether the operator explicitly confirmed the payment.
        confirmed: bool,
    },
}
