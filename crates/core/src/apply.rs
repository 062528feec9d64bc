// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::settings::Settings;
use crate::state::{State, TransitionResult};
use libris_audit::{Action, Actor, AuditEvent, AuditScope, Cause, StateSnapshot};
use libris_domain::{
    Book, DomainError, FineAssessment, Loan, LoanStatus, Member, MemberStatus, MembershipNumber,
    SerialNumber, assess_fine, compute_end_date, validate_book_fields, validate_loan_window,
    validate_member_eligible, validate_member_fields, validate_membership_number_unique,
    validate_serial_unique,
};
use time::Date;

/// Applies a command to the state, producing a new state and audit event.
///
/// The input state is never mutated. Multi-record transitions (issue and
/// return touch both a loan and the catalog's availability) happen on the
/// candidate state, so they land together or not at all.
///
/// # Arguments
///
/// * `state` - The current state (immutable)
/// * `settings` - The settings in force for this transition
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `today` - The current date, passed in so transitions stay pure
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state and audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if the command violates domain rules.
#[allow(clippy::too_many_lines)]
pub fn apply(
    state: &State,
    settings: &Settings,
    command: Command,
    actor: Actor,
    cause: Cause,
    today: Date,
) -> Result<TransitionResult, CoreError> {
    let before: StateSnapshot = state.to_snapshot();

    match command {
        Command::AddBook {
            serial,
            title,
            author,
            genre,
            kind,
            copies,
        } => {
            let book: Book = Book::new(serial, title, author, genre, kind, copies);
            validate_book_fields(&book)?;
            validate_serial_unique(&state.books, &book.serial)?;

            let mut new_state: State = state.clone();
            new_state.books.push(book.clone());

            let action: Action = Action::new(
                String::from("AddBook"),
                Some(format!(
                    "Added '{}' ({} copies) as {}",
                    book.title, book.copies, book.serial
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                AuditScope::for_book(book.serial),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
            })
        }
        Command::UpdateBook {
            serial,
            title,
            author,
            genre,
            copies,
        } => {
            let mut new_state: State = state.clone();
            let book: &mut Book = new_state
                .books
                .iter_mut()
                .find(|b| b.serial == serial)
                .ok_or_else(|| DomainError::BookNotFound {
                    serial: serial.value().to_string(),
                })?;

            if let Some(title) = title {
                book.title = title;
            }
            if let Some(author) = author {
                book.author = author;
            }
            if let Some(genre) = genre {
                book.genre = Some(genre);
            }
            if let Some(new_copies) = copies {
                // Keep the checked-out count fixed; availability absorbs
                // the whole delta.
                let checked_out: u32 = book.copies - book.available_copies;
                if new_copies < checked_out {
                    return Err(CoreError::DomainViolation(
                        DomainError::CopiesBelowCheckedOut {
                            requested: new_copies,
                            checked_out,
                        },
                    ));
                }
                book.copies = new_copies;
                book.available_copies = new_copies - checked_out;
            }

            validate_book_fields(book)?;

            let action: Action = Action::new(
                String::from("UpdateBook"),
                Some(format!("Updated catalog item {serial}")),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                AuditScope::for_book(serial),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
            })
        }
        Command::RegisterMember {
            membership_number,
            name,
            email,
            start_date,
            duration,
        } => {
            validate_membership_number_unique(&state.members, &membership_number)?;

            let member: Member =
                Member::new(membership_number, name, email, start_date, duration)?;
            validate_member_fields(&member)?;

            let mut new_state: State = state.clone();
            new_state.members.push(member.clone());

            let action: Action = Action::new(
                String::from("RegisterMember"),
                Some(format!(
                    "Registered '{}' as {} until {}",
                    member.name, member.membership_number, member.end_date
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                AuditScope::for_member(member.membership_number),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
            })
        }
        Command::ExtendMembership {
            membership_number,
            duration,
        } => {
            let mut new_state: State = state.clone();
            let member: &mut Member = new_state
                .members
                .iter_mut()
                .find(|m| m.membership_number == membership_number)
                .ok_or_else(|| DomainError::MemberNotFound {
                    membership_number: membership_number.value().to_string(),
                })?;

            if member.status == MemberStatus::Cancelled {
                return Err(CoreError::DomainViolation(
                    DomainError::MembershipAlreadyCancelled {
                        membership_number: membership_number.value().to_string(),
                    },
                ));
            }

            // The extension stacks on the current end date. An expired
            // membership comes back active.
            member.end_date = compute_end_date(member.end_date, duration)?;
            member.duration = duration;
            member.status = MemberStatus::Active;
            let new_end: Date = member.end_date;

            let action: Action = Action::new(
                String::from("ExtendMembership"),
                Some(format!(
                    "Extended {membership_number} by {duration} to {new_end}"
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                AuditScope::for_member(membership_number),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
            })
        }
        Command::CancelMembership { membership_number } => {
            let mut new_state: State = state.clone();
            let member: &mut Member = new_state
                .members
                .iter_mut()
                .find(|m| m.membership_number == membership_number)
                .ok_or_else(|| DomainError::MemberNotFound {
                    membership_number: membership_number.value().to_string(),
                })?;

            if member.status == MemberStatus::Cancelled {
                return Err(CoreError::DomainViolation(
                    DomainError::MembershipAlreadyCancelled {
                        membership_number: membership_number.value().to_string(),
                    },
                ));
            }

            member.status = MemberStatus::Cancelled;

            let action: Action = Action::new(
                String::from("CancelMembership"),
                Some(format!("Cancelled membership {membership_number}")),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                AuditScope::for_member(membership_number),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
            })
        }
        Command::IssueBook {
            serial,
            membership_number,
            issue_date,
            due_date,
            remarks,
        } => {
            let member: &Member =
                state
                    .find_member(&membership_number)
                    .ok_or_else(|| DomainError::MemberNotFound {
                        membership_number: membership_number.value().to_string(),
                    })?;
            validate_member_eligible(member)?;

            let book: &Book =
                state
                    .find_book(&serial)
                    .ok_or_else(|| DomainError::BookNotFound {
                        serial: serial.value().to_string(),
                    })?;
            if !book.has_available_copy() {
                return Err(CoreError::DomainViolation(DomainError::NoCopiesAvailable {
                    serial: serial.value().to_string(),
                }));
            }

            validate_loan_window(issue_date, due_date, today)?;

            // Two writes, one transition: the loan record and the
            // availability decrement land together.
            let mut new_state: State = state.clone();
            let loan_id: i64 = new_state.next_loan_id;
            new_state.next_loan_id += 1;
            if let Some(book) = new_state.books.iter_mut().find(|b| b.serial == serial) {
                book.take_copy();
            }
            let loan: Loan = Loan::new(
                loan_id,
                serial.clone(),
                membership_number.clone(),
                issue_date,
                due_date,
                remarks,
            );
            new_state.loans.push(loan);

            let action: Action = Action::new(
                String::from("IssueBook"),
                Some(format!(
                    "Issued {serial} to {membership_number}, due {due_date}"
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                AuditScope::for_loan(loan_id, serial, membership_number),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
            })
        }
        Command::ReturnBook {
            loan_id,
            return_date,
        } => {
            let loan: &Loan = state
                .find_loan(loan_id)
                .ok_or(DomainError::LoanNotFound { loan_id })?;
            if !loan.is_open() {
                return Err(CoreError::DomainViolation(
                    DomainError::LoanAlreadyReturned { loan_id },
                ));
            }

            let assessment: FineAssessment =
                assess_fine(loan.due_date, return_date, settings.daily_fine_rate);
            let serial: SerialNumber = loan.serial.clone();
            let membership_number: MembershipNumber = loan.membership_number.clone();

            let mut new_state: State = state.clone();
            if let Some(loan) = new_state.loans.iter_mut().find(|l| l.loan_id == loan_id) {
                loan.return_date = Some(return_date);
                loan.status = LoanStatus::Returned;
                if assessment.is_fined() {
                    loan.fine = Some(assessment.amount);
                    loan.fine_paid = Some(false);
                }
            }
            if let Some(book) = new_state.books.iter_mut().find(|b| b.serial == serial) {
                book.restore_copy();
            }

            let detail: String = if assessment.is_fined() {
                format!(
                    "Returned {serial}, {} days overdue, fine {}",
                    assessment.days_overdue, assessment.amount
                )
            } else {
                format!("Returned {serial} on time")
            };
            let action: Action = Action::new(String::from("ReturnBook"), Some(detail));
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                AuditScope::for_loan(loan_id, serial, membership_number),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
            })
        }
        Command::PayFine { loan_id, confirmed } => {
            let loan: &Loan = state
                .find_loan(loan_id)
                .ok_or(DomainError::LoanNotFound { loan_id })?;

            let amount: u32 = match loan.fine {
                Some(amount) if amount > 0 => amount,
                _ => {
                    return Err(CoreError::DomainViolation(DomainError::NoFineDue {
                        loan_id,
                    }));
                }
            };
            if loan.fine_paid == Some(true) {
                return Err(CoreError::DomainViolation(DomainError::FineAlreadyPaid {
                    loan_id,
                }));
            }
            if !confirmed {
                return Err(CoreError::DomainViolation(DomainError::PaymentNotConfirmed));
            }

            let serial: SerialNumber = loan.serial.clone();
            let membership_number: MembershipNumber = loan.membership_number.clone();

            let mut new_state: State = state.clone();
            if let Some(loan) = new_state.loans.iter_mut().find(|l| l.loan_id == loan_id) {
                loan.fine_paid = Some(true);
            }

            let action: Action = Action::new(
                String::from("PayFine"),
                Some(format!("Collected fine of {amount} for loan {loan_id}")),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                AuditScope::for_loan(loan_id, serial, membership_number),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
            })
        }
    }
}
