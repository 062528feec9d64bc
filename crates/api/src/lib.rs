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

mod csv_preview;

#[cfg(test)]
mod tests;

pub use csv_preview::{CsvPreviewResult, CsvRowResult, CsvRowStatus, ImportError, preview_books_csv};

use libris::{
    Command, CoreError, LoanFilter, Settings, State, TransitionResult, apply, filter_loans,
};
use libris_audit::{Actor, AuditEvent, Cause};
use libris_domain::{
    DomainError, Loan, MediaKind, MembershipDuration, MembershipNumber, SerialNumber,
    classify_loan, days_overdue, parse_iso_date,
};
use libris_notify::{Notification, ReadStateStore, Viewer, derive_notifications};
use rand::RngExt;
use std::str::FromStr;
use time::Date;

/// Actor roles for authorization.
///
/// Roles determine what actions an authenticated actor may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Admin role: library staff with full authority.
    ///
    /// Admins may perform:
    /// - catalog management (add and update items, bulk import preview)
    /// - member management (register, extend, cancel)
    /// - circulation (issue, return, fine collection)
    /// - audit timeline review
    Admin,
    /// Member role: a library member browsing their own records.
    ///
    /// Members may:
    /// - view the catalog
    /// - view their own loans
    /// - view and mark their own notifications
    Member,
}

/// An authenticated actor with an associated role.
///
/// This represents someone who has been authenticated and has permission
/// to perform certain actions based on their role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
    /// For member actors, the membership number their view is scoped to.
    pub membership_number: Option<MembershipNumber>,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    /// * `membership_number` - The membership scope for member actors
    #[must_use]
    pub const fn new(id: String, role: Role, membership_number: Option<MembershipNumber>) -> Self {
        Self {
            id,
            role,
            membership_number,
        }
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording audit events to attribute actions
    /// to the authenticated operator.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        let actor_type: String = match self.role {
            Role::Admin => String::from("admin"),
            Role::Member => String::from("member"),
        };
        Actor::new(self.id.clone(), actor_type)
    }
}

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Stub authentication function.
///
/// This is a minimal placeholder. It does NOT implement real
/// authentication - callers assert who they are and what role they hold.
///
/// In a real system, this would validate credentials, check tokens,
/// or integrate with an identity provider.
///
/// # Arguments
///
/// * `actor_id` - The identifier of the actor to authenticate
/// * `role` - The role to assign to the actor
/// * `membership_number` - The membership scope, required for the Member role
///
/// # Returns
///
/// An authenticated actor if successful.
///
/// # Errors
///
/// Returns an error if the actor id is empty, or if a member actor
/// carries no membership number.
pub fn authenticate_stub(
    actor_id: String,
    role: Role,
    membership_number: Option<MembershipNumber>,
) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    if role == Role::Member && membership_number.is_none() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Member actors must carry a membership number"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id, role, membership_number))
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The referenced resource does not exist.
    ResourceNotFound {
        /// The kind of resource (e.g., "book", "member", "loan").
        resource: String,
        /// The identifier that was looked up.
        id: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The uploaded CSV could not be read.
    InvalidCsvFormat {
        /// The reason the CSV was rejected.
        reason: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::ResourceNotFound { resource, id } => {
                write!(f, "{resource} '{id}' not found")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::InvalidCsvFormat { reason } => {
                write!(f, "Invalid CSV: {reason}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[allow(clippy::too_many_lines)]
fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidSerial(msg) => ApiError::InvalidInput {
            field: String::from("serial"),
            message: msg,
        },
        DomainError::InvalidTitle(msg) => ApiError::InvalidInput {
            field: String::from("title"),
            message: msg,
        },
        DomainError::InvalidAuthor(msg) => ApiError::InvalidInput {
            field: String::from("author"),
            message: msg,
        },
        DomainError::InvalidCopyCount { count } => ApiError::InvalidInput {
            field: String::from("copies"),
            message: format!("Invalid copy count: {count}. Must be at least 1"),
        },
        DomainError::InvalidAvailableCopies { available, copies } => {
            ApiError::DomainRuleViolation {
                rule: String::from("availability_bounds"),
                message: format!(
                    "Available copies ({available}) cannot exceed total copies ({copies})"
                ),
            }
        }
        DomainError::CopiesBelowCheckedOut {
            requested,
            checked_out,
        } => ApiError::DomainRuleViolation {
            rule: String::from("availability_bounds"),
            message: format!(
                "Cannot set copies to {requested}: {checked_out} copies are checked out"
            ),
        },
        DomainError::InvalidName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidEmail(msg) => ApiError::InvalidInput {
            field: String::from("email"),
            message: msg,
        },
        DomainError::InvalidDuration(value) => ApiError::InvalidInput {
            field: String::from("duration"),
            message: format!("Invalid duration '{value}'. Must be '6months', '1year', or '2years'"),
        },
        DomainError::InvalidMemberStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Invalid member status '{value}'"),
        },
        DomainError::InvalidMediaKind(value) => ApiError::InvalidInput {
            field: String::from("kind"),
            message: format!("Invalid media kind '{value}'. Must be 'book' or 'movie'"),
        },
        DomainError::DuplicateSerial { serial } => ApiError::DomainRuleViolation {
            rule: String::from("unique_serial"),
            message: format!(
                "A catalog item with serial number '{}' already exists",
                serial.value()
            ),
        },
        DomainError::DuplicateMembershipNumber { membership_number } => {
            ApiError::DomainRuleViolation {
                rule: String::from("unique_membership_number"),
                message: format!(
                    "A member with membership number '{}' already exists",
                    membership_number.value()
                ),
            }
        }
        DomainError::BookNotFound { serial } => ApiError::ResourceNotFound {
            resource: String::from("book"),
            id: serial,
        },
        DomainError::MemberNotFound { membership_number } => ApiError::ResourceNotFound {
            resource: String::from("member"),
            id: membership_number,
        },
        DomainError::LoanNotFound { loan_id } => ApiError::ResourceNotFound {
            resource: String::from("loan"),
            id: loan_id.to_string(),
        },
        DomainError::MemberNotActive {
            membership_number,
            status,
        } => ApiError::DomainRuleViolation {
            rule: String::from("member_active"),
            message: format!("Member '{membership_number}' cannot borrow: membership is {status}"),
        },
        DomainError::NoCopiesAvailable { serial } => ApiError::DomainRuleViolation {
            rule: String::from("copy_available"),
            message: format!("No copies of '{serial}' are available for issue"),
        },
        DomainError::LoanPeriodTooLong { days, max } => ApiError::DomainRuleViolation {
            rule: String::from("loan_window"),
            message: format!("Loan period of {days} days exceeds the maximum of {max} days"),
        },
        DomainError::DueDateBeforeIssueDate {
            issue_date,
            due_date,
        } => ApiError::DomainRuleViolation {
            rule: String::from("loan_window"),
            message: format!("Due date {due_date} is before the issue date {issue_date}"),
        },
        DomainError::IssueDateInPast { issue_date, today } => ApiError::DomainRuleViolation {
            rule: String::from("loan_window"),
            message: format!("Issue date {issue_date} is in the past (today is {today})"),
        },
        DomainError::LoanAlreadyReturned { loan_id } => ApiError::DomainRuleViolation {
            rule: String::from("loan_open"),
            message: format!("Loan {loan_id} has already been returned"),
        },
        DomainError::NoFineDue { loan_id } => ApiError::DomainRuleViolation {
            rule: String::from("fine_due"),
            message: format!("Loan {loan_id} has no outstanding fine"),
        },
        DomainError::FineAlreadyPaid { loan_id } => ApiError::DomainRuleViolation {
            rule: String::from("fine_unpaid"),
            message: format!("The fine for loan {loan_id} has already been paid"),
        },
        DomainError::PaymentNotConfirmed => ApiError::InvalidInput {
            field: String::from("confirmed"),
            message: String::from("Fine payment requires explicit confirmation"),
        },
        DomainError::MembershipAlreadyCancelled { membership_number } => {
            ApiError::DomainRuleViolation {
                rule: String::from("membership_not_cancelled"),
                message: format!("Membership '{membership_number}' has already been cancelled"),
            }
        }
        DomainError::DateArithmeticOverflow { operation } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Date arithmetic overflow while {operation}"),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
    }
}

/// Translates a core error into an API error.
fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Authorization service for enforcing role-based access control.
///
/// This service determines whether an authenticated actor has permission
/// to perform a specific action based on their role.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Member => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Checks if an actor is authorized to manage the catalog.
    ///
    /// Only Admin actors may add or update catalog items.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_catalog(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_catalog")
    }

    /// Checks if an actor is authorized to manage memberships.
    ///
    /// Only Admin actors may register, extend, or cancel members.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_members(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_members")
    }

    /// Checks if an actor is authorized to run circulation actions.
    ///
    /// Only Admin actors may issue, return, or collect fines.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_circulation(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "circulation")
    }

    /// Checks if an actor is authorized to review the audit timeline.
    ///
    /// Only Admin actors may read audit events.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_audit_timeline(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "audit_timeline")
    }
}

/// The result of an API operation that includes both the response and the audit event.
///
/// This ensures that successful API operations always produce an audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResult<T> {
    /// The API response.
    pub response: T,
    /// The audit event generated by this operation.
    pub audit_event: AuditEvent,
    /// The new state after the operation.
    pub new_state: State,
}

/// API request to add a catalog item.
///
/// This DTO is distinct from domain types and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddBookRequest {
    /// The serial number.
    pub serial: String,
    /// The title.
    pub title: String,
    /// The author (or director).
    pub author: String,
    /// Optional genre.
    pub genre: Option<String>,
    /// The media kind ("book" or "movie").
    pub kind: String,
    /// Total copies owned.
    pub copies: u32,
}

/// API response for a successful catalog addition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddBookResponse {
    /// The normalized serial number.
    pub serial: String,
    /// The title.
    pub title: String,
    /// A success message.
    pub message: String,
}

/// API request to update a catalog item. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateBookRequest {
    /// The serial number of the item to update.
    pub serial: String,
    /// New title, if changing.
    pub title: Option<String>,
    /// New author, if changing.
    pub author: Option<String>,
    /// New genre, if changing.
    pub genre: Option<String>,
    /// New total copy count, if changing.
    pub copies: Option<u32>,
}

/// API response for a successful catalog update.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateBookResponse {
    /// The normalized serial number.
    pub serial: String,
    /// A success message.
    pub message: String,
}

/// API request to register a member.
///
/// The membership number is generated server-side and returned in the
/// response, never supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterMemberRequest {
    /// The member's name.
    pub name: String,
    /// The member's email address.
    pub email: String,
    /// The membership start date (ISO 8601).
    pub start_date: String,
    /// The membership duration ("6months", "1year", or "2years").
    pub duration: String,
}

/// API response for a successful member registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterMemberResponse {
    /// The generated membership number.
    pub membership_number: String,
    /// The member's name.
    pub name: String,
    /// The computed membership end date (ISO 8601).
    pub end_date: String,
    /// A success message.
    pub message: String,
}

/// API request to extend a membership.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExtendMembershipRequest {
    /// The membership number.
    pub membership_number: String,
    /// The duration to extend by.
    pub duration: String,
}

/// API response for a successful membership extension.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExtendMembershipResponse {
    /// The membership number.
    pub membership_number: String,
    /// The new end date (ISO 8601).
    pub end_date: String,
    /// A success message.
    pub message: String,
}

/// API request to cancel a membership.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CancelMembershipRequest {
    /// The membership number.
    pub membership_number: String,
}

/// API response for a successful membership cancellation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CancelMembershipResponse {
    /// The membership number.
    pub membership_number: String,
    /// A success message.
    pub message: String,
}

/// API request to issue an item to a member.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IssueBookRequest {
    /// The serial number of the item.
    pub serial: String,
    /// The borrower's membership number.
    pub membership_number: String,
    /// The issue date (ISO 8601).
    pub issue_date: String,
    /// The due date (ISO 8601).
    pub due_date: String,
    /// Optional free-form remarks.
    pub remarks: Option<String>,
}

/// API response for a successful issue.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IssueBookResponse {
    /// The assigned loan identifier.
    pub loan_id: i64,
    /// The normalized serial number.
    pub serial: String,
    /// The borrower's membership number.
    pub membership_number: String,
    /// The due date (ISO 8601).
    pub due_date: String,
    /// A success message.
    pub message: String,
}

/// API request to return a borrowed item.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReturnBookRequest {
    /// The loan to close.
    pub loan_id: i64,
    /// The return date (ISO 8601).
    pub return_date: String,
}

/// API response for a successful return.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReturnBookResponse {
    /// The loan identifier.
    pub loan_id: i64,
    /// The fine assessed, in whole currency units, if the return was late.
    pub fine: Option<u32>,
    /// Days past the due date. Zero for an on-time return.
    pub days_overdue: u32,
    /// A success message.
    pub message: String,
}

/// API request to record a fine payment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PayFineRequest {
    /// The loan whose fine is being paid.
    pub loan_id: i64,
    /// Whether the operator explicitly confirmed the payment.
    pub confirmed: bool,
}

/// API response for a successful fine payment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PayFineResponse {
    /// The loan identifier.
    pub loan_id: i64,
    /// The amount collected, in whole currency units.
    pub amount: u32,
    /// A success message.
    pub message: String,
}

/// A loan as seen through the API, with its read-time classification.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoanView {
    /// The loan identifier.
    pub loan_id: i64,
    /// The serial number of the borrowed item.
    pub serial: String,
    /// The borrower's membership number.
    pub membership_number: String,
    /// The issue date (ISO 8601).
    pub issue_date: String,
    /// The due date (ISO 8601).
    pub due_date: String,
    /// The return date, once returned (ISO 8601).
    pub return_date: Option<String>,
    /// The classification as of the query date: "issued", "overdue", or
    /// "returned".
    pub status: String,
    /// The fine assessed at return time, if any.
    pub fine: Option<u32>,
    /// Whether the fine has been paid.
    pub fine_paid: Option<bool>,
}

impl LoanView {
    fn from_loan(loan: &Loan, today: Date) -> Self {
        Self {
            loan_id: loan.loan_id,
            serial: loan.serial.value().to_string(),
            membership_number: loan.membership_number.value().to_string(),
            issue_date: loan.issue_date.to_string(),
            due_date: loan.due_date.to_string(),
            return_date: loan.return_date.map(|d| d.to_string()),
            status: classify_loan(loan, today).to_string(),
            fine: loan.fine,
            fine_paid: loan.fine_paid,
        }
    }
}

/// Upper bound on attempts to find an unused membership number.
const MEMBERSHIP_NUMBER_ATTEMPTS: usize = 64;

/// Generates an unused membership number of the form `LIB` plus four digits.
///
/// Collisions with existing members are retried with a fresh draw; the
/// bound only trips when the number space is effectively full.
fn generate_membership_number(state: &State) -> Result<MembershipNumber, ApiError> {
    let mut rng = rand::rng();
    for _ in 0..MEMBERSHIP_NUMBER_ATTEMPTS {
        let n: u32 = rng.random_range(0..=9999);
        let candidate: MembershipNumber = MembershipNumber::new(&format!("LIB{n:04}"));
        if state.find_member(&candidate).is_none() {
            return Ok(candidate);
        }
    }
    tracing::warn!(
        "Membership number generation exhausted {} attempts",
        MEMBERSHIP_NUMBER_ATTEMPTS
    );
    Err(ApiError::DomainRuleViolation {
        rule: String::from("unique_membership_number"),
        message: String::from("Could not generate an unused membership number"),
    })
}

fn parse_duration(value: &str) -> Result<MembershipDuration, ApiError> {
    MembershipDuration::from_str(value).map_err(translate_domain_error)
}

fn parse_date(value: &str) -> Result<Date, ApiError> {
    parse_iso_date(value).map_err(translate_domain_error)
}

/// Adds a catalog item via the API boundary with authorization.
///
/// # Arguments
///
/// * `state` - The current system state
/// * `settings` - The settings in force
/// * `request` - The API request
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause or reason for this action
/// * `today` - The current date
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, a field is invalid, or
/// the serial number is already in use.
pub fn add_book(
    state: &State,
    settings: &Settings,
    request: AddBookRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    today: Date,
) -> Result<ApiResult<AddBookResponse>, ApiError> {
    AuthorizationService::authorize_manage_catalog(authenticated_actor)?;

    let actor: Actor = authenticated_actor.to_audit_actor();
    let serial: SerialNumber = SerialNumber::new(&request.serial);
    let kind: MediaKind = MediaKind::from_str(&request.kind).map_err(translate_domain_error)?;

    let command: Command = Command::AddBook {
        serial: serial.clone(),
        title: request.title.clone(),
        author: request.author,
        genre: request.genre,
        kind,
        copies: request.copies,
    };

    let transition_result: TransitionResult =
        apply(state, settings, command, actor, cause, today).map_err(translate_core_error)?;

    let response: AddBookResponse = AddBookResponse {
        serial: serial.value().to_string(),
        title: request.title.clone(),
        message: format!(
            "Successfully added '{}' as {}",
            request.title,
            serial.value()
        ),
    };

    Ok(ApiResult {
        response,
        audit_event: transition_result.audit_event,
        new_state: transition_result.new_state,
    })
}

/// Updates a catalog item via the API boundary with authorization.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the item does not exist,
/// or the update would break the availability invariant.
pub fn update_book(
    state: &State,
    settings: &Settings,
    request: UpdateBookRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    today: Date,
) -> Result<ApiResult<UpdateBookResponse>, ApiError> {
    AuthorizationService::authorize_manage_catalog(authenticated_actor)?;

    let actor: Actor = authenticated_actor.to_audit_actor();
    let serial: SerialNumber = SerialNumber::new(&request.serial);

    let command: Command = Command::UpdateBook {
        serial: serial.clone(),
        title: request.title,
        author: request.author,
        genre: request.genre,
        copies: request.copies,
    };

    let transition_result: TransitionResult =
        apply(state, settings, command, actor, cause, today).map_err(translate_core_error)?;

    let response: UpdateBookResponse = UpdateBookResponse {
        serial: serial.value().to_string(),
        message: format!("Successfully updated {}", serial.value()),
    };

    Ok(ApiResult {
        response,
        audit_event: transition_result.audit_event,
        new_state: transition_result.new_state,
    })
}

/// Registers a new member via the API boundary with authorization.
///
/// This function:
/// - Verifies the actor is authorized (Admin role required)
/// - Generates an unused membership number, retrying on collision
/// - Applies the registration command to the current state
/// - Returns the API response with audit event on success
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, a field is invalid, or
/// no unused membership number could be generated.
pub fn register_member(
    state: &State,
    settings: &Settings,
    request: RegisterMemberRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    today: Date,
) -> Result<ApiResult<RegisterMemberResponse>, ApiError> {
    AuthorizationService::authorize_manage_members(authenticated_actor)?;

    let actor: Actor = authenticated_actor.to_audit_actor();
    let membership_number: MembershipNumber = generate_membership_number(state)?;
    let start_date: Date = parse_date(&request.start_date)?;
    let duration: MembershipDuration = parse_duration(&request.duration)?;

    let command: Command = Command::RegisterMember {
        membership_number: membership_number.clone(),
        name: request.name.clone(),
        email: request.email,
        start_date,
        duration,
    };

    let transition_result: TransitionResult =
        apply(state, settings, command, actor, cause, today).map_err(translate_core_error)?;

    let end_date: String = transition_result
        .new_state
        .find_member(&membership_number)
        .map(|m| m.end_date.to_string())
        .unwrap_or_default();

    let response: RegisterMemberResponse = RegisterMemberResponse {
        membership_number: membership_number.value().to_string(),
        name: request.name.clone(),
        end_date,
        message: format!(
            "Successfully registered '{}' as {}",
            request.name,
            membership_number.value()
        ),
    };

    Ok(ApiResult {
        response,
        audit_event: transition_result.audit_event,
        new_state: transition_result.new_state,
    })
}

/// Extends a membership via the API boundary with authorization.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the member does not
/// exist, or the membership has been cancelled.
pub fn extend_membership(
    state: &State,
    settings: &Settings,
    request: ExtendMembershipRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    today: Date,
) -> Result<ApiResult<ExtendMembershipResponse>, ApiError> {
    AuthorizationService::authorize_manage_members(authenticated_actor)?;

    let actor: Actor = authenticated_actor.to_audit_actor();
    let membership_number: MembershipNumber = MembershipNumber::new(&request.membership_number);
    let duration: MembershipDuration = parse_duration(&request.duration)?;

    let command: Command = Command::ExtendMembership {
        membership_number: membership_number.clone(),
        duration,
    };

    let transition_result: TransitionResult =
        apply(state, settings, command, actor, cause, today).map_err(translate_core_error)?;

    let end_date: String = transition_result
        .new_state
        .find_member(&membership_number)
        .map(|m| m.end_date.to_string())
        .unwrap_or_default();

    let response: ExtendMembershipResponse = ExtendMembershipResponse {
        membership_number: membership_number.value().to_string(),
        end_date: end_date.clone(),
        message: format!(
            "Successfully extended {} until {end_date}",
            membership_number.value()
        ),
    };

    Ok(ApiResult {
        response,
        audit_event: transition_result.audit_event,
        new_state: transition_result.new_state,
    })
}

/// Cancels a membership via the API boundary with authorization.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the member does not
/// exist, or the membership was already cancelled.
pub fn cancel_membership(
    state: &State,
    settings: &Settings,
    request: CancelMembershipRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    today: Date,
) -> Result<ApiResult<CancelMembershipResponse>, ApiError> {
    AuthorizationService::authorize_manage_members(authenticated_actor)?;

    let actor: Actor = authenticated_actor.to_audit_actor();
    let membership_number: MembershipNumber = MembershipNumber::new(&request.membership_number);

    let command: Command = Command::CancelMembership {
        membership_number: membership_number.clone(),
    };

    let transition_result: TransitionResult =
        apply(state, settings, command, actor, cause, today).map_err(translate_core_error)?;

    let response: CancelMembershipResponse = CancelMembershipResponse {
        membership_number: membership_number.value().to_string(),
        message: format!("Successfully cancelled {}", membership_number.value()),
    };

    Ok(ApiResult {
        response,
        audit_event: transition_result.audit_event,
        new_state: transition_result.new_state,
    })
}

/// Issues an item to a member via the API boundary with authorization.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the item or member does
/// not exist, no copy is available, the member is not active, or the loan
/// window is invalid.
pub fn issue_book(
    state: &State,
    settings: &Settings,
    request: IssueBookRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    today: Date,
) -> Result<ApiResult<IssueBookResponse>, ApiError> {
    AuthorizationService::authorize_circulation(authenticated_actor)?;

    let actor: Actor = authenticated_actor.to_audit_actor();
    let serial: SerialNumber = SerialNumber::new(&request.serial);
    let membership_number: MembershipNumber = MembershipNumber::new(&request.membership_number);
    let issue_date: Date = parse_date(&request.issue_date)?;
    let due_date: Date = parse_date(&request.due_date)?;

    let command: Command = Command::IssueBook {
        serial: serial.clone(),
        membership_number: membership_number.clone(),
        issue_date,
        due_date,
        remarks: request.remarks,
    };

    let transition_result: TransitionResult =
        apply(state, settings, command, actor, cause, today).map_err(translate_core_error)?;

    let loan_id: i64 = transition_result
        .audit_event
        .scope
        .loan_id
        .unwrap_or_default();

    let response: IssueBookResponse = IssueBookResponse {
        loan_id,
        serial: serial.value().to_string(),
        membership_number: membership_number.value().to_string(),
        due_date: due_date.to_string(),
        message: format!(
            "Issued {} to {}, due {due_date}",
            serial.value(),
            membership_number.value()
        ),
    };

    Ok(ApiResult {
        response,
        audit_event: transition_result.audit_event,
        new_state: transition_result.new_state,
    })
}

/// Returns a borrowed item via the API boundary with authorization.
///
/// The fine, if any, is assessed here under the settings in force at
/// return time and recorded on the loan.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the loan does not exist,
/// or the loan was already returned.
pub fn return_book(
    state: &State,
    settings: &Settings,
    request: ReturnBookRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    today: Date,
) -> Result<ApiResult<ReturnBookResponse>, ApiError> {
    AuthorizationService::authorize_circulation(authenticated_actor)?;

    let actor: Actor = authenticated_actor.to_audit_actor();
    let return_date: Date = parse_date(&request.return_date)?;

    let command: Command = Command::ReturnBook {
        loan_id: request.loan_id,
        return_date,
    };

    let transition_result: TransitionResult =
        apply(state, settings, command, actor, cause, today).map_err(translate_core_error)?;

    let (fine, days_overdue): (Option<u32>, u32) = transition_result
        .new_state
        .find_loan(request.loan_id)
        .map_or((None, 0), |loan| {
            let days: u32 = loan
                .return_date
                .map_or(0, |d| days_overdue(loan.due_date, d));
            (loan.fine, days)
        });

    let message: String = fine.map_or_else(
        || format!("Loan {} returned on time", request.loan_id),
        |amount| {
            format!(
                "Loan {} returned {days_overdue} day(s) late, fine {amount}",
                request.loan_id
            )
        },
    );

    let response: ReturnBookResponse = ReturnBookResponse {
        loan_id: request.loan_id,
        fine,
        days_overdue,
        message,
    };

    Ok(ApiResult {
        response,
        audit_event: transition_result.audit_event,
        new_state: transition_result.new_state,
    })
}

/// Records a fine payment via the API boundary with authorization.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the loan does not exist,
/// no fine is due, the fine was already paid, or the payment was not
/// confirmed.
pub fn pay_fine(
    state: &State,
    settings: &Settings,
    request: PayFineRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    today: Date,
) -> Result<ApiResult<PayFineResponse>, ApiError> {
    AuthorizationService::authorize_circulation(authenticated_actor)?;

    let actor: Actor = authenticated_actor.to_audit_actor();

    let command: Command = Command::PayFine {
        loan_id: request.loan_id,
        confirmed: request.confirmed,
    };

    let transition_result: TransitionResult =
        apply(state, settings, command, actor, cause, today).map_err(translate_core_error)?;

    let amount: u32 = transition_result
        .new_state
        .find_loan(request.loan_id)
        .and_then(|loan| loan.fine)
        .unwrap_or_default();

    let response: PayFineResponse = PayFineResponse {
        loan_id: request.loan_id,
        amount,
        message: format!("Collected fine of {amount} for loan {}", request.loan_id),
    };

    Ok(ApiResult {
        response,
        audit_event: transition_result.audit_event,
        new_state: transition_result.new_state,
    })
}

/// Lists loans for an actor, scoped by role.
///
/// Admins see every loan matching the filter; members see only their own.
/// The filter and the overdue classification are evaluated as of `today`.
///
/// # Errors
///
/// Returns an error if the filter string is not recognized.
pub fn list_loans(
    state: &State,
    authenticated_actor: &AuthenticatedActor,
    filter: Option<&str>,
    today: Date,
) -> Result<Vec<LoanView>, ApiError> {
    let filter: LoanFilter = match filter {
        Some(value) => LoanFilter::from_str(value).map_err(|message| ApiError::InvalidInput {
            field: String::from("filter"),
            message,
        })?,
        None => LoanFilter::All,
    };

    let loans: Vec<&Loan> = filter_loans(state, filter, today);
    let loans: Vec<&Loan> = match (&authenticated_actor.role, &authenticated_actor.membership_number)
    {
        (Role::Admin, _) => loans,
        (Role::Member, Some(own)) => loans
            .into_iter()
            .filter(|l| l.membership_number == *own)
            .collect(),
        (Role::Member, None) => Vec::new(),
    };

    Ok(loans
        .iter()
        .map(|loan| LoanView::from_loan(loan, today))
        .collect())
}

/// Maps an authenticated actor to a notification viewer.
///
/// # Errors
///
/// Returns an error if a member actor carries no membership number.
pub fn viewer_for(authenticated_actor: &AuthenticatedActor) -> Result<Viewer, ApiError> {
    match (&authenticated_actor.role, &authenticated_actor.membership_number) {
        (Role::Admin, _) => Ok(Viewer::Admin),
        (Role::Member, Some(membership_number)) => {
            Ok(Viewer::Member(membership_number.clone()))
        }
        (Role::Member, None) => Err(ApiError::AuthenticationFailed {
            reason: String::from("Member actors must carry a membership number"),
        }),
    }
}

/// Derives the notification feed for an actor as of `today`.
///
/// # Errors
///
/// Returns an error if the actor cannot be mapped to a viewer.
pub fn notification_feed(
    state: &State,
    read_store: &ReadStateStore,
    authenticated_actor: &AuthenticatedActor,
    today: Date,
) -> Result<Vec<Notification>, ApiError> {
    let viewer: Viewer = viewer_for(authenticated_actor)?;
    Ok(derive_notifications(state, &viewer, today, read_store))
}

/// Marks one notification read for an actor.
///
/// # Errors
///
/// Returns an error if the actor cannot be mapped to a viewer.
pub fn mark_notification_read(
    read_store: &mut ReadStateStore,
    authenticated_actor: &AuthenticatedActor,
    notification_id: &str,
) -> Result<(), ApiError> {
    let viewer: Viewer = viewer_for(authenticated_actor)?;
    read_store.mark_read(&viewer, notification_id);
    Ok(())
}

/// Marks an actor's entire current feed read and returns how many
/// notifications were covered.
///
/// # Errors
///
/// Returns an error if the actor cannot be mapped to a viewer.
pub fn mark_all_notifications_read(
    state: &State,
    read_store: &mut ReadStateStore,
    authenticated_actor: &AuthenticatedActor,
    today: Date,
) -> Result<usize, ApiError> {
    let viewer: Viewer = viewer_for(authenticated_actor)?;
    let feed: Vec<Notification> = derive_notifications(state, &viewer, today, read_store);
    read_store.mark_all_read(&viewer, feed.iter().map(|n| n.id.as_str()));
    Ok(feed.len())
}
