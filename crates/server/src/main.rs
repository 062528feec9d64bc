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
#![allow(clippy::multiple_crate_versions)]

mod live;

use axum::{
    Json, Router,
    extract::{FromRef, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Date;
use tokio::sync::Mutex;
use tracing::info;

use libris::{DEFAULT_DAILY_FINE_RATE, Settings, State};
use libris_api::{
    AddBookRequest, ApiError, ApiResult, AuthenticatedActor, AuthorizationService,
    CancelMembershipRequest, CsvPreviewResult, ExtendMembershipRequest, IssueBookRequest,
    LoanView, PayFineRequest, RegisterMemberRequest, ReturnBookRequest, Role, UpdateBookRequest,
    add_book, authenticate_stub, cancel_membership, extend_membership, issue_book, list_loans,
    mark_all_notifications_read, mark_notification_read, notification_feed, pay_fine,
    preview_books_csv, register_member, return_book, update_book,
};
use libris_audit::{AuditEvent, Cause};
use libris_domain::MembershipNumber;
use libris_notify::{Notification, ReadStateStore};

/// Libris Server - HTTP server for the Libris circulation system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Daily fine rate, in whole currency units per overdue day
    #[arg(short, long, default_value_t = DEFAULT_DAILY_FINE_RATE)]
    daily_fine_rate: u32,
}

/// The in-memory circulation engine behind the Mutex.
///
/// All write handlers lock this before reading the current state, so
/// transitions are strictly serialized. Two simultaneous requests for the
/// last available copy of an item cannot both observe it as available.
struct Engine {
    /// The canonical circulation state.
    state: State,
    /// Fine policy settings, fixed at startup.
    settings: Settings,
    /// Ordered audit log of every accepted transition.
    audit_log: Vec<AuditEvent>,
    /// Per-viewer notification read marks.
    read_store: ReadStateStore,
}

impl Engine {
    fn new(settings: Settings) -> Self {
        Self {
            state: State::new(),
            settings,
            audit_log: Vec::new(),
            read_store: ReadStateStore::new(),
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The circulation engine, serialized behind a Mutex.
    engine: Arc<Mutex<Engine>>,
    /// Broadcaster for live WebSocket events.
    live: Arc<LiveEventBroadcaster>,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.live)
    }
}

/// Returns the current civil date in UTC.
///
/// Overdue classification, fines, and loan window checks are all evaluated
/// against this date at request time.
fn current_date() -> Date {
    time::OffsetDateTime::now_utc().date()
}

/// API request to add a catalog item.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct AddBookApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The serial number.
    serial: String,
    /// The title.
    title: String,
    /// The author (or director).
    author: String,
    /// Optional genre.
    genre: Option<String>,
    /// The media kind ("book" or "movie").
    kind: String,
    /// Total copies owned.
    copies: u32,
}

/// API request to update a catalog item.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct UpdateBookApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The serial number of the item to update.
    serial: String,
    /// New title, if changing.
    title: Option<String>,
    /// New author, if changing.
    author: Option<String>,
    /// New genre, if changing.
    genre: Option<String>,
    /// New total copy count, if changing.
    copies: Option<u32>,
}

/// API request to preview a CSV catalog import.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CsvPreviewApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The raw CSV text to validate.
    csv_text: String,
}

/// API request to register a member.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RegisterMemberApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The member's name.
    name: String,
    /// The member's email address.
    email: String,
    /// The membership start date (ISO 8601).
    start_date: String,
    /// The membership duration ("6months", "1year", or "2years").
    duration: String,
}

/// API request to extend a membership.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ExtendMembershipApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The membership number to extend.
    membership_number: String,
    /// The duration to extend by.
    duration: String,
}

/// API request to cancel a membership.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CancelMembershipApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The membership number to cancel.
    membership_number: String,
}

/// API request to issue an item to a member.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct IssueBookApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The serial number of the item.
    serial: String,
    /// The borrower's membership number.
    membership_number: String,
    /// The issue date (ISO 8601).
    issue_date: String,
    /// The due date (ISO 8601).
    due_date: String,
    /// Optional free-form remarks.
    remarks: Option<String>,
}

/// API request to return a borrowed item.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ReturnBookApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The loan to close.
    loan_id: i64,
    /// The return date (ISO 8601).
    return_date: String,
}

/// API request to record a fine payment.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct PayFineApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The loan whose fine is being paid.
    loan_id: i64,
    /// Whether the operator explicitly confirmed the payment.
    confirmed: bool,
}

/// API request to mark one notification read.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct MarkReadApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// The notification identifier to mark read.
    notification_id: String,
}

/// API request to mark an actor's entire feed read.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct MarkAllReadApiRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
}

/// Query parameters identifying the requesting actor on read endpoints.
#[derive(Debug, Deserialize)]
struct ActorQuery {
    /// The actor ID.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
}

/// Query parameters for listing loans.
#[derive(Debug, Deserialize)]
struct ListLoansQuery {
    /// The actor ID.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The actor's membership number, for member actors.
    actor_membership_number: Option<String>,
    /// Optional classification filter: "all", "open", "overdue", or "returned".
    filter: Option<String>,
}

/// Query parameters for listing catalog items.
#[derive(Debug, Deserialize)]
struct ListBooksQuery {
    /// When true, only items with at least one available copy are returned.
    available: Option<bool>,
}

/// API response for write operations without a richer payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriteResponse {
    /// Success indicator.
    success: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// API response for a successful catalog addition.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AddBookApiResponse {
    /// Success indicator.
    success: bool,
    /// The normalized serial number.
    serial: String,
    /// A success message.
    message: String,
}

/// API response for a successful member registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegisterMemberApiResponse {
    /// Success indicator.
    success: bool,
    /// The generated membership number.
    membership_number: String,
    /// The member's name.
    name: String,
    /// The computed membership end date (ISO 8601).
    end_date: String,
    /// A success message.
    message: String,
}

/// API response for a successful membership extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExtendMembershipApiResponse {
    /// Success indicator.
    success: bool,
    /// The membership number.
    membership_number: String,
    /// The new end date (ISO 8601).
    end_date: String,
    /// A success message.
    message: String,
}

/// API response for a successful issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IssueBookApiResponse {
    /// Success indicator.
    success: bool,
    /// The assigned loan identifier.
    loan_id: i64,
    /// The normalized serial number.
    serial: String,
    /// The borrower's membership number.
    membership_number: String,
    /// The due date (ISO 8601).
    due_date: String,
    /// A success message.
    message: String,
}

/// API response for a successful return.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReturnBookApiResponse {
    /// Success indicator.
    success: bool,
    /// The loan identifier.
    loan_id: i64,
    /// The fine assessed, if the return was late.
    fine: Option<u32>,
    /// Days past the due date. Zero for an on-time return.
    days_overdue: u32,
    /// A success message.
    message: String,
}

/// API response for a successful fine payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PayFineApiResponse {
    /// Success indicator.
    success: bool,
    /// The loan identifier.
    loan_id: i64,
    /// The amount collected.
    amount: u32,
    /// A success message.
    message: String,
}

/// Serializable representation of a catalog item for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookResponse {
    /// The serial number.
    serial: String,
    /// The title.
    title: String,
    /// The author (or director).
    author: String,
    /// Optional genre.
    genre: Option<String>,
    /// The media kind.
    kind: String,
    /// Total copies owned.
    copies: u32,
    /// Copies currently on the shelf.
    available_copies: u32,
}

/// API response for listing catalog items.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ListBooksApiResponse {
    /// The catalog items.
    books: Vec<BookResponse>,
}

/// Serializable representation of a member for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MemberResponse {
    /// The membership number.
    membership_number: String,
    /// The member's name.
    name: String,
    /// The member's email address.
    email: String,
    /// The membership start date (ISO 8601).
    start_date: String,
    /// The membership end date (ISO 8601).
    end_date: String,
    /// The membership duration.
    duration: String,
    /// The membership status.
    status: String,
}

/// API response for listing members.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ListMembersApiResponse {
    /// The registered members.
    members: Vec<MemberResponse>,
}

/// Serializable representation of a loan for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoanApiResponse {
    /// The loan identifier.
    loan_id: i64,
    /// The serial number of the borrowed item.
    serial: String,
    /// The borrower's membership number.
    membership_number: String,
    /// The issue date (ISO 8601).
    issue_date: String,
    /// The due date (ISO 8601).
    due_date: String,
    /// The return date, once returned (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    return_date: Option<String>,
    /// The classification as of the query date.
    status: String,
    /// The fine assessed, if any.
    fine: Option<u32>,
    /// Whether the fine has been paid, if one was assessed.
    fine_paid: Option<bool>,
}

impl From<LoanView> for LoanApiResponse {
    fn from(view: LoanView) -> Self {
        Self {
            loan_id: view.loan_id,
            serial: view.serial,
            membership_number: view.membership_number,
            issue_date: view.issue_date,
            due_date: view.due_date,
            return_date: view.return_date,
            status: view.status,
            fine: view.fine,
            fine_paid: view.fine_paid,
        }
    }
}

/// One row of a CSV import preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CsvRowApiResponse {
    /// The 1-based row number in the uploaded file.
    row_number: usize,
    /// The parsed serial number, when readable.
    serial: Option<String>,
    /// The parsed title, when readable.
    title: Option<String>,
    /// The parsed author, when readable.
    author: Option<String>,
    /// The parsed copy count, when readable.
    copies: Option<u32>,
    /// Whether the row would import cleanly.
    valid: bool,
    /// Validation errors for this row.
    errors: Vec<String>,
}

/// API response for a CSV import preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CsvPreviewApiResponse {
    /// Total data rows in the file.
    total_rows: usize,
    /// Rows that would import cleanly.
    valid_count: usize,
    /// Rows that would be rejected.
    invalid_count: usize,
    /// Per-row results, in file order.
    rows: Vec<CsvRowApiResponse>,
}

/// API response for marking the whole feed read.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MarkAllReadApiResponse {
    /// Success indicator.
    success: bool,
    /// How many notifications were marked read.
    marked: usize,
}

/// A state snapshot attached to an audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotResponse {
    /// Catalog item count.
    books: usize,
    /// Registered member count.
    members: usize,
    /// Open loan count.
    open_loans: usize,
}

/// Serializable representation of an `AuditEvent` for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuditEventResponse {
    /// The actor ID.
    actor_id: String,
    /// The actor type.
    actor_type: String,
    /// The cause ID.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The action name.
    action_name: String,
    /// Optional action details.
    action_details: Option<String>,
    /// The serial number this event touched, if any.
    serial: Option<String>,
    /// The membership number this event touched, if any.
    membership_number: Option<String>,
    /// The loan this event touched, if any.
    loan_id: Option<i64>,
    /// State before the transition.
    before: SnapshotResponse,
    /// State after the transition.
    after: SnapshotResponse,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::AuthenticationFailed { .. } => Self {
                status: StatusCode::UNAUTHORIZED,
                message: err.to_string(),
            },
            ApiError::Unauthorized { .. } => Self {
                status: StatusCode::FORBIDDEN,
                message: err.to_string(),
            },
            ApiError::ResourceNotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            ApiError::DomainRuleViolation { .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: err.to_string(),
            },
            ApiError::InvalidInput { .. } | ApiError::InvalidCsvFormat { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
        }
    }
}

/// Parses a role string into a Role enum.
fn parse_role(role_str: &str) -> Result<Role, HttpError> {
    match role_str.to_lowercase().as_str() {
        "admin" => Ok(Role::Admin),
        "member" => Ok(Role::Member),
        _ => Err(HttpError {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid role: '{role_str}'. Must be 'admin' or 'member'"),
        }),
    }
}

/// Parses and authenticates the actor fields carried on a request.
fn authenticate(
    actor_id: &str,
    actor_role: &str,
    actor_membership_number: Option<&str>,
) -> Result<AuthenticatedActor, HttpError> {
    let role: Role = parse_role(actor_role)?;
    let membership_number: Option<MembershipNumber> =
        actor_membership_number.map(MembershipNumber::new);
    authenticate_stub(actor_id.to_string(), role, membership_number).map_err(|e| HttpError {
        status: StatusCode::UNAUTHORIZED,
        message: e.to_string(),
    })
}

/// Handler for POST `/books` endpoint.
///
/// Adds a new item to the catalog.
async fn handle_add_book(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<AddBookApiRequest>,
) -> Result<Json<AddBookApiResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        serial = %req.serial,
        "Handling add_book request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);

    let request: AddBookRequest = AddBookRequest {
        serial: req.serial,
        title: req.title,
        author: req.author,
        genre: req.genre,
        kind: req.kind,
        copies: req.copies,
    };

    let mut engine = app_state.engine.lock().await;
    let ApiResult {
        response,
        audit_event,
        new_state,
    } = add_book(
        &engine.state,
        &engine.settings,
        request,
        &actor,
        cause,
        current_date(),
    )?;
    engine.state = new_state;
    engine.audit_log.push(audit_event);
    drop(engine);

    info!(serial = %response.serial, "Successfully added catalog item");

    app_state.live.broadcast(&LiveEvent::BookAdded {
        serial: response.serial.clone(),
    });

    Ok(Json(AddBookApiResponse {
        success: true,
        serial: response.serial,
        message: response.message,
    }))
}

/// Handler for GET `/books` endpoint.
///
/// Lists catalog items, optionally restricted to those with an available copy.
async fn handle_list_books(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> Json<ListBooksApiResponse> {
    info!(available = ?query.available, "Handling list_books request");

    let engine = app_state.engine.lock().await;
    let books: Vec<BookResponse> = engine
        .state
        .books
        .iter()
        .filter(|b| !query.available.unwrap_or(false) || b.has_available_copy())
        .map(|b| BookResponse {
            serial: b.serial.value().to_string(),
            title: b.title.clone(),
            author: b.author.clone(),
            genre: b.genre.clone(),
            kind: b.kind.as_str().to_string(),
            copies: b.copies,
            available_copies: b.available_copies,
        })
        .collect();
    drop(engine);

    Json(ListBooksApiResponse { books })
}

/// Handler for POST `/books/update` endpoint.
///
/// Updates an existing catalog item. Omitted fields are left unchanged.
async fn handle_update_book(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<UpdateBookApiRequest>,
) -> Result<Json<WriteResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        serial = %req.serial,
        "Handling update_book request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);

    let request: UpdateBookRequest = UpdateBookRequest {
        serial: req.serial,
        title: req.title,
        author: req.author,
        genre: req.genre,
        copies: req.copies,
    };

    let mut engine = app_state.engine.lock().await;
    let ApiResult {
        response,
        audit_event,
        new_state,
    } = update_book(
        &engine.state,
        &engine.settings,
        request,
        &actor,
        cause,
        current_date(),
    )?;
    engine.state = new_state;
    engine.audit_log.push(audit_event);
    drop(engine);

    info!(serial = %response.serial, "Successfully updated catalog item");

    app_state.live.broadcast(&LiveEvent::BookUpdated {
        serial: response.serial,
    });

    Ok(Json(WriteResponse {
        success: true,
        message: Some(response.message),
    }))
}

/// Handler for POST `/books/import/preview` endpoint.
///
/// Validates an uploaded CSV against the catalog without importing anything.
async fn handle_csv_preview(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CsvPreviewApiRequest>,
) -> Result<Json<CsvPreviewApiResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        "Handling csv_preview request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;
    AuthorizationService::authorize_manage_catalog(&actor)
        .map_err(ApiError::from)
        .map_err(HttpError::from)?;

    let engine = app_state.engine.lock().await;
    let preview: CsvPreviewResult =
        preview_books_csv(&req.csv_text, &engine.state).map_err(ApiError::from)?;
    drop(engine);

    let rows: Vec<CsvRowApiResponse> = preview
        .rows
        .into_iter()
        .map(|row| CsvRowApiResponse {
            row_number: row.row_number,
            serial: row.serial,
            title: row.title,
            author: row.author,
            copies: row.copies,
            valid: row.status == libris_api::CsvRowStatus::Valid,
            errors: row.errors,
        })
        .collect();

    Ok(Json(CsvPreviewApiResponse {
        total_rows: preview.total_rows,
        valid_count: preview.valid_count,
        invalid_count: preview.invalid_count,
        rows,
    }))
}

/// Handler for POST `/members` endpoint.
///
/// Registers a new member with a server-generated membership number.
async fn handle_register_member(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterMemberApiRequest>,
) -> Result<Json<RegisterMemberApiResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        name = %req.name,
        "Handling register_member request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);

    let request: RegisterMemberRequest = RegisterMemberRequest {
        name: req.name,
        email: req.email,
        start_date: req.start_date,
        duration: req.duration,
    };

    let mut engine = app_state.engine.lock().await;
    let ApiResult {
        response,
        audit_event,
        new_state,
    } = register_member(
        &engine.state,
        &engine.settings,
        request,
        &actor,
        cause,
        current_date(),
    )?;
    engine.state = new_state;
    engine.audit_log.push(audit_event);
    drop(engine);

    info!(
        membership_number = %response.membership_number,
        "Successfully registered member"
    );

    app_state.live.broadcast(&LiveEvent::MemberRegistered {
        membership_number: response.membership_number.clone(),
    });

    Ok(Json(RegisterMemberApiResponse {
        success: true,
        membership_number: response.membership_number,
        name: response.name,
        end_date: response.end_date,
        message: response.message,
    }))
}

/// Handler for GET `/members` endpoint.
///
/// Lists all registered members. Restricted to admins.
async fn handle_list_members(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<ListMembersApiResponse>, HttpError> {
    info!(
        actor_id = %query.actor_id,
        role = %query.actor_role,
        "Handling list_members request"
    );

    let actor: AuthenticatedActor = authenticate(
        &query.actor_id,
        &query.actor_role,
        query.actor_membership_number.as_deref(),
    )?;
    AuthorizationService::authorize_manage_members(&actor)
        .map_err(ApiError::from)
        .map_err(HttpError::from)?;

    let engine = app_state.engine.lock().await;
    let members: Vec<MemberResponse> = engine
        .state
        .members
        .iter()
        .map(|m| MemberResponse {
            membership_number: m.membership_number.value().to_string(),
            name: m.name.clone(),
            email: m.email.clone(),
            start_date: m.start_date.to_string(),
            end_date: m.end_date.to_string(),
            duration: m.duration.as_str().to_string(),
            status: m.status.as_str().to_string(),
        })
        .collect();
    drop(engine);

    Ok(Json(ListMembersApiResponse { members }))
}

/// Handler for POST `/members/extend` endpoint.
///
/// Extends a membership from its current end date.
async fn handle_extend_membership(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ExtendMembershipApiRequest>,
) -> Result<Json<ExtendMembershipApiResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        membership_number = %req.membership_number,
        "Handling extend_membership request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);

    let request: ExtendMembershipRequest = ExtendMembershipRequest {
        membership_number: req.membership_number,
        duration: req.duration,
    };

    let mut engine = app_state.engine.lock().await;
    let ApiResult {
        response,
        audit_event,
        new_state,
    } = extend_membership(
        &engine.state,
        &engine.settings,
        request,
        &actor,
        cause,
        current_date(),
    )?;
    engine.state = new_state;
    engine.audit_log.push(audit_event);
    drop(engine);

    info!(
        membership_number = %response.membership_number,
        end_date = %response.end_date,
        "Successfully extended membership"
    );

    app_state.live.broadcast(&LiveEvent::MembershipExtended {
        membership_number: response.membership_number.clone(),
        end_date: response.end_date.clone(),
    });

    Ok(Json(ExtendMembershipApiResponse {
        success: true,
        membership_number: response.membership_number,
        end_date: response.end_date,
        message: response.message,
    }))
}

/// Handler for POST `/members/cancel` endpoint.
///
/// Cancels a membership. Cancellation is terminal.
async fn handle_cancel_membership(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CancelMembershipApiRequest>,
) -> Result<Json<WriteResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        membership_number = %req.membership_number,
        "Handling cancel_membership request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);

    let request: CancelMembershipRequest = CancelMembershipRequest {
        membership_number: req.membership_number,
    };

    let mut engine = app_state.engine.lock().await;
    let ApiResult {
        response,
        audit_event,
        new_state,
    } = cancel_membership(
        &engine.state,
        &engine.settings,
        request,
        &actor,
        cause,
        current_date(),
    )?;
    engine.state = new_state;
    engine.audit_log.push(audit_event);
    drop(engine);

    info!(
        membership_number = %response.membership_number,
        "Successfully cancelled membership"
    );

    app_state.live.broadcast(&LiveEvent::MembershipCancelled {
        membership_number: response.membership_number,
    });

    Ok(Json(WriteResponse {
        success: true,
        message: Some(response.message),
    }))
}

/// Handler for POST `/loans/issue` endpoint.
///
/// Issues an item to a member. The copy decrement and the loan record are
/// committed together under the engine lock.
async fn handle_issue_book(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<IssueBookApiRequest>,
) -> Result<Json<IssueBookApiResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        serial = %req.serial,
        membership_number = %req.membership_number,
        "Handling issue_book request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);

    let request: IssueBookRequest = IssueBookRequest {
        serial: req.serial,
        membership_number: req.membership_number,
        issue_date: req.issue_date,
        due_date: req.due_date,
        remarks: req.remarks,
    };

    let mut engine = app_state.engine.lock().await;
    let ApiResult {
        response,
        audit_event,
        new_state,
    } = issue_book(
        &engine.state,
        &engine.settings,
        request,
        &actor,
        cause,
        current_date(),
    )?;
    engine.state = new_state;
    engine.audit_log.push(audit_event);
    drop(engine);

    info!(
        loan_id = response.loan_id,
        serial = %response.serial,
        "Successfully issued item"
    );

    app_state.live.broadcast(&LiveEvent::BookIssued {
        loan_id: response.loan_id,
        serial: response.serial.clone(),
        membership_number: response.membership_number.clone(),
    });

    Ok(Json(IssueBookApiResponse {
        success: true,
        loan_id: response.loan_id,
        serial: response.serial,
        membership_number: response.membership_number,
        due_date: response.due_date,
        message: response.message,
    }))
}

/// Handler for POST `/loans/return` endpoint.
///
/// Closes a loan, restores the copy, and assesses any overdue fine at the
/// rate in effect right now.
async fn handle_return_book(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ReturnBookApiRequest>,
) -> Result<Json<ReturnBookApiResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        loan_id = req.loan_id,
        "Handling return_book request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);

    let request: ReturnBookRequest = ReturnBookRequest {
        loan_id: req.loan_id,
        return_date: req.return_date,
    };

    let mut engine = app_state.engine.lock().await;
    let ApiResult {
        response,
        audit_event,
        new_state,
    } = return_book(
        &engine.state,
        &engine.settings,
        request,
        &actor,
        cause,
        current_date(),
    )?;
    engine.state = new_state;
    engine.audit_log.push(audit_event);
    drop(engine);

    info!(
        loan_id = response.loan_id,
        fine = ?response.fine,
        "Successfully returned item"
    );

    app_state.live.broadcast(&LiveEvent::BookReturned {
        loan_id: response.loan_id,
        fine: response.fine,
    });

    Ok(Json(ReturnBookApiResponse {
        success: true,
        loan_id: response.loan_id,
        fine: response.fine,
        days_overdue: response.days_overdue,
        message: response.message,
    }))
}

/// Handler for POST `/loans/pay_fine` endpoint.
///
/// Records payment of an assessed fine.
async fn handle_pay_fine(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<PayFineApiRequest>,
) -> Result<Json<PayFineApiResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        loan_id = req.loan_id,
        "Handling pay_fine request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;
    let cause: Cause = Cause::new(req.cause_id, req.cause_description);

    let request: PayFineRequest = PayFineRequest {
        loan_id: req.loan_id,
        confirmed: req.confirmed,
    };

    let mut engine = app_state.engine.lock().await;
    let ApiResult {
        response,
        audit_event,
        new_state,
    } = pay_fine(
        &engine.state,
        &engine.settings,
        request,
        &actor,
        cause,
        current_date(),
    )?;
    engine.state = new_state;
    engine.audit_log.push(audit_event);
    drop(engine);

    info!(
        loan_id = response.loan_id,
        amount = response.amount,
        "Successfully recorded fine payment"
    );

    app_state.live.broadcast(&LiveEvent::FinePaid {
        loan_id: response.loan_id,
        amount: response.amount,
    });

    Ok(Json(PayFineApiResponse {
        success: true,
        loan_id: response.loan_id,
        amount: response.amount,
        message: response.message,
    }))
}

/// Handler for GET `/loans` endpoint.
///
/// Lists loans with their read-time classification. Admins see every loan;
/// members see only their own.
async fn handle_list_loans(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Vec<LoanApiResponse>>, HttpError> {
    info!(
        actor_id = %query.actor_id,
        role = %query.actor_role,
        filter = ?query.filter,
        "Handling list_loans request"
    );

    let actor: AuthenticatedActor = authenticate(
        &query.actor_id,
        &query.actor_role,
        query.actor_membership_number.as_deref(),
    )?;

    let engine = app_state.engine.lock().await;
    let views: Vec<LoanView> = list_loans(
        &engine.state,
        &actor,
        query.filter.as_deref(),
        current_date(),
    )?;
    drop(engine);

    Ok(Json(views.into_iter().map(LoanApiResponse::from).collect()))
}

/// Handler for GET `/notifications` endpoint.
///
/// Derives the overdue and due-soon feed for the requesting actor.
async fn handle_notifications(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<Vec<Notification>>, HttpError> {
    info!(
        actor_id = %query.actor_id,
        role = %query.actor_role,
        "Handling notifications request"
    );

    let actor: AuthenticatedActor = authenticate(
        &query.actor_id,
        &query.actor_role,
        query.actor_membership_number.as_deref(),
    )?;

    let engine = app_state.engine.lock().await;
    let feed: Vec<Notification> =
        notification_feed(&engine.state, &engine.read_store, &actor, current_date())?;
    drop(engine);

    Ok(Json(feed))
}

/// Handler for POST `/notifications/read` endpoint.
///
/// Marks one notification read for the requesting actor only.
async fn handle_mark_read(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<MarkReadApiRequest>,
) -> Result<Json<WriteResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        notification_id = %req.notification_id,
        "Handling mark_read request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;

    let mut engine = app_state.engine.lock().await;
    mark_notification_read(&mut engine.read_store, &actor, &req.notification_id)?;
    drop(engine);

    Ok(Json(WriteResponse {
        success: true,
        message: None,
    }))
}

/// Handler for POST `/notifications/read_all` endpoint.
///
/// Marks the actor's entire current feed read.
async fn handle_mark_all_read(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<MarkAllReadApiRequest>,
) -> Result<Json<MarkAllReadApiResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        "Handling mark_all_read request"
    );

    let actor: AuthenticatedActor = authenticate(
        &req.actor_id,
        &req.actor_role,
        req.actor_membership_number.as_deref(),
    )?;

    let mut engine = app_state.engine.lock().await;
    let engine_ref: &mut Engine = &mut engine;
    let marked: usize = mark_all_notifications_read(
        &engine_ref.state,
        &mut engine_ref.read_store,
        &actor,
        current_date(),
    )?;
    drop(engine);

    Ok(Json(MarkAllReadApiResponse {
        success: true,
        marked,
    }))
}

/// Handler for GET `/audit/timeline` endpoint.
///
/// Returns the ordered audit event timeline. Restricted to admins.
async fn handle_audit_timeline(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<Vec<AuditEventResponse>>, HttpError> {
    info!(
        actor_id = %query.actor_id,
        role = %query.actor_role,
        "Handling audit_timeline request"
    );

    let actor: AuthenticatedActor = authenticate(
        &query.actor_id,
        &query.actor_role,
        query.actor_membership_number.as_deref(),
    )?;
    AuthorizationService::authorize_audit_timeline(&actor)
        .map_err(ApiError::from)
        .map_err(HttpError::from)?;

    let engine = app_state.engine.lock().await;
    let events: Vec<AuditEventResponse> = engine
        .audit_log
        .iter()
        .map(audit_event_to_response)
        .collect();
    drop(engine);

    Ok(Json(events))
}

/// Converts an `AuditEvent` to an `AuditEventResponse`.
fn audit_event_to_response(event: &AuditEvent) -> AuditEventResponse {
    AuditEventResponse {
        actor_id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
        cause_id: event.cause.id.clone(),
        cause_description: event.cause.description.clone(),
        action_name: event.action.name.clone(),
        action_details: event.action.details.clone(),
        serial: event.scope.serial.as_ref().map(|s| s.value().to_string()),
        membership_number: event
            .scope
            .membership_number
            .as_ref()
            .map(|m| m.value().to_string()),
        loan_id: event.scope.loan_id,
        before: SnapshotResponse {
            books: event.before.books,
            members: event.before.members,
            open_loans: event.before.open_loans,
        },
        after: SnapshotResponse {
            books: event.after.books,
            members: event.after.members,
            open_loans: event.after.open_loans,
        },
    }
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/books", post(handle_add_book))
        .route("/books", get(handle_list_books))
        .route("/books/update", post(handle_update_book))
        .route("/books/import/preview", post(handle_csv_preview))
        .route("/members", post(handle_register_member))
        .route("/members", get(handle_list_members))
        .route("/members/extend", post(handle_extend_membership))
        .route("/members/cancel", post(handle_cancel_membership))
        .route("/loans/issue", post(handle_issue_book))
        .route("/loans/return", post(handle_return_book))
        .route("/loans/pay_fine", post(handle_pay_fine))
        .route("/loans", get(handle_list_loans))
        .route("/notifications", get(handle_notifications))
        .route("/notifications/read", post(handle_mark_read))
        .route("/notifications/read_all", post(handle_mark_all_read))
        .route("/audit/timeline", get(handle_audit_timeline))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Libris Server");

    let settings: Settings = Settings::new(args.daily_fine_rate);
    info!(
        daily_fine_rate = settings.daily_fine_rate,
        "Fine policy configured"
    );

    let app_state: AppState = AppState {
        engine: Arc::new(Mutex::new(Engine::new(settings))),
        live: Arc::new(LiveEventBroadcaster::new()),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
