//! HTTP request handlers for the leave ledger API.
//!
//! This module contains the router and the handler functions for all API
//! endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::models::{BalanceKey, BalanceView, Employee, LeaveRequest, Role};

use super::request::{
    ApplyCompOffQuery, BalanceListQuery, CreatePolicyRequest, GrantCompOffRequest,
    LeaveListQuery, OpenBalanceRequest, PolicyListQuery, RecordTimeEntryRequest,
    RegisterEmployeeRequest, SetAdjustmentRequest, SubmitLeaveRequest, TimeSummaryQuery,
};
use super::response::{
    ApiError, ApiErrorResponse, CompOffAppliedResponse, LeaveRequestResponse,
    TimeSummaryResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/employees", post(register_employee_handler))
        .route(
            "/employees/:employee_id/leave-requests",
            get(list_leave_requests_handler),
        )
        .route("/employees/:employee_id/comp-offs", get(list_comp_offs_handler))
        .route("/employees/:employee_id/balances", get(list_balances_handler))
        .route("/employees/:employee_id/years/:year/open", post(open_year_handler))
        .route("/employees/:employee_id/time-summary", get(time_summary_handler))
        .route("/policies", post(create_policy_handler))
        .route("/policies/:policy_id/deactivate", post(deactivate_policy_handler))
        .route(
            "/organizations/:organization_id/policies",
            get(list_policies_handler),
        )
        .route("/leave-requests", post(submit_leave_handler))
        .route("/leave-requests/:request_id", get(get_leave_handler))
        .route("/leave-requests/:request_id/approve", post(approve_leave_handler))
        .route("/leave-requests/:request_id/reject", post(reject_leave_handler))
        .route("/leave-requests/:request_id/cancel", post(cancel_leave_handler))
        .route("/comp-offs", post(grant_comp_off_handler))
        .route("/comp-offs/:grant_id", get(get_comp_off_handler))
        .route("/comp-offs/:grant_id/apply", post(apply_comp_off_handler))
        .route(
            "/balances/:employee_id/:policy_id/:year",
            get(get_balance_handler),
        )
        .route(
            "/balances/:employee_id/:policy_id/:year/opening",
            put(open_balance_handler),
        )
        .route(
            "/balances/:employee_id/:policy_id/:year/adjustment",
            put(set_adjustment_handler),
        )
        .route("/time-entries", post(record_time_entry_handler))
        .with_state(state)
}

/// Maps a body extraction failure to a 400 response.
fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

/// Renders a ledger result, logging failures against the correlation id.
fn respond<T: Serialize>(
    status: StatusCode,
    result: LedgerResult<T>,
    correlation_id: Uuid,
    operation: &'static str,
) -> Response {
    match result {
        Ok(body) => {
            info!(correlation_id = %correlation_id, operation, "Request completed");
            (status, Json(body)).into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                "Request failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Resolves a balance key, checking the employee exists and the policy
/// belongs to the employee's organization.
fn resolve_balance_key(
    ledger: &Ledger,
    employee_id: Uuid,
    policy_id: Uuid,
    year: i32,
) -> LedgerResult<BalanceKey> {
    let employee = ledger.directory.get(employee_id)?;
    let policy = ledger
        .policies
        .get_in_org(policy_id, employee.organization_id)?;
    Ok(BalanceKey::new(employee.id, policy.id, year))
}

fn with_balance(ledger: &Ledger, request: LeaveRequest) -> LedgerResult<LeaveRequestResponse> {
    let available_balance = ledger.requests.balance_for(&request).current_balance()?;
    Ok(LeaveRequestResponse {
        request,
        available_balance,
    })
}

/// Handler for GET /health.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Handler for POST /employees.
async fn register_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterEmployeeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Registering employee");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let employee = Employee {
        id: Uuid::new_v4(),
        organization_id: request.organization_id,
        name: request.name,
        role: request.role.unwrap_or(Role::Employee),
    };
    let result = state.ledger().directory.register(employee);
    respond(StatusCode::CREATED, result, correlation_id, "register_employee")
}

/// Handler for POST /policies.
async fn create_policy_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreatePolicyRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Creating leave policy");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let result = state.ledger().policies.create(request.into());
    respond(StatusCode::CREATED, result, correlation_id, "create_policy")
}

/// Handler for GET /organizations/{organization_id}/policies.
async fn list_policies_handler(
    State(state): State<AppState>,
    Path(organization_id): Path<Uuid>,
    Query(query): Query<PolicyListQuery>,
) -> Response {
    let policies = state
        .ledger()
        .policies
        .list(organization_id, query.include_inactive);
    (StatusCode::OK, Json(policies)).into_response()
}

/// Handler for POST /policies/{policy_id}/deactivate.
async fn deactivate_policy_handler(
    State(state): State<AppState>,
    Path(policy_id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state.ledger().policies.deactivate(policy_id);
    respond(StatusCode::OK, result, correlation_id, "deactivate_policy")
}

/// Handler for POST /leave-requests.
///
/// The request is created pending; the balance is reported but not checked.
async fn submit_leave_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmitLeaveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Submitting leave request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let ledger = state.ledger();
    let result = ledger
        .requests
        .submit(request.into())
        .and_then(|r| with_balance(ledger, r));
    respond(StatusCode::CREATED, result, correlation_id, "submit_leave")
}

/// Handler for GET /leave-requests/{request_id}.
async fn get_leave_handler(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let ledger = state.ledger();
    let result = ledger
        .requests
        .get(request_id)
        .and_then(|r| with_balance(ledger, r));
    respond(StatusCode::OK, result, correlation_id, "get_leave")
}

/// Handler for POST /leave-requests/{request_id}/approve.
async fn approve_leave_handler(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, request_id = %request_id, "Approving leave request");
    let ledger = state.ledger();
    let result = ledger
        .requests
        .approve(request_id)
        .and_then(|r| with_balance(ledger, r));
    respond(StatusCode::OK, result, correlation_id, "approve_leave")
}

/// Handler for POST /leave-requests/{request_id}/reject.
async fn reject_leave_handler(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, request_id = %request_id, "Rejecting leave request");
    let ledger = state.ledger();
    let result = ledger
        .requests
        .reject(request_id)
        .and_then(|r| with_balance(ledger, r));
    respond(StatusCode::OK, result, correlation_id, "reject_leave")
}

/// Handler for POST /leave-requests/{request_id}/cancel.
async fn cancel_leave_handler(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, request_id = %request_id, "Cancelling leave request");
    let ledger = state.ledger();
    let result = ledger
        .requests
        .cancel(request_id)
        .and_then(|r| with_balance(ledger, r));
    respond(StatusCode::OK, result, correlation_id, "cancel_leave")
}

/// Handler for GET /employees/{employee_id}/leave-requests.
async fn list_leave_requests_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<LeaveListQuery>,
) -> Response {
    let requests = state
        .ledger()
        .requests
        .list_for_employee(employee_id, query.status);
    (StatusCode::OK, Json(requests)).into_response()
}

/// Handler for POST /comp-offs.
async fn grant_comp_off_handler(
    State(state): State<AppState>,
    payload: Result<Json<GrantCompOffRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Granting comp-off");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let result = state.ledger().comp_offs.grant(request.into());
    respond(StatusCode::CREATED, result, correlation_id, "grant_comp_off")
}

/// Handler for GET /comp-offs/{grant_id}.
async fn get_comp_off_handler(
    State(state): State<AppState>,
    Path(grant_id): Path<Uuid>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state.ledger().comp_offs.get(grant_id);
    respond(StatusCode::OK, result, correlation_id, "get_comp_off")
}

/// Handler for POST /comp-offs/{grant_id}/apply.
///
/// Credits the organization's comp-off policy unless `?policy_id=` names
/// another policy.
async fn apply_comp_off_handler(
    State(state): State<AppState>,
    Path(grant_id): Path<Uuid>,
    Query(query): Query<ApplyCompOffQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, grant_id = %grant_id, "Applying comp-off");

    let comp_offs = &state.ledger().comp_offs;
    let result = match query.policy_id {
        Some(policy_id) => comp_offs.apply_to(grant_id, policy_id),
        None => comp_offs.apply(grant_id),
    }
    .and_then(|(grant, balance)| {
        Ok(CompOffAppliedResponse {
            grant,
            balance: BalanceView::try_from(&balance)?,
        })
    });
    respond(StatusCode::OK, result, correlation_id, "apply_comp_off")
}

/// Handler for GET /employees/{employee_id}/comp-offs.
async fn list_comp_offs_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Response {
    let grants = state.ledger().comp_offs.list_for_employee(employee_id);
    (StatusCode::OK, Json(grants)).into_response()
}

/// Handler for GET /balances/{employee_id}/{policy_id}/{year}.
async fn get_balance_handler(
    State(state): State<AppState>,
    Path((employee_id, policy_id, year)): Path<(Uuid, Uuid, i32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let ledger = state.ledger();
    let result = resolve_balance_key(ledger, employee_id, policy_id, year)
        .and_then(|key| BalanceView::try_from(&ledger.balances.get_balance(key)));
    respond(StatusCode::OK, result, correlation_id, "get_balance")
}

/// Handler for GET /employees/{employee_id}/balances?year=.
async fn list_balances_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<BalanceListQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result: LedgerResult<Vec<BalanceView>> = state
        .ledger()
        .balances
        .list_for_employee(employee_id, query.year)
        .iter()
        .map(BalanceView::try_from)
        .collect();
    respond(StatusCode::OK, result, correlation_id, "list_balances")
}

/// Handler for PUT /balances/{employee_id}/{policy_id}/{year}/opening.
async fn open_balance_handler(
    State(state): State<AppState>,
    Path((employee_id, policy_id, year)): Path<(Uuid, Uuid, i32)>,
    payload: Result<Json<OpenBalanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Opening balance");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let ledger = state.ledger();
    let result = resolve_balance_key(ledger, employee_id, policy_id, year)
        .and_then(|key| ledger.balances.open(key, request.opening_balance))
        .and_then(|row| BalanceView::try_from(&row));
    respond(StatusCode::OK, result, correlation_id, "open_balance")
}

/// Handler for PUT /balances/{employee_id}/{policy_id}/{year}/adjustment.
async fn set_adjustment_handler(
    State(state): State<AppState>,
    Path((employee_id, policy_id, year)): Path<(Uuid, Uuid, i32)>,
    payload: Result<Json<SetAdjustmentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Setting balance adjustment");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let ledger = state.ledger();
    let result = resolve_balance_key(ledger, employee_id, policy_id, year)
        .and_then(|key| ledger.balances.set_adjustment(key, request.adjustment))
        .and_then(|row| BalanceView::try_from(&row));
    respond(StatusCode::OK, result, correlation_id, "set_adjustment")
}

/// Handler for POST /employees/{employee_id}/years/{year}/open.
async fn open_year_handler(
    State(state): State<AppState>,
    Path((employee_id, year)): Path<(Uuid, i32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state
        .ledger()
        .open_year(employee_id, year)
        .and_then(|rows| {
            rows.iter()
                .map(BalanceView::try_from)
                .collect::<LedgerResult<Vec<_>>>()
        });
    respond(StatusCode::OK, result, correlation_id, "open_year")
}

/// Handler for POST /time-entries.
async fn record_time_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecordTimeEntryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let result = state.ledger().time_entries.record(
        request.employee_id,
        request.entry_type,
        request.entry_time,
    );
    respond(StatusCode::CREATED, result, correlation_id, "record_time_entry")
}

/// Handler for GET /employees/{employee_id}/time-summary.
async fn time_summary_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<TimeSummaryQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = state
        .ledger()
        .time_entries
        .summarize(employee_id, query.start_date, query.end_date)
        .map(|summaries| TimeSummaryResponse {
            employee_id,
            start_date: query.start_date,
            end_date: query.end_date,
            total_minutes: summaries.total_minutes(),
            days: summaries.iter().collect(),
        });
    respond(StatusCode::OK, result, correlation_id, "time_summary")
}
