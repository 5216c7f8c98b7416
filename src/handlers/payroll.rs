// src/handlers/payroll.rs

use crate::{
    auth::ActorContext,
    errors::AppResult,
    models::{
        CreatePayrollRequest, PayPayrollRequest, PayrollQuery, PayrollRecord,
        ReopenPayrollRequest, ReversePaymentRequest, UpdatePayrollRequest,
    },
    services::lifecycle,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

/// List payroll records for the institution, newest period first
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, description = "List of payroll records", body = Vec<PayrollRecord>),
        (status = 400, description = "Invalid status filter"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payroll(
    ctx: ActorContext,
    State(state): State<AppState>,
    Query(query): Query<PayrollQuery>,
) -> AppResult<Json<Vec<PayrollRecord>>> {
    let records = lifecycle::list(&state.db, &ctx, &query).await?;
    Ok(Json(records))
}

/// Get a single payroll record
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{record_id}",
    params(("record_id" = Uuid, Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll record detail", body = PayrollRecord),
        (status = 403, description = "Employee belongs to another institution"),
        (status = 404, description = "Record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<PayrollRecord>> {
    let record = lifecycle::get(&state.db, &ctx, record_id).await?;
    Ok(Json(record))
}

/// Create a payroll record for an employee and month.
/// All monetary fields are derived from the employee master and attendance facts.
#[utoipa::path(
    post,
    path = "/api/v1/payroll",
    request_body = CreatePayrollRequest,
    responses(
        (status = 201, description = "Payroll record created", body = PayrollRecord),
        (status = 400, description = "Missing employee/month/year or no base salary"),
        (status = 403, description = "Employee belongs to another institution"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Record already exists for employee and period"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll(
    ctx: ActorContext,
    State(state): State<AppState>,
    Json(body): Json<CreatePayrollRequest>,
) -> AppResult<(StatusCode, Json<PayrollRecord>)> {
    let record = lifecycle::create(&state.db, &ctx, body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Update a payroll record while it is still editable.
/// Every derived field is recomputed regardless of which inputs changed.
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{record_id}",
    request_body = UpdatePayrollRequest,
    params(("record_id" = Uuid, Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll record updated", body = PayrollRecord),
        (status = 400, description = "Invalid status value"),
        (status = 403, description = "Record is closed/paid or transition not allowed"),
        (status = 404, description = "Record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Json(body): Json<UpdatePayrollRequest>,
) -> AppResult<Json<PayrollRecord>> {
    let record = lifecycle::update(&state.db, &ctx, record_id, body).await?;
    Ok(Json(record))
}

/// Permanently delete a payroll record (drafts only)
#[utoipa::path(
    delete,
    path = "/api/v1/payroll/{record_id}",
    params(("record_id" = Uuid, Path, description = "Payroll record ID")),
    responses(
        (status = 204, description = "Payroll record deleted"),
        (status = 403, description = "Record is not a draft"),
        (status = 404, description = "Record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_payroll(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    lifecycle::delete(&state.db, &ctx, record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Close a payroll record, locking it against further edits
#[utoipa::path(
    post,
    path = "/api/v1/payroll/{record_id}/close",
    params(("record_id" = Uuid, Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll record closed", body = PayrollRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Record already closed or paid"),
        (status = 404, description = "Record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn close_payroll(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<PayrollRecord>> {
    let record = lifecycle::close(&state.db, &ctx, record_id).await?;
    Ok(Json(record))
}

/// Reopen a closed payroll record (ADMIN/DIRECTOR, justification required)
#[utoipa::path(
    post,
    path = "/api/v1/payroll/{record_id}/reopen",
    request_body = ReopenPayrollRequest,
    params(("record_id" = Uuid, Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll record reopened", body = PayrollRecord),
        (status = 400, description = "Missing justification"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing role or record not closed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn reopen_payroll(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Json(body): Json<ReopenPayrollRequest>,
) -> AppResult<Json<PayrollRecord>> {
    let record = lifecycle::reopen(&state.db, &ctx, record_id, body.justification).await?;
    Ok(Json(record))
}

/// Mark a closed payroll record as paid
#[utoipa::path(
    post,
    path = "/api/v1/payroll/{record_id}/pay",
    request_body = PayPayrollRequest,
    params(("record_id" = Uuid, Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll record paid", body = PayrollRecord),
        (status = 400, description = "Missing payment method"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing role or record not closed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn pay_payroll(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Json(body): Json<PayPayrollRequest>,
) -> AppResult<Json<PayrollRecord>> {
    let record = lifecycle::pay(&state.db, &ctx, record_id, body).await?;
    Ok(Json(record))
}

/// Reverse a payment, returning the record to closed (ADMIN/DIRECTOR)
#[utoipa::path(
    post,
    path = "/api/v1/payroll/{record_id}/reverse-payment",
    request_body = ReversePaymentRequest,
    params(("record_id" = Uuid, Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payment reversed", body = PayrollRecord),
        (status = 400, description = "Missing justification"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing role or record not paid"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn reverse_payment(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Json(body): Json<ReversePaymentRequest>,
) -> AppResult<Json<PayrollRecord>> {
    let record =
        lifecycle::reverse_payment(&state.db, &ctx, record_id, body.justification).await?;
    Ok(Json(record))
}
