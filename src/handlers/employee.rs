// src/handlers/employee.rs

use crate::{
    auth::ActorContext,
    errors::{AppError, AppResult},
    models::{
        AttendanceRecord, CreateEmployeeRequest, Employee, RecordAttendanceRequest, Role,
        SetBaseSalaryRequest,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use uuid::Uuid;

const EMPLOYEE_WRITE_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Hr];
const ATTENDANCE_WRITE_ROLES: &[Role] =
    &[Role::SuperAdmin, Role::Admin, Role::Hr, Role::Secretariat];

/// Register a new employee in the institution
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing role"),
        (status = 409, description = "Employee email already exists in institution"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    ctx: ActorContext,
    State(state): State<AppState>,
    Json(body): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let tenant_id = ctx.require_tenant()?;
    ctx.require_any_role(EMPLOYEE_WRITE_ROLES)?;

    if let Some(salary) = body.base_salary {
        if salary < Decimal::ZERO {
            return Err(AppError::Validation(
                "base salary cannot be negative".to_string(),
            ));
        }
    }

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        INSERT INTO employees (
            id, tenant_id, first_name, last_name, email,
            position_id, base_salary, is_active, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(tenant_id)
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.email)
    .bind(body.position_id)
    .bind(body.base_salary)
    .fetch_one(&state.db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict(
            format!("employee with email '{}' already exists", body.email),
        ),
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(employee)))
}

/// List all employees of the institution
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses(
        (status = 200, description = "List of employees", body = Vec<Employee>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    ctx: ActorContext,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Employee>>> {
    let tenant_id = ctx.require_tenant()?;

    let employees = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE tenant_id = $1 ORDER BY created_at DESC",
    )
    .bind(tenant_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(employees))
}

/// Get a single employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee detail", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get_employee(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let tenant_id = ctx.require_tenant()?;

    let employee = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE id = $1 AND tenant_id = $2",
    )
    .bind(employee_id)
    .bind(tenant_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("employee {employee_id} not found")))?;

    Ok(Json(employee))
}

/// Set an employee's contracted base salary
#[utoipa::path(
    patch,
    path = "/api/v1/employees/{employee_id}/salary",
    request_body = SetBaseSalaryRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Salary updated", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing role"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn set_base_salary(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<SetBaseSalaryRequest>,
) -> AppResult<Json<Employee>> {
    let tenant_id = ctx.require_tenant()?;
    ctx.require_any_role(EMPLOYEE_WRITE_ROLES)?;

    if body.base_salary < Decimal::ZERO {
        return Err(AppError::Validation(
            "base salary cannot be negative".to_string(),
        ));
    }

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        UPDATE employees SET base_salary = $1, updated_at = NOW()
        WHERE id = $2 AND tenant_id = $3
        RETURNING *
        "#,
    )
    .bind(body.base_salary)
    .bind(employee_id)
    .bind(tenant_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("employee {employee_id} not found")))?;

    Ok(Json(employee))
}

/// Record one day of attendance for an employee. Re-submitting the same day
/// overwrites the earlier entry (corrections).
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/attendance",
    request_body = RecordAttendanceRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing role"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn record_attendance(
    ctx: ActorContext,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<RecordAttendanceRequest>,
) -> AppResult<(StatusCode, Json<AttendanceRecord>)> {
    let tenant_id = ctx.require_tenant()?;
    ctx.require_any_role(ATTENDANCE_WRITE_ROLES)?;

    let overtime = body.overtime_hours.unwrap_or_default();
    if overtime < Decimal::ZERO {
        return Err(AppError::Validation(
            "overtime hours cannot be negative".to_string(),
        ));
    }

    let exists = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM employees WHERE id = $1 AND tenant_id = $2",
    )
    .bind(employee_id)
    .bind(tenant_id)
    .fetch_optional(&state.db)
    .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "employee {employee_id} not found"
        )));
    }

    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        INSERT INTO attendance_records (id, employee_id, work_date, status, overtime_hours, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (employee_id, work_date) DO UPDATE
        SET status = EXCLUDED.status,
            overtime_hours = EXCLUDED.overtime_hours
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(body.work_date)
    .bind(body.status)
    .bind(overtime)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}
