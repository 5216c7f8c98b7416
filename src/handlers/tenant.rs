// src/handlers/tenant.rs

use crate::{
    auth::{ActorContext, generate_token},
    errors::{AppError, AppResult},
    models::{
        AuthResponse, CreateHolidayRequest, CreateUserRequest, Holiday, LoginRequest,
        RegisterTenantRequest, Role, Tenant, User, UserPublic,
    },
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use bcrypt::{DEFAULT_COST, hash, verify};
use uuid::Uuid;

const USER_ADMIN_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin];
const HOLIDAY_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin];

/// Register a new institution together with its first ADMIN user
#[utoipa::path(
    post,
    path = "/api/v1/tenants/register",
    request_body = RegisterTenantRequest,
    responses(
        (status = 201, description = "Institution registered", body = AuthResponse),
        (status = 409, description = "Email already exists"),
    ),
    tag = "Tenants & Auth"
)]
pub async fn register_tenant(
    State(state): State<AppState>,
    Json(body): Json<RegisterTenantRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM tenants WHERE email = $1")
        .bind(&body.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "institution with email '{}' already exists",
            body.email
        )));
    }

    let password_hash =
        hash(&body.password, DEFAULT_COST).map_err(|e| AppError::Internal(e.to_string()))?;

    let mut tx = state.db.begin().await?;

    let tenant = sqlx::query_as::<_, Tenant>(
        "INSERT INTO tenants (id, name, email, created_at) VALUES ($1, $2, $3, NOW()) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&body.name)
    .bind(&body.email)
    .fetch_one(&mut *tx)
    .await?;

    let admin = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, tenant_id, name, email, password_hash, roles, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(tenant.id)
    .bind(&body.admin_name)
    .bind(&body.admin_email)
    .bind(&password_hash)
    .bind(vec![Role::Admin.as_str().to_string()])
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict(
            format!("user with email '{}' already exists", body.admin_email),
        ),
        _ => AppError::from(e),
    })?;

    tx.commit().await?;

    let token = generate_token(
        admin.id,
        &admin.name,
        admin.tenant_id,
        &[Role::Admin],
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: admin.into(),
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Tenants & Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&body.email)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = verify(&body.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !valid {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let roles: Vec<Role> = user.roles.iter().filter_map(|r| Role::parse(r)).collect();
    let token = generate_token(
        user.id,
        &user.name,
        user.tenant_id,
        &roles,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserPublic),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tenants & Auth"
)]
pub async fn me(ctx: ActorContext, State(state): State<AppState>) -> AppResult<Json<UserPublic>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(ctx.user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Create a staff user in the institution with a role set
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserPublic),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing role"),
        (status = 409, description = "Email already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tenants & Auth"
)]
pub async fn create_user(
    ctx: ActorContext,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserPublic>)> {
    let tenant_id = ctx.require_tenant()?;
    ctx.require_any_role(USER_ADMIN_ROLES)?;

    if body.roles.is_empty() {
        return Err(AppError::Validation(
            "at least one role is required".to_string(),
        ));
    }

    let password_hash =
        hash(&body.password, DEFAULT_COST).map_err(|e| AppError::Internal(e.to_string()))?;
    let roles: Vec<String> = body.roles.iter().map(|r| r.as_str().to_string()).collect();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, tenant_id, name, email, password_hash, roles, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(tenant_id)
    .bind(&body.name)
    .bind(&body.email)
    .bind(&password_hash)
    .bind(&roles)
    .fetch_one(&state.db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!("user with email '{}' already exists", body.email))
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Register an institution holiday (excluded from business-day counts)
#[utoipa::path(
    post,
    path = "/api/v1/holidays",
    request_body = CreateHolidayRequest,
    responses(
        (status = 201, description = "Holiday created", body = Holiday),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Missing role"),
        (status = 409, description = "Holiday already registered for that date"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tenants & Auth"
)]
pub async fn create_holiday(
    ctx: ActorContext,
    State(state): State<AppState>,
    Json(body): Json<CreateHolidayRequest>,
) -> AppResult<(StatusCode, Json<Holiday>)> {
    let tenant_id = ctx.require_tenant()?;
    ctx.require_any_role(HOLIDAY_ROLES)?;

    let holiday = sqlx::query_as::<_, Holiday>(
        r#"
        INSERT INTO holidays (id, tenant_id, holiday_date, name)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(tenant_id)
    .bind(body.holiday_date)
    .bind(&body.name)
    .fetch_one(&state.db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict(
            format!("holiday already registered for {}", body.holiday_date),
        ),
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(holiday)))
}
