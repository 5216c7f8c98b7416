use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

/// Root handler — returns an HTML landing page with project info and links
pub async fn root_handler() -> impl IntoResponse {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>Campus Payroll API</title>
  <style>
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: 'Segoe UI', system-ui, sans-serif; background: #0f172a; color: #e2e8f0; min-height: 100vh; padding: 40px 20px; }
    .container { max-width: 820px; margin: 0 auto; }
    header { text-align: center; margin-bottom: 40px; }
    header h1 { font-size: 2.4rem; font-weight: 800; background: linear-gradient(135deg, #34d399, #3b82f6); -webkit-background-clip: text; -webkit-text-fill-color: transparent; margin-bottom: 8px; }
    header p { color: #94a3b8; font-size: 1.05rem; }
    .badge { display: inline-block; background: #1e293b; border: 1px solid #334155; color: #38bdf8; padding: 4px 12px; border-radius: 20px; font-size: 0.8rem; margin-top: 12px; }
    .routes { background: #1e293b; border: 1px solid #334155; border-radius: 12px; padding: 24px; }
    .routes h2 { font-size: 1.15rem; font-weight: 700; color: #f1f5f9; margin-bottom: 16px; }
    .route-group { margin-bottom: 18px; }
    .route-group h4 { font-size: 0.8rem; font-weight: 600; text-transform: uppercase; letter-spacing: 0.1em; color: #64748b; margin-bottom: 8px; }
    .route-item { display: flex; align-items: flex-start; gap: 12px; padding: 7px 0; border-bottom: 1px solid #0f172a; }
    .route-item:last-child { border-bottom: none; }
    .method { font-size: 0.7rem; font-weight: 700; padding: 2px 8px; border-radius: 4px; min-width: 52px; text-align: center; font-family: monospace; }
    .get { background: #064e3b; color: #34d399; }
    .post { background: #1e3a5f; color: #60a5fa; }
    .put, .patch { background: #451a03; color: #fb923c; }
    .delete { background: #4c0519; color: #fb7185; }
    .route-path { font-family: monospace; font-size: 0.85rem; color: #e2e8f0; flex: 1; }
    .route-desc { font-size: 0.8rem; color: #64748b; }
    footer { text-align: center; margin-top: 36px; color: #475569; font-size: 0.85rem; }
    a { color: #38bdf8; }
  </style>
</head>
<body>
<div class="container">
  <header>
    <h1>Campus Payroll API</h1>
    <p>Multi-institution payroll engine: attendance-driven salary derivation with an auditable record lifecycle</p>
    <span class="badge">v1.0.0 · REST API · JSON · <a href="/docs">Swagger UI</a></span>
  </header>

  <div class="routes">
    <h2>API Routes</h2>

    <div class="route-group">
      <h4>Tenants &amp; Auth</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/tenants/register</span><span class="route-desc">Register an institution + first admin</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/auth/login</span><span class="route-desc">Login, get a JWT</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/auth/me</span><span class="route-desc">Current user</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/users</span><span class="route-desc">Create a staff user with roles</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/holidays</span><span class="route-desc">Register an institution holiday</span></div>
    </div>

    <div class="route-group">
      <h4>Employees &amp; Attendance</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/employees</span><span class="route-desc">Register an employee</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/employees</span><span class="route-desc">List employees</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/employees/:id</span><span class="route-desc">Employee detail</span></div>
      <div class="route-item"><span class="method patch">PATCH</span><span class="route-path">/api/v1/employees/:id/salary</span><span class="route-desc">Set contracted base salary</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/employees/:id/attendance</span><span class="route-desc">Record a day of attendance</span></div>
    </div>

    <div class="route-group">
      <h4>Payroll</h4>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/payroll</span><span class="route-desc">List payroll records (filterable)</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/payroll</span><span class="route-desc">Create a record for an employee + month</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/payroll/:id</span><span class="route-desc">Record detail</span></div>
      <div class="route-item"><span class="method put">PUT</span><span class="route-path">/api/v1/payroll/:id</span><span class="route-desc">Update (full recomputation)</span></div>
      <div class="route-item"><span class="method delete">DELETE</span><span class="route-path">/api/v1/payroll/:id</span><span class="route-desc">Delete (drafts only)</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/payroll/:id/close</span><span class="route-desc">Close (locks editing)</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/payroll/:id/reopen</span><span class="route-desc">Reopen (justification required)</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/payroll/:id/pay</span><span class="route-desc">Mark as paid</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/payroll/:id/reverse-payment</span><span class="route-desc">Reverse a payment</span></div>
    </div>
  </div>

  <footer>
    <p>Built with Rust · Axum · SQLx · rust_decimal</p>
  </footer>
</div>
</body>
</html>"#)
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "service": "campus-payroll",
                "version": "1.0.0"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string()
            })),
        ),
    }
}
