// src/routes/mod.rs

use crate::{
    handlers::{
        employee::{
            create_employee, get_employee, list_employees, record_attendance, set_base_salary,
        },
        payroll::{
            close_payroll, create_payroll, delete_payroll, get_payroll, list_payroll, pay_payroll,
            reopen_payroll, reverse_payment, update_payroll,
        },
        tenant::{create_holiday, create_user, login, me, register_tenant},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, patch, post},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Tenants & Auth ───────────────────────────────────
        .route("/tenants/register", post(register_tenant))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/users", post(create_user))
        .route("/holidays", post(create_holiday))
        // ─── Employees & Attendance ───────────────────────────
        .route("/employees", post(create_employee).get(list_employees))
        .route("/employees/{employee_id}", get(get_employee))
        .route("/employees/{employee_id}/salary", patch(set_base_salary))
        .route(
            "/employees/{employee_id}/attendance",
            post(record_attendance),
        )
        // ─── Payroll ──────────────────────────────────────────
        .route("/payroll", post(create_payroll).get(list_payroll))
        .route(
            "/payroll/{record_id}",
            get(get_payroll)
                .put(update_payroll)
                .delete(delete_payroll),
        )
        .route("/payroll/{record_id}/close", post(close_payroll))
        .route("/payroll/{record_id}/reopen", post(reopen_payroll))
        .route("/payroll/{record_id}/pay", post(pay_payroll))
        .route(
            "/payroll/{record_id}/reverse-payment",
            post(reverse_payment),
        )
}
