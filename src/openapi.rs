// src/openapi.rs

use crate::models::{
    AttendanceRecord, AttendanceStatus, AuthResponse, CreateEmployeeRequest, CreateHolidayRequest,
    CreatePayrollRequest, CreateUserRequest, Employee, Holiday, LoginRequest, PayPayrollRequest,
    PayrollRecord, PayrollStatus, RecordAttendanceRequest, RegisterTenantRequest,
    ReopenPayrollRequest, ReversePaymentRequest, Role, SetBaseSalaryRequest, Tenant,
    UpdatePayrollRequest, UserPublic,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus Payroll API",
        version = "1.0.0",
        description = "Institutional back-office payroll engine built with Rust and Axum. \
            Derives monthly net salaries from attendance facts and the employee master, \
            and enforces an auditable draft → calculated → closed → paid record lifecycle \
            across institutions.",
        license(name = "MIT")
    ),
    paths(
        // Tenants & Auth
        crate::handlers::tenant::register_tenant,
        crate::handlers::tenant::login,
        crate::handlers::tenant::me,
        crate::handlers::tenant::create_user,
        crate::handlers::tenant::create_holiday,
        // Employees & Attendance
        crate::handlers::employee::create_employee,
        crate::handlers::employee::list_employees,
        crate::handlers::employee::get_employee,
        crate::handlers::employee::set_base_salary,
        crate::handlers::employee::record_attendance,
        // Payroll
        crate::handlers::payroll::list_payroll,
        crate::handlers::payroll::get_payroll,
        crate::handlers::payroll::create_payroll,
        crate::handlers::payroll::update_payroll,
        crate::handlers::payroll::delete_payroll,
        crate::handlers::payroll::close_payroll,
        crate::handlers::payroll::reopen_payroll,
        crate::handlers::payroll::pay_payroll,
        crate::handlers::payroll::reverse_payment,
    ),
    components(
        schemas(
            RegisterTenantRequest, LoginRequest, AuthResponse, Tenant, UserPublic,
            CreateUserRequest, Role,
            CreateEmployeeRequest, Employee, SetBaseSalaryRequest,
            RecordAttendanceRequest, AttendanceRecord, AttendanceStatus,
            CreateHolidayRequest, Holiday,
            CreatePayrollRequest, UpdatePayrollRequest, ReopenPayrollRequest,
            PayPayrollRequest, ReversePaymentRequest, PayrollRecord, PayrollStatus,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Tenants & Auth", description = "Institution registration, login and staff users"),
        (name = "Employees", description = "Employee master data"),
        (name = "Attendance", description = "Daily attendance and overtime facts"),
        (name = "Payroll", description = "Payroll records: derivation and lifecycle"),
    )
)]
pub struct ApiDoc;
