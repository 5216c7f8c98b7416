// src/models/mod.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ─── Roles ────────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Director,
    Secretariat,
    Hr,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Director => "DIRECTOR",
            Role::Secretariat => "SECRETARIAT",
            Role::Hr => "HR",
            Role::Staff => "STAFF",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "ADMIN" => Some(Role::Admin),
            "DIRECTOR" => Some(Role::Director),
            "SECRETARIAT" => Some(Role::Secretariat),
            "HR" => Some(Role::Hr),
            "STAFF" => Some(Role::Staff),
            _ => None,
        }
    }

    /// Global roles are not bound to a single institution.
    pub fn is_global(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

// ─── Payroll status ───────────────────────────────────────────────────────────

// sqlx 0.8: custom Postgres enums need #[sqlx(type_name = "...")] on the enum
#[derive(Debug, Copy, Clone, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "payroll_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Calculated,
    Closed,
    Paid,
}

impl PayrollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayrollStatus::Draft => "draft",
            PayrollStatus::Calculated => "calculated",
            PayrollStatus::Closed => "closed",
            PayrollStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PayrollStatus::Draft),
            "calculated" => Some(PayrollStatus::Calculated),
            "closed" => Some(PayrollStatus::Closed),
            "paid" => Some(PayrollStatus::Paid),
            _ => None,
        }
    }

    /// Closed and paid records reject every generic edit; only the dedicated
    /// transition endpoints may touch them.
    pub fn is_locked(&self) -> bool {
        matches!(self, PayrollStatus::Closed | PayrollStatus::Paid)
    }

    /// Status values a generic update may move this record to. Close, pay and
    /// their reversals go through their own endpoints and are never reachable
    /// from here.
    pub fn can_update_to(self, target: PayrollStatus) -> bool {
        matches!(
            (self, target),
            (PayrollStatus::Draft, PayrollStatus::Draft)
                | (PayrollStatus::Draft, PayrollStatus::Calculated)
                | (PayrollStatus::Calculated, PayrollStatus::Calculated)
                | (PayrollStatus::Calculated, PayrollStatus::Draft)
        )
    }
}

impl std::fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Attendance ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    AbsentJustified,
    AbsentUnjustified,
}

// ─── Tenant ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterTenantRequest {
    pub name: String,
    pub email: String,
    pub admin_name: String,
    pub admin_email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

// ─── Users (administrative actors) ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserPublic {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        UserPublic {
            id: u.id,
            tenant_id: u.tenant_id,
            name: u.name,
            email: u.email,
            roles: u.roles,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<Role>,
}

// ─── Employees ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position_id: Option<Uuid>,
    pub base_salary: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position_id: Option<Uuid>,
    pub base_salary: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetBaseSalaryRequest {
    pub base_salary: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordAttendanceRequest {
    /// Format: "YYYY-MM-DD"
    pub work_date: chrono::NaiveDate,
    pub status: AttendanceStatus,
    pub overtime_hours: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: chrono::NaiveDate,
    pub status: AttendanceStatus,
    pub overtime_hours: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateHolidayRequest {
    /// Format: "YYYY-MM-DD"
    pub holiday_date: chrono::NaiveDate,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Holiday {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub holiday_date: chrono::NaiveDate,
    pub name: String,
}

// ─── Payroll record ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub business_days: i32,
    pub base_salary: Decimal,
    pub daily_rate: Decimal,
    pub unjustified_absences: i32,
    pub absence_deduction: Decimal,
    pub hourly_rate: Decimal,
    pub overtime_hours: Decimal,
    pub overtime_pay: Decimal,
    pub bonus: Decimal,
    pub transport_benefit: Decimal,
    pub meal_benefit: Decimal,
    pub other_benefits: Decimal,
    pub inss: Decimal,
    pub irt: Decimal,
    pub other_deductions: Decimal,
    pub net_salary: Decimal,
    pub status: PayrollStatus,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<Uuid>,
    pub reopened_at: Option<DateTime<Utc>>,
    pub reopened_by: Option<Uuid>,
    pub reopen_justification: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by: Option<Uuid>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_note: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create request. employee_id/month/year are validated by hand so a missing
/// field comes back as a 400 with a usable message instead of a body-parse
/// rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePayrollRequest {
    pub employee_id: Option<Uuid>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub overtime_hours: Option<Decimal>,
    pub bonus: Option<Decimal>,
    pub transport_benefit: Option<Decimal>,
    pub meal_benefit: Option<Decimal>,
    pub other_benefits: Option<Decimal>,
    pub inss: Option<Decimal>,
    pub irt: Option<Decimal>,
    pub other_deductions: Option<Decimal>,
}

/// Update request. Omitted fields keep the stored value; every derived field
/// is recomputed regardless of what changed. `status` is a raw string so an
/// unknown literal maps to 400 and a known-but-disallowed transition to 403.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePayrollRequest {
    pub status: Option<String>,
    pub overtime_hours: Option<Decimal>,
    pub bonus: Option<Decimal>,
    pub transport_benefit: Option<Decimal>,
    pub meal_benefit: Option<Decimal>,
    pub other_benefits: Option<Decimal>,
    pub inss: Option<Decimal>,
    pub irt: Option<Decimal>,
    pub other_deductions: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReopenPayrollRequest {
    pub justification: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PayPayrollRequest {
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReversePaymentRequest {
    pub justification: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PayrollQuery {
    pub employee_id: Option<Uuid>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    /// One of: draft, calculated, closed, paid
    pub status: Option<String>,
}

// ─── JWT Claims ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub tenant_id: Option<Uuid>,
    pub roles: Vec<Role>,
    pub exp: usize,
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_transitions_stay_within_draft_and_calculated() {
        use PayrollStatus::*;

        assert!(Draft.can_update_to(Draft));
        assert!(Draft.can_update_to(Calculated));
        assert!(Calculated.can_update_to(Draft));
        assert!(Calculated.can_update_to(Calculated));

        assert!(!Draft.can_update_to(Closed));
        assert!(!Draft.can_update_to(Paid));
        assert!(!Calculated.can_update_to(Closed));
        assert!(!Calculated.can_update_to(Paid));
        assert!(!Closed.can_update_to(Draft));
        assert!(!Closed.can_update_to(Paid));
        assert!(!Paid.can_update_to(Closed));
        assert!(!Paid.can_update_to(Draft));
    }

    #[test]
    fn locked_statuses() {
        assert!(!PayrollStatus::Draft.is_locked());
        assert!(!PayrollStatus::Calculated.is_locked());
        assert!(PayrollStatus::Closed.is_locked());
        assert!(PayrollStatus::Paid.is_locked());
    }

    #[test]
    fn payroll_status_parse_round_trip() {
        for s in [
            PayrollStatus::Draft,
            PayrollStatus::Calculated,
            PayrollStatus::Closed,
            PayrollStatus::Paid,
        ] {
            assert_eq!(PayrollStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(PayrollStatus::parse("archived"), None);
    }

    #[test]
    fn role_parse_round_trip() {
        for r in [
            Role::SuperAdmin,
            Role::Admin,
            Role::Director,
            Role::Secretariat,
            Role::Hr,
            Role::Staff,
        ] {
            assert_eq!(Role::parse(r.as_str()), Some(r));
        }
        assert_eq!(Role::parse("PRINCIPAL"), None);
    }

    #[test]
    fn only_super_admin_is_global() {
        assert!(Role::SuperAdmin.is_global());
        assert!(!Role::Admin.is_global());
        assert!(!Role::Director.is_global());
        assert!(!Role::Hr.is_global());
    }
}
