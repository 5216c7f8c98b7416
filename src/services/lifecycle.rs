// src/services/lifecycle.rs
//
// The payroll record state machine: create, update, close, reopen, pay,
// reverse-payment, delete. Every mutating operation locks the row, re-derives
// the monetary fields from facts read inside the same transaction, performs
// one atomic write, then emits an audit event (best-effort). Blocked attempts
// are audited too.

use crate::{
    auth::ActorContext,
    errors::{AppError, AppResult},
    models::{
        CreatePayrollRequest, Employee, PayPayrollRequest, PayrollQuery, PayrollRecord,
        PayrollStatus, Role, UpdatePayrollRequest,
    },
    services::{
        attendance,
        audit::{self, AuditEvent},
        calculator::{self, AttendanceFacts, DerivedPay, ManualInputs},
    },
    store,
};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

pub const REOPEN_ROLES: &[Role] = &[Role::Admin, Role::Director];
pub const PAY_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin, Role::Secretariat, Role::Hr];
pub const REVERSE_ROLES: &[Role] = &[Role::Admin, Role::Director];

// ─── Queries ──────────────────────────────────────────────────────────────────

pub async fn list(
    db: &PgPool,
    ctx: &ActorContext,
    query: &PayrollQuery,
) -> AppResult<Vec<PayrollRecord>> {
    let tenant_id = ctx.require_tenant()?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            PayrollStatus::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("invalid status value '{raw}'")))?,
        ),
        None => None,
    };

    store::list_records(db, tenant_id, query.employee_id, query.month, query.year, status).await
}

pub async fn get(db: &PgPool, ctx: &ActorContext, record_id: Uuid) -> AppResult<PayrollRecord> {
    let tenant_id = ctx.require_tenant()?;
    let mut conn = db.acquire().await?;

    let record = store::find_record(&mut conn, record_id)
        .await?
        .filter(|r| r.tenant_id == tenant_id)
        .ok_or_else(|| AppError::NotFound(format!("payroll record {record_id} not found")))?;

    // The primary-key hit alone is not enough: the resolved employee must
    // also live in the caller's institution.
    let employee = store::find_employee(&mut conn, record.employee_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("employee {} not found", record.employee_id))
        })?;
    if employee.tenant_id != tenant_id {
        return Err(AppError::Forbidden(
            "employee belongs to another institution".to_string(),
        ));
    }

    Ok(record)
}

// ─── Transitions ──────────────────────────────────────────────────────────────

pub async fn create(
    db: &PgPool,
    ctx: &ActorContext,
    req: CreatePayrollRequest,
) -> AppResult<PayrollRecord> {
    let tenant_id = ctx.require_tenant()?;

    let employee_id = req
        .employee_id
        .ok_or_else(|| AppError::Validation("employee_id is required".to_string()))?;
    let month = req
        .month
        .ok_or_else(|| AppError::Validation("month is required".to_string()))?;
    let year = req
        .year
        .ok_or_else(|| AppError::Validation("year is required".to_string()))?;
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }

    let mut tx = db.begin().await?;
    let employee = resolve_employee(&mut tx, tenant_id, employee_id).await?;

    let facts =
        attendance::collect(&mut tx, tenant_id, employee.id, year, month, req.overtime_hours)
            .await?;
    let inputs = ManualInputs {
        bonus: req.bonus.unwrap_or_default(),
        transport_benefit: req.transport_benefit.unwrap_or_default(),
        meal_benefit: req.meal_benefit.unwrap_or_default(),
        other_benefits: req.other_benefits.unwrap_or_default(),
        inss: req.inss,
        irt: req.irt.unwrap_or_default(),
        other_deductions: req.other_deductions.unwrap_or_default(),
    };
    let derived = calculator::derive_all(&facts, &inputs);

    let now = Utc::now();
    let mut record = PayrollRecord {
        id: Uuid::new_v4(),
        tenant_id,
        employee_id: employee.id,
        month,
        year,
        business_days: 0,
        base_salary: facts.base_salary,
        daily_rate: Default::default(),
        unjustified_absences: 0,
        absence_deduction: Default::default(),
        hourly_rate: Default::default(),
        overtime_hours: Default::default(),
        overtime_pay: Default::default(),
        bonus: Default::default(),
        transport_benefit: Default::default(),
        meal_benefit: Default::default(),
        other_benefits: Default::default(),
        inss: Default::default(),
        irt: Default::default(),
        other_deductions: Default::default(),
        net_salary: Default::default(),
        status: PayrollStatus::Draft,
        closed_at: None,
        closed_by: None,
        reopened_at: None,
        reopened_by: None,
        reopen_justification: None,
        paid_at: None,
        paid_by: None,
        payment_method: None,
        payment_reference: None,
        payment_note: None,
        created_by: ctx.user_id,
        created_at: now,
        updated_at: now,
    };
    apply_derivation(&mut record, &facts, &inputs, &derived);

    // The unique constraint decides the race between two concurrent creates;
    // no prior existence check.
    let inserted = store::insert_record(&mut tx, &record).await?;
    tx.commit().await?;

    info!(record_id = %inserted.id, employee_id = %employee.id, month, year, "payroll record created");
    audit::emit(
        db,
        ctx,
        AuditEvent::new("create", inserted.id).with_snapshots(None, Some(snapshot(&inserted))),
    )
    .await;

    Ok(inserted)
}

pub async fn update(
    db: &PgPool,
    ctx: &ActorContext,
    record_id: Uuid,
    req: UpdatePayrollRequest,
) -> AppResult<PayrollRecord> {
    let tenant_id = ctx.require_tenant()?;

    // An unknown status literal is a validation failure before any I/O.
    let requested_status = match req.status.as_deref() {
        Some(raw) => Some(
            PayrollStatus::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("invalid status value '{raw}'")))?,
        ),
        None => None,
    };

    let mut tx = db.begin().await?;
    let current = lock_scoped_record(&mut tx, tenant_id, record_id).await?;
    let before = snapshot(&current);

    if current.status.is_locked() {
        drop(tx);
        audit::emit(
            db,
            ctx,
            AuditEvent::new("update_blocked", record_id)
                .with_note(format!("record is {}", current.status)),
        )
        .await;
        return Err(AppError::Forbidden(format!(
            "payroll record is {}; editing is locked",
            current.status
        )));
    }

    if let Some(target) = requested_status {
        if !current.status.can_update_to(target) {
            drop(tx);
            audit::emit(
                db,
                ctx,
                AuditEvent::new("update_blocked", record_id)
                    .with_note(format!("status transition {} -> {}", current.status, target)),
            )
            .await;
            return Err(AppError::Forbidden(format!(
                "status transition {} -> {} is not allowed via update",
                current.status, target
            )));
        }
    }

    // Re-resolve the employee and the attendance facts inside this
    // transaction: the base salary is resynced from the master record on
    // every write, stored values are never trusted.
    let employee = resolve_employee(&mut tx, tenant_id, current.employee_id).await?;
    let facts = attendance::collect(
        &mut tx,
        tenant_id,
        employee.id,
        current.year,
        current.month,
        req.overtime_hours,
    )
    .await?;

    let inputs = ManualInputs {
        bonus: req.bonus.unwrap_or(current.bonus),
        transport_benefit: req.transport_benefit.unwrap_or(current.transport_benefit),
        meal_benefit: req.meal_benefit.unwrap_or(current.meal_benefit),
        other_benefits: req.other_benefits.unwrap_or(current.other_benefits),
        inss: Some(req.inss.unwrap_or(current.inss)),
        irt: req.irt.unwrap_or(current.irt),
        other_deductions: req.other_deductions.unwrap_or(current.other_deductions),
    };
    let derived = calculator::derive_all(&facts, &inputs);

    let mut record = current;
    apply_derivation(&mut record, &facts, &inputs, &derived);
    if let Some(target) = requested_status {
        record.status = target;
    }

    let updated = store::update_record(&mut tx, &record).await?;
    tx.commit().await?;

    audit::emit(
        db,
        ctx,
        AuditEvent::new("update", updated.id).with_snapshots(Some(before), Some(snapshot(&updated))),
    )
    .await;

    Ok(updated)
}

pub async fn close(db: &PgPool, ctx: &ActorContext, record_id: Uuid) -> AppResult<PayrollRecord> {
    let tenant_id = ctx.require_tenant()?;

    let mut tx = db.begin().await?;
    let current = lock_scoped_record(&mut tx, tenant_id, record_id).await?;
    let before = snapshot(&current);

    if current.status.is_locked() {
        drop(tx);
        audit::emit(
            db,
            ctx,
            AuditEvent::new("close_blocked", record_id)
                .with_note(format!("record is already {}", current.status)),
        )
        .await;
        return Err(AppError::Forbidden(format!(
            "payroll record is already {}",
            current.status
        )));
    }

    // Final recomputation before the record locks: the closed values reflect
    // the facts at close time.
    let employee = resolve_employee(&mut tx, tenant_id, current.employee_id).await?;
    let facts = attendance::collect(
        &mut tx,
        tenant_id,
        employee.id,
        current.year,
        current.month,
        None,
    )
    .await?;
    let inputs = ManualInputs {
        bonus: current.bonus,
        transport_benefit: current.transport_benefit,
        meal_benefit: current.meal_benefit,
        other_benefits: current.other_benefits,
        inss: Some(current.inss),
        irt: current.irt,
        other_deductions: current.other_deductions,
    };
    let derived = calculator::derive_all(&facts, &inputs);

    let mut record = current;
    apply_derivation(&mut record, &facts, &inputs, &derived);
    record.status = PayrollStatus::Closed;
    record.closed_at = Some(Utc::now());
    record.closed_by = Some(ctx.user_id);

    let updated = store::update_record(&mut tx, &record).await?;
    tx.commit().await?;

    info!(record_id = %updated.id, "payroll record closed");
    audit::emit(
        db,
        ctx,
        AuditEvent::new("close", updated.id).with_snapshots(Some(before), Some(snapshot(&updated))),
    )
    .await;

    Ok(updated)
}

pub async fn reopen(
    db: &PgPool,
    ctx: &ActorContext,
    record_id: Uuid,
    justification: Option<String>,
) -> AppResult<PayrollRecord> {
    let tenant_id = ctx.require_tenant()?;

    if let Err(err) = ctx.require_any_role(REOPEN_ROLES) {
        audit::emit(
            db,
            ctx,
            AuditEvent::new("reopen_blocked", record_id).with_note("missing required role"),
        )
        .await;
        return Err(err);
    }
    let justification = require_justification(justification)?;

    let mut tx = db.begin().await?;
    let current = lock_scoped_record(&mut tx, tenant_id, record_id).await?;
    let before = snapshot(&current);

    if current.status != PayrollStatus::Closed {
        drop(tx);
        audit::emit(
            db,
            ctx,
            AuditEvent::new("reopen_blocked", record_id)
                .with_note(format!("record is {}", current.status)),
        )
        .await;
        return Err(AppError::Forbidden(format!(
            "only closed records can be reopened; record is {}",
            current.status
        )));
    }

    let mut record = current;
    record.status = PayrollStatus::Draft;
    record.reopened_at = Some(Utc::now());
    record.reopened_by = Some(ctx.user_id);
    record.reopen_justification = Some(justification.clone());
    // a future close re-stamps these
    record.closed_at = None;
    record.closed_by = None;

    let updated = store::update_record(&mut tx, &record).await?;
    tx.commit().await?;

    info!(record_id = %updated.id, "payroll record reopened");
    audit::emit(
        db,
        ctx,
        AuditEvent::new("reopen", updated.id)
            .with_snapshots(Some(before), Some(snapshot(&updated)))
            .with_note(justification),
    )
    .await;

    Ok(updated)
}

pub async fn pay(
    db: &PgPool,
    ctx: &ActorContext,
    record_id: Uuid,
    req: PayPayrollRequest,
) -> AppResult<PayrollRecord> {
    let tenant_id = ctx.require_tenant()?;

    if let Err(err) = ctx.require_any_role(PAY_ROLES) {
        audit::emit(
            db,
            ctx,
            AuditEvent::new("pay_blocked", record_id).with_note("missing required role"),
        )
        .await;
        return Err(err);
    }
    let payment_method = req
        .payment_method
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::Validation("payment_method is required".to_string()))?;

    let mut tx = db.begin().await?;
    let current = lock_scoped_record(&mut tx, tenant_id, record_id).await?;
    let before = snapshot(&current);

    if current.status != PayrollStatus::Closed {
        drop(tx);
        audit::emit(
            db,
            ctx,
            AuditEvent::new("pay_blocked", record_id)
                .with_note(format!("record is {}", current.status)),
        )
        .await;
        return Err(AppError::Forbidden(format!(
            "only closed records can be paid; record is {}",
            current.status
        )));
    }

    let mut record = current;
    record.status = PayrollStatus::Paid;
    record.paid_at = Some(Utc::now());
    record.paid_by = Some(ctx.user_id);
    record.payment_method = Some(payment_method);
    record.payment_reference = req.payment_reference;
    record.payment_note = req.payment_note;

    let updated = store::update_record(&mut tx, &record).await?;
    tx.commit().await?;

    info!(record_id = %updated.id, net_salary = %updated.net_salary, "payroll record paid");
    audit::emit(
        db,
        ctx,
        AuditEvent::new("pay", updated.id).with_snapshots(Some(before), Some(snapshot(&updated))),
    )
    .await;

    Ok(updated)
}

pub async fn reverse_payment(
    db: &PgPool,
    ctx: &ActorContext,
    record_id: Uuid,
    justification: Option<String>,
) -> AppResult<PayrollRecord> {
    let tenant_id = ctx.require_tenant()?;

    if let Err(err) = ctx.require_any_role(REVERSE_ROLES) {
        audit::emit(
            db,
            ctx,
            AuditEvent::new("reverse_payment_blocked", record_id).with_note("missing required role"),
        )
        .await;
        return Err(err);
    }
    let justification = require_justification(justification)?;

    let mut tx = db.begin().await?;
    let current = lock_scoped_record(&mut tx, tenant_id, record_id).await?;
    let before = snapshot(&current);

    if current.status != PayrollStatus::Paid {
        drop(tx);
        audit::emit(
            db,
            ctx,
            AuditEvent::new("reverse_payment_blocked", record_id)
                .with_note(format!("record is {}", current.status)),
        )
        .await;
        return Err(AppError::Forbidden(format!(
            "only paid records can have their payment reversed; record is {}",
            current.status
        )));
    }

    let mut record = current;
    record.status = PayrollStatus::Closed;
    record.paid_at = None;
    record.paid_by = None;
    record.payment_method = None;
    record.payment_reference = None;
    record.payment_note = None;

    let updated = store::update_record(&mut tx, &record).await?;
    tx.commit().await?;

    info!(record_id = %updated.id, "payroll payment reversed");
    audit::emit(
        db,
        ctx,
        AuditEvent::new("reverse_payment", updated.id)
            .with_snapshots(Some(before), Some(snapshot(&updated)))
            .with_note(justification),
    )
    .await;

    Ok(updated)
}

pub async fn delete(db: &PgPool, ctx: &ActorContext, record_id: Uuid) -> AppResult<()> {
    let tenant_id = ctx.require_tenant()?;

    let mut tx = db.begin().await?;
    let current = lock_scoped_record(&mut tx, tenant_id, record_id).await?;

    if current.status != PayrollStatus::Draft {
        drop(tx);
        audit::emit(
            db,
            ctx,
            AuditEvent::new("delete_blocked", record_id)
                .with_note(format!("record is {}", current.status)),
        )
        .await;
        return Err(AppError::Forbidden(format!(
            "only draft records can be deleted; record is {}",
            current.status
        )));
    }

    let before = snapshot(&current);
    store::delete_record(&mut tx, record_id).await?;
    tx.commit().await?;

    info!(record_id = %record_id, "payroll record deleted");
    audit::emit(
        db,
        ctx,
        AuditEvent::new("delete", record_id).with_snapshots(Some(before), None),
    )
    .await;

    Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn resolve_employee(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    employee_id: Uuid,
) -> AppResult<Employee> {
    let employee = store::find_employee(conn, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("employee {employee_id} not found")))?;
    if employee.tenant_id != tenant_id {
        return Err(AppError::Forbidden(
            "employee belongs to another institution".to_string(),
        ));
    }
    Ok(employee)
}

/// Cross-tenant lookups must look like absence.
async fn lock_scoped_record(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    record_id: Uuid,
) -> AppResult<PayrollRecord> {
    store::lock_record(conn, record_id)
        .await?
        .filter(|r| r.tenant_id == tenant_id)
        .ok_or_else(|| AppError::NotFound(format!("payroll record {record_id} not found")))
}

fn require_justification(value: Option<String>) -> AppResult<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("justification is required".to_string()))
}

fn apply_derivation(
    record: &mut PayrollRecord,
    facts: &AttendanceFacts,
    inputs: &ManualInputs,
    derived: &DerivedPay,
) {
    record.business_days = derived.business_days;
    record.base_salary = facts.base_salary;
    record.daily_rate = derived.daily_rate;
    record.unjustified_absences = derived.unjustified_absences;
    record.absence_deduction = derived.absence_deduction;
    record.hourly_rate = derived.hourly_rate;
    record.overtime_hours = derived.overtime_hours;
    record.overtime_pay = derived.overtime_pay;
    record.bonus = inputs.bonus;
    record.transport_benefit = inputs.transport_benefit;
    record.meal_benefit = inputs.meal_benefit;
    record.other_benefits = inputs.other_benefits;
    record.inss = derived.inss;
    record.irt = inputs.irt;
    record.other_deductions = inputs.other_deductions;
    record.net_salary = derived.net_salary;
}

fn snapshot(record: &PayrollRecord) -> serde_json::Value {
    serde_json::to_value(record).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn justification_must_be_non_empty() {
        assert!(require_justification(None).is_err());
        assert!(require_justification(Some("".to_string())).is_err());
        assert!(require_justification(Some("   ".to_string())).is_err());
        assert_eq!(
            require_justification(Some("  salary correction  ".to_string())).unwrap(),
            "salary correction"
        );
    }

    #[test]
    fn transition_role_sets() {
        assert!(REOPEN_ROLES.contains(&Role::Admin));
        assert!(REOPEN_ROLES.contains(&Role::Director));
        assert!(!REOPEN_ROLES.contains(&Role::Hr));

        assert!(PAY_ROLES.contains(&Role::Admin));
        assert!(PAY_ROLES.contains(&Role::SuperAdmin));
        assert!(PAY_ROLES.contains(&Role::Secretariat));
        assert!(PAY_ROLES.contains(&Role::Hr));
        assert!(!PAY_ROLES.contains(&Role::Director));

        assert_eq!(REVERSE_ROLES, REOPEN_ROLES);
    }
}
