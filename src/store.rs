// src/store.rs
//
// Persistence for payroll records and the employee master reads the engine
// depends on. Uniqueness of (tenant, employee, month, year) lives in the
// database constraint, not in application-side checks; a violated constraint
// surfaces as a Conflict. Mutations take `&mut PgConnection` so the lifecycle
// service controls the surrounding transaction.

use crate::{
    errors::{AppError, AppResult},
    models::{Employee, PayrollRecord, PayrollStatus},
};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub async fn find_employee(
    conn: &mut PgConnection,
    employee_id: Uuid,
) -> AppResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(conn)
        .await?;
    Ok(employee)
}

pub async fn find_record(
    conn: &mut PgConnection,
    record_id: Uuid,
) -> AppResult<Option<PayrollRecord>> {
    let record = sqlx::query_as::<_, PayrollRecord>("SELECT * FROM payroll_records WHERE id = $1")
        .bind(record_id)
        .fetch_optional(conn)
        .await?;
    Ok(record)
}

/// Row-locking read for lifecycle transitions: the guard check and the write
/// that follows see the status actually persisted, and a racing transition
/// waits here until this transaction finishes.
pub async fn lock_record(
    conn: &mut PgConnection,
    record_id: Uuid,
) -> AppResult<Option<PayrollRecord>> {
    let record =
        sqlx::query_as::<_, PayrollRecord>("SELECT * FROM payroll_records WHERE id = $1 FOR UPDATE")
            .bind(record_id)
            .fetch_optional(conn)
            .await?;
    Ok(record)
}

pub async fn list_records(
    db: &PgPool,
    tenant_id: Uuid,
    employee_id: Option<Uuid>,
    month: Option<i32>,
    year: Option<i32>,
    status: Option<PayrollStatus>,
) -> AppResult<Vec<PayrollRecord>> {
    let records = sqlx::query_as::<_, PayrollRecord>(
        r#"
        SELECT * FROM payroll_records
        WHERE tenant_id = $1
          AND ($2::uuid IS NULL OR employee_id = $2)
          AND ($3::int IS NULL OR month = $3)
          AND ($4::int IS NULL OR year = $4)
          AND ($5::payroll_status IS NULL OR status = $5)
        ORDER BY year DESC, month DESC, created_at DESC
        "#,
    )
    .bind(tenant_id)
    .bind(employee_id)
    .bind(month)
    .bind(year)
    .bind(status)
    .fetch_all(db)
    .await?;
    Ok(records)
}

pub async fn insert_record(
    conn: &mut PgConnection,
    record: &PayrollRecord,
) -> AppResult<PayrollRecord> {
    let inserted = sqlx::query_as::<_, PayrollRecord>(
        r#"
        INSERT INTO payroll_records (
            id, tenant_id, employee_id, month, year,
            business_days, base_salary, daily_rate,
            unjustified_absences, absence_deduction, hourly_rate,
            overtime_hours, overtime_pay,
            bonus, transport_benefit, meal_benefit, other_benefits,
            inss, irt, other_deductions, net_salary,
            status, created_by, created_at, updated_at
        ) VALUES (
            $1, $2, $3, $4, $5,
            $6, $7, $8,
            $9, $10, $11,
            $12, $13,
            $14, $15, $16, $17,
            $18, $19, $20, $21,
            $22, $23, NOW(), NOW()
        )
        RETURNING *
        "#,
    )
    .bind(record.id)
    .bind(record.tenant_id)
    .bind(record.employee_id)
    .bind(record.month)
    .bind(record.year)
    .bind(record.business_days)
    .bind(record.base_salary)
    .bind(record.daily_rate)
    .bind(record.unjustified_absences)
    .bind(record.absence_deduction)
    .bind(record.hourly_rate)
    .bind(record.overtime_hours)
    .bind(record.overtime_pay)
    .bind(record.bonus)
    .bind(record.transport_benefit)
    .bind(record.meal_benefit)
    .bind(record.other_benefits)
    .bind(record.inss)
    .bind(record.irt)
    .bind(record.other_deductions)
    .bind(record.net_salary)
    .bind(record.status)
    .bind(record.created_by)
    .fetch_one(conn)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict(
            format!(
                "payroll record already exists for employee {} in {}/{}",
                record.employee_id, record.month, record.year
            ),
        ),
        _ => AppError::from(e),
    })?;
    Ok(inserted)
}

/// Single atomic write of every mutable field. Callers assemble the full
/// post-transition record; there are no partial column updates.
pub async fn update_record(
    conn: &mut PgConnection,
    record: &PayrollRecord,
) -> AppResult<PayrollRecord> {
    let updated = sqlx::query_as::<_, PayrollRecord>(
        r#"
        UPDATE payroll_records SET
            business_days = $2,
            base_salary = $3,
            daily_rate = $4,
            unjustified_absences = $5,
            absence_deduction = $6,
            hourly_rate = $7,
            overtime_hours = $8,
            overtime_pay = $9,
            bonus = $10,
            transport_benefit = $11,
            meal_benefit = $12,
            other_benefits = $13,
            inss = $14,
            irt = $15,
            other_deductions = $16,
            net_salary = $17,
            status = $18,
            closed_at = $19,
            closed_by = $20,
            reopened_at = $21,
            reopened_by = $22,
            reopen_justification = $23,
            paid_at = $24,
            paid_by = $25,
            payment_method = $26,
            payment_reference = $27,
            payment_note = $28,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(record.id)
    .bind(record.business_days)
    .bind(record.base_salary)
    .bind(record.daily_rate)
    .bind(record.unjustified_absences)
    .bind(record.absence_deduction)
    .bind(record.hourly_rate)
    .bind(record.overtime_hours)
    .bind(record.overtime_pay)
    .bind(record.bonus)
    .bind(record.transport_benefit)
    .bind(record.meal_benefit)
    .bind(record.other_benefits)
    .bind(record.inss)
    .bind(record.irt)
    .bind(record.other_deductions)
    .bind(record.net_salary)
    .bind(record.status)
    .bind(record.closed_at)
    .bind(record.closed_by)
    .bind(record.reopened_at)
    .bind(record.reopened_by)
    .bind(record.reopen_justification.as_deref())
    .bind(record.paid_at)
    .bind(record.paid_by)
    .bind(record.payment_method.as_deref())
    .bind(record.payment_reference.as_deref())
    .bind(record.payment_note.as_deref())
    .fetch_one(conn)
    .await?;
    Ok(updated)
}

pub async fn delete_record(conn: &mut PgConnection, record_id: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM payroll_records WHERE id = $1")
        .bind(record_id)
        .execute(conn)
        .await?;
    Ok(())
}
