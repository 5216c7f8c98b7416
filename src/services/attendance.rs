// src/services/attendance.rs
//
// Attendance aggregator: resolves the per-employee, per-month facts the
// payroll derivation runs on. Every query takes `&mut PgConnection` so the
// lifecycle service can run it inside the transaction that also writes the
// record.

use crate::{
    errors::{AppError, AppResult},
    services::calculator::{self, AttendanceFacts},
};
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

/// First day of the month and first day of the following month.
pub fn month_bounds(year: i32, month: i32) -> Option<(NaiveDate, NaiveDate)> {
    let m = u32::try_from(month).ok()?;
    let start = NaiveDate::from_ymd_opt(year, m, 1)?;
    let end = if m == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, m + 1, 1)?
    };
    Some((start, end))
}

/// Days in [start, end) that are neither weekend nor listed as holidays.
pub fn count_business_days(start: NaiveDate, end: NaiveDate, holidays: &[NaiveDate]) -> i32 {
    let mut days = 0;
    let mut day = start;
    while day < end {
        let weekday = day.weekday();
        if weekday != Weekday::Sat && weekday != Weekday::Sun && !holidays.contains(&day) {
            days += 1;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

/// Contracted base salary, resolved employee -> position -> active contract.
pub async fn base_salary(
    conn: &mut PgConnection,
    employee_id: Uuid,
) -> Result<Option<Decimal>, sqlx::Error> {
    let salary = sqlx::query_scalar::<_, Option<Decimal>>(
        r#"
        SELECT COALESCE(e.base_salary, p.base_salary, c.salary)
        FROM employees e
        LEFT JOIN positions p ON p.id = e.position_id
        LEFT JOIN LATERAL (
            SELECT salary FROM contracts
            WHERE employee_id = e.id AND is_active = TRUE
            ORDER BY starts_on DESC
            LIMIT 1
        ) c ON TRUE
        WHERE e.id = $1
        "#,
    )
    .bind(employee_id)
    .fetch_optional(conn)
    .await?;

    Ok(salary.flatten())
}

/// Business days in the month for a tenant: weekdays minus tenant holidays.
pub async fn business_days(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    year: i32,
    month: i32,
) -> AppResult<i32> {
    let (start, end) = month_bounds(year, month)
        .ok_or_else(|| AppError::Validation(format!("invalid month/year: {month}/{year}")))?;

    let holidays = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT holiday_date FROM holidays WHERE tenant_id = $1 AND holiday_date >= $2 AND holiday_date < $3",
    )
    .bind(tenant_id)
    .bind(start)
    .bind(end)
    .fetch_all(conn)
    .await?;

    Ok(count_business_days(start, end, &holidays))
}

pub async fn unjustified_absences(
    conn: &mut PgConnection,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<i32, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM attendance_records
        WHERE employee_id = $1
          AND work_date >= $2 AND work_date < $3
          AND status = 'absent_unjustified'
        "#,
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_one(conn)
    .await?;

    Ok(count as i32)
}

pub async fn overtime_hours(
    conn: &mut PgConnection,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Decimal, sqlx::Error> {
    sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(overtime_hours), 0) FROM attendance_records
        WHERE employee_id = $1 AND work_date >= $2 AND work_date < $3
        "#,
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_one(conn)
    .await
}

/// Gather every fact the derivation needs for one (employee, month).
///
/// Manually supplied overtime hours win only when > 0, otherwise the logged
/// hours are counted; overtime pay is always recomputed from the resolved
/// hours. Fails when no base salary > 0 resolves for the employee.
pub async fn collect(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    employee_id: Uuid,
    year: i32,
    month: i32,
    manual_overtime_hours: Option<Decimal>,
) -> AppResult<AttendanceFacts> {
    let base_salary = base_salary(conn, employee_id)
        .await?
        .filter(|salary| *salary > Decimal::ZERO)
        .ok_or(AppError::MissingBaseSalary)?;

    let (start, end) = month_bounds(year, month)
        .ok_or_else(|| AppError::Validation(format!("invalid month/year: {month}/{year}")))?;

    let days = business_days(conn, tenant_id, year, month).await?;
    let absences = unjustified_absences(conn, employee_id, start, end).await?;

    let resolved_hours = match manual_overtime_hours {
        Some(hours) if hours > Decimal::ZERO => hours,
        _ => overtime_hours(conn, employee_id, start, end).await?,
    };
    let hourly = calculator::raw_hourly_rate(base_salary, days);
    let pay = calculator::overtime_pay(hourly, resolved_hours);

    Ok(AttendanceFacts {
        base_salary,
        business_days: days,
        unjustified_absences: absences,
        overtime_hours: resolved_hours,
        overtime_pay: pay,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_bounds_handles_december() {
        assert_eq!(month_bounds(2026, 1), Some((d(2026, 1, 1), d(2026, 2, 1))));
        assert_eq!(month_bounds(2026, 12), Some((d(2026, 12, 1), d(2027, 1, 1))));
        assert_eq!(month_bounds(2026, 13), None);
        assert_eq!(month_bounds(2026, 0), None);
    }

    #[test]
    fn january_2026_has_22_weekdays() {
        let (start, end) = month_bounds(2026, 1).unwrap();
        assert_eq!(count_business_days(start, end, &[]), 22);
    }

    #[test]
    fn february_2026_has_20_weekdays() {
        let (start, end) = month_bounds(2026, 2).unwrap();
        assert_eq!(count_business_days(start, end, &[]), 20);
    }

    #[test]
    fn weekday_holiday_reduces_the_count() {
        let (start, end) = month_bounds(2026, 1).unwrap();
        // Jan 1 2026 is a Thursday
        assert_eq!(count_business_days(start, end, &[d(2026, 1, 1)]), 21);
    }

    #[test]
    fn weekend_holiday_changes_nothing() {
        let (start, end) = month_bounds(2026, 1).unwrap();
        // Jan 3 2026 is a Saturday
        assert_eq!(count_business_days(start, end, &[d(2026, 1, 3)]), 22);
    }
}
