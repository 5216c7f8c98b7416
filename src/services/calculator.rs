// src/services/calculator.rs
//
// Pure derivation of every monetary line item from attendance facts plus
// manually entered inputs. No I/O; the lifecycle service calls this inside
// the same transaction as the write so derived fields always reflect the
// facts as of the write.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Employee-side social security default, applied when the caller did not
/// explicitly supply a value (an explicit 0 is kept as 0).
pub const INSS_RATE: Decimal = dec!(0.03);

/// Overtime premium over the base hourly rate.
pub const OVERTIME_MULTIPLIER: Decimal = dec!(1.5);

pub const HOURS_PER_DAY: Decimal = dec!(8);

/// Facts resolved from the attendance aggregator for one (employee, month).
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceFacts {
    pub base_salary: Decimal,
    pub business_days: i32,
    pub unjustified_absences: i32,
    pub overtime_hours: Decimal,
    pub overtime_pay: Decimal,
}

/// Manually entered benefit/deduction inputs. `inss` stays an Option so that
/// omission and an explicit zero remain distinguishable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualInputs {
    pub bonus: Decimal,
    pub transport_benefit: Decimal,
    pub meal_benefit: Decimal,
    pub other_benefits: Decimal,
    pub inss: Option<Decimal>,
    pub irt: Decimal,
    pub other_deductions: Decimal,
}

/// Every derived monetary field of a payroll record.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPay {
    pub business_days: i32,
    pub daily_rate: Decimal,
    pub unjustified_absences: i32,
    pub absence_deduction: Decimal,
    pub hourly_rate: Decimal,
    pub overtime_hours: Decimal,
    pub overtime_pay: Decimal,
    pub inss: Decimal,
    pub net_salary: Decimal,
}

/// 2-dp currency rounding, half away from zero (half-up for the non-negative
/// amounts handled here).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn raw_daily_rate(base_salary: Decimal, business_days: i32) -> Decimal {
    if business_days > 0 {
        base_salary / Decimal::from(business_days)
    } else {
        Decimal::ZERO
    }
}

pub(crate) fn raw_hourly_rate(base_salary: Decimal, business_days: i32) -> Decimal {
    let hours = Decimal::from(business_days) * HOURS_PER_DAY;
    if hours > Decimal::ZERO {
        base_salary / hours
    } else {
        Decimal::ZERO
    }
}

pub fn default_inss(base_salary: Decimal, supplied: Option<Decimal>) -> Decimal {
    match supplied {
        Some(value) => value,
        None => round2(base_salary * INSS_RATE),
    }
}

/// Overtime pay for already-resolved hours. Manually supplied pay amounts are
/// never trusted; callers always recompute through here.
pub fn overtime_pay(hourly_rate: Decimal, hours: Decimal) -> Decimal {
    round2(hourly_rate * OVERTIME_MULTIPLIER * hours)
}

/// Full recomputation of every derived field. Idempotent: identical facts and
/// inputs yield identical output. The net salary is rounded once, at the end,
/// and floored at zero.
pub fn derive_all(facts: &AttendanceFacts, inputs: &ManualInputs) -> DerivedPay {
    let daily = raw_daily_rate(facts.base_salary, facts.business_days);
    let hourly = raw_hourly_rate(facts.base_salary, facts.business_days);

    let absence_deduction = if facts.unjustified_absences > 0 {
        round2(daily * Decimal::from(facts.unjustified_absences))
    } else {
        Decimal::ZERO
    };

    let inss = default_inss(facts.base_salary, inputs.inss);

    let benefits = inputs.bonus
        + facts.overtime_pay
        + inputs.transport_benefit
        + inputs.meal_benefit
        + inputs.other_benefits;
    let deductions = absence_deduction + inss + inputs.irt + inputs.other_deductions;
    let gross = facts.base_salary + benefits;
    let net_salary = round2(gross - deductions).max(Decimal::ZERO);

    DerivedPay {
        business_days: facts.business_days,
        daily_rate: round2(daily),
        unjustified_absences: facts.unjustified_absences,
        absence_deduction,
        hourly_rate: round2(hourly),
        overtime_hours: facts.overtime_hours,
        overtime_pay: facts.overtime_pay,
        inss,
        net_salary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(base: Decimal, days: i32, absences: i32) -> AttendanceFacts {
        AttendanceFacts {
            base_salary: base,
            business_days: days,
            unjustified_absences: absences,
            overtime_hours: Decimal::ZERO,
            overtime_pay: Decimal::ZERO,
        }
    }

    #[test]
    fn full_month_with_absences_and_default_inss() {
        // 200000 over 20 business days, 2 unjustified absences, nothing else
        let derived = derive_all(&facts(dec!(200000), 20, 2), &ManualInputs::default());

        assert_eq!(derived.daily_rate, dec!(10000.00));
        assert_eq!(derived.absence_deduction, dec!(20000.00));
        assert_eq!(derived.hourly_rate, dec!(1250.00));
        assert_eq!(derived.inss, dec!(6000.00));
        assert_eq!(derived.net_salary, dec!(174000.00));
    }

    #[test]
    fn explicit_zero_inss_is_kept() {
        let inputs = ManualInputs {
            inss: Some(dec!(0)),
            ..ManualInputs::default()
        };
        let derived = derive_all(&facts(dec!(200000), 20, 0), &inputs);
        assert_eq!(derived.inss, dec!(0));
        assert_eq!(derived.net_salary, dec!(200000.00));
    }

    #[test]
    fn omitted_inss_defaults_to_three_percent() {
        assert_eq!(default_inss(dec!(200000), None), dec!(6000.00));
        assert_eq!(default_inss(dec!(200000), Some(dec!(1234.56))), dec!(1234.56));
    }

    #[test]
    fn zero_business_days_zeroes_the_rates() {
        let derived = derive_all(&facts(dec!(150000), 0, 3), &ManualInputs::default());
        assert_eq!(derived.daily_rate, Decimal::ZERO);
        assert_eq!(derived.hourly_rate, Decimal::ZERO);
        assert_eq!(derived.absence_deduction, Decimal::ZERO);
    }

    #[test]
    fn net_salary_never_goes_negative() {
        let inputs = ManualInputs {
            irt: dec!(500000),
            ..ManualInputs::default()
        };
        let derived = derive_all(&facts(dec!(100000), 22, 0), &inputs);
        assert_eq!(derived.net_salary, Decimal::ZERO);
    }

    #[test]
    fn absence_deduction_uses_the_unrounded_daily_rate() {
        // 100000 / 21 = 4761.904761..., x3 = 14285.714285... -> 14285.71
        let derived = derive_all(&facts(dec!(100000), 21, 3), &ManualInputs::default());
        assert_eq!(derived.daily_rate, dec!(4761.90));
        assert_eq!(derived.absence_deduction, dec!(14285.71));
    }

    #[test]
    fn rounding_is_half_up_at_two_places() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(1.004)), dec!(1.00));
        assert_eq!(round2(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn overtime_pay_applies_the_premium() {
        // hourly 1250, 4 hours -> 1250 * 1.5 * 4 = 7500
        assert_eq!(overtime_pay(dec!(1250), dec!(4)), dec!(7500.00));
        assert_eq!(overtime_pay(dec!(1250), Decimal::ZERO), dec!(0));
    }

    #[test]
    fn overtime_pay_feeds_the_gross() {
        let f = AttendanceFacts {
            base_salary: dec!(200000),
            business_days: 20,
            unjustified_absences: 0,
            overtime_hours: dec!(4),
            overtime_pay: dec!(7500),
        };
        let derived = derive_all(&f, &ManualInputs::default());
        // 200000 + 7500 - 6000 inss
        assert_eq!(derived.net_salary, dec!(201500.00));
    }

    #[test]
    fn derivation_is_deterministic() {
        let f = AttendanceFacts {
            base_salary: dec!(123456.78),
            business_days: 19,
            unjustified_absences: 1,
            overtime_hours: dec!(2.5),
            overtime_pay: dec!(1218.75),
        };
        let inputs = ManualInputs {
            bonus: dec!(5000),
            transport_benefit: dec!(1500),
            meal_benefit: dec!(800),
            other_benefits: dec!(0),
            inss: None,
            irt: dec!(4321.09),
            other_deductions: dec!(100),
        };
        assert_eq!(derive_all(&f, &inputs), derive_all(&f, &inputs));
    }
}
