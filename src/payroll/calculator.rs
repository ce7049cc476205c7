//! Pure payroll arithmetic: one employee's salary components plus the leave
//! days taken in the period map to a pay breakdown. No store access, no state.

use rust_decimal::Decimal;

use crate::error::{PayrollError, PayrollResult};

/// Flat income-tax rate (10%). No brackets, no exemptions.
fn tax_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// The per-day rate is derived from base salary over a fixed 30-day month.
fn days_per_month() -> Decimal {
    Decimal::from(30)
}

/// Salary components from an employee's current salary profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryComponents {
    pub base_salary: Decimal,
    pub hra: Decimal,
    pub da: Decimal,
    pub bonus: Decimal,
}

/// The computed figures for one ledger line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayBreakdown {
    pub gross: Decimal,
    pub tax: Decimal,
    pub leave_deduction: Decimal,
    pub net_pay: Decimal,
}

fn require_non_negative(field: &str, value: Decimal) -> PayrollResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PayrollError::invalid_input(field, "must not be negative"));
    }
    Ok(())
}

/// Computes the pay breakdown for one employee.
///
/// `gross = base + hra + da + bonus`, `tax = gross * 0.10`,
/// `leave_deduction = (base / 30) * leave_days` when any leave was taken,
/// `net_pay = gross - tax - leave_deduction`.
///
/// Allowances and bonus are never pro-rated for leave; only base salary feeds
/// the daily rate. Net pay is not clamped and goes negative for large enough
/// leave counts.
pub fn compute_pay(salary: &SalaryComponents, leave_days: i64) -> PayrollResult<PayBreakdown> {
    require_non_negative("base_salary", salary.base_salary)?;
    require_non_negative("hra", salary.hra)?;
    require_non_negative("da", salary.da)?;
    require_non_negative("bonus", salary.bonus)?;

    if leave_days < 0 {
        return Err(PayrollError::invalid_input(
            "leave_days",
            "must not be negative",
        ));
    }

    let gross = salary.base_salary + salary.hra + salary.da + salary.bonus;
    let tax = gross * tax_rate();

    let leave_deduction = if leave_days > 0 {
        salary.base_salary / days_per_month() * Decimal::from(leave_days)
    } else {
        Decimal::ZERO
    };

    let net_pay = gross - tax - leave_deduction;

    Ok(PayBreakdown {
        gross,
        tax,
        leave_deduction,
        net_pay,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_salary() -> SalaryComponents {
        SalaryComponents {
            base_salary: dec("30000"),
            hra: dec("5000"),
            da: dec("2000"),
            bonus: dec("1000"),
        }
    }

    #[test]
    fn worked_example_with_three_leave_days() {
        let pay = compute_pay(&sample_salary(), 3).unwrap();

        assert_eq!(pay.gross, dec("38000"));
        assert_eq!(pay.tax, dec("3800.00"));
        assert_eq!(pay.leave_deduction, dec("3000"));
        assert_eq!(pay.net_pay, dec("31200.00"));
    }

    #[test]
    fn zero_leave_days_means_no_deduction() {
        let pay = compute_pay(&sample_salary(), 0).unwrap();

        assert_eq!(pay.leave_deduction, Decimal::ZERO);
        assert_eq!(pay.net_pay, dec("34200.00"));
        assert_eq!(pay.net_pay, pay.gross - pay.gross * tax_rate());
    }

    #[test]
    fn net_pay_may_go_negative_for_large_leave_counts() {
        let salary = SalaryComponents {
            base_salary: dec("30000"),
            hra: Decimal::ZERO,
            da: Decimal::ZERO,
            bonus: Decimal::ZERO,
        };

        // 60 leave days deducts two full months of base pay
        let pay = compute_pay(&salary, 60).unwrap();
        assert!(pay.net_pay.is_sign_negative());
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let a = compute_pay(&sample_salary(), 7).unwrap();
        let b = compute_pay(&sample_salary(), 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_negative_salary_component() {
        let salary = SalaryComponents {
            base_salary: dec("-1"),
            ..sample_salary()
        };

        match compute_pay(&salary, 0).unwrap_err() {
            PayrollError::InvalidInput { field, .. } => assert_eq!(field, "base_salary"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_leave_days() {
        match compute_pay(&sample_salary(), -1).unwrap_err() {
            PayrollError::InvalidInput { field, .. } => assert_eq!(field, "leave_days"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn allowances_are_not_pro_rated_for_leave() {
        let with_allowances = compute_pay(&sample_salary(), 5).unwrap();
        let base_only = compute_pay(
            &SalaryComponents {
                base_salary: dec("30000"),
                hra: Decimal::ZERO,
                da: Decimal::ZERO,
                bonus: Decimal::ZERO,
            },
            5,
        )
        .unwrap();

        assert_eq!(with_allowances.leave_deduction, base_only.leave_deduction);
    }
}
