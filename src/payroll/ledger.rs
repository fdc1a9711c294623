//! Year-to-date ledger updates.
//!
//! These functions are the only code that changes an employee's YTD
//! totals, and they are only called from the commit path while the
//! tenant's store is locked.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AccrualMethod, Compensation, Employee, Paystub, TimeOffPolicy, YtdTotals};

/// Checks that a paystub can be posted to the employee's ledger.
///
/// A paystub for a tax year earlier than the ledger's current year would
/// reopen a closed year and is refused.
pub fn check_postable(employee: &Employee, paystub: &Paystub) -> EngineResult<()> {
    if paystub.employee_id != employee.id {
        return Err(EngineError::CalculationError {
            message: format!(
                "paystub for '{}' cannot be posted to employee '{}'",
                paystub.employee_id, employee.id
            ),
        });
    }
    if employee.ytd.tax_year != 0 && paystub.tax_year < employee.ytd.tax_year {
        return Err(EngineError::FinalizationBlocked {
            employee_id: employee.id.clone(),
            reason: format!(
                "tax year {} is closed; ledger is in {}",
                paystub.tax_year, employee.ytd.tax_year
            ),
        });
    }
    Ok(())
}

/// Checks that a submitted paystub matches a fresh calculation.
///
/// Everything that reaches the ledger, remittance or year-end slips is
/// compared; audit steps are not. Returns `PaystubMismatch` naming the
/// first field that differs.
pub fn verify_paystub(expected: &Paystub, submitted: &Paystub) -> EngineResult<()> {
    let checks = [
        ("employee_id", expected.employee_id == submitted.employee_id),
        ("employee_name", expected.employee_name == submitted.employee_name),
        ("pay_period_label", expected.pay_period_label == submitted.pay_period_label),
        ("pay_date", expected.pay_date == submitted.pay_date),
        ("tax_year", expected.tax_year == submitted.tax_year),
        ("province", expected.province == submitted.province),
        ("pay_frequency", expected.pay_frequency == submitted.pay_frequency),
        ("earnings", expected.earnings == submitted.earnings),
        ("gross_pay", expected.gross_pay == submitted.gross_pay),
        ("deductions", expected.deductions == submitted.deductions),
        ("total_deductions", expected.total_deductions == submitted.total_deductions),
        ("net_pay", expected.net_pay == submitted.net_pay),
        (
            "pensionable_earnings",
            expected.pensionable_earnings == submitted.pensionable_earnings,
        ),
        ("insurable_earnings", expected.insurable_earnings == submitted.insurable_earnings),
        ("taxable_income", expected.taxable_income == submitted.taxable_income),
        (
            "employer_contributions",
            expected.employer_contributions == submitted.employer_contributions,
        ),
        ("vacation", expected.vacation == submitted.vacation),
        ("warnings", expected.warnings == submitted.warnings),
    ];

    match checks.iter().find(|(_, matches)| !matches) {
        Some((field, _)) => Err(EngineError::PaystubMismatch {
            employee_id: submitted.employee_id.clone(),
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}

/// Starts a new tax year if the paystub belongs to a later year.
///
/// The previous year's totals move to `ytd_history`. Vacation liability is
/// not tied to a tax year and carries forward. Returns `true` if a rollover
/// happened.
pub fn roll_over(employee: &mut Employee, tax_year: i32) -> bool {
    if employee.ytd.tax_year == tax_year {
        return false;
    }

    let carried_liability = employee.ytd.vacation_pay_liability;
    let previous = std::mem::replace(&mut employee.ytd, YtdTotals::new(tax_year));
    if previous.tax_year != 0 {
        employee.ytd_history.push(previous);
    }
    employee.ytd.vacation_pay_liability = carried_liability;
    true
}

/// Adds a paystub's amounts to the employee's YTD totals.
///
/// Vacation liability rises by any accrued vacation pay and falls by any
/// vacation pay paid out, never below zero.
pub fn post_paystub(employee: &mut Employee, paystub: &Paystub) {
    roll_over(employee, paystub.tax_year);

    let ytd = &mut employee.ytd;
    ytd.gross_pay += paystub.gross_pay;
    ytd.pensionable_earnings += paystub.pensionable_earnings;
    ytd.insurable_earnings += paystub.insurable_earnings;
    ytd.cpp += paystub.cpp();
    ytd.ei += paystub.ei();
    ytd.employer_cpp += paystub.employer_contributions.cpp;
    ytd.employer_ei += paystub.employer_contributions.ei;
    ytd.federal_tax += paystub.federal_tax();
    ytd.provincial_tax += paystub.provincial_tax();

    ytd.vacation_pay_liability += paystub.vacation_accrued();
    ytd.vacation_pay_liability =
        (ytd.vacation_pay_liability - paystub.vacation_paid_out()).max(Decimal::ZERO);
}

/// Accrues time-off hours for one committed pay period.
///
/// Only policies present in the employee's balances are applied.
/// Per-pay-period policies add their rate; per-hour policies add the rate
/// times standard hours for hourly employees. When `new_year` is set,
/// balances are first cut to the policy's carryover limit and annual
/// policies grant their yearly hours.
pub fn accrue_time_off(
    employee: &mut Employee,
    policies: &[TimeOffPolicy],
    paystub: &Paystub,
    new_year: bool,
) {
    let hours_worked = employee
        .current_profile(paystub.pay_date)
        .and_then(|profile| match &profile.compensation {
            Compensation::Hourly {
                hours_per_period, ..
            } => Some(*hours_per_period),
            Compensation::Salary { .. } => None,
        })
        .unwrap_or(Decimal::ZERO);

    for policy in policies {
        let Some(balance) = employee.time_off_balances.get_mut(&policy.id) else {
            continue;
        };

        if new_year {
            if let Some(limit) = policy.carryover_limit {
                *balance = (*balance).min(limit);
            }
            if policy.accrual_method == AccrualMethod::Annual {
                *balance += policy.accrual_rate;
            }
        }

        match policy.accrual_method {
            AccrualMethod::PerPayPeriod => *balance += policy.accrual_rate,
            AccrualMethod::PerHourWorked => *balance += policy.accrual_rate * hours_worked,
            AccrualMethod::Annual => {}
        }
    }
}
