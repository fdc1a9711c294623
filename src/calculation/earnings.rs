//! Regular pay and recurring earnings.
//!
//! Regular pay is derived from the employee's current profile: an annual
//! salary is spread evenly over the pay periods in a year, an hourly rate is
//! multiplied by standard hours. Recurring earnings are looked up in the
//! company catalog so each line carries the code's tax treatment.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{
    AuditStep, CompanySettings, Compensation, EarningKind, EarningLine, EmployeeProfile,
    RecurringEarning,
};

use super::round_money;

/// Earning code used for salary and standard hours.
pub const REGULAR_PAY_CODE: &str = "REG";

/// The result of calculating regular pay.
#[derive(Debug, Clone)]
pub struct RegularPayResult {
    /// The regular pay earning line.
    pub earning_line: EarningLine,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates regular pay for one pay period.
///
/// Salaried employees receive `annual_amount / periods_per_year`; hourly
/// employees receive `hourly_rate * hours_per_period`. The result is rounded
/// to cents and is taxable, pensionable and insurable.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_regular_pay;
/// use payroll_engine::models::{Compensation, EmployeeProfile, PayFrequency};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let profile = EmployeeProfile {
///     effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
///     job_title: String::new(),
///     province_of_employment: "ON".to_string(),
///     pay_frequency: PayFrequency::SemiMonthly,
///     compensation: Compensation::Salary { annual_amount: Decimal::new(48000, 0) },
/// };
///
/// let result = calculate_regular_pay(&profile, 2);
/// assert_eq!(result.earning_line.amount, Decimal::new(200000, 2));
/// ```
pub fn calculate_regular_pay(profile: &EmployeeProfile, step_number: u32) -> RegularPayResult {
    let periods = profile.pay_frequency.periods_per_year();

    let (amount, input, reasoning) = match &profile.compensation {
        Compensation::Salary { annual_amount } => {
            let amount = round_money(annual_amount / Decimal::from(periods));
            (
                amount,
                serde_json::json!({
                    "basis": "salary",
                    "annual_amount": annual_amount.normalize().to_string(),
                    "periods_per_year": periods
                }),
                format!(
                    "${} / {} periods = ${}",
                    annual_amount.normalize(),
                    periods,
                    amount
                ),
            )
        }
        Compensation::Hourly {
            hourly_rate,
            hours_per_period,
        } => {
            let amount = round_money(hourly_rate * hours_per_period);
            (
                amount,
                serde_json::json!({
                    "basis": "hourly",
                    "hourly_rate": hourly_rate.normalize().to_string(),
                    "hours_per_period": hours_per_period.normalize().to_string()
                }),
                format!(
                    "{}h x ${}/hr = ${}",
                    hours_per_period.normalize(),
                    hourly_rate.normalize(),
                    amount
                ),
            )
        }
    };

    let earning_line = EarningLine {
        kind: EarningKind::Regular,
        code: REGULAR_PAY_CODE.to_string(),
        description: "Regular Pay".to_string(),
        amount,
        taxable: true,
        pensionable: true,
        insurable: true,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "regular_pay".to_string(),
        rule_name: "Regular Pay".to_string(),
        reference: "Employment contract".to_string(),
        input,
        output: serde_json::json!({ "amount": amount.to_string() }),
        reasoning,
    };

    RegularPayResult {
        earning_line,
        audit_step,
    }
}

/// The result of resolving recurring earnings.
#[derive(Debug, Clone)]
pub struct RecurringEarningsResult {
    /// One earning line per recurring earning, in the employee's order.
    pub earning_lines: Vec<EarningLine>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Resolves recurring earnings against the company earning code catalog.
///
/// # Errors
///
/// Returns `CodeNotFound` if an earning references a code missing from the
/// catalog.
pub fn resolve_recurring_earnings(
    earnings: &[RecurringEarning],
    settings: &CompanySettings,
    step_number: u32,
) -> EngineResult<RecurringEarningsResult> {
    let mut earning_lines = Vec::with_capacity(earnings.len());

    for earning in earnings {
        let code = settings.earning_code(&earning.code)?;
        earning_lines.push(EarningLine {
            kind: EarningKind::Recurring,
            code: code.code.clone(),
            description: code.name.clone(),
            amount: round_money(earning.amount),
            taxable: code.taxable,
            pensionable: code.pensionable,
            insurable: code.insurable,
        });
    }

    let total: Decimal = earning_lines.iter().map(|l| l.amount).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "recurring_earnings".to_string(),
        rule_name: "Recurring Earnings".to_string(),
        reference: "Company earning codes".to_string(),
        input: serde_json::json!({
            "codes": earnings.iter().map(|e| e.code.as_str()).collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "line_count": earning_lines.len(),
            "total": total.to_string()
        }),
        reasoning: if earning_lines.is_empty() {
            "No recurring earnings".to_string()
        } else {
            format!(
                "{} recurring earning(s) totalling ${}",
                earning_lines.len(),
                total
            )
        },
    };

    Ok(RecurringEarningsResult {
        earning_lines,
        audit_step,
    })
}
