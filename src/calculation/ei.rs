//! Employment Insurance premiums.

use rust_decimal::Decimal;

use crate::config::EiRates;
use crate::models::AuditStep;

use super::round_money;

/// The result of an EI calculation.
#[derive(Debug, Clone)]
pub struct EiResult {
    /// Employee premium withheld this period.
    pub employee_premium: Decimal,
    /// Employer premium this period.
    pub employer_premium: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates EI premiums for one pay period.
///
/// The employee premium is `insurable_earnings * rate`, limited to what is
/// left of the annual maximum premium. The employer pays the employee
/// premium times the employer multiplier.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_ei;
/// use payroll_engine::config::EiRates;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rates = EiRates {
///     rate: Decimal::from_str("0.0166").unwrap(),
///     max_insurable_earnings: Decimal::from(63200),
///     max_premium: Decimal::from_str("1049.12").unwrap(),
///     employer_multiplier: Decimal::from_str("1.4").unwrap(),
/// };
///
/// let result = calculate_ei(Decimal::from(2000), Decimal::ZERO, &rates, 7);
/// assert_eq!(result.employee_premium, Decimal::from_str("33.20").unwrap());
/// assert_eq!(result.employer_premium, Decimal::from_str("46.48").unwrap());
/// ```
pub fn calculate_ei(
    insurable_earnings: Decimal,
    ytd_premiums: Decimal,
    rates: &EiRates,
    step_number: u32,
) -> EiResult {
    let uncapped = round_money(insurable_earnings.max(Decimal::ZERO) * rates.rate);
    let remaining = (rates.max_premium - ytd_premiums).max(Decimal::ZERO);
    let premium = uncapped.min(remaining);
    let employer_premium = round_money(premium * rates.employer_multiplier);
    let capped = premium < uncapped;

    let reasoning = if remaining.is_zero() {
        format!(
            "YTD EI ${} has reached the annual maximum ${} - no premium",
            ytd_premiums, rates.max_premium
        )
    } else if capped {
        format!(
            "${} x {} = ${}, capped at remaining ${}; employer x {} = ${}",
            insurable_earnings,
            rates.rate.normalize(),
            uncapped,
            remaining,
            rates.employer_multiplier.normalize(),
            employer_premium
        )
    } else {
        format!(
            "${} x {} = ${}; employer x {} = ${}",
            insurable_earnings,
            rates.rate.normalize(),
            premium,
            rates.employer_multiplier.normalize(),
            employer_premium
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "ei".to_string(),
        rule_name: "EI Premium".to_string(),
        reference: "Employment Insurance Act s. 67-68; CRA T4127".to_string(),
        input: serde_json::json!({
            "insurable_earnings": insurable_earnings.to_string(),
            "ytd_premiums": ytd_premiums.to_string(),
            "rate": rates.rate.normalize().to_string(),
            "max_premium": rates.max_premium.to_string()
        }),
        output: serde_json::json!({
            "employee_premium": premium.to_string(),
            "employer_premium": employer_premium.to_string(),
            "capped": capped
        }),
        reasoning,
    };

    EiResult {
        employee_premium: premium,
        employer_premium,
        audit_step,
    }
}
