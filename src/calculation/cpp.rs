//! Canada Pension Plan contributions.
//!
//! The employee contribution for a period is the pensionable earnings less
//! the period's share of the basic exemption, times the contribution rate.
//! It never exceeds what is left of the annual maximum after year-to-date
//! contributions. The employer matches the employee contribution.

use rust_decimal::Decimal;

use crate::config::CppRates;
use crate::models::AuditStep;

use super::round_money;

/// The result of a CPP calculation.
#[derive(Debug, Clone)]
pub struct CppResult {
    /// Employee contribution withheld this period.
    pub employee_contribution: Decimal,
    /// Employer contribution this period.
    pub employer_contribution: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates CPP contributions for one pay period.
///
/// # Arguments
///
/// * `pensionable_earnings` - Earnings subject to CPP this period
/// * `periods_per_year` - Pay periods in the year
/// * `ytd_contributions` - Employee CPP already withheld this tax year
/// * `rates` - The tax year's CPP rates
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_cpp;
/// use payroll_engine::config::CppRates;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rates = CppRates {
///     rate: Decimal::from_str("0.0595").unwrap(),
///     basic_exemption: Decimal::from(3500),
///     max_pensionable_earnings: Decimal::from(68500),
///     max_contribution: Decimal::from_str("3867.50").unwrap(),
/// };
///
/// let result = calculate_cpp(Decimal::from(2000), 26, Decimal::ZERO, &rates, 6);
/// assert_eq!(result.employee_contribution, Decimal::from_str("110.99").unwrap());
/// assert_eq!(result.employer_contribution, result.employee_contribution);
/// ```
pub fn calculate_cpp(
    pensionable_earnings: Decimal,
    periods_per_year: u32,
    ytd_contributions: Decimal,
    rates: &CppRates,
    step_number: u32,
) -> CppResult {
    let period_exemption = rates.basic_exemption / Decimal::from(periods_per_year);
    let contributory = (pensionable_earnings - period_exemption).max(Decimal::ZERO);
    let uncapped = round_money(contributory * rates.rate);
    let remaining = (rates.max_contribution - ytd_contributions).max(Decimal::ZERO);
    let contribution = uncapped.min(remaining);
    let capped = contribution < uncapped;

    let reasoning = if remaining.is_zero() {
        format!(
            "YTD CPP ${} has reached the annual maximum ${} - no contribution",
            ytd_contributions, rates.max_contribution
        )
    } else if capped {
        format!(
            "(${} - ${}) x {} = ${}, capped at remaining ${}",
            pensionable_earnings,
            round_money(period_exemption),
            rates.rate.normalize(),
            uncapped,
            remaining
        )
    } else {
        format!(
            "(${} - ${}) x {} = ${}",
            pensionable_earnings,
            round_money(period_exemption),
            rates.rate.normalize(),
            contribution
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "cpp".to_string(),
        rule_name: "CPP Contribution".to_string(),
        reference: "Canada Pension Plan s. 8; CRA T4127".to_string(),
        input: serde_json::json!({
            "pensionable_earnings": pensionable_earnings.to_string(),
            "periods_per_year": periods_per_year,
            "ytd_contributions": ytd_contributions.to_string(),
            "rate": rates.rate.normalize().to_string(),
            "max_contribution": rates.max_contribution.to_string()
        }),
        output: serde_json::json!({
            "employee_contribution": contribution.to_string(),
            "employer_contribution": contribution.to_string(),
            "capped": capped
        }),
        reasoning,
    };

    CppResult {
        employee_contribution: contribution,
        employer_contribution: contribution,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rates_2024() -> CppRates {
        CppRates {
            rate: dec("0.0595"),
            basic_exemption: dec("3500"),
            max_pensionable_earnings: dec("68500"),
            max_contribution: dec("3867.50"),
        }
    }

    /// CPP-001: exemption prorated by pay frequency
    #[test]
    fn test_contribution_after_period_exemption() {
        // 3500 / 26 = 134.615..., (2000 - 134.615) x 0.0595 = 110.99
        let result = calculate_cpp(dec("2000.00"), 26, Decimal::ZERO, &rates_2024(), 6);

        assert_eq!(result.employee_contribution, dec("110.99"));
        assert_eq!(result.employer_contribution, dec("110.99"));
        assert_eq!(result.audit_step.rule_id, "cpp");
        assert!(!result.audit_step.output["capped"].as_bool().unwrap());
    }

    /// CPP-002: no contribution once YTD reaches the maximum
    #[test]
    fn test_no_contribution_at_annual_maximum() {
        let result = calculate_cpp(dec("5000.00"), 26, dec("3867.50"), &rates_2024(), 6);

        assert_eq!(result.employee_contribution, Decimal::ZERO);
        assert_eq!(result.employer_contribution, Decimal::ZERO);
        assert!(result.audit_step.reasoning.contains("annual maximum"));
    }

    /// CPP-003: YTD above the maximum still yields zero
    #[test]
    fn test_ytd_above_maximum_yields_zero() {
        let result = calculate_cpp(dec("5000.00"), 26, dec("4000.00"), &rates_2024(), 6);
        assert_eq!(result.employee_contribution, Decimal::ZERO);
    }

    /// CPP-004: final contribution tops up to the maximum
    #[test]
    fn test_contribution_capped_at_remaining_room() {
        let result = calculate_cpp(dec("5000.00"), 26, dec("3800.00"), &rates_2024(), 6);

        assert_eq!(result.employee_contribution, dec("67.50"));
        assert!(result.audit_step.output["capped"].as_bool().unwrap());
    }

    /// CPP-005: earnings below the period exemption contribute nothing
    #[test]
    fn test_earnings_below_exemption() {
        let result = calculate_cpp(dec("100.00"), 26, Decimal::ZERO, &rates_2024(), 6);
        assert_eq!(result.employee_contribution, Decimal::ZERO);
    }
}
