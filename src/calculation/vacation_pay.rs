//! Vacation pay calculation.
//!
//! Vacation pay is a percentage of the period's base earnings. Under the
//! `accrue` method the amount is recorded against the employee's vacation
//! liability and does not appear in earnings; under `payout` it is added to
//! this period's earnings.

use rust_decimal::Decimal;

use crate::models::{AuditStep, EarningKind, EarningLine, VacationPay, VacationPayoutMethod};

use super::round_money;

/// Earning code used for vacation pay paid out with wages.
pub const VACATION_PAY_CODE: &str = "VAC";

/// The result of calculating vacation pay.
#[derive(Debug, Clone)]
pub struct VacationPayResult {
    /// The vacation amount, or `None` when no vacation policy applies.
    pub vacation: Option<VacationPay>,
    /// The earning line to add when paying out.
    pub earning_line: Option<EarningLine>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates vacation pay for the period.
///
/// # Arguments
///
/// * `base_earnings` - Regular pay plus recurring earnings
/// * `rate_percent` - The vacation policy percentage, if one is assigned
/// * `method` - The company's vacation payout method
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_vacation_pay;
/// use payroll_engine::models::VacationPayoutMethod;
/// use rust_decimal::Decimal;
///
/// let result = calculate_vacation_pay(
///     Decimal::new(200000, 2),
///     Some(Decimal::new(4, 0)),
///     VacationPayoutMethod::Payout,
///     4,
/// );
/// assert_eq!(result.vacation.unwrap().amount, Decimal::new(8000, 2));
/// assert!(result.earning_line.is_some());
/// ```
pub fn calculate_vacation_pay(
    base_earnings: Decimal,
    rate_percent: Option<Decimal>,
    method: VacationPayoutMethod,
    step_number: u32,
) -> VacationPayResult {
    let method_str = match method {
        VacationPayoutMethod::Accrue => "accrue",
        VacationPayoutMethod::Payout => "payout",
    };

    let Some(rate_percent) = rate_percent else {
        return VacationPayResult {
            vacation: None,
            earning_line: None,
            audit_step: AuditStep {
                step_number,
                rule_id: "vacation_pay".to_string(),
                rule_name: "Vacation Pay".to_string(),
                reference: "Employment standards: vacation pay".to_string(),
                input: serde_json::json!({
                    "base_earnings": base_earnings.to_string(),
                    "method": method_str
                }),
                output: serde_json::json!({ "amount": "0" }),
                reasoning: "No vacation policy assigned - no vacation pay".to_string(),
            },
        };
    };

    let amount = round_money(base_earnings * rate_percent / Decimal::ONE_HUNDRED);

    let earning_line = match method {
        VacationPayoutMethod::Accrue => None,
        VacationPayoutMethod::Payout => Some(EarningLine {
            kind: EarningKind::VacationPay,
            code: VACATION_PAY_CODE.to_string(),
            description: "Vacation Pay".to_string(),
            amount,
            taxable: true,
            pensionable: true,
            insurable: true,
        }),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "vacation_pay".to_string(),
        rule_name: "Vacation Pay".to_string(),
        reference: "Employment standards: vacation pay".to_string(),
        input: serde_json::json!({
            "base_earnings": base_earnings.to_string(),
            "rate_percent": rate_percent.normalize().to_string(),
            "method": method_str
        }),
        output: serde_json::json!({
            "amount": amount.to_string(),
            "added_to_earnings": earning_line.is_some()
        }),
        reasoning: match method {
            VacationPayoutMethod::Accrue => format!(
                "${} x {}% = ${} accrued to vacation liability",
                base_earnings,
                rate_percent.normalize(),
                amount
            ),
            VacationPayoutMethod::Payout => format!(
                "${} x {}% = ${} paid out with this period's earnings",
                base_earnings,
                rate_percent.normalize(),
                amount
            ),
        },
    };

    VacationPayResult {
        vacation: Some(VacationPay {
            method,
            rate_percent,
            amount,
        }),
        earning_line,
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

    /// VP-001: accrue never produces an earning line
    #[test]
    fn test_accrue_records_amount_without_earning_line() {
        let result = calculate_vacation_pay(
            dec("2000.00"),
            Some(dec("4")),
            VacationPayoutMethod::Accrue,
            4,
        );

        let vacation = result.vacation.unwrap();
        assert_eq!(vacation.amount, dec("80.00"));
        assert_eq!(vacation.method, VacationPayoutMethod::Accrue);
        assert!(result.earning_line.is_none());
        assert!(result.audit_step.reasoning.contains("accrued"));
    }

    /// VP-002: payout adds a vacation earning line
    #[test]
    fn test_payout_adds_earning_line() {
        let result = calculate_vacation_pay(
            dec("1923.08"),
            Some(dec("6")),
            VacationPayoutMethod::Payout,
            4,
        );

        let line = result.earning_line.unwrap();
        assert_eq!(line.kind, EarningKind::VacationPay);
        assert_eq!(line.code, VACATION_PAY_CODE);
        assert_eq!(line.amount, dec("115.38"));
        assert!(line.taxable && line.pensionable && line.insurable);
        assert!(result.audit_step.output["added_to_earnings"]
            .as_bool()
            .unwrap());
    }

    /// VP-003: no policy means no vacation pay
    #[test]
    fn test_no_policy_means_no_vacation() {
        let result = calculate_vacation_pay(dec("2000"), None, VacationPayoutMethod::Payout, 4);

        assert!(result.vacation.is_none());
        assert!(result.earning_line.is_none());
        assert_eq!(result.audit_step.rule_id, "vacation_pay");
    }
}
