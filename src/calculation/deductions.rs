//! Recurring deductions.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{
    AuditStep, CompanySettings, DeductionCategory, DeductionLine, RecurringDeduction,
};

use super::round_money;

/// The result of resolving recurring deductions.
#[derive(Debug, Clone)]
pub struct RecurringDeductionsResult {
    /// One deduction line per recurring deduction, in the employee's order.
    pub deduction_lines: Vec<DeductionLine>,
    /// Portion of the deductions that reduces taxable income.
    pub pre_tax_total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Resolves recurring deductions against the company deduction catalog.
///
/// Deductions whose code reduces taxable income (RRSP, union dues) are
/// summed into `pre_tax_total` so the caller can lower taxable income
/// before withholding.
///
/// # Errors
///
/// Returns `CodeNotFound` for a code missing from the catalog.
pub fn resolve_recurring_deductions(
    deductions: &[RecurringDeduction],
    settings: &CompanySettings,
    step_number: u32,
) -> EngineResult<RecurringDeductionsResult> {
    let mut deduction_lines = Vec::with_capacity(deductions.len());
    let mut pre_tax_total = Decimal::ZERO;

    for deduction in deductions {
        let code = settings.deduction_code(&deduction.code)?;
        let amount = round_money(deduction.amount);
        if code.reduces_taxable_income {
            pre_tax_total += amount;
        }
        deduction_lines.push(DeductionLine {
            category: DeductionCategory::RecurringDeduction,
            code: code.code.clone(),
            description: code.name.clone(),
            amount,
        });
    }

    let total: Decimal = deduction_lines.iter().map(|l| l.amount).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "recurring_deductions".to_string(),
        rule_name: "Recurring Deductions".to_string(),
        reference: "Company deduction codes".to_string(),
        input: serde_json::json!({
            "codes": deductions.iter().map(|d| d.code.as_str()).collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "total": total.to_string(),
            "pre_tax_total": pre_tax_total.to_string()
        }),
        reasoning: if deduction_lines.is_empty() {
            "No recurring deductions".to_string()
        } else {
            format!(
                "{} recurring deduction(s) totalling ${}, ${} before tax",
                deduction_lines.len(),
                total,
                pre_tax_total
            )
        },
    };

    Ok(RecurringDeductionsResult {
        deduction_lines,
        pre_tax_total,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{DeductionCode, PayFrequency, VacationPayoutMethod};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_settings() -> CompanySettings {
        CompanySettings {
            legal_name: "Maple Widgets Inc.".to_string(),
            business_number: "123456789RP0001".to_string(),
            province: "ON".to_string(),
            pay_frequency: PayFrequency::BiWeekly,
            vacation_payout_method: VacationPayoutMethod::Accrue,
            earning_codes: vec![],
            deduction_codes: vec![
                DeductionCode {
                    code: "RRSP".to_string(),
                    name: "Group RRSP".to_string(),
                    reduces_taxable_income: true,
                },
                DeductionCode {
                    code: "PARKING".to_string(),
                    name: "Parking".to_string(),
                    reduces_taxable_income: false,
                },
            ],
            garnishment_configurations: vec![],
            time_off_policies: vec![],
        }
    }

    /// RD-001: only flagged codes reduce taxable income
    #[test]
    fn test_pre_tax_total_counts_flagged_codes() {
        let deductions = vec![
            RecurringDeduction {
                code: "RRSP".to_string(),
                amount: dec("100"),
            },
            RecurringDeduction {
                code: "PARKING".to_string(),
                amount: dec("40"),
            },
        ];

        let result = resolve_recurring_deductions(&deductions, &create_test_settings(), 5).unwrap();

        assert_eq!(result.deduction_lines.len(), 2);
        assert_eq!(result.pre_tax_total, dec("100.00"));
        assert_eq!(result.deduction_lines[1].description, "Parking");
        assert_eq!(result.audit_step.output["total"].as_str().unwrap(), "140.00");
    }

    /// RD-002: unknown deduction code fails
    #[test]
    fn test_unknown_code_fails() {
        let deductions = vec![RecurringDeduction {
            code: "DENTAL".to_string(),
            amount: dec("12"),
        }];

        assert!(matches!(
            resolve_recurring_deductions(&deductions, &create_test_settings(), 5),
            Err(EngineError::CodeNotFound { .. })
        ));
    }
}
