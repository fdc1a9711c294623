//! Federal and provincial income tax withholding.
//!
//! Withholding follows the annualization method: the period's taxable
//! income is multiplied by the number of pay periods, progressive brackets
//! are applied to the annual figure, non-refundable credits are subtracted
//! at the lowest bracket rate, and the annual tax is divided back into the
//! period.
//!
//! Credits are the TD1 claim amount, annualized CPP and EI (each limited to
//! the annual maximum), and federally the Canada Employment Amount.

use rust_decimal::Decimal;

use crate::config::{RateTable, TaxBracket};
use crate::models::{AuditStep, Province};

use super::round_money;

/// Computes tax on an annual income using progressive brackets.
///
/// Brackets must be sorted by ascending threshold and start at zero. Each
/// bracket's rate applies to the income between its threshold and the next.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::bracket_tax;
/// use payroll_engine::config::TaxBracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![
///     TaxBracket { threshold: Decimal::ZERO, rate: Decimal::new(10, 2) },
///     TaxBracket { threshold: Decimal::from(50000), rate: Decimal::new(20, 2) },
/// ];
/// assert_eq!(bracket_tax(Decimal::from(60000), &brackets), Decimal::from(7000));
/// ```
pub fn bracket_tax(annual_income: Decimal, brackets: &[TaxBracket]) -> Decimal {
    let mut tax = Decimal::ZERO;

    for (i, bracket) in brackets.iter().enumerate() {
        if annual_income <= bracket.threshold {
            break;
        }
        let upper = brackets
            .get(i + 1)
            .map(|next| next.threshold.min(annual_income))
            .unwrap_or(annual_income);
        tax += (upper - bracket.threshold) * bracket.rate;
    }

    tax
}

/// Returns the rate of the lowest bracket, used to value tax credits.
pub fn lowest_rate(brackets: &[TaxBracket]) -> Decimal {
    brackets.first().map(|b| b.rate).unwrap_or(Decimal::ZERO)
}

/// Per-period amounts that feed the tax calculation.
#[derive(Debug, Clone, Copy)]
pub struct TaxableAmounts {
    /// Taxable income for the period.
    pub taxable_income: Decimal,
    /// Employee CPP withheld this period.
    pub cpp: Decimal,
    /// Employee EI withheld this period.
    pub ei: Decimal,
    /// Pay periods in the year.
    pub periods_per_year: u32,
}

/// The result of an income tax calculation for one jurisdiction.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// Tax withheld this period.
    pub tax: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

struct Withholding {
    annual_income: Decimal,
    annual_tax_before_credits: Decimal,
    credit_base: Decimal,
    credits: Decimal,
    annual_tax: Decimal,
    period_tax: Decimal,
}

fn withhold(
    amounts: &TaxableAmounts,
    brackets: &[TaxBracket],
    claim_amount: Decimal,
    extra_credit: Decimal,
    table: &RateTable,
) -> Withholding {
    let periods = Decimal::from(amounts.periods_per_year);
    let annual_income = (amounts.taxable_income * periods).max(Decimal::ZERO);
    let annual_tax_before_credits = bracket_tax(annual_income, brackets);

    let annual_cpp = (amounts.cpp * periods).min(table.cpp.max_contribution);
    let annual_ei = (amounts.ei * periods).min(table.ei.max_premium);
    let credit_base = claim_amount + annual_cpp + annual_ei + extra_credit;
    let credits = lowest_rate(brackets) * credit_base;

    let annual_tax = (annual_tax_before_credits - credits).max(Decimal::ZERO);
    let period_tax = round_money(annual_tax / periods);

    Withholding {
        annual_income,
        annual_tax_before_credits,
        credit_base,
        credits,
        annual_tax,
        period_tax,
    }
}

/// Calculates federal income tax withheld for one pay period.
///
/// # Arguments
///
/// * `amounts` - The period's taxable income, CPP, EI and pay frequency
/// * `claim_amount` - The federal TD1 claim amount
/// * `table` - The tax year's rate table
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_federal_tax(
    amounts: &TaxableAmounts,
    claim_amount: Decimal,
    table: &RateTable,
    step_number: u32,
) -> IncomeTaxResult {
    let periods = Decimal::from(amounts.periods_per_year);
    let employment_amount = table
        .federal
        .canada_employment_amount
        .min((amounts.taxable_income * periods).max(Decimal::ZERO));

    let w = withhold(
        amounts,
        &table.federal.brackets,
        claim_amount,
        employment_amount,
        table,
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "federal_tax".to_string(),
        rule_name: "Federal Income Tax".to_string(),
        reference: format!("Income Tax Act s. 117-118; CRA T4127 ({})", table.tax_year),
        input: serde_json::json!({
            "taxable_income": amounts.taxable_income.to_string(),
            "periods_per_year": amounts.periods_per_year,
            "td1_claim_amount": claim_amount.to_string(),
            "canada_employment_amount": employment_amount.to_string()
        }),
        output: serde_json::json!({
            "annual_income": w.annual_income.to_string(),
            "annual_tax_before_credits": round_money(w.annual_tax_before_credits).to_string(),
            "credits": round_money(w.credits).to_string(),
            "annual_tax": round_money(w.annual_tax).to_string(),
            "tax": w.period_tax.to_string()
        }),
        reasoning: format!(
            "Annual ${} taxed ${} less {} x ${} credits = ${} / {} = ${}",
            w.annual_income,
            round_money(w.annual_tax_before_credits),
            lowest_rate(&table.federal.brackets).normalize(),
            round_money(w.credit_base),
            round_money(w.annual_tax),
            amounts.periods_per_year,
            w.period_tax
        ),
    };

    IncomeTaxResult {
        tax: w.period_tax,
        audit_step,
    }
}

/// Calculates provincial or territorial income tax withheld for one pay
/// period.
///
/// Returns `None` if the rate table has no rates for `province`.
pub fn calculate_provincial_tax(
    amounts: &TaxableAmounts,
    claim_amount: Decimal,
    province: Province,
    table: &RateTable,
    step_number: u32,
) -> Option<IncomeTaxResult> {
    let rates = table.provinces.get(&province)?;
    let w = withhold(amounts, &rates.brackets, claim_amount, Decimal::ZERO, table);

    let audit_step = AuditStep {
        step_number,
        rule_id: "provincial_tax".to_string(),
        rule_name: format!("{} Income Tax", province.code()),
        reference: format!("{} provincial tax tables; CRA T4127 ({})", province.code(), table.tax_year),
        input: serde_json::json!({
            "province": province.code(),
            "taxable_income": amounts.taxable_income.to_string(),
            "periods_per_year": amounts.periods_per_year,
            "td1_claim_amount": claim_amount.to_string()
        }),
        output: serde_json::json!({
            "annual_income": w.annual_income.to_string(),
            "annual_tax_before_credits": round_money(w.annual_tax_before_credits).to_string(),
            "credits": round_money(w.credits).to_string(),
            "annual_tax": round_money(w.annual_tax).to_string(),
            "tax": w.period_tax.to_string()
        }),
        reasoning: format!(
            "Annual ${} taxed ${} less {} x ${} credits = ${} / {} = ${}",
            w.annual_income,
            round_money(w.annual_tax_before_credits),
            lowest_rate(&rates.brackets).normalize(),
            round_money(w.credit_base),
            round_money(w.annual_tax),
            amounts.periods_per_year,
            w.period_tax
        ),
    };

    Some(IncomeTaxResult {
        tax: w.period_tax,
        audit_step,
    })
}
