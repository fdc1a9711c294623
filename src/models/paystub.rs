//! Paystub and pay run models for the Payroll Engine.
//!
//! This module contains the [`Paystub`] type and its associated structures
//! that capture all outputs of one employee's pay calculation, including
//! earning and deduction lines, totals, employer contributions, and an
//! audit trail of each calculation step. A [`PayRun`] is an ordered set of
//! paystubs committed together.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PayFrequency, Province, VacationPayoutMethod};

/// The source of an earning line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningKind {
    /// Salary or standard hours for the period.
    Regular,
    /// A recurring earning code.
    Recurring,
    /// Vacation pay paid out this period.
    VacationPay,
}

/// A single earning line on a paystub.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{EarningKind, EarningLine};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let line = EarningLine {
///     kind: EarningKind::Regular,
///     code: "REG".to_string(),
///     description: "Regular Pay".to_string(),
///     amount: Decimal::from_str("2000.00").unwrap(),
///     taxable: true,
///     pensionable: true,
///     insurable: true,
/// };
/// assert!(line.pensionable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningLine {
    /// Where the earning came from.
    pub kind: EarningKind,
    /// Earning code.
    pub code: String,
    /// Display text.
    pub description: String,
    /// Amount for the period.
    pub amount: Decimal,
    /// Counts toward taxable income.
    pub taxable: bool,
    /// Counts toward CPP pensionable earnings.
    pub pensionable: bool,
    /// Counts toward EI insurable earnings.
    pub insurable: bool,
}

/// The category of a deduction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionCategory {
    /// Federal income tax.
    FederalTax,
    /// Provincial or territorial income tax.
    ProvincialTax,
    /// Employee CPP contribution.
    Cpp,
    /// Employee EI premium.
    Ei,
    /// A garnishment order.
    Garnishment,
    /// A recurring deduction code.
    RecurringDeduction,
}

/// A single deduction line on a paystub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// Deduction category.
    pub category: DeductionCategory,
    /// Code (statutory code, garnishment ID, or deduction code).
    pub code: String,
    /// Display text.
    pub description: String,
    /// Amount withheld.
    pub amount: Decimal,
}

/// Employer-side statutory contributions for the period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributions {
    /// Employer CPP (matches employee CPP).
    pub cpp: Decimal,
    /// Employer EI (employee EI times the employer multiplier).
    pub ei: Decimal,
}

/// Vacation pay calculated for the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationPay {
    /// Whether the amount was accrued or paid out.
    pub method: VacationPayoutMethod,
    /// Percentage applied to vacationable earnings.
    pub rate_percent: Decimal,
    /// Amount accrued or paid.
    pub amount: Decimal,
}

/// A single step in the audit trail recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the statute or CRA formula for this rule.
    pub reference: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// One employee's pay result for one pay period.
///
/// Paystubs are deterministic: calculating the same inputs twice yields
/// equal values. They are immutable once their pay run is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paystub {
    /// The employee this paystub belongs to.
    pub employee_id: String,
    /// Employee name at calculation time.
    pub employee_name: String,
    /// Pay period label (e.g., "Jan 1 - Jan 15").
    pub pay_period_label: String,
    /// Pay date; its year is the tax year.
    pub pay_date: NaiveDate,
    /// Tax year used for rates and YTD maximums.
    pub tax_year: i32,
    /// Province of employment.
    pub province: Province,
    /// Pay frequency used to prorate annual amounts.
    pub pay_frequency: PayFrequency,
    /// Earning lines.
    pub earnings: Vec<EarningLine>,
    /// Deduction lines.
    pub deductions: Vec<DeductionLine>,
    /// Sum of earning lines.
    pub gross_pay: Decimal,
    /// Sum of deduction lines.
    pub total_deductions: Decimal,
    /// Gross pay minus total deductions.
    pub net_pay: Decimal,
    /// Earnings subject to CPP.
    pub pensionable_earnings: Decimal,
    /// Earnings subject to EI.
    pub insurable_earnings: Decimal,
    /// Earnings subject to income tax after pre-tax deductions.
    pub taxable_income: Decimal,
    /// Employer CPP and EI.
    pub employer_contributions: EmployerContributions,
    /// Vacation pay accrued or paid, if the employee has a vacation rate.
    pub vacation: Option<VacationPay>,
    /// Warnings raised during calculation.
    pub warnings: Vec<AuditWarning>,
    /// Calculation steps in order.
    pub audit_steps: Vec<AuditStep>,
}

impl Paystub {
    /// Sums deduction lines in a category.
    pub fn deduction_total(&self, category: DeductionCategory) -> Decimal {
        self.deductions
            .iter()
            .filter(|d| d.category == category)
            .map(|d| d.amount)
            .sum()
    }

    /// Employee CPP withheld.
    pub fn cpp(&self) -> Decimal {
        self.deduction_total(DeductionCategory::Cpp)
    }

    /// Employee EI withheld.
    pub fn ei(&self) -> Decimal {
        self.deduction_total(DeductionCategory::Ei)
    }

    /// Federal income tax withheld.
    pub fn federal_tax(&self) -> Decimal {
        self.deduction_total(DeductionCategory::FederalTax)
    }

    /// Provincial income tax withheld.
    pub fn provincial_tax(&self) -> Decimal {
        self.deduction_total(DeductionCategory::ProvincialTax)
    }

    /// Federal plus provincial income tax.
    pub fn income_tax(&self) -> Decimal {
        self.federal_tax() + self.provincial_tax()
    }

    /// Vacation pay added to the liability this period.
    pub fn vacation_accrued(&self) -> Decimal {
        match &self.vacation {
            Some(v) if v.method == VacationPayoutMethod::Accrue => v.amount,
            _ => Decimal::ZERO,
        }
    }

    /// Vacation pay paid out as earnings this period.
    pub fn vacation_paid_out(&self) -> Decimal {
        match &self.vacation {
            Some(v) if v.method == VacationPayoutMethod::Payout => v.amount,
            _ => Decimal::ZERO,
        }
    }
}

/// A committed pay run.
///
/// Pay runs reference employees by ID only; later changes to an
/// employee record never alter a committed paystub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRun {
    /// Unique identifier assigned at commit.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: String,
    /// Pay period label.
    pub pay_period_label: String,
    /// Pay date.
    pub pay_date: NaiveDate,
    /// When the run was committed.
    pub committed_at: DateTime<Utc>,
    /// Paystubs in processing order.
    pub paystubs: Vec<Paystub>,
}
