//! Report records derived from committed payroll.
//!
//! These are flat, read-only projections: the CRA remittance summary for a
//! pay run, and the year-end T4 slip and Record of Employment for an
//! employee.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source deductions owed to the CRA for one pay run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceSummary {
    /// The pay run summarized.
    pub pay_run_id: Uuid,
    /// Pay period label of the run.
    pub pay_period_label: String,
    /// Number of paystubs.
    pub employee_count: usize,
    /// Total gross pay.
    pub total_gross: Decimal,
    /// Federal income tax withheld.
    pub federal_tax: Decimal,
    /// Provincial income tax withheld.
    pub provincial_tax: Decimal,
    /// Federal plus provincial income tax.
    pub income_tax: Decimal,
    /// Employee CPP withheld.
    pub employee_cpp: Decimal,
    /// Employer CPP.
    pub employer_cpp: Decimal,
    /// Employee plus employer CPP.
    pub cpp_remitted: Decimal,
    /// Employee EI withheld.
    pub employee_ei: Decimal,
    /// Employer EI.
    pub employer_ei: Decimal,
    /// Employee plus employer EI.
    pub ei_remitted: Decimal,
    /// Income tax plus CPP and EI remitted.
    pub total_remittance: Decimal,
}

/// A T4 Statement of Remuneration Paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct T4Slip {
    /// Tax year of the slip.
    pub tax_year: i32,
    /// Employer legal name.
    pub employer_name: String,
    /// Employer CRA business number.
    pub employer_business_number: String,
    /// Employee ID.
    pub employee_id: String,
    /// Employee name.
    pub employee_name: String,
    /// Social Insurance Number (box 12).
    pub sin: String,
    /// Province of employment (box 10).
    pub province_of_employment: String,
    /// Employment income (box 14).
    pub employment_income: Decimal,
    /// Employee CPP contributions (box 16).
    pub cpp_contributions: Decimal,
    /// Employee EI premiums (box 18).
    pub ei_premiums: Decimal,
    /// Income tax deducted (box 22).
    pub income_tax_deducted: Decimal,
    /// EI insurable earnings (box 24).
    pub ei_insurable_earnings: Decimal,
    /// CPP pensionable earnings (box 26).
    pub cpp_pensionable_earnings: Decimal,
    /// Employer CPP for the year.
    pub employer_cpp: Decimal,
    /// Employer EI for the year.
    pub employer_ei: Decimal,
}

/// Reason for issuing a Record of Employment (block 16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoeReason {
    /// A: shortage of work or end of contract.
    ShortageOfWork,
    /// D: illness or injury.
    Illness,
    /// E: quit.
    Quit,
    /// F: maternity.
    Maternity,
    /// G: retirement.
    Retirement,
    /// M: dismissal.
    Dismissal,
    /// P: parental leave.
    Parental,
    /// K: other.
    Other,
}

impl RoeReason {
    /// The one-letter Service Canada code.
    pub fn code(&self) -> &'static str {
        match self {
            RoeReason::ShortageOfWork => "A",
            RoeReason::Illness => "D",
            RoeReason::Quit => "E",
            RoeReason::Maternity => "F",
            RoeReason::Retirement => "G",
            RoeReason::Dismissal => "M",
            RoeReason::Parental => "P",
            RoeReason::Other => "K",
        }
    }
}

/// A Record of Employment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOfEmployment {
    /// Employer legal name.
    pub employer_name: String,
    /// Employer CRA business number.
    pub employer_business_number: String,
    /// Employee ID.
    pub employee_id: String,
    /// Employee name.
    pub employee_name: String,
    /// Social Insurance Number.
    pub sin: String,
    /// First day worked (block 10).
    pub first_day_worked: NaiveDate,
    /// Last day for which paid (block 12).
    pub last_day_paid: NaiveDate,
    /// Reason for issuing.
    pub reason: RoeReason,
    /// Service Canada reason code.
    pub reason_code: String,
    /// Tax year of the insurable earnings.
    pub tax_year: i32,
    /// Insurable earnings for the year.
    pub insurable_earnings: Decimal,
    /// Accrued vacation pay not yet paid (block 17A).
    pub vacation_pay_outstanding: Decimal,
}
