//! Company settings and payroll code catalogs.
//!
//! This module defines [`CompanySettings`] and the catalogs it owns:
//! earning codes, deduction codes, garnishment configurations, and
//! time-off policies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{Employee, Jurisdiction, PayFrequency};

/// How vacation pay is handled each pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacationPayoutMethod {
    /// Vacation pay accrues to a liability and is not paid this period.
    Accrue,
    /// Vacation pay is added to this period's earnings.
    Payout,
}

fn default_true() -> bool {
    true
}

/// An earning code in the company catalog.
///
/// Flags default to `true`; a non-cash benefit, for example, would set
/// `insurable` to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningCode {
    /// Short code (e.g., "BONUS").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Subject to income tax.
    #[serde(default = "default_true")]
    pub taxable: bool,
    /// Subject to CPP.
    #[serde(default = "default_true")]
    pub pensionable: bool,
    /// Subject to EI.
    #[serde(default = "default_true")]
    pub insurable: bool,
}

/// A deduction code in the company catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionCode {
    /// Short code (e.g., "RRSP").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Reduces taxable income (e.g., RRSP, union dues).
    #[serde(default)]
    pub reduces_taxable_income: bool,
}

/// How a garnishment amount is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarnishmentCalculation {
    /// The assignment amount is dollars per pay period.
    FixedAmount,
    /// The assignment amount is a percentage of net-after-tax pay.
    Percentage,
}

/// A garnishment order type configured for the company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarnishmentConfiguration {
    /// Unique ID.
    pub id: String,
    /// Display name (e.g., "Family Support Order").
    pub name: String,
    /// Issuing authority.
    pub jurisdiction: Jurisdiction,
    /// Fixed amount or percentage.
    pub calculation: GarnishmentCalculation,
    /// Lower priorities are deducted first.
    pub priority: u32,
}

/// How a time-off policy accrues hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualMethod {
    /// A fixed number of hours each pay period.
    PerPayPeriod,
    /// Hours per hour worked.
    PerHourWorked,
    /// A lump sum at the start of the year.
    Annual,
}

/// A time-off policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffPolicy {
    /// Unique ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Accrual method.
    pub accrual_method: AccrualMethod,
    /// Hours accrued per accrual event.
    pub accrual_rate: Decimal,
    /// Maximum hours carried into the next year.
    #[serde(default)]
    pub carryover_limit: Option<Decimal>,
    /// Whether this policy drives vacation pay.
    #[serde(default)]
    pub is_vacation_policy: bool,
    /// Vacation pay percentage of gross (e.g., 4 for 4%).
    #[serde(default)]
    pub vacation_pay_percent: Option<Decimal>,
}

/// Tenant-wide payroll settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySettings {
    /// Legal business name.
    pub legal_name: String,
    /// CRA business number.
    pub business_number: String,
    /// Province code of the head office.
    pub province: String,
    /// Default pay schedule.
    pub pay_frequency: PayFrequency,
    /// Accrue or pay out vacation pay.
    pub vacation_payout_method: VacationPayoutMethod,
    /// Earning code catalog.
    #[serde(default)]
    pub earning_codes: Vec<EarningCode>,
    /// Deduction code catalog.
    #[serde(default)]
    pub deduction_codes: Vec<DeductionCode>,
    /// Garnishment configurations.
    #[serde(default)]
    pub garnishment_configurations: Vec<GarnishmentConfiguration>,
    /// Time-off policies.
    #[serde(default)]
    pub time_off_policies: Vec<TimeOffPolicy>,
}

impl CompanySettings {
    /// Looks up an earning code.
    pub fn earning_code(&self, code: &str) -> EngineResult<&EarningCode> {
        self.earning_codes
            .iter()
            .find(|c| c.code == code)
            .ok_or_else(|| not_found("earning", code))
    }

    /// Looks up a deduction code.
    pub fn deduction_code(&self, code: &str) -> EngineResult<&DeductionCode> {
        self.deduction_codes
            .iter()
            .find(|c| c.code == code)
            .ok_or_else(|| not_found("deduction", code))
    }

    /// Looks up a garnishment configuration by ID.
    pub fn garnishment_configuration(&self, id: &str) -> EngineResult<&GarnishmentConfiguration> {
        self.garnishment_configurations
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("garnishment", id))
    }

    /// Returns the vacation policy assigned to the employee, if any.
    ///
    /// An employee is assigned every policy that appears in their
    /// time-off balances; the first assigned vacation policy in catalog
    /// order wins.
    pub fn vacation_policy_for(&self, employee: &Employee) -> Option<&TimeOffPolicy> {
        self.time_off_policies
            .iter()
            .filter(|p| p.is_vacation_policy)
            .find(|p| employee.time_off_balances.contains_key(&p.id))
    }

    /// Checks that every code is unique within its catalog.
    pub fn validate(&self) -> EngineResult<()> {
        if self.legal_name.trim().is_empty() {
            return Err(EngineError::Validation {
                message: "legal name is required".to_string(),
            });
        }

        let catalogs: [(&str, Vec<&str>); 4] = [
            ("earning", self.earning_codes.iter().map(|c| c.code.as_str()).collect()),
            ("deduction", self.deduction_codes.iter().map(|c| c.code.as_str()).collect()),
            (
                "garnishment",
                self.garnishment_configurations
                    .iter()
                    .map(|c| c.id.as_str())
                    .collect(),
            ),
            (
                "time-off policy",
                self.time_off_policies.iter().map(|p| p.id.as_str()).collect(),
            ),
        ];

        for (kind, mut codes) in catalogs {
            codes.sort_unstable();
            if let Some(w) = codes.windows(2).find(|w| w[0] == w[1]) {
                return Err(EngineError::Validation {
                    message: format!("duplicate {} code: {}", kind, w[0]),
                });
            }
        }

        for policy in &self.time_off_policies {
            if policy.is_vacation_policy
                && policy
                    .vacation_pay_percent
                    .is_some_and(|p| p.is_sign_negative() || p > Decimal::ONE_HUNDRED)
            {
                return Err(EngineError::Validation {
                    message: format!(
                        "vacation pay percent for policy '{}' must be between 0 and 100",
                        policy.id
                    ),
                });
            }
        }

        Ok(())
    }
}

fn not_found(kind: &str, code: &str) -> EngineError {
    EngineError::CodeNotFound {
        kind: kind.to_string(),
        code: code.to_string(),
    }
}
