//! Employee model and related types.
//!
//! This module defines the [`Employee`] record together with its
//! effective-dated [`EmployeeProfile`] history, TD1 data, bank accounts,
//! garnishment assignments, and recurring earnings and deductions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};

use super::YtdTotals;

/// How often an employee is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// 52 pay periods per year.
    Weekly,
    /// 26 pay periods per year.
    BiWeekly,
    /// 24 pay periods per year.
    SemiMonthly,
    /// 12 pay periods per year.
    Monthly,
}

impl PayFrequency {
    /// Returns the number of pay periods in a year.
    ///
    /// ```
    /// use payroll_engine::models::PayFrequency;
    ///
    /// assert_eq!(PayFrequency::BiWeekly.periods_per_year(), 26);
    /// ```
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PayFrequency::Weekly => 52,
            PayFrequency::BiWeekly => 26,
            PayFrequency::SemiMonthly => 24,
            PayFrequency::Monthly => 12,
        }
    }
}

/// The basis on which regular pay is calculated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Compensation {
    /// Annual salary divided evenly across pay periods.
    Salary {
        /// Annual salary.
        annual_amount: Decimal,
    },
    /// Hourly rate multiplied by standard hours per period.
    Hourly {
        /// Hourly rate.
        hourly_rate: Decimal,
        /// Standard hours in one pay period.
        hours_per_period: Decimal,
    },
}

/// One effective-dated version of an employee's job and pay details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// The date from which this profile applies.
    pub effective_date: NaiveDate,
    /// Legal first name.
    pub first_name: String,
    /// Legal last name.
    pub last_name: String,
    /// Job title.
    #[serde(default)]
    pub job_title: String,
    /// Province or territory code of employment (e.g., "ON").
    pub province_of_employment: String,
    /// Pay frequency.
    pub pay_frequency: PayFrequency,
    /// Regular pay basis.
    pub compensation: Compensation,
}

impl EmployeeProfile {
    /// Returns "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payroll identity and TD1 claim amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollInfo {
    /// Social Insurance Number.
    pub sin: String,
    /// Total claim amount from the federal TD1.
    pub federal_claim_amount: Decimal,
    /// Total claim amount from the provincial TD1.
    pub provincial_claim_amount: Decimal,
}

/// A bank account receiving a share of net pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Three-digit institution number.
    pub institution_number: String,
    /// Five-digit transit number.
    pub transit_number: String,
    /// Account number.
    pub account_number: String,
    /// Percentage of net pay deposited to this account.
    pub allocation_percent: Decimal,
}

/// A garnishment order applied to an employee.
///
/// `amount` is dollars or a percentage depending on the referenced
/// configuration's calculation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarnishmentAssignment {
    /// ID of the company's garnishment configuration.
    pub configuration_id: String,
    /// Dollar amount or percentage.
    pub amount: Decimal,
}

/// An earning paid every pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringEarning {
    /// Earning code from the company catalog.
    pub code: String,
    /// Amount per pay period.
    pub amount: Decimal,
}

/// A deduction taken every pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringDeduction {
    /// Deduction code from the company catalog.
    pub code: String,
    /// Amount per pay period.
    pub amount: Decimal,
}

/// An employee on a tenant's payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee within the tenant.
    pub id: String,
    /// First day worked.
    pub hire_date: NaiveDate,
    /// Profile history, most recent effective date first.
    #[serde(default)]
    pub profiles: Vec<EmployeeProfile>,
    /// SIN and TD1 data; required to run payroll.
    #[serde(default)]
    pub payroll: Option<PayrollInfo>,
    /// Deposit accounts; required to finalize payroll.
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
    /// Garnishment orders.
    #[serde(default)]
    pub garnishments: Vec<GarnishmentAssignment>,
    /// Earnings added every pay period.
    #[serde(default)]
    pub recurring_earnings: Vec<RecurringEarning>,
    /// Deductions taken every pay period.
    #[serde(default)]
    pub recurring_deductions: Vec<RecurringDeduction>,
    /// Time-off balances in hours, keyed by policy ID.
    ///
    /// A key's presence assigns the policy to the employee.
    #[serde(default)]
    pub time_off_balances: BTreeMap<String, Decimal>,
    /// Year-to-date totals for the current tax year.
    #[serde(default)]
    pub ytd: YtdTotals,
    /// Closed year-to-date totals for prior tax years.
    #[serde(default)]
    pub ytd_history: Vec<YtdTotals>,
}

impl Employee {
    /// Returns the profile in effect on `date`.
    ///
    /// The current profile is the one with the latest effective date on or
    /// before `date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Compensation, Employee, EmployeeProfile, PayFrequency};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let profile = |date: NaiveDate, title: &str| EmployeeProfile {
    ///     effective_date: date,
    ///     first_name: "Ada".to_string(),
    ///     last_name: "Lovelace".to_string(),
    ///     job_title: title.to_string(),
    ///     province_of_employment: "ON".to_string(),
    ///     pay_frequency: PayFrequency::BiWeekly,
    ///     compensation: Compensation::Salary { annual_amount: Decimal::new(52000, 0) },
    /// };
    ///
    /// let mut employee: Employee = serde_json::from_str(
    ///     r#"{"id": "emp_001", "hire_date": "2023-01-01"}"#,
    /// ).unwrap();
    /// employee.add_profile(profile(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), "Analyst")).unwrap();
    /// employee.add_profile(profile(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "Lead")).unwrap();
    ///
    /// let jan = employee.current_profile(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()).unwrap();
    /// assert_eq!(jan.job_title, "Analyst");
    /// let apr = employee.current_profile(NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()).unwrap();
    /// assert_eq!(apr.job_title, "Lead");
    /// ```
    pub fn current_profile(&self, date: NaiveDate) -> Option<&EmployeeProfile> {
        self.profiles
            .iter()
            .filter(|p| p.effective_date <= date)
            .max_by_key(|p| p.effective_date)
    }

    /// Returns the profile in effect on `date`, or `ProfileNotFound`.
    pub fn profile_on(&self, date: NaiveDate) -> EngineResult<&EmployeeProfile> {
        self.current_profile(date)
            .ok_or_else(|| EngineError::ProfileNotFound {
                employee_id: self.id.clone(),
                date,
            })
    }

    /// Appends a profile to the history, keeping it sorted newest first.
    ///
    /// Returns `InvalidEmployee` if a profile with the same effective date
    /// already exists; existing history is never rewritten.
    pub fn add_profile(&mut self, profile: EmployeeProfile) -> EngineResult<()> {
        if self
            .profiles
            .iter()
            .any(|p| p.effective_date == profile.effective_date)
        {
            return Err(EngineError::InvalidEmployee {
                field: "profiles".to_string(),
                message: format!(
                    "a profile effective {} already exists",
                    profile.effective_date
                ),
            });
        }
        self.profiles.push(profile);
        self.sort_profiles();
        Ok(())
    }

    /// Sorts the profile history by effective date, newest first.
    pub fn sort_profiles(&mut self) {
        self.profiles
            .sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
    }

    /// Sum of all bank account allocations.
    pub fn bank_allocation_total(&self) -> Decimal {
        self.bank_accounts.iter().map(|a| a.allocation_percent).sum()
    }

    /// Returns true if net pay has somewhere to go.
    pub fn has_bank_details(&self) -> bool {
        !self.bank_accounts.is_empty()
    }

    /// Returns the YTD totals for a tax year, current or archived.
    pub fn ytd_for(&self, tax_year: i32) -> Option<&YtdTotals> {
        if self.ytd.tax_year == tax_year {
            return Some(&self.ytd);
        }
        self.ytd_history.iter().find(|y| y.tax_year == tax_year)
    }

    /// Checks the record before it is saved or sent to payroll.
    ///
    /// An employee with no bank accounts passes; missing bank details only
    /// block finalization of a pay run.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(invalid("id", "must not be empty"));
        }

        if self.profiles.is_empty() {
            return Err(invalid("profiles", "at least one profile is required"));
        }

        let sorted_unique = self
            .profiles
            .windows(2)
            .all(|w| w[0].effective_date > w[1].effective_date);
        if !sorted_unique {
            return Err(invalid(
                "profiles",
                "effective dates must be unique and sorted newest first",
            ));
        }

        for profile in &self.profiles {
            if profile.first_name.trim().is_empty() || profile.last_name.trim().is_empty() {
                return Err(invalid("profiles.name", "first and last name are required"));
            }
            if profile.province_of_employment.trim().is_empty() {
                return Err(invalid(
                    "profiles.province_of_employment",
                    "province of employment is required",
                ));
            }
            let negative_pay = match &profile.compensation {
                Compensation::Salary { annual_amount } => annual_amount.is_sign_negative(),
                Compensation::Hourly {
                    hourly_rate,
                    hours_per_period,
                } => hourly_rate.is_sign_negative() || hours_per_period.is_sign_negative(),
            };
            if negative_pay {
                return Err(invalid("profiles.compensation", "must not be negative"));
            }
        }

        if let Some(payroll) = &self.payroll {
            let digits: String = payroll
                .sin
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '-')
                .collect();
            if digits.len() != 9 || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("payroll.sin", "SIN must be 9 digits"));
            }
            if payroll.federal_claim_amount.is_sign_negative()
                || payroll.provincial_claim_amount.is_sign_negative()
            {
                return Err(invalid("payroll", "TD1 claim amounts must not be negative"));
            }
        }

        if !self.bank_accounts.is_empty() {
            if self
                .bank_accounts
                .iter()
                .any(|a| a.allocation_percent <= Decimal::ZERO)
            {
                return Err(invalid(
                    "bank_accounts",
                    "each allocation must be greater than 0",
                ));
            }
            let total = self.bank_allocation_total();
            if total != Decimal::ONE_HUNDRED {
                return Err(invalid(
                    "bank_accounts",
                    &format!("allocations must sum to 100, got {}", total.normalize()),
                ));
            }
        }

        let negative_amount = self.garnishments.iter().any(|g| g.amount.is_sign_negative())
            || self
                .recurring_earnings
                .iter()
                .any(|e| e.amount.is_sign_negative())
            || self
                .recurring_deductions
                .iter()
                .any(|d| d.amount.is_sign_negative());
        if negative_amount {
            return Err(invalid(
                "recurring",
                "garnishment, earning and deduction amounts must not be negative",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidEmployee {
        field: field.to_string(),
        message: message.to_string(),
    }
}
