//! Year-to-date totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An employee's accumulated payroll totals for one tax year.
///
/// Only committed pay runs change these totals. A default value has
/// `tax_year` 0 and is treated as "no payroll yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YtdTotals {
    /// The tax year these totals belong to.
    pub tax_year: i32,
    /// Gross pay (T4 box 14).
    pub gross_pay: Decimal,
    /// CPP pensionable earnings (T4 box 26).
    pub pensionable_earnings: Decimal,
    /// EI insurable earnings (T4 box 24).
    pub insurable_earnings: Decimal,
    /// Employee CPP contributions (T4 box 16).
    pub cpp: Decimal,
    /// Employee EI premiums (T4 box 18).
    pub ei: Decimal,
    /// Employer CPP contributions.
    pub employer_cpp: Decimal,
    /// Employer EI premiums.
    pub employer_ei: Decimal,
    /// Federal income tax withheld.
    pub federal_tax: Decimal,
    /// Provincial income tax withheld.
    pub provincial_tax: Decimal,
    /// Vacation pay accrued but not yet paid out.
    pub vacation_pay_liability: Decimal,
}

impl YtdTotals {
    /// Creates empty totals for a tax year.
    pub fn new(tax_year: i32) -> Self {
        Self {
            tax_year,
            ..Self::default()
        }
    }

    /// Total income tax withheld (T4 box 22).
    pub fn income_tax(&self) -> Decimal {
        self.federal_tax + self.provincial_tax
    }

    /// Employee CPP already withheld in `tax_year`, or zero for another year.
    pub fn cpp_for_year(&self, tax_year: i32) -> Decimal {
        if self.tax_year == tax_year {
            self.cpp
        } else {
            Decimal::ZERO
        }
    }

    /// Employee EI already withheld in `tax_year`, or zero for another year.
    pub fn ei_for_year(&self, tax_year: i32) -> Decimal {
        if self.tax_year == tax_year {
            self.ei
        } else {
            Decimal::ZERO
        }
    }
}
