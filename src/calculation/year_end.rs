//! Year-end projections: T4 slips and Records of Employment.
//!
//! Both are read-only views over an employee's YTD ledger and profile
//! history. Nothing here changes employee state.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    CompanySettings, Employee, EmployeeProfile, RecordOfEmployment, RoeReason, T4Slip,
};

fn payroll_sin(employee: &Employee) -> EngineResult<String> {
    employee
        .payroll
        .as_ref()
        .map(|p| p.sin.clone())
        .ok_or_else(|| EngineError::MissingTd1 {
            employee_id: employee.id.clone(),
        })
}

/// The profile in effect on `date`, or the earliest profile if `date` comes
/// before all of them.
fn profile_near(employee: &Employee, date: NaiveDate) -> EngineResult<&EmployeeProfile> {
    employee
        .current_profile(date)
        .or_else(|| employee.profiles.iter().min_by_key(|p| p.effective_date))
        .ok_or_else(|| EngineError::ProfileNotFound {
            employee_id: employee.id.clone(),
            date,
        })
}

/// Generates a T4 slip for a tax year.
///
/// Amounts come from the employee's YTD totals for `tax_year`, current or
/// archived. The name and province of employment are taken from the profile
/// in effect at the end of that year.
///
/// # Errors
///
/// * `YtdNotFound` - no totals exist for the tax year
/// * `MissingTd1` - the employee has no SIN on file
/// * `ProfileNotFound` - the employee has no profile
pub fn generate_t4(
    employee: &Employee,
    company: &CompanySettings,
    tax_year: i32,
) -> EngineResult<T4Slip> {
    let ytd = employee
        .ytd_for(tax_year)
        .ok_or_else(|| EngineError::YtdNotFound {
            employee_id: employee.id.clone(),
            tax_year,
        })?;
    let sin = payroll_sin(employee)?;
    let year_end = NaiveDate::from_ymd_opt(tax_year, 12, 31).ok_or_else(|| {
        EngineError::CalculationError {
            message: format!("invalid tax year {}", tax_year),
        }
    })?;
    let profile = profile_near(employee, year_end)?;

    Ok(T4Slip {
        tax_year,
        employer_name: company.legal_name.clone(),
        employer_business_number: company.business_number.clone(),
        employee_id: employee.id.clone(),
        employee_name: profile.full_name(),
        sin,
        province_of_employment: profile.province_of_employment.clone(),
        employment_income: ytd.gross_pay,
        cpp_contributions: ytd.cpp,
        ei_premiums: ytd.ei,
        income_tax_deducted: ytd.income_tax(),
        ei_insurable_earnings: ytd.insurable_earnings,
        cpp_pensionable_earnings: ytd.pensionable_earnings,
        employer_cpp: ytd.employer_cpp,
        employer_ei: ytd.employer_ei,
    })
}

/// Generates a Record of Employment.
///
/// Insurable earnings are the YTD insurable earnings for the year of the
/// last day paid. Outstanding vacation pay is the current vacation
/// liability.
///
/// # Errors
///
/// * `Validation` - the last day paid is before the hire date
/// * `MissingTd1` - the employee has no SIN on file
/// * `ProfileNotFound` - the employee has no profile
pub fn generate_record_of_employment(
    employee: &Employee,
    company: &CompanySettings,
    last_day_paid: NaiveDate,
    reason: RoeReason,
) -> EngineResult<RecordOfEmployment> {
    if last_day_paid < employee.hire_date {
        return Err(EngineError::Validation {
            message: format!(
                "last day paid {} is before hire date {}",
                last_day_paid, employee.hire_date
            ),
        });
    }
    let sin = payroll_sin(employee)?;
    let profile = profile_near(employee, last_day_paid)?;
    let tax_year = last_day_paid.year();

    let insurable_earnings = employee
        .ytd_for(tax_year)
        .map(|y| y.insurable_earnings)
        .unwrap_or(Decimal::ZERO);

    Ok(RecordOfEmployment {
        employer_name: company.legal_name.clone(),
        employer_business_number: company.business_number.clone(),
        employee_id: employee.id.clone(),
        employee_name: profile.full_name(),
        sin,
        first_day_worked: employee.hire_date,
        last_day_paid,
        reason,
        reason_code: reason.code().to_string(),
        tax_year,
        insurable_earnings,
        vacation_pay_outstanding: employee.ytd.vacation_pay_liability,
    })
}
