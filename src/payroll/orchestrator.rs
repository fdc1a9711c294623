//! Pay run preview.
//!
//! The orchestrator validates a pay run request, then calculates each
//! employee's paystub one at a time in input order, reporting progress
//! after every employee. A failure for any employee aborts the run and no
//! paystubs are returned.
//!
//! Previewing never changes employee state. Only
//! [`commit_payroll_run`](super::commit_payroll_run) does.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculation::{PaystubInput, calculate_paystub, resolve_garnishments};
use crate::config::{ConfigLoader, RateTable};
use crate::error::{EngineError, EngineResult};
use crate::models::{CompanySettings, Employee, Paystub};

/// A request to calculate one pay period for a set of employees.
#[derive(Debug, Clone)]
pub struct PayRunRequest {
    /// Owning tenant.
    pub tenant_id: String,
    /// Pay period label (e.g., "Jan 1 - Jan 15").
    pub pay_period_label: String,
    /// Pay date.
    pub pay_date: NaiveDate,
    /// Selected employees, in processing order.
    pub employees: Vec<Employee>,
}

/// Progress reported after each employee is calculated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRunProgress {
    /// The employee just calculated.
    pub employee_id: String,
    /// Employees calculated so far.
    pub completed: usize,
    /// Employees in the run.
    pub total: usize,
    /// Completion percentage, rounded to two decimal places.
    pub percent: Decimal,
}

/// Validates a pay run request before any calculation runs.
///
/// # Errors
///
/// * `Validation` - the label is empty, there are no employees, or an
///   employee ID appears twice
/// * `InvalidEmployee` - an employee record fails validation
pub fn validate_pay_run_request(request: &PayRunRequest) -> EngineResult<()> {
    if request.pay_period_label.trim().is_empty() {
        return Err(EngineError::Validation {
            message: "pay period label is required".to_string(),
        });
    }

    if request.employees.is_empty() {
        return Err(EngineError::Validation {
            message: "at least one employee must be selected".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for employee in &request.employees {
        if !seen.insert(employee.id.as_str()) {
            return Err(EngineError::Validation {
                message: format!("duplicate employee ID: {}", employee.id),
            });
        }
        employee.validate()?;
    }

    Ok(())
}

/// Calculates paystubs for every employee in the request.
///
/// Employees are processed sequentially in input order. `on_progress` is
/// called once after each employee, with `completed` rising by one each
/// time and `percent` reaching 100 on the last call.
///
/// # Errors
///
/// Validation errors are returned as-is. A missing rate table for the pay
/// date's tax year returns `RateTableNotFound`. Any per-employee failure is
/// returned as `EmployeeCalculationFailed` naming the employee.
pub fn preview_pay_run<F>(
    request: &PayRunRequest,
    settings: &CompanySettings,
    config: &ConfigLoader,
    mut on_progress: F,
) -> EngineResult<Vec<Paystub>>
where
    F: FnMut(&PayRunProgress),
{
    validate_pay_run_request(request)?;

    let tax_year = request.pay_date.year();
    let rate_table = config.get_rate_table(tax_year)?;
    let total = request.employees.len();

    info!(
        tenant_id = %request.tenant_id,
        pay_period = %request.pay_period_label,
        tax_year,
        employee_count = total,
        "Starting pay run preview"
    );

    let mut paystubs = Vec::with_capacity(total);

    for (index, employee) in request.employees.iter().enumerate() {
        let paystub = calculate_employee_paystub(
            employee,
            &request.pay_period_label,
            request.pay_date,
            settings,
            rate_table,
        )
        .map_err(|err| {
            warn!(
                tenant_id = %request.tenant_id,
                employee_id = %employee.id,
                error = %err,
                "Pay run aborted"
            );
            err.for_employee(&employee.id)
        })?;

        debug!(
            employee_id = %employee.id,
            gross_pay = %paystub.gross_pay,
            net_pay = %paystub.net_pay,
            "Employee calculated"
        );
        paystubs.push(paystub);

        let completed = index + 1;
        on_progress(&PayRunProgress {
            employee_id: employee.id.clone(),
            completed,
            total,
            percent: (Decimal::from(completed) * Decimal::ONE_HUNDRED / Decimal::from(total))
                .round_dp(2),
        });
    }

    info!(
        tenant_id = %request.tenant_id,
        pay_period = %request.pay_period_label,
        paystub_count = paystubs.len(),
        "Pay run preview completed"
    );

    Ok(paystubs)
}

/// Calculates one employee's paystub with the company's vacation policy
/// and garnishment configurations applied.
///
/// Preview and commit both calculate through here, so a paystub commits
/// only if it still matches what this returns for the stored employee.
pub fn calculate_employee_paystub(
    employee: &Employee,
    pay_period_label: &str,
    pay_date: NaiveDate,
    settings: &CompanySettings,
    rate_table: &RateTable,
) -> EngineResult<Paystub> {
    let vacation_rate_percent = settings
        .vacation_policy_for(employee)
        .and_then(|policy| policy.vacation_pay_percent);
    let garnishments = resolve_garnishments(employee, settings)?;

    calculate_paystub(&PaystubInput {
        employee,
        pay_period_label,
        pay_date,
        settings,
        rate_table,
        vacation_rate_percent,
        garnishments: &garnishments,
    })
}
