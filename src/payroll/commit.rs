//! Pay run commit.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::ledger::{accrue_time_off, check_postable, post_paystub, roll_over, verify_paystub};
use super::orchestrator::calculate_employee_paystub;
use super::store::PayrollStore;
use crate::config::{ConfigLoader, RateTable};
use crate::error::{EngineError, EngineResult};
use crate::models::{CompanySettings, Employee, PayRun, Paystub};

/// Commits previewed paystubs as a pay run.
///
/// This is the only operation that changes YTD ledgers. Each paystub is
/// recalculated against the employee's stored ledger while the tenant is
/// locked and must match what was submitted, so a preview made stale by
/// another commit, or a paystub edited after preview, is refused. Every
/// check runs before anything is written; a refused commit leaves no trace.
///
/// # Errors
///
/// * `Validation` - empty label, no paystubs, a paystub for another period,
///   or two paystubs for one employee
/// * `RateTableNotFound` - no rates for the pay date's tax year
/// * `PayRunAlreadyCommitted` - the tenant already committed this period
/// * `EmployeeNotFound` - a paystub names an unknown employee
/// * `FinalizationBlocked` - an employee has no bank details, or a paystub
///   falls in a closed tax year
/// * `PaystubMismatch` - a paystub differs from its recalculation
/// * `EmployeeCalculationFailed` - the recalculation itself failed
pub fn commit_payroll_run(
    store: &dyn PayrollStore,
    config: &ConfigLoader,
    tenant_id: &str,
    pay_period_label: &str,
    pay_date: NaiveDate,
    paystubs: Vec<Paystub>,
) -> EngineResult<PayRun> {
    if pay_period_label.trim().is_empty() {
        return Err(EngineError::Validation {
            message: "pay period label is required".to_string(),
        });
    }
    if paystubs.is_empty() {
        return Err(EngineError::Validation {
            message: "a pay run needs at least one paystub".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for paystub in &paystubs {
        if paystub.pay_period_label != pay_period_label || paystub.pay_date != pay_date {
            return Err(EngineError::Validation {
                message: format!(
                    "paystub for '{}' belongs to a different pay period",
                    paystub.employee_id
                ),
            });
        }
        if !seen.insert(paystub.employee_id.clone()) {
            return Err(EngineError::Validation {
                message: format!("duplicate paystub for employee '{}'", paystub.employee_id),
            });
        }
    }

    if store.has_run_for_period(tenant_id, pay_period_label)? {
        warn!(
            tenant_id = %tenant_id,
            pay_period = %pay_period_label,
            "Pay run already committed"
        );
        return Err(EngineError::PayRunAlreadyCommitted {
            pay_period_label: pay_period_label.to_string(),
        });
    }

    let rate_table = config.get_rate_table(pay_date.year())?;

    let run = PayRun {
        id: Uuid::new_v4(),
        tenant_id: tenant_id.to_string(),
        pay_period_label: pay_period_label.to_string(),
        pay_date,
        committed_at: Utc::now(),
        paystubs,
    };
    store
        .commit_run(run.clone(), &|settings, employee, paystub| {
            post_verified(settings, rate_table, employee, paystub)
        })
        .inspect_err(|err| {
            warn!(
                tenant_id = %tenant_id,
                pay_period = %pay_period_label,
                error = %err,
                "Pay run commit refused"
            );
        })?;

    info!(
        tenant_id = %tenant_id,
        pay_run_id = %run.id,
        pay_period = %run.pay_period_label,
        paystub_count = run.paystubs.len(),
        "Pay run committed"
    );

    Ok(run)
}

/// Checks one paystub against the stored employee and posts it.
fn post_verified(
    settings: &CompanySettings,
    rate_table: &RateTable,
    employee: &mut Employee,
    paystub: &Paystub,
) -> EngineResult<()> {
    if !employee.has_bank_details() {
        return Err(EngineError::FinalizationBlocked {
            employee_id: employee.id.clone(),
            reason: "no bank account on file".to_string(),
        });
    }
    check_postable(employee, paystub)?;

    let expected = calculate_employee_paystub(
        employee,
        &paystub.pay_period_label,
        paystub.pay_date,
        settings,
        rate_table,
    )
    .map_err(|err| err.for_employee(&employee.id))?;
    verify_paystub(&expected, paystub)?;

    let new_year = roll_over(employee, paystub.tax_year);
    post_paystub(employee, paystub);
    accrue_time_off(employee, &settings.time_off_policies, paystub, new_year);
    Ok(())
}
