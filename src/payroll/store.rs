//! Tenant-scoped payroll storage.
//!
//! [`PayrollStore`] is the capability the API and commit path depend on.
//! [`InMemoryPayrollStore`] keeps each tenant's state behind its own lock so
//! tenants never contend with each other.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{CompanySettings, Employee, PayRun, Paystub};

/// Posts one paystub to an employee's stored record.
///
/// Called by [`PayrollStore::commit_run`] with the tenant's current company
/// settings and a working copy of the employee, while no other write to the
/// tenant can run.
pub type PostPaystub<'a> =
    dyn Fn(&CompanySettings, &mut Employee, &Paystub) -> EngineResult<()> + 'a;

/// Storage for company settings, employees and committed pay runs.
pub trait PayrollStore: Send + Sync {
    /// Returns the tenant's company settings.
    fn company_settings(&self, tenant_id: &str) -> EngineResult<CompanySettings>;

    /// Validates and saves the tenant's company settings.
    fn save_company_settings(&self, tenant_id: &str, settings: CompanySettings)
    -> EngineResult<()>;

    /// Returns every employee of the tenant, ordered by ID.
    fn employees(&self, tenant_id: &str) -> EngineResult<Vec<Employee>>;

    /// Returns one employee, or `EmployeeNotFound`.
    fn employee(&self, tenant_id: &str, employee_id: &str) -> EngineResult<Employee>;

    /// Validates and saves an employee, returning the stored record.
    ///
    /// For an existing employee the profile history is append-only and the
    /// YTD ledger is never taken from the caller.
    fn save_employee(&self, tenant_id: &str, employee: Employee) -> EngineResult<Employee>;

    /// Returns the tenant's committed pay runs, oldest first.
    fn history(&self, tenant_id: &str) -> EngineResult<Vec<PayRun>>;

    /// Returns one committed pay run, or `PayRunNotFound`.
    fn pay_run(&self, tenant_id: &str, run_id: Uuid) -> EngineResult<PayRun>;

    /// Returns true if a pay run with this label has been committed.
    fn has_run_for_period(&self, tenant_id: &str, pay_period_label: &str) -> EngineResult<bool>;

    /// Posts every paystub of the run and appends it to the history.
    ///
    /// `post` runs against the stored employees with the tenant locked, so
    /// it sees every earlier write. Either every change is applied or none
    /// is.
    fn commit_run(&self, run: PayRun, post: &PostPaystub<'_>) -> EngineResult<()>;
}

#[derive(Debug, Default)]
struct TenantState {
    settings: Option<CompanySettings>,
    employees: BTreeMap<String, Employee>,
    pay_runs: Vec<PayRun>,
}

impl TenantState {
    fn has_run_for_period(&self, pay_period_label: &str) -> bool {
        self.pay_runs
            .iter()
            .any(|run| run.pay_period_label == pay_period_label)
    }
}

/// A [`PayrollStore`] held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPayrollStore {
    tenants: RwLock<HashMap<String, Arc<RwLock<TenantState>>>>,
}

fn poisoned(what: &str) -> EngineError {
    EngineError::Storage {
        message: format!("{} lock poisoned", what),
    }
}

impl InMemoryPayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tenant(&self, tenant_id: &str) -> EngineResult<Arc<RwLock<TenantState>>> {
        if let Some(state) = self
            .tenants
            .read()
            .map_err(|_| poisoned("tenant map"))?
            .get(tenant_id)
        {
            return Ok(Arc::clone(state));
        }

        let mut tenants = self.tenants.write().map_err(|_| poisoned("tenant map"))?;
        Ok(Arc::clone(tenants.entry(tenant_id.to_string()).or_default()))
    }

    fn read<T>(
        &self,
        tenant_id: &str,
        f: impl FnOnce(&TenantState) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let tenant = self.tenant(tenant_id)?;
        let state = tenant.read().map_err(|_| poisoned("tenant"))?;
        f(&*state)
    }

    fn write<T>(
        &self,
        tenant_id: &str,
        f: impl FnOnce(&mut TenantState) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let tenant = self.tenant(tenant_id)?;
        let mut state = tenant.write().map_err(|_| poisoned("tenant"))?;
        f(&mut *state)
    }
}

/// Merges an incoming employee record into the stored one.
///
/// Stored profiles must come back unchanged; new effective dates are
/// appended. The stored YTD ledger is kept, as are accrued time-off
/// balances for policies still assigned.
fn merge_employee(stored: &Employee, mut incoming: Employee) -> EngineResult<Employee> {
    let mut merged_profiles = stored.clone();
    for profile in incoming.profiles.drain(..) {
        match merged_profiles
            .profiles
            .iter()
            .find(|p| p.effective_date == profile.effective_date)
        {
            Some(existing) if *existing == profile => {}
            Some(_) => {
                return Err(EngineError::InvalidEmployee {
                    field: "profiles".to_string(),
                    message: format!(
                        "profile effective {} cannot be changed; add a new profile instead",
                        profile.effective_date
                    ),
                });
            }
            None => merged_profiles.add_profile(profile)?,
        }
    }
    incoming.profiles = merged_profiles.profiles;

    for (policy_id, balance) in incoming.time_off_balances.iter_mut() {
        if let Some(stored_balance) = stored.time_off_balances.get(policy_id) {
            *balance = *stored_balance;
        }
    }

    incoming.ytd = stored.ytd.clone();
    incoming.ytd_history = stored.ytd_history.clone();
    Ok(incoming)
}

impl PayrollStore for InMemoryPayrollStore {
    fn company_settings(&self, tenant_id: &str) -> EngineResult<CompanySettings> {
        self.read(tenant_id, |state| {
            state
                .settings
                .clone()
                .ok_or_else(|| EngineError::CompanySettingsNotFound {
                    tenant_id: tenant_id.to_string(),
                })
        })
    }

    fn save_company_settings(
        &self,
        tenant_id: &str,
        settings: CompanySettings,
    ) -> EngineResult<()> {
        settings.validate()?;
        self.write(tenant_id, |state| {
            state.settings = Some(settings);
            Ok(())
        })
    }

    fn employees(&self, tenant_id: &str) -> EngineResult<Vec<Employee>> {
        self.read(tenant_id, |state| Ok(state.employees.values().cloned().collect()))
    }

    fn employee(&self, tenant_id: &str, employee_id: &str) -> EngineResult<Employee> {
        self.read(tenant_id, |state| {
            state
                .employees
                .get(employee_id)
                .cloned()
                .ok_or_else(|| EngineError::EmployeeNotFound {
                    employee_id: employee_id.to_string(),
                })
        })
    }

    fn save_employee(&self, tenant_id: &str, mut employee: Employee) -> EngineResult<Employee> {
        employee.sort_profiles();
        self.write(tenant_id, |state| {
            let employee = match state.employees.get(&employee.id) {
                Some(stored) => merge_employee(stored, employee)?,
                None => employee,
            };
            employee.validate()?;
            state
                .employees
                .insert(employee.id.clone(), employee.clone());
            Ok(employee)
        })
    }

    fn history(&self, tenant_id: &str) -> EngineResult<Vec<PayRun>> {
        self.read(tenant_id, |state| Ok(state.pay_runs.clone()))
    }

    fn pay_run(&self, tenant_id: &str, run_id: Uuid) -> EngineResult<PayRun> {
        self.read(tenant_id, |state| {
            state
                .pay_runs
                .iter()
                .find(|run| run.id == run_id)
                .cloned()
                .ok_or_else(|| EngineError::PayRunNotFound {
                    run_id: run_id.to_string(),
                })
        })
    }

    fn has_run_for_period(&self, tenant_id: &str, pay_period_label: &str) -> EngineResult<bool> {
        self.read(tenant_id, |state| Ok(state.has_run_for_period(pay_period_label)))
    }

    fn commit_run(&self, run: PayRun, post: &PostPaystub<'_>) -> EngineResult<()> {
        let tenant_id = run.tenant_id.clone();
        self.write(&tenant_id, |state| {
            if state.has_run_for_period(&run.pay_period_label) {
                return Err(EngineError::PayRunAlreadyCommitted {
                    pay_period_label: run.pay_period_label.clone(),
                });
            }
            let settings = state.settings.as_ref().ok_or_else(|| {
                EngineError::CompanySettingsNotFound {
                    tenant_id: tenant_id.clone(),
                }
            })?;

            let mut posted = Vec::with_capacity(run.paystubs.len());
            let mut seen = HashSet::new();
            for paystub in &run.paystubs {
                if !seen.insert(paystub.employee_id.clone()) {
                    return Err(EngineError::Validation {
                        message: format!(
                            "duplicate paystub for employee '{}'",
                            paystub.employee_id
                        ),
                    });
                }
                let mut employee = state
                    .employees
                    .get(&paystub.employee_id)
                    .cloned()
                    .ok_or_else(|| EngineError::EmployeeNotFound {
                        employee_id: paystub.employee_id.clone(),
                    })?;
                post(settings, &mut employee, paystub)?;
                posted.push(employee);
            }

            for employee in posted {
                state.employees.insert(employee.id.clone(), employee);
            }
            state.pay_runs.push(run);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Compensation, EmployeeProfile, EmployerContributions, PayFrequency, Province,
        VacationPayoutMethod, YtdTotals,
    };
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profile(effective_date: NaiveDate, title: &str) -> EmployeeProfile {
        EmployeeProfile {
            effective_date,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            job_title: title.to_string(),
            province_of_employment: "ON".to_string(),
            pay_frequency: PayFrequency::BiWeekly,
            compensation: Compensation::Salary {
                annual_amount: dec("52000"),
            },
        }
    }

    fn create_test_employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            hire_date: date(2023, 1, 1),
            profiles: vec![profile(date(2023, 1, 1), "Analyst")],
            payroll: None,
            bank_accounts: vec![],
            garnishments: vec![],
            recurring_earnings: vec![],
            recurring_deductions: vec![],
            time_off_balances: BTreeMap::new(),
            ytd: YtdTotals::default(),
            ytd_history: vec![],
        }
    }

    fn create_test_settings() -> CompanySettings {
        CompanySettings {
            legal_name: "Maple Widgets Inc.".to_string(),
            business_number: "123456789RP0001".to_string(),
            province: "ON".to_string(),
            pay_frequency: PayFrequency::BiWeekly,
            vacation_payout_method: VacationPayoutMethod::Accrue,
            earning_codes: vec![],
            deduction_codes: vec![],
            garnishment_configurations: vec![],
            time_off_policies: vec![],
        }
    }

    fn create_paystub(employee_id: &str) -> Paystub {
        Paystub {
            employee_id: employee_id.to_string(),
            employee_name: "Jane Doe".to_string(),
            pay_period_label: "Jan 1 - Jan 15".to_string(),
            pay_date: date(2024, 1, 19),
            tax_year: 2024,
            province: Province::Ontario,
            pay_frequency: PayFrequency::BiWeekly,
            earnings: vec![],
            deductions: vec![],
            gross_pay: dec("2000.00"),
            total_deductions: Decimal::ZERO,
            net_pay: dec("2000.00"),
            pensionable_earnings: dec("2000.00"),
            insurable_earnings: dec("2000.00"),
            taxable_income: dec("2000.00"),
            employer_contributions: EmployerContributions::default(),
            vacation: None,
            warnings: vec![],
            audit_steps: vec![],
        }
    }

    fn create_run(tenant_id: &str, label: &str, paystubs: Vec<Paystub>) -> PayRun {
        PayRun {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.to_string(),
            pay_period_label: label.to_string(),
            pay_date: date(2024, 1, 19),
            committed_at: Utc::now(),
            paystubs,
        }
    }

    /// ST-001: settings round trip and missing settings
    #[test]
    fn test_company_settings() {
        let store = InMemoryPayrollStore::new();
        assert!(matches!(
            store.company_settings("acme"),
            Err(EngineError::CompanySettingsNotFound { .. })
        ));

        store
            .save_company_settings("acme", create_test_settings())
            .unwrap();
        assert_eq!(
            store.company_settings("acme").unwrap().legal_name,
            "Maple Widgets Inc."
        );
    }

    /// ST-002: tenants do not see each other's employees
    #[test]
    fn test_tenant_isolation() {
        let store = InMemoryPayrollStore::new();
        store
            .save_employee("acme", create_test_employee("emp_001"))
            .unwrap();

        assert_eq!(store.employees("acme").unwrap().len(), 1);
        assert!(store.employees("globex").unwrap().is_empty());
        assert!(matches!(
            store.employee("globex", "emp_001"),
            Err(EngineError::EmployeeNotFound { .. })
        ));
    }

    /// ST-003: invalid employees are not saved
    #[test]
    fn test_save_validates() {
        let store = InMemoryPayrollStore::new();
        let mut employee = create_test_employee("emp_001");
        employee.profiles.clear();

        assert!(matches!(
            store.save_employee("acme", employee),
            Err(EngineError::InvalidEmployee { .. })
        ));
        assert!(store.employees("acme").unwrap().is_empty());
    }

    /// ST-004: profile history is append-only and YTD is preserved
    #[test]
    fn test_save_merges_existing_employee() {
        let store = InMemoryPayrollStore::new();
        let mut original = create_test_employee("emp_001");
        original.ytd.tax_year = 2024;
        original.ytd.gross_pay = dec("2000.00");
        store.save_employee("acme", original).unwrap();

        let mut update = create_test_employee("emp_001");
        update.profiles = vec![profile(date(2024, 3, 1), "Lead")];
        update.ytd = YtdTotals::default();
        let saved = store.save_employee("acme", update).unwrap();

        assert_eq!(saved.profiles.len(), 2);
        assert_eq!(saved.profiles[0].job_title, "Lead");
        assert_eq!(saved.ytd.gross_pay, dec("2000.00"));

        let mut rewrite = create_test_employee("emp_001");
        rewrite.profiles = vec![profile(date(2023, 1, 1), "Changed")];
        assert!(matches!(
            store.save_employee("acme", rewrite),
            Err(EngineError::InvalidEmployee { .. })
        ));
    }

    /// ST-005: duplicate period and unknown employee rejected with no writes
    #[test]
    fn test_commit_run_checks() {
        let store = InMemoryPayrollStore::new();
        store
            .save_company_settings("acme", create_test_settings())
            .unwrap();
        store
            .save_employee("acme", create_test_employee("emp_001"))
            .unwrap();
        let run = create_run("acme", "Jan 1 - Jan 15", vec![]);
        let run_id = run.id;
        store.commit_run(run, &|_, _, _| Ok(())).unwrap();

        assert!(store.has_run_for_period("acme", "Jan 1 - Jan 15").unwrap());
        assert!(!store.has_run_for_period("globex", "Jan 1 - Jan 15").unwrap());
        assert_eq!(store.pay_run("acme", run_id).unwrap().id, run_id);

        assert!(matches!(
            store.commit_run(create_run("acme", "Jan 1 - Jan 15", vec![]), &|_, _, _| Ok(())),
            Err(EngineError::PayRunAlreadyCommitted { .. })
        ));

        let ghost = create_run("acme", "Jan 16 - Jan 31", vec![create_paystub("emp_999")]);
        assert!(matches!(
            store.commit_run(ghost, &|_, _, _| Ok(())),
            Err(EngineError::EmployeeNotFound { .. })
        ));
        assert_eq!(store.history("acme").unwrap().len(), 1);
    }

    /// ST-007: posting sees the latest stored record and a refusal writes nothing
    #[test]
    fn test_commit_run_posts_under_lock() {
        let store = InMemoryPayrollStore::new();
        store
            .save_company_settings("acme", create_test_settings())
            .unwrap();
        store
            .save_employee("acme", create_test_employee("emp_001"))
            .unwrap();
        store
            .save_employee("acme", create_test_employee("emp_002"))
            .unwrap();
        let mut update = create_test_employee("emp_001");
        update.profiles = vec![profile(date(2024, 3, 1), "Lead")];
        store.save_employee("acme", update).unwrap();

        fn add_gross(
            _: &CompanySettings,
            employee: &mut Employee,
            paystub: &Paystub,
        ) -> EngineResult<()> {
            employee.ytd.gross_pay += paystub.gross_pay;
            Ok(())
        }

        let refused = create_run(
            "acme",
            "Jan 1 - Jan 15",
            vec![create_paystub("emp_001"), create_paystub("emp_002")],
        );
        let result = store.commit_run(refused, &|settings, employee, paystub| {
            if employee.id == "emp_002" {
                return Err(EngineError::FinalizationBlocked {
                    employee_id: employee.id.clone(),
                    reason: "no bank account on file".to_string(),
                });
            }
            add_gross(settings, employee, paystub)
        });
        assert!(matches!(result, Err(EngineError::FinalizationBlocked { .. })));
        assert_eq!(
            store.employee("acme", "emp_001").unwrap().ytd.gross_pay,
            Decimal::ZERO
        );
        assert!(store.history("acme").unwrap().is_empty());

        let run = create_run("acme", "Jan 1 - Jan 15", vec![create_paystub("emp_001")]);
        store.commit_run(run, &add_gross).unwrap();

        let stored = store.employee("acme", "emp_001").unwrap();
        assert_eq!(stored.profiles.len(), 2);
        assert_eq!(stored.ytd.gross_pay, dec("2000.00"));
        assert_eq!(store.history("acme").unwrap().len(), 1);
    }

    /// ST-006: unknown pay run
    #[test]
    fn test_pay_run_not_found() {
        let store = InMemoryPayrollStore::new();
        assert!(matches!(
            store.pay_run("acme", Uuid::new_v4()),
            Err(EngineError::PayRunNotFound { .. })
        ));
    }
}
