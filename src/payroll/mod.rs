//! Pay run processing.
//!
//! Previewing calculates paystubs without side effects. Committing posts
//! them to each employee's YTD ledger and appends the pay run to the
//! tenant's history through a [`PayrollStore`].

mod commit;
mod ledger;
mod orchestrator;
mod store;

pub use commit::commit_payroll_run;
pub use ledger::{accrue_time_off, check_postable, post_paystub, roll_over, verify_paystub};
pub use orchestrator::{
    PayRunProgress, PayRunRequest, calculate_employee_paystub, preview_pay_run,
    validate_pay_run_request,
};
pub use store::{InMemoryPayrollStore, PayrollStore, PostPaystub};
