//! CRA remittance aggregation.

use rust_decimal::Decimal;

use crate::models::{PayRun, Paystub, RemittanceSummary};

/// Sums the source deductions owed for a committed pay run.
///
/// Income tax is federal plus provincial tax withheld. CPP and EI remitted
/// include both the employee and the employer share. The total remittance
/// is income tax plus CPP remitted plus EI remitted.
///
/// The summary is recomputed on every call; nothing is cached.
pub fn aggregate_remittance(run: &PayRun) -> RemittanceSummary {
    let sum = |f: fn(&Paystub) -> Decimal| -> Decimal {
        run.paystubs.iter().map(f).sum()
    };

    let total_gross = sum(|p| p.gross_pay);
    let federal_tax = sum(|p| p.federal_tax());
    let provincial_tax = sum(|p| p.provincial_tax());
    let employee_cpp = sum(|p| p.cpp());
    let employer_cpp = sum(|p| p.employer_contributions.cpp);
    let employee_ei = sum(|p| p.ei());
    let employer_ei = sum(|p| p.employer_contributions.ei);

    let income_tax = federal_tax + provincial_tax;
    let cpp_remitted = employee_cpp + employer_cpp;
    let ei_remitted = employee_ei + employer_ei;

    RemittanceSummary {
        pay_run_id: run.id,
        pay_period_label: run.pay_period_label.clone(),
        employee_count: run.paystubs.len(),
        total_gross,
        federal_tax,
        provincial_tax,
        income_tax,
        employee_cpp,
        employer_cpp,
        cpp_remitted,
        employee_ei,
        employer_ei,
        ei_remitted,
        total_remittance: income_tax + cpp_remitted + ei_remitted,
    }
}
