//! Calculation logic for the Payroll Engine.
//!
//! This module contains the gross-to-net steps for one employee (regular
//! pay, recurring earnings, vacation pay, recurring deductions, CPP, EI,
//! federal and provincial income tax, garnishments), the paystub calculator
//! that runs them in order, CRA remittance aggregation, and year-end T4 and
//! ROE projections.

mod cpp;
mod deductions;
mod earnings;
mod ei;
mod garnishments;
mod income_tax;
mod paystub;
mod remittance;
mod rounding;
mod vacation_pay;
mod year_end;

pub use cpp::{CppResult, calculate_cpp};
pub use deductions::{RecurringDeductionsResult, resolve_recurring_deductions};
pub use earnings::{
    REGULAR_PAY_CODE, RecurringEarningsResult, RegularPayResult, calculate_regular_pay,
    resolve_recurring_earnings,
};
pub use ei::{EiResult, calculate_ei};
pub use garnishments::{
    GARNISHMENTS_EXCEED_NET_PAY, GarnishmentResult, ResolvedGarnishment, apply_garnishments,
    resolve_garnishments,
};
pub use income_tax::{
    IncomeTaxResult, TaxableAmounts, bracket_tax, calculate_federal_tax, calculate_provincial_tax,
    lowest_rate,
};
pub use paystub::{PaystubInput, calculate_paystub};
pub use remittance::aggregate_remittance;
pub use rounding::round_money;
pub use vacation_pay::{VACATION_PAY_CODE, VacationPayResult, calculate_vacation_pay};
pub use year_end::{generate_record_of_employment, generate_t4};
