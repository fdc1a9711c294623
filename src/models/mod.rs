//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod company;
mod employee;
mod jurisdiction;
mod paystub;
mod reports;
mod ytd;

pub use company::{
    AccrualMethod, CompanySettings, DeductionCode, EarningCode, GarnishmentCalculation,
    GarnishmentConfiguration, TimeOffPolicy, VacationPayoutMethod,
};
pub use employee::{
    BankAccount, Compensation, Employee, EmployeeProfile, GarnishmentAssignment, PayFrequency,
    PayrollInfo, RecurringDeduction, RecurringEarning,
};
pub use jurisdiction::{Jurisdiction, Province};
pub use paystub::{
    AuditStep, AuditWarning, DeductionCategory, DeductionLine, EarningKind, EarningLine,
    EmployerContributions, PayRun, Paystub, VacationPay,
};
pub use reports::{RecordOfEmployment, RemittanceSummary, RoeReason, T4Slip};
pub use ytd::YtdTotals;
