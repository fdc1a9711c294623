//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while calculating, committing,
//! and reporting on payroll.

use thiserror::Error;

/// The main error type for the Payroll Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No rate table is configured for the requested tax year.
    #[error("Rate table not found for tax year {tax_year}")]
    RateTableNotFound {
        /// The tax year that was requested.
        tax_year: i32,
    },

    /// The jurisdiction is unrecognized or has no rates for the tax year.
    #[error("Jurisdiction '{jurisdiction}' is not supported for tax year {tax_year}")]
    JurisdictionNotFound {
        /// The jurisdiction code as supplied.
        jurisdiction: String,
        /// The tax year being calculated.
        tax_year: i32,
    },

    /// The employee has no TD1 information on file.
    #[error("Employee '{employee_id}' has no TD1 information on file")]
    MissingTd1 {
        /// The employee missing TD1 data.
        employee_id: String,
    },

    /// No employee profile is effective on the requested date.
    #[error("Employee '{employee_id}' has no profile effective on {date}")]
    ProfileNotFound {
        /// The employee whose profile was requested.
        employee_id: String,
        /// The date the profile was requested for.
        date: chrono::NaiveDate,
    },

    /// An earning, deduction, garnishment, or policy code is not in the company catalog.
    #[error("Unknown {kind} code: {code}")]
    CodeNotFound {
        /// The catalog that was searched (e.g., "earning").
        kind: String,
        /// The code that was not found.
        code: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A request failed validation before any payroll logic ran.
    #[error("Validation failed: {message}")]
    Validation {
        /// A user-facing description of the problem.
        message: String,
    },

    /// Calculation for one employee failed, aborting the whole pay run.
    #[error("Payroll calculation failed for employee '{employee_id}': {source}")]
    EmployeeCalculationFailed {
        /// The employee whose calculation failed.
        employee_id: String,
        /// The underlying error.
        #[source]
        source: Box<EngineError>,
    },

    /// The employee does not exist for the tenant.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee ID that was not found.
        employee_id: String,
    },

    /// The tenant has no company settings configured.
    #[error("Company settings not found for tenant: {tenant_id}")]
    CompanySettingsNotFound {
        /// The tenant without settings.
        tenant_id: String,
    },

    /// The pay run does not exist in the tenant's history.
    #[error("Pay run not found: {run_id}")]
    PayRunNotFound {
        /// The pay run ID that was not found.
        run_id: String,
    },

    /// A pay run for this period has already been committed.
    #[error("Pay run for period '{pay_period_label}' has already been committed")]
    PayRunAlreadyCommitted {
        /// The pay period label that was already committed.
        pay_period_label: String,
    },

    /// The pay run cannot be finalized until the employee's data is fixed.
    #[error("Cannot finalize pay run for employee '{employee_id}': {reason}")]
    FinalizationBlocked {
        /// The employee blocking finalization.
        employee_id: String,
        /// Why finalization is blocked.
        reason: String,
    },

    /// A submitted paystub differs from a fresh calculation against the
    /// employee's current ledger.
    #[error("Paystub for employee '{employee_id}' no longer matches its calculation ({field}); preview the pay run again")]
    PaystubMismatch {
        /// The employee whose paystub is stale or altered.
        employee_id: String,
        /// The first field that differs.
        field: String,
    },

    /// No year-to-date totals exist for the requested tax year.
    #[error("No year-to-date totals for employee '{employee_id}' in tax year {tax_year}")]
    YtdNotFound {
        /// The employee whose totals were requested.
        employee_id: String,
        /// The requested tax year.
        tax_year: i32,
    },

    /// The payroll store could not be read or written.
    #[error("Payroll store error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Wraps an error with the ID of the employee being processed.
    ///
    /// Errors that already name an employee run are left as they are.
    pub fn for_employee(self, employee_id: &str) -> Self {
        match self {
            EngineError::EmployeeCalculationFailed { .. } => self,
            other => EngineError::EmployeeCalculationFailed {
                employee_id: employee_id.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
