//! Configuration loading and management for the Payroll Engine.
//!
//! This module loads versioned statutory rate tables (CPP, EI, federal and
//! provincial income tax) from YAML files keyed by tax year, and reads the
//! server settings used by the binary from the environment.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/canada").unwrap();
//! println!("Loaded rate set: {}", config.metadata().name);
//! ```

mod loader;
mod settings;
mod types;

pub use loader::ConfigLoader;
pub use settings::ServerSettings;
pub use types::{
    CppRates, EiRates, FederalTaxRates, PayrollConfig, PayrollMetadata, ProvincialTaxRates,
    RateTable, TaxBracket,
};
