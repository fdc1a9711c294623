//! Configuration types for payroll rate tables.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::Province;

/// Metadata about the rate table set.
///
/// Contains identifying information about where the rates come from.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollMetadata {
    /// The country code the rates apply to (e.g., "CA").
    pub country: String,
    /// The human-readable name of the rate set.
    pub name: String,
    /// The version of the rate set.
    pub version: String,
    /// URL to the official formula documentation.
    pub source_url: String,
}

/// Canada Pension Plan parameters for one tax year.
#[derive(Debug, Clone, Deserialize)]
pub struct CppRates {
    /// Employee contribution rate (e.g., 0.0595).
    pub rate: Decimal,
    /// Annual basic exemption, prorated per pay period.
    pub basic_exemption: Decimal,
    /// Year's maximum pensionable earnings.
    pub max_pensionable_earnings: Decimal,
    /// Maximum annual employee contribution.
    pub max_contribution: Decimal,
}

/// Employment Insurance parameters for one tax year.
#[derive(Debug, Clone, Deserialize)]
pub struct EiRates {
    /// Employee premium rate (e.g., 0.0166).
    pub rate: Decimal,
    /// Maximum annual insurable earnings.
    pub max_insurable_earnings: Decimal,
    /// Maximum annual employee premium.
    pub max_premium: Decimal,
    /// Employer premium as a multiple of the employee premium.
    pub employer_multiplier: Decimal,
}

/// A single progressive tax bracket.
///
/// The rate applies to annual income above `threshold`, up to the next
/// bracket's threshold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxBracket {
    /// Annual income at which this bracket starts.
    pub threshold: Decimal,
    /// Marginal rate for income in this bracket.
    pub rate: Decimal,
}

/// Federal income tax parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct FederalTaxRates {
    /// Maximum basic personal amount.
    pub basic_personal_amount: Decimal,
    /// Canada Employment Amount credit base.
    pub canada_employment_amount: Decimal,
    /// Progressive brackets, lowest threshold first.
    pub brackets: Vec<TaxBracket>,
}

/// Provincial or territorial income tax parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvincialTaxRates {
    /// Provincial basic personal amount.
    pub basic_personal_amount: Decimal,
    /// Progressive brackets, lowest threshold first.
    pub brackets: Vec<TaxBracket>,
}

/// All statutory rates for a single tax year.
///
/// Loaded from one file under `rates/` (e.g., `rates/2024.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RateTable {
    /// The tax year these rates apply to.
    pub tax_year: i32,
    /// CPP parameters.
    pub cpp: CppRates,
    /// EI parameters.
    pub ei: EiRates,
    /// Federal income tax parameters.
    pub federal: FederalTaxRates,
    /// Provincial income tax parameters keyed by province.
    pub provinces: BTreeMap<Province, ProvincialTaxRates>,
}

/// The complete payroll configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    /// Rate set metadata.
    metadata: PayrollMetadata,
    /// Rate tables keyed by tax year.
    tables: BTreeMap<i32, RateTable>,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    ///
    /// When two tables share a tax year the later one wins; the loader
    /// rejects that case before calling this.
    pub fn new(metadata: PayrollMetadata, tables: Vec<RateTable>) -> Self {
        let tables = tables.into_iter().map(|t| (t.tax_year, t)).collect();
        Self { metadata, tables }
    }

    /// Returns the rate set metadata.
    pub fn metadata(&self) -> &PayrollMetadata {
        &self.metadata
    }

    /// Returns the rate table for a tax year, if configured.
    pub fn rate_table(&self, tax_year: i32) -> Option<&RateTable> {
        self.tables.get(&tax_year)
    }

    /// Returns all configured tax years, oldest first.
    pub fn tax_years(&self) -> Vec<i32> {
        self.tables.keys().copied().collect()
    }
}
