//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! rate tables from YAML files.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::Province;

use super::types::{PayrollConfig, PayrollMetadata, ProvincialTaxRates, RateTable};

/// Loads and provides access to payroll rate tables.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and answers rate lookups by tax year.
///
/// # Directory Structure
///
/// ```text
/// config/canada/
/// ├── payroll.yaml        # Rate set metadata
/// └── rates/
///     ├── 2023.yaml       # One rate table per tax year
///     └── 2024.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/canada").unwrap();
/// let table = loader.get_rate_table(2024).unwrap();
/// println!("CPP max: ${}", table.cpp.max_contribution);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `payroll.yaml` or the `rates/` directory is
    /// missing, if any file contains invalid YAML, or if two rate files
    /// declare the same tax year.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/canada")?;
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<PayrollMetadata>(&path.join("payroll.yaml"))?;
        let tables = Self::load_rate_tables(&path.join("rates"))?;

        Ok(Self {
            config: PayrollConfig::new(metadata, tables),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate tables from the rates directory.
    fn load_rate_tables(rates_dir: &Path) -> EngineResult<Vec<RateTable>> {
        let rates_dir_str = rates_dir.display().to_string();

        if !rates_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: rates_dir_str,
            });
        }

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut tables = Vec::new();
        let mut seen_years = BTreeSet::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let table = Self::load_yaml::<RateTable>(&path)?;
                Self::check_brackets(&path, &table)?;
                if !seen_years.insert(table.tax_year) {
                    return Err(EngineError::ConfigParseError {
                        path: path.display().to_string(),
                        message: format!("duplicate rate table for tax year {}", table.tax_year),
                    });
                }
                tables.push(table);
            }
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(tables)
    }

    /// Brackets must start at zero and be strictly ascending.
    fn check_brackets(path: &Path, table: &RateTable) -> EngineResult<()> {
        let federal = std::iter::once(("federal".to_string(), &table.federal.brackets));
        let provincial = table
            .provinces
            .iter()
            .map(|(province, rates)| (province.code().to_string(), &rates.brackets));

        for (name, brackets) in federal.chain(provincial) {
            let starts_at_zero = brackets.first().is_some_and(|b| b.threshold.is_zero());
            let ascending = brackets.windows(2).all(|w| w[0].threshold < w[1].threshold);
            if !starts_at_zero || !ascending {
                return Err(EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: format!(
                        "{} brackets must start at 0 and be strictly ascending",
                        name
                    ),
                });
            }
        }

        Ok(())
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the rate set metadata.
    pub fn metadata(&self) -> &PayrollMetadata {
        self.config.metadata()
    }

    /// Gets the rate table for a tax year.
    ///
    /// There is no fallback to a neighbouring year: payroll for a prior
    /// year must be recalculated with that year's rates.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/canada")?;
    /// let table = loader.get_rate_table(2024)?;
    /// println!("EI rate: {}", table.ei.rate);
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn get_rate_table(&self, tax_year: i32) -> EngineResult<&RateTable> {
        self.config
            .rate_table(tax_year)
            .ok_or(EngineError::RateTableNotFound { tax_year })
    }

    /// Gets the provincial tax rates for a province in a tax year.
    pub fn get_provincial_rates(
        &self,
        tax_year: i32,
        province: Province,
    ) -> EngineResult<&ProvincialTaxRates> {
        self.get_rate_table(tax_year)?
            .provinces
            .get(&province)
            .ok_or_else(|| EngineError::JurisdictionNotFound {
                jurisdiction: province.code().to_string(),
                tax_year,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/canada"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.metadata().country, "CA");
        assert_eq!(loader.config().tax_years(), vec![2023, 2024]);
    }

    #[test]
    fn test_2024_cpp_and_ei_maximums() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let table = loader.get_rate_table(2024).unwrap();

        assert_eq!(table.cpp.rate, dec("0.0595"));
        assert_eq!(table.cpp.max_contribution, dec("3867.50"));
        assert_eq!(table.ei.rate, dec("0.0166"));
        assert_eq!(table.ei.max_premium, dec("1049.12"));
        assert_eq!(table.ei.employer_multiplier, dec("1.4"));
    }

    #[test]
    fn test_2023_cpp_maximum() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let table = loader.get_rate_table(2023).unwrap();

        assert_eq!(table.cpp.max_contribution, dec("3754.45"));
        assert_eq!(table.ei.max_premium, dec("1002.45"));
    }

    #[test]
    fn test_rate_table_not_found_for_unconfigured_year() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_rate_table(2019) {
            Err(EngineError::RateTableNotFound { tax_year }) => assert_eq!(tax_year, 2019),
            other => panic!("Expected RateTableNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_get_provincial_rates_for_ontario() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let ontario = loader.get_provincial_rates(2024, Province::Ontario).unwrap();

        assert_eq!(ontario.basic_personal_amount, dec("12399"));
        assert_eq!(ontario.brackets[0].rate, dec("0.0505"));
    }

    #[test]
    fn test_quebec_is_not_configured() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_provincial_rates(2024, Province::Quebec) {
            Err(EngineError::JurisdictionNotFound {
                jurisdiction,
                tax_year,
            }) => {
                assert_eq!(jurisdiction, "QC");
                assert_eq!(tax_year, 2024);
            }
            other => panic!("Expected JurisdictionNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_brackets_are_ascending_from_zero() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let table = loader.get_rate_table(2024).unwrap();

        assert!(table.federal.brackets[0].threshold.is_zero());
        assert!(
            table
                .federal
                .brackets
                .windows(2)
                .all(|w| w[0].threshold < w[1].threshold)
        );
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("payroll.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }
}
