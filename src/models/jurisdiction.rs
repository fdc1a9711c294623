//! Canadian jurisdictions.
//!
//! This module defines the [`Province`] and [`Jurisdiction`] types used to
//! select provincial tax tables and to scope garnishment orders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Canadian province or territory.
///
/// Serialized as its two-letter postal code (e.g., `"ON"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Province {
    /// Alberta.
    #[serde(rename = "AB")]
    Alberta,
    /// British Columbia.
    #[serde(rename = "BC")]
    BritishColumbia,
    /// Manitoba.
    #[serde(rename = "MB")]
    Manitoba,
    /// New Brunswick.
    #[serde(rename = "NB")]
    NewBrunswick,
    /// Newfoundland and Labrador.
    #[serde(rename = "NL")]
    NewfoundlandAndLabrador,
    /// Nova Scotia.
    #[serde(rename = "NS")]
    NovaScotia,
    /// Northwest Territories.
    #[serde(rename = "NT")]
    NorthwestTerritories,
    /// Nunavut.
    #[serde(rename = "NU")]
    Nunavut,
    /// Ontario.
    #[serde(rename = "ON")]
    Ontario,
    /// Prince Edward Island.
    #[serde(rename = "PE")]
    PrinceEdwardIsland,
    /// Quebec.
    #[serde(rename = "QC")]
    Quebec,
    /// Saskatchewan.
    #[serde(rename = "SK")]
    Saskatchewan,
    /// Yukon.
    #[serde(rename = "YT")]
    Yukon,
}

impl Province {
    /// All provinces and territories.
    pub const ALL: [Province; 13] = [
        Province::Alberta,
        Province::BritishColumbia,
        Province::Manitoba,
        Province::NewBrunswick,
        Province::NewfoundlandAndLabrador,
        Province::NovaScotia,
        Province::NorthwestTerritories,
        Province::Nunavut,
        Province::Ontario,
        Province::PrinceEdwardIsland,
        Province::Quebec,
        Province::Saskatchewan,
        Province::Yukon,
    ];

    /// Returns the two-letter postal code.
    pub fn code(&self) -> &'static str {
        match self {
            Province::Alberta => "AB",
            Province::BritishColumbia => "BC",
            Province::Manitoba => "MB",
            Province::NewBrunswick => "NB",
            Province::NewfoundlandAndLabrador => "NL",
            Province::NovaScotia => "NS",
            Province::NorthwestTerritories => "NT",
            Province::Nunavut => "NU",
            Province::Ontario => "ON",
            Province::PrinceEdwardIsland => "PE",
            Province::Quebec => "QC",
            Province::Saskatchewan => "SK",
            Province::Yukon => "YT",
        }
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Province {
    type Err = String;

    /// Parses a postal code, ignoring case and surrounding whitespace.
    ///
    /// ```
    /// use payroll_engine::models::Province;
    ///
    /// assert_eq!(" on ".parse::<Province>(), Ok(Province::Ontario));
    /// assert!("XX".parse::<Province>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Province::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| format!("Unrecognized province: {}", s))
    }
}

/// The authority a garnishment order is issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    /// A federal order (e.g., CRA requirement to pay).
    Federal,
    /// A provincial order (e.g., family support enforcement).
    Province(Province),
}
