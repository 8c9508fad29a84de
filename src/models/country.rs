//! Supported jurisdictions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Currency;
use crate::error::EngineError;

/// A jurisdiction the engine has a rule adapter for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CountryCode {
    /// Cyprus.
    #[serde(rename = "cy")]
    Cyprus,
    /// United Kingdom.
    #[serde(rename = "uk")]
    UnitedKingdom,
    /// France.
    #[serde(rename = "fr")]
    France,
    /// Spain.
    #[serde(rename = "es")]
    Spain,
    /// Portugal.
    #[serde(rename = "pt")]
    Portugal,
    /// Poland.
    #[serde(rename = "pl")]
    Poland,
}

impl CountryCode {
    /// Every supported country, in display order.
    pub const ALL: [CountryCode; 6] = [
        CountryCode::Portugal,
        CountryCode::Spain,
        CountryCode::France,
        CountryCode::UnitedKingdom,
        CountryCode::Cyprus,
        CountryCode::Poland,
    ];

    /// Returns the short code used in requests ("pt", "uk", ...).
    pub fn code(&self) -> &'static str {
        match self {
            CountryCode::Cyprus => "cy",
            CountryCode::UnitedKingdom => "uk",
            CountryCode::France => "fr",
            CountryCode::Spain => "es",
            CountryCode::Portugal => "pt",
            CountryCode::Poland => "pl",
        }
    }

    /// Returns the English name of the country.
    pub fn name(&self) -> &'static str {
        match self {
            CountryCode::Cyprus => "Cyprus",
            CountryCode::UnitedKingdom => "United Kingdom",
            CountryCode::France => "France",
            CountryCode::Spain => "Spain",
            CountryCode::Portugal => "Portugal",
            CountryCode::Poland => "Poland",
        }
    }

    /// Returns the currency the country's tables are expressed in.
    pub fn native_currency(&self) -> Currency {
        match self {
            CountryCode::UnitedKingdom => Currency::Gbp,
            CountryCode::Poland => Currency::Pln,
            _ => Currency::Eur,
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CountryCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        CountryCode::ALL
            .into_iter()
            .find(|country| country.code() == lowered)
            .ok_or_else(|| EngineError::UnsupportedCountry {
                code: s.to_string(),
            })
    }
}
