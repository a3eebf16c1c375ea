use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Countries with a cleaned measurement campaign.
///
/// Serialized as the human display name (`"Sierra Leone"`). Parsing is
/// case-insensitive and also accepts the file-name form (`"sierra_leone"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Country {
    Benin,
    Togo,
    SierraLeone,
}

impl Country {
    /// All known countries, in the order the dashboard offers them.
    pub const ALL: [Country; 3] = [Country::Benin, Country::Togo, Country::SierraLeone];

    pub fn name(&self) -> &'static str {
        match self {
            Country::Benin => "Benin",
            Country::Togo => "Togo",
            Country::SierraLeone => "Sierra Leone",
        }
    }

    /// Conventional cleaned file name, e.g. `sierra_leone_clean.csv`.
    pub fn file_name(&self) -> String {
        format!("{}_clean.csv", self.name().to_lowercase().replace(' ', "_"))
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown country `{0}` (expected one of: Benin, Togo, Sierra Leone)")]
pub struct UnknownCountry(pub String);

impl FromStr for Country {
    type Err = UnknownCountry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace('_', " ");
        Country::ALL
            .into_iter()
            .find(|c| c.name().to_lowercase() == norm)
            .ok_or_else(|| UnknownCountry(s.to_string()))
    }
}

impl TryFrom<String> for Country {
    type Error = UnknownCountry;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Country> for String {
    fn from(c: Country) -> Self {
        c.name().to_string()
    }
}

/// A known metric column and its human definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricInfo {
    pub name: &'static str,
    pub definition: &'static str,
}

/// Metrics the dashboard offers, in selection order.
pub const KNOWN_METRICS: [MetricInfo; 5] = [
    MetricInfo {
        name: "GHI",
        definition: "Global Horizontal Irradiance - Total solar radiation received",
    },
    MetricInfo {
        name: "DNI",
        definition: "Direct Normal Irradiance - Direct solar radiation",
    },
    MetricInfo {
        name: "DHI",
        definition: "Diffuse Horizontal Irradiance - Scattered solar radiation",
    },
    MetricInfo {
        name: "Tamb",
        definition: "Ambient Temperature",
    },
    MetricInfo {
        name: "WS",
        definition: "Wind Speed",
    },
];

/// Metrics selected when the caller does not choose any.
pub const DEFAULT_METRICS: [&str; 2] = ["GHI", "DNI"];

/// Look up the definition of a known metric (exact name).
pub fn metric_info(name: &str) -> Option<&'static MetricInfo> {
    KNOWN_METRICS.iter().find(|m| m.name == name)
}
