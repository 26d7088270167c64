//! Person Field Types
//!
//! Value types for the facts stored about a person: gender, birth and death
//! years, location and founder statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GraphError;

/// Person identifier as stored in the backing store
pub type PersonId = u32;

/// Lowest person identifier in the source population
pub const MIN_PERSON_ID: PersonId = 1;

/// Highest person identifier in the source population
pub const MAX_PERSON_ID: PersonId = 43_589_549;

// ============================================================================
// Gender
// ============================================================================

/// Recorded gender of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Map a raw store code (`1` male, `2` female) to a gender.
    ///
    /// Any other code is a data integrity error, never treated as unknown.
    pub fn from_code(id: PersonId, code: i64) -> Result<Self, GraphError> {
        match code {
            1 => Ok(Gender::Male),
            2 => Ok(Gender::Female),
            _ => Err(GraphError::UnknownGenderCode { id, code }),
        }
    }

    /// Get the raw store code
    pub fn code(&self) -> i64 {
        match self {
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => Err(format!(
                "Unknown gender: '{}'. Valid values: male, female",
                s
            )),
        }
    }
}

// ============================================================================
// Years
// ============================================================================

/// Birth and death year, always resolved together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Years {
    pub birth: Option<i32>,
    pub death: Option<i32>,
}

impl Years {
    /// Both years unknown (no record in the store)
    pub const UNKNOWN: Years = Years {
        birth: None,
        death: None,
    };

    pub fn new(birth: Option<i32>, death: Option<i32>) -> Self {
        Self { birth, death }
    }
}

// ============================================================================
// Location
// ============================================================================

/// Continent of a resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    #[serde(rename = "AF")]
    Africa,
    #[serde(rename = "AS")]
    Asia,
    #[serde(rename = "EU")]
    Europe,
    #[serde(rename = "NA")]
    NorthAmerica,
    #[serde(rename = "OC")]
    Oceania,
    #[serde(rename = "SA")]
    SouthAmerica,
    #[serde(rename = "AN")]
    Antarctica,
}

impl Continent {
    /// Two-letter code used by the store
    pub fn code(&self) -> &'static str {
        match self {
            Continent::Africa => "AF",
            Continent::Asia => "AS",
            Continent::Europe => "EU",
            Continent::NorthAmerica => "NA",
            Continent::Oceania => "OC",
            Continent::SouthAmerica => "SA",
            Continent::Antarctica => "AN",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::Oceania => "Oceania",
            Continent::SouthAmerica => "South America",
            Continent::Antarctica => "Antarctica",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Continent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AF" => Ok(Continent::Africa),
            "AS" => Ok(Continent::Asia),
            "EU" => Ok(Continent::Europe),
            "NA" => Ok(Continent::NorthAmerica),
            "OC" => Ok(Continent::Oceania),
            "SA" => Ok(Continent::SouthAmerica),
            "AN" => Ok(Continent::Antarctica),
            other => Err(format!("Unknown continent code: '{}'", other)),
        }
    }
}

/// Geographic location of a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
    pub country: Option<String>,
    pub continent: Option<Continent>,
    /// Geocoding resolution level reported by the store
    pub resolution: Option<i32>,
}

// ============================================================================
// Founder statistics
// ============================================================================

/// Lineage statistics precomputed for founders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FounderStats {
    /// Number of leaves in the founder's descendant tree
    pub leaf_count: u64,
    pub min_depth: u32,
    pub max_depth: u32,
    pub median_depth: f64,
}

// ============================================================================
// Stats snapshot
// ============================================================================

/// Snapshot of the commonly used fields of a person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonStats {
    pub id: PersonId,
    pub parents: Vec<PersonId>,
    pub children: Vec<PersonId>,
    pub age: Option<i32>,
    pub birth: Option<i32>,
    pub death: Option<i32>,
    pub gender: Option<Gender>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub country: Option<String>,
    pub continent: Option<Continent>,
    pub resolution: Option<i32>,
}

// ============================================================================
// Fields
// ============================================================================

/// Names one lazily cached field of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Age,
    Years,
    Gender,
    Location,
    Parents,
    Children,
    FounderStats,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Age,
        Field::Years,
        Field::Gender,
        Field::Location,
        Field::Parents,
        Field::Children,
        Field::FounderStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Years => "years",
            Field::Gender => "gender",
            Field::Location => "location",
            Field::Parents => "parents",
            Field::Children => "children",
            Field::FounderStats => "founder_stats",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
