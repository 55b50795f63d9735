//! Travel modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// How a leg is travelled.
///
/// `Wait` never appears in a routing request; some backends emit it for
/// legs that stand still between two rides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Tram,
    Suburb,
    Bus,
    Train,
    Walk,
    Bike,
    Car,
    Wait,
}

impl Mode {
    /// All modes a user may request, in the order the planner lists them.
    pub const REQUESTABLE: [Mode; 7] = [
        Mode::Tram,
        Mode::Suburb,
        Mode::Bus,
        Mode::Bike,
        Mode::Walk,
        Mode::Car,
        Mode::Train,
    ];

    /// Wire name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Tram => "TRAM",
            Mode::Suburb => "SUBURB",
            Mode::Bus => "BUS",
            Mode::Train => "TRAIN",
            Mode::Walk => "WALK",
            Mode::Bike => "BIKE",
            Mode::Car => "CAR",
            Mode::Wait => "WAIT",
        }
    }

    /// Name shown on ride badges.
    pub fn display_name(self) -> &'static str {
        match self {
            Mode::Suburb => "S-BAHN",
            other => other.as_str(),
        }
    }

    /// Returns true for public-transport vehicles.
    pub fn is_transit(self) -> bool {
        matches!(self, Mode::Tram | Mode::Suburb | Mode::Bus | Mode::Train)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRAM" => Ok(Mode::Tram),
            "SUBURB" => Ok(Mode::Suburb),
            "BUS" => Ok(Mode::Bus),
            "TRAIN" => Ok(Mode::Train),
            "WALK" => Ok(Mode::Walk),
            "BIKE" | "BICYCLE" => Ok(Mode::Bike),
            "CAR" => Ok(Mode::Car),
            "WAIT" => Ok(Mode::Wait),
            other => Err(DomainError::UnknownMode(other.to_string())),
        }
    }
}
