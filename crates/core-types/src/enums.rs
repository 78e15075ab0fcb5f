use serde::{Deserialize, Serialize};
use std::fmt;

/// The category a workout session is logged under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Strength,
    Cardio,
}

impl ActivityType {
    /// Returns the lowercase name used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Strength => "strength",
            ActivityType::Cardio => "cardio",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
