use crate::error::RollError;
use crate::roll::Number;
use serde::{Deserialize, Serialize};

/// The persisted outcome of a roll, enough to show it again without rolling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RollSnapshot {
    Dice {
        result: Option<Number>,
        #[serde(default)]
        tooltip: String,
    },
    /// A snapshot written by some other kind of roller.
    #[serde(other)]
    Other,
}

impl RollSnapshot {
    pub fn to_json(&self) -> Result<String, RollError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RollError> {
        Ok(serde_json::from_str(json)?)
    }
}
