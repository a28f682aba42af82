use serde::{Deserialize, Serialize};

use super::period::Period;
use crate::errors::CoreError;

/// Engine configuration. Missing fields fall back to their defaults when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Period used when a series request does not name one.
    pub default_period: Period,

    /// Longest accepted CUSTOM range, in days.
    pub max_custom_range_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_period: Period::SixMonths,
            max_custom_range_days: 3650,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_custom_range_days < 1 {
            return Err(CoreError::ValidationError(format!(
                "maxCustomRangeDays must be at least 1, got {}",
                self.max_custom_range_days
            )));
        }
        Ok(())
    }
}
