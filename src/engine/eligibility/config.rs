use serde::{Deserialize, Serialize};

/// Thresholds for the four eligibility criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// Per-capita monthly income at or below which the income criterion passes.
    pub guaranteed_minimum_income: f64,
    pub property_cap_mpc: f64,
    pub conventional_unit_cap_per_member: f64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            guaranteed_minimum_income: 15_000.0,
            property_cap_mpc: 4.0,
            conventional_unit_cap_per_member: 4.0,
        }
    }
}
