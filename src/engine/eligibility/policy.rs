use serde::{Deserialize, Serialize};

use super::config::EligibilityConfig;
use super::rules::CriteriaSignals;
use super::EligibilityInputs;

/// Overall status of an application as derived from the criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Eligible,
    Ineligible,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Eligible => "ELIGIBLE",
            ApplicationStatus::Ineligible => "INELIGIBLE",
        }
    }
}

/// A failed criterion with the figures that caused it, for adverse decision notices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "criterion", rename_all = "snake_case")]
pub enum CriterionFailure {
    Income {
        per_capita_income: f64,
        guaranteed_minimum_income: f64,
    },
    Property {
        property_value: f64,
        property_cap_mpc: f64,
    },
    Family {
        conventional_units: f64,
        unit_cap: f64,
    },
    Vehicle {
        vehicles_failing: usize,
    },
}

impl CriterionFailure {
    pub fn summary(&self) -> String {
        match self {
            CriterionFailure::Income {
                per_capita_income,
                guaranteed_minimum_income,
            } => format!(
                "per-capita income {:.2} exceeds guaranteed minimum {:.2}",
                per_capita_income, guaranteed_minimum_income
            ),
            CriterionFailure::Property {
                property_value,
                property_cap_mpc,
            } => format!(
                "property value {:.2} MPC exceeds cap {:.2} MPC",
                property_value, property_cap_mpc
            ),
            CriterionFailure::Family {
                conventional_units,
                unit_cap,
            } => format!(
                "livestock holdings {:.2} conventional units exceed family cap {:.2}",
                conventional_units, unit_cap
            ),
            CriterionFailure::Vehicle { vehicles_failing } => {
                format!("{vehicles_failing} passenger car(s) exceed the permitted age")
            }
        }
    }
}

pub(crate) fn collect_failures(
    inputs: &EligibilityInputs,
    config: &EligibilityConfig,
    signals: &CriteriaSignals,
) -> Vec<CriterionFailure> {
    let mut failures = Vec::new();

    if !signals.income_eligible {
        failures.push(CriterionFailure::Income {
            per_capita_income: signals.per_capita_income,
            guaranteed_minimum_income: config.guaranteed_minimum_income,
        });
    }

    if !signals.property_eligible {
        failures.push(CriterionFailure::Property {
            property_value: inputs.property_value,
            property_cap_mpc: config.property_cap_mpc,
        });
    }

    if !signals.family_eligible {
        failures.push(CriterionFailure::Family {
            conventional_units: inputs.conv_units_total,
            unit_cap: signals.unit_cap,
        });
    }

    if !signals.vehicle_eligible {
        failures.push(CriterionFailure::Vehicle {
            vehicles_failing: inputs.vehicles_failing,
        });
    }

    failures
}

pub(crate) fn decide_status(failures: &[CriterionFailure]) -> (ApplicationStatus, String) {
    if failures.is_empty() {
        return (
            ApplicationStatus::Eligible,
            "household meets all eligibility criteria".to_string(),
        );
    }

    let reasons: Vec<String> = failures.iter().map(CriterionFailure::summary).collect();
    (
        ApplicationStatus::Ineligible,
        format!("household is ineligible: {}", reasons.join("; ")),
    )
}
