mod config;
mod policy;
mod rules;

pub use config::EligibilityConfig;
pub use policy::{ApplicationStatus, CriterionFailure};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{sanitize_amount, Household};
use super::income::IncomeAggregate;
use super::units::UnitConverter;
use policy::{collect_failures, decide_status};

/// Scalar inputs to the four criteria once holdings have been converted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EligibilityInputs {
    /// Members plus the applicant.
    pub family_size: usize,
    pub total_monthly: f64,
    pub property_value: f64,
    pub conv_units_total: f64,
    pub vehicles_failing: usize,
}

/// Pass/fail state of each criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CriteriaFlags {
    pub income_eligible: bool,
    pub property_eligible: bool,
    pub family_eligible: bool,
    pub vehicle_eligible: bool,
}

impl CriteriaFlags {
    pub fn all_met(&self) -> bool {
        self.income_eligible && self.property_eligible && self.family_eligible && self.vehicle_eligible
    }
}

/// Derived household figures; recomputed on every change, never edited by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdMetrics {
    pub family_size: usize,
    pub total_income_month: f64,
    pub per_capita_income: f64,
    pub conv_units_total: f64,
    pub property_value: f64,
    pub criteria: CriteriaFlags,
    pub guaranteed_minimum_income: f64,
    pub application_status: ApplicationStatus,
    pub status_message: String,
    pub failures: Vec<CriterionFailure>,
}

impl HouseholdMetrics {
    /// Initial state before any computation has run.
    pub fn pending(config: &EligibilityConfig) -> Self {
        Self {
            family_size: 1,
            total_income_month: 0.0,
            per_capita_income: 0.0,
            conv_units_total: 0.0,
            property_value: 0.0,
            criteria: CriteriaFlags::default(),
            guaranteed_minimum_income: config.guaranteed_minimum_income,
            application_status: ApplicationStatus::Pending,
            status_message: "awaiting household data".to_string(),
            failures: Vec::new(),
        }
    }
}

/// Stateless evaluator applying the configured thresholds to a household.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEvaluator {
    config: EligibilityConfig,
    converter: UnitConverter,
}

impl EligibilityEvaluator {
    pub fn new(config: EligibilityConfig, converter: UnitConverter) -> Self {
        Self { config, converter }
    }

    /// Convert holdings and evaluate the household as of `as_of`.
    pub fn evaluate(
        &self,
        household: &Household,
        income: &IncomeAggregate,
        as_of: NaiveDate,
    ) -> HouseholdMetrics {
        let conv_units_total = self.converter.conventional_units(household.livestock.values());
        let property_value = self.converter.property_value(
            household.land_plots.values(),
            household.livestock.values(),
            household.vehicles.values(),
        );
        let vehicles_failing = household
            .vehicles
            .values()
            .filter(|vehicle| !self.converter.vehicle_passes(vehicle, as_of))
            .count();

        self.evaluate_inputs(&EligibilityInputs {
            family_size: household.family_size(),
            total_monthly: income.total_monthly,
            property_value,
            conv_units_total,
            vehicles_failing,
        })
    }

    pub fn evaluate_inputs(&self, inputs: &EligibilityInputs) -> HouseholdMetrics {
        let inputs = EligibilityInputs {
            family_size: inputs.family_size,
            total_monthly: sanitize_amount(inputs.total_monthly),
            property_value: sanitize_amount(inputs.property_value),
            conv_units_total: sanitize_amount(inputs.conv_units_total),
            vehicles_failing: inputs.vehicles_failing,
        };

        let signals = rules::evaluate_criteria(&inputs, &self.config);
        let failures = collect_failures(&inputs, &self.config, &signals);
        let (application_status, status_message) = decide_status(&failures);

        debug!(
            family_size = signals.family_size,
            per_capita_income = signals.per_capita_income,
            status = application_status.label(),
            "eligibility evaluated"
        );

        HouseholdMetrics {
            family_size: signals.family_size,
            total_income_month: inputs.total_monthly,
            per_capita_income: signals.per_capita_income,
            conv_units_total: inputs.conv_units_total,
            property_value: inputs.property_value,
            criteria: CriteriaFlags {
                income_eligible: signals.income_eligible,
                property_eligible: signals.property_eligible,
                family_eligible: signals.family_eligible,
                vehicle_eligible: signals.vehicle_eligible,
            },
            guaranteed_minimum_income: self.config.guaranteed_minimum_income,
            application_status,
            status_message,
            failures,
        }
    }
}
