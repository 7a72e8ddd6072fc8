use super::super::domain::effective_family_size;
use super::config::EligibilityConfig;
use super::EligibilityInputs;

pub(crate) struct CriteriaSignals {
    pub family_size: usize,
    pub per_capita_income: f64,
    pub income_eligible: bool,
    pub property_eligible: bool,
    pub family_eligible: bool,
    pub vehicle_eligible: bool,
    pub unit_cap: f64,
}

pub(crate) fn evaluate_criteria(
    inputs: &EligibilityInputs,
    config: &EligibilityConfig,
) -> CriteriaSignals {
    let family_size = effective_family_size(inputs.family_size);
    let per_capita_income = inputs.total_monthly / family_size as f64;
    let unit_cap = config.conventional_unit_cap_per_member * family_size as f64;

    CriteriaSignals {
        family_size,
        per_capita_income,
        income_eligible: per_capita_income <= config.guaranteed_minimum_income,
        property_eligible: inputs.property_value <= config.property_cap_mpc,
        family_eligible: inputs.conv_units_total <= unit_cap,
        vehicle_eligible: inputs.vehicles_failing == 0,
        unit_cap,
    }
}
