//! Conversion of livestock, land, and vehicle holdings into comparable scalar units.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{sanitize_amount, LandPlot, LandUnit, LivestockEntry, Vehicle};

/// Weights used to express holdings in conventional livestock units and MPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Conventional units per head, keyed by lowercase livestock type.
    #[serde(deserialize_with = "crate::engine::domain::lowercase_keys")]
    pub livestock_rates: BTreeMap<String, f64>,
    pub land_weight_per_sotka: f64,
    pub conventional_unit_weight: f64,
    pub vehicle_weight: f64,
    /// Passenger cars at or above this age fail the vehicle criterion.
    pub passenger_car_max_age: i32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let livestock_rates = [
            ("cow", 1.0),
            ("horse", 1.0),
            ("sheep", 0.1),
            ("goat", 0.1),
            ("pig", 0.2),
            ("chicken", 0.01),
            ("duck", 0.01),
            ("goose", 0.01),
        ]
        .into_iter()
        .map(|(kind, rate)| (kind.to_string(), rate))
        .collect();

        Self {
            livestock_rates,
            land_weight_per_sotka: 0.1,
            conventional_unit_weight: 0.5,
            vehicle_weight: 2.0,
            passenger_car_max_age: 20,
        }
    }
}

impl ConversionConfig {
    /// Rate for a livestock type; unknown types convert at 0.
    pub fn rate(&self, kind: &str) -> f64 {
        self.livestock_rates
            .get(kind.trim().to_lowercase().as_str())
            .copied()
            .map(sanitize_amount)
            .unwrap_or(0.0)
    }
}

/// Stateless converter over a [`ConversionConfig`].
#[derive(Debug, Clone, Default)]
pub struct UnitConverter {
    config: ConversionConfig,
}

impl UnitConverter {
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    pub fn conventional_units<'a, I>(&self, livestock: I) -> f64
    where
        I: IntoIterator<Item = &'a LivestockEntry>,
    {
        livestock
            .into_iter()
            .map(|entry| {
                let rate = self.config.rate(&entry.kind);
                if rate == 0.0 && entry.count > 0 {
                    warn!(kind = %entry.kind, "livestock type has no conversion rate");
                }
                f64::from(entry.count) * rate
            })
            .sum()
    }

    /// Total land area expressed in sotok; plots in unknown units contribute 0.
    pub fn land_area_sotok<'a, I>(&self, plots: I) -> f64
    where
        I: IntoIterator<Item = &'a LandPlot>,
    {
        plots
            .into_iter()
            .map(|plot| {
                let area = sanitize_amount(plot.area);
                match plot.unit {
                    LandUnit::Sotok => area,
                    LandUnit::Hectare => area * 100.0,
                    LandUnit::Sqm => area / 100.0,
                    LandUnit::Unknown => {
                        warn!(kind = %plot.kind, "land plot unit not recognised");
                        0.0
                    }
                }
            })
            .sum()
    }

    /// Household property value in MPC from land, livestock, and vehicle holdings.
    pub fn property_value<'a, L, S, V>(&self, land_plots: L, livestock: S, vehicles: V) -> f64
    where
        L: IntoIterator<Item = &'a LandPlot>,
        S: IntoIterator<Item = &'a LivestockEntry>,
        V: IntoIterator<Item = &'a Vehicle>,
    {
        let land = self.land_area_sotok(land_plots);
        let units = self.conventional_units(livestock);
        let vehicle_count = vehicles.into_iter().count() as f64;

        land * self.config.land_weight_per_sotka
            + units * self.config.conventional_unit_weight
            + vehicle_count * self.config.vehicle_weight
    }

    pub fn is_vehicle_age_valid(&self, year: i32, is_passenger_car: bool, current_year: i32) -> bool {
        let age = i64::from(current_year) - i64::from(year);
        !(is_passenger_car && age >= i64::from(self.config.passenger_car_max_age))
    }

    /// Vehicle check at `as_of`; a missing model year is never flagged.
    pub fn vehicle_passes(&self, vehicle: &Vehicle, as_of: NaiveDate) -> bool {
        match vehicle.model_year {
            Some(year) => {
                self.is_vehicle_age_valid(year, vehicle.kind.is_passenger_car(), as_of.year())
            }
            None => true,
        }
    }
}
