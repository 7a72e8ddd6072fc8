use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::ChildEntry;
use super::EngineError;

/// Amounts applied by the benefit calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenefitConfig {
    pub base_child_amount: f64,
    /// Multiplier applied to every child's base amount.
    pub coefficient: f64,
    pub large_family_bonus: f64,
    pub large_family_min_children: usize,
    pub single_parent_bonus: f64,
}

impl Default for BenefitConfig {
    fn default() -> Self {
        Self {
            base_child_amount: 5_000.0,
            coefficient: 1.0,
            large_family_bonus: 1_000.0,
            large_family_min_children: 3,
            single_parent_bonus: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildBenefit {
    pub name: String,
    pub age: u32,
    pub base_amount: f64,
    pub coefficient: f64,
    pub amount: f64,
}

/// Rule-based allowances; `disability` and `other` stay at 0 under current rules.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Allowances {
    pub large_family: f64,
    pub single_parent: f64,
    pub disability: f64,
    pub other: f64,
}

impl Allowances {
    pub fn total(&self) -> f64 {
        self.large_family + self.single_parent + self.disability + self.other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitStatus {
    Computed,
    /// No children in the household; allowances are withheld as well.
    NoBenefitComputed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitCalculation {
    pub status: BenefitStatus,
    pub children: Vec<ChildBenefit>,
    pub total_amount: f64,
    pub allowances: Allowances,
    pub total_allowances: f64,
    pub final_amount: f64,
    pub children_count: usize,
}

impl BenefitCalculation {
    fn no_benefit() -> Self {
        Self {
            status: BenefitStatus::NoBenefitComputed,
            children: Vec::new(),
            total_amount: 0.0,
            allowances: Allowances::default(),
            total_allowances: 0.0,
            final_amount: 0.0,
            children_count: 0,
        }
    }

    pub fn summary(&self) -> String {
        match self.status {
            BenefitStatus::NoBenefitComputed => {
                "no benefit computed: no eligible children".to_string()
            }
            BenefitStatus::Computed => format!(
                "{} child(ren): {:.2} base + {:.2} allowances = {:.2} per month",
                self.children_count, self.total_amount, self.total_allowances, self.final_amount
            ),
        }
    }
}

fn require_amount(name: &str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidInput {
            reason: format!("benefit setting {name} must be a finite non-negative number"),
        })
    }
}

/// Stateless calculator for the monthly benefit amount.
#[derive(Debug, Clone, Default)]
pub struct BenefitCalculator {
    config: BenefitConfig,
}

impl BenefitCalculator {
    pub fn new(config: BenefitConfig) -> Self {
        Self { config }
    }

    /// `None` means the caller never supplied a child list, which is rejected.
    pub fn calculate(
        &self,
        children: Option<&[ChildEntry]>,
    ) -> Result<BenefitCalculation, EngineError> {
        let children = children.ok_or_else(|| EngineError::InvalidInput {
            reason: "child list is required for the benefit calculation".to_string(),
        })?;

        let base = require_amount("base_child_amount", self.config.base_child_amount)?;
        let coefficient = require_amount("coefficient", self.config.coefficient)?;
        let large_family_bonus =
            require_amount("large_family_bonus", self.config.large_family_bonus)?;
        let single_parent_bonus =
            require_amount("single_parent_bonus", self.config.single_parent_bonus)?;

        if children.is_empty() {
            debug!("benefit calculation skipped: no children");
            return Ok(BenefitCalculation::no_benefit());
        }

        let breakdown: Vec<ChildBenefit> = children
            .iter()
            .map(|child| ChildBenefit {
                name: child.name.clone(),
                age: child.age,
                base_amount: base,
                coefficient,
                amount: base * coefficient,
            })
            .collect();

        let children_count = breakdown.len();
        let total_amount: f64 = breakdown.iter().map(|child| child.amount).sum();

        let allowances = Allowances {
            large_family: if children_count >= self.config.large_family_min_children {
                large_family_bonus
            } else {
                0.0
            },
            // Applied to every household with children; not conditioned on marital status.
            single_parent: single_parent_bonus,
            disability: 0.0,
            other: 0.0,
        };
        let total_allowances = allowances.total();

        Ok(BenefitCalculation {
            status: BenefitStatus::Computed,
            children: breakdown,
            total_amount,
            allowances,
            total_allowances,
            final_amount: total_amount + total_allowances,
            children_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn children(count: usize) -> Vec<ChildEntry> {
        (0..count)
            .map(|idx| ChildEntry {
                name: format!("Child {}", idx + 1),
                age: 3 + idx as u32,
            })
            .collect()
    }

    #[test]
    fn two_children_receive_base_and_single_parent_allowance() {
        let calculator = BenefitCalculator::default();

        let result = calculator
            .calculate(Some(children(2).as_slice()))
            .expect("calculation succeeds");

        assert_eq!(result.status, BenefitStatus::Computed);
        assert_eq!(result.total_amount, 10_000.0);
        assert_eq!(result.allowances.large_family, 0.0);
        assert_eq!(result.allowances.single_parent, 500.0);
        assert_eq!(result.final_amount, 10_500.0);
        assert_eq!(result.children_count, 2);
        assert!(result.children.iter().all(|child| child.coefficient == 1.0));
    }

    #[test]
    fn three_children_add_large_family_bonus() {
        let calculator = BenefitCalculator::default();

        let result = calculator
            .calculate(Some(children(3).as_slice()))
            .expect("calculation succeeds");

        assert_eq!(result.total_amount, 15_000.0);
        assert_eq!(result.allowances.large_family, 1_000.0);
        assert_eq!(result.total_allowances, 1_500.0);
        assert_eq!(result.final_amount, 16_500.0);
    }

    #[test]
    fn single_parent_allowance_is_unconditional_current_behavior() {
        let calculator = BenefitCalculator::default();
        let result = calculator
            .calculate(Some(children(1).as_slice()))
            .expect("calculation succeeds");
        assert_eq!(result.allowances.single_parent, 500.0);
    }

    #[test]
    fn no_children_yields_explicit_no_benefit() {
        let calculator = BenefitCalculator::default();

        let result = calculator.calculate(Some(Vec::new().as_slice())).expect("empty list is valid");

        assert_eq!(result.status, BenefitStatus::NoBenefitComputed);
        assert_eq!(result.final_amount, 0.0);
        assert_eq!(result.total_allowances, 0.0);
        assert!(result.summary().contains("no benefit computed"));
    }

    #[test]
    fn missing_child_list_is_invalid_input() {
        let calculator = BenefitCalculator::default();

        match calculator.calculate(None) {
            Err(EngineError::InvalidInput { reason }) => assert!(reason.contains("child list")),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn coefficient_scales_each_child() {
        let calculator = BenefitCalculator::new(BenefitConfig {
            coefficient: 1.5,
            ..BenefitConfig::default()
        });

        let result = calculator
            .calculate(Some(children(2).as_slice()))
            .expect("calculation succeeds");

        assert_eq!(result.total_amount, 15_000.0);
        assert_eq!(result.children[0].amount, 7_500.0);
    }

    #[test]
    fn non_finite_settings_are_rejected() {
        let calculator = BenefitCalculator::new(BenefitConfig {
            base_child_amount: f64::NAN,
            ..BenefitConfig::default()
        });
        assert!(matches!(
            calculator.calculate(Some(children(1).as_slice())),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}
