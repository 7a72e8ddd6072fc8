use serde::{Deserialize, Serialize};

use super::taxonomy::IncomeBucket;
use super::{ClassifierConfig, IncomeCategory};

/// Qualitative rating used for stability and diversification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    pub const fn label(self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
        }
    }
}

pub(crate) fn stability(primary_share_pct: f64, config: &ClassifierConfig) -> Level {
    if primary_share_pct >= config.stability_high_pct {
        Level::High
    } else if primary_share_pct >= config.stability_medium_pct {
        Level::Medium
    } else {
        Level::Low
    }
}

pub(crate) fn diversification(non_empty: usize, config: &ClassifierConfig) -> Level {
    if non_empty >= config.diversification_high {
        Level::High
    } else if non_empty >= config.diversification_medium {
        Level::Medium
    } else {
        Level::Low
    }
}

pub(crate) struct InsightContext<'a> {
    pub total_income: f64,
    pub per_capita_income: f64,
    pub categories: &'a [IncomeCategory],
    pub primary: Option<&'a IncomeCategory>,
    pub diversification: Level,
    pub config: &'a ClassifierConfig,
}

/// Advisory rules in output priority order.
#[derive(Debug, Clone, Copy)]
enum RecommendationRule {
    NoIncomeDeclared,
    PerCapitaAboveMinimum,
    DominantSource,
    LowDiversification,
    LargeUnclassifiedShare,
}

const RULES: [RecommendationRule; 5] = [
    RecommendationRule::NoIncomeDeclared,
    RecommendationRule::PerCapitaAboveMinimum,
    RecommendationRule::DominantSource,
    RecommendationRule::LowDiversification,
    RecommendationRule::LargeUnclassifiedShare,
];

impl RecommendationRule {
    fn fire(self, ctx: &InsightContext<'_>) -> Option<String> {
        match self {
            RecommendationRule::NoIncomeDeclared => (ctx.total_income <= 0.0).then(|| {
                "No income declared; confirm the household has no earnings and collect supporting statements"
                    .to_string()
            }),
            RecommendationRule::PerCapitaAboveMinimum => {
                (ctx.per_capita_income > ctx.config.analysis_minimum_income).then(|| {
                    format!(
                        "Per-capita income {:.2} is above the guaranteed minimum {:.2}; review the income criterion",
                        ctx.per_capita_income, ctx.config.analysis_minimum_income
                    )
                })
            }
            RecommendationRule::DominantSource => ctx
                .primary
                .filter(|category| category.percentage >= ctx.config.stability_high_pct)
                .map(|category| {
                    format!(
                        "{:.0}% of income comes from {}; verify continuity of this source",
                        category.percentage,
                        category.name.to_lowercase()
                    )
                }),
            RecommendationRule::LowDiversification => (ctx.diversification == Level::Low)
                .then(|| {
                    "Income comes from at most one category; document any additional sources"
                        .to_string()
                }),
            RecommendationRule::LargeUnclassifiedShare => ctx
                .categories
                .iter()
                .find(|category| category.id == IncomeBucket::Other)
                .filter(|category| {
                    category.amount > 0.0
                        && category.percentage >= ctx.config.unclassified_share_alert_pct
                })
                .map(|category| {
                    format!(
                        "{:.0}% of income is unclassified; request documents to categorise it",
                        category.percentage
                    )
                }),
        }
    }
}

pub(crate) fn recommendations(ctx: &InsightContext<'_>) -> Vec<String> {
    RULES.iter().filter_map(|rule| rule.fire(ctx)).collect()
}
