//! Classification of income records into the fixed taxonomy, with audit indicators.

mod insights;
mod taxonomy;

pub use insights::Level;
pub use taxonomy::{default_category_map, IncomeBucket};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{effective_family_size, IncomeRecord};
use insights::InsightContext;

/// Mapping and cut-points for the income classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Per-capita threshold used by the advisory rules. Kept separate from the
    /// eligibility guaranteed minimum income.
    pub analysis_minimum_income: f64,
    #[serde(deserialize_with = "crate::engine::domain::lowercase_keys")]
    pub category_map: BTreeMap<String, IncomeBucket>,
    pub stability_high_pct: f64,
    pub stability_medium_pct: f64,
    pub diversification_high: usize,
    pub diversification_medium: usize,
    pub unclassified_share_alert_pct: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            analysis_minimum_income: 4_500.0,
            category_map: default_category_map(),
            stability_high_pct: 70.0,
            stability_medium_pct: 40.0,
            diversification_high: 4,
            diversification_medium: 2,
            unclassified_share_alert_pct: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeCategory {
    pub id: IncomeBucket,
    pub name: String,
    pub amount: f64,
    pub percentage: f64,
    /// Distinct source labels in order of first appearance.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeAnalysisResult {
    pub total_income: f64,
    pub family_size: usize,
    pub per_capita_income: f64,
    pub stability: Level,
    pub diversification: Level,
    /// `None` when no income was declared.
    pub primary_source: Option<IncomeBucket>,
    /// All eight categories in taxonomy order.
    pub categories: Vec<IncomeCategory>,
    pub recommendations: Vec<String>,
}

impl IncomeAnalysisResult {
    pub fn category(&self, bucket: IncomeBucket) -> Option<&IncomeCategory> {
        self.categories.iter().find(|category| category.id == bucket)
    }
}

/// Stateless classifier over a [`ClassifierConfig`].
#[derive(Debug, Clone, Default)]
pub struct IncomeClassifier {
    config: ClassifierConfig,
}

impl IncomeClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Bucket for a category code; unmapped codes fall into [`IncomeBucket::Other`].
    pub fn bucket_for(&self, code: &str) -> IncomeBucket {
        self.config
            .category_map
            .get(code.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(IncomeBucket::Other)
    }

    pub fn analyze<'a, I>(&self, records: I, family_size: usize) -> IncomeAnalysisResult
    where
        I: IntoIterator<Item = &'a IncomeRecord>,
    {
        let mut amounts = [0.0_f64; IncomeBucket::ALL.len()];
        let mut sources: [Vec<String>; IncomeBucket::ALL.len()] = Default::default();

        for record in records {
            let monthly = record.normalized_monthly();
            if monthly <= 0.0 {
                continue;
            }
            let idx = self.bucket_for(&record.category).index();
            amounts[idx] += monthly;
            let label = record.source_label();
            if !label.is_empty() && !sources[idx].iter().any(|seen| seen == label) {
                sources[idx].push(label.to_string());
            }
        }

        let total_income: f64 = amounts.iter().sum();
        let family_size = effective_family_size(family_size);
        let per_capita_income = total_income / family_size as f64;

        let categories: Vec<IncomeCategory> = IncomeBucket::ALL
            .iter()
            .zip(amounts.iter().zip(sources))
            .map(|(bucket, (amount, sources))| IncomeCategory {
                id: *bucket,
                name: bucket.display_name().to_string(),
                amount: *amount,
                percentage: if total_income > 0.0 {
                    amount / total_income * 100.0
                } else {
                    0.0
                },
                sources,
            })
            .collect();

        let primary = if total_income > 0.0 {
            categories.iter().fold(None, |best: Option<&IncomeCategory>, category| {
                match best {
                    Some(current) if category.amount <= current.amount => Some(current),
                    _ => Some(category),
                }
            })
        } else {
            None
        };

        let non_empty = categories.iter().filter(|category| category.amount > 0.0).count();
        let stability = insights::stability(
            primary.map(|category| category.percentage).unwrap_or(0.0),
            &self.config,
        );
        let diversification = insights::diversification(non_empty, &self.config);

        let recommendations = insights::recommendations(&InsightContext {
            total_income,
            per_capita_income,
            categories: &categories,
            primary,
            diversification,
            config: &self.config,
        });

        let primary_source = primary.map(|category| category.id);
        debug!(
            total_income,
            stability = stability.label(),
            diversification = diversification.label(),
            "income classified"
        );

        IncomeAnalysisResult {
            total_income,
            family_size,
            per_capita_income,
            stability,
            diversification,
            primary_source,
            categories,
            recommendations,
        }
    }
}
