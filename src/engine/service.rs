use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::audit::{AuditSink, CalculationAudit, CalculationKind};
use super::benefit::{BenefitCalculation, BenefitCalculator};
use super::classification::{IncomeAnalysisResult, IncomeClassifier};
use super::domain::{ChildEntry, Household, IncomeRecord};
use super::eligibility::{ApplicationStatus, EligibilityEvaluator, HouseholdMetrics};
use super::income::{self, IncomeAggregate};
use super::units::UnitConverter;
use super::{EngineConfig, EngineError};

/// Everything one pipeline run produces for a household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    pub as_of: NaiveDate,
    pub income: IncomeAggregate,
    pub metrics: HouseholdMetrics,
    pub benefit: BenefitCalculation,
    pub analysis: IncomeAnalysisResult,
}

impl EngineResult {
    /// Monthly amount payable: the computed benefit for eligible households, otherwise 0.
    pub fn payable_amount(&self) -> f64 {
        match self.metrics.application_status {
            ApplicationStatus::Eligible => self.benefit.final_amount,
            ApplicationStatus::Ineligible | ApplicationStatus::Pending => 0.0,
        }
    }
}

/// Service composing the engine components with the audit sink.
pub struct BenefitEngineService<S> {
    evaluator: EligibilityEvaluator,
    calculator: BenefitCalculator,
    classifier: IncomeClassifier,
    audit: Arc<S>,
}

impl<S> BenefitEngineService<S>
where
    S: AuditSink + 'static,
{
    pub fn new(config: EngineConfig, audit: Arc<S>) -> Self {
        let EngineConfig {
            conversion,
            eligibility,
            benefit,
            classifier,
        } = config;

        Self {
            evaluator: EligibilityEvaluator::new(eligibility, UnitConverter::new(conversion)),
            calculator: BenefitCalculator::new(benefit),
            classifier: IncomeClassifier::new(classifier),
            audit,
        }
    }

    /// Run the whole pipeline on the current household state.
    pub fn recompute(
        &self,
        household: &Household,
        as_of: NaiveDate,
        actor_role: &str,
    ) -> Result<EngineResult, EngineServiceError> {
        let records = income::household_income_records(household);
        let aggregate = income::aggregate(&records);
        let metrics = self.evaluator.evaluate(household, &aggregate, as_of);

        let children = household.children(as_of);
        let benefit = self.calculator.calculate(Some(children.as_slice()))?;
        let analysis = self.classifier.analyze(&records, household.family_size());

        debug!(
            status = metrics.application_status.label(),
            final_amount = benefit.final_amount,
            "household recomputed"
        );

        self.record(
            CalculationKind::Benefit,
            actor_role,
            json!({ "as_of": as_of, "household": household, "children": children }),
            json!({ "metrics": metrics, "benefit": benefit }),
        );
        self.record(
            CalculationKind::IncomeAnalysis,
            actor_role,
            json!({ "records": records, "family_size": household.family_size() }),
            json!(analysis),
        );

        Ok(EngineResult {
            as_of,
            income: aggregate,
            metrics,
            benefit,
            analysis,
        })
    }

    /// Eligibility only; not audited since no decision amount is produced.
    pub fn evaluate_eligibility(&self, household: &Household, as_of: NaiveDate) -> HouseholdMetrics {
        let records = income::household_income_records(household);
        let aggregate = income::aggregate(&records);
        self.evaluator.evaluate(household, &aggregate, as_of)
    }

    pub fn calculate_benefit(
        &self,
        children: Option<&[ChildEntry]>,
        actor_role: &str,
    ) -> Result<BenefitCalculation, EngineServiceError> {
        let benefit = self.calculator.calculate(children)?;
        self.record(
            CalculationKind::Benefit,
            actor_role,
            json!({ "children": children }),
            json!({ "benefit": benefit }),
        );
        Ok(benefit)
    }

    pub fn analyze_income(
        &self,
        records: &[IncomeRecord],
        family_size: usize,
        actor_role: &str,
    ) -> IncomeAnalysisResult {
        let analysis = self.classifier.analyze(records, family_size);
        self.record(
            CalculationKind::IncomeAnalysis,
            actor_role,
            json!({ "records": records, "family_size": family_size }),
            json!(analysis),
        );
        analysis
    }

    /// Fire-and-forget: sink failures are logged and never reach the caller.
    fn record(
        &self,
        kind: CalculationKind,
        actor_role: &str,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let entry = CalculationAudit {
            kind,
            actor_role: actor_role.to_string(),
            recorded_at: Utc::now(),
            input,
            output,
        };

        if let Err(err) = self.audit.log_calculation(entry) {
            warn!(kind = kind.label(), error = %err, "audit sink rejected calculation");
        }
    }
}

/// Error raised by the engine service.
#[derive(Debug, thiserror::Error)]
pub enum EngineServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}
