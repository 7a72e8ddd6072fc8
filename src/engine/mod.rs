//! Eligibility and income-classification engine for the family social benefit.
//!
//! Every component is a pure function of its inputs. The owning service calls
//! [`BenefitEngineService::recompute`] after each accepted household mutation and keeps only
//! the latest result; snapshotting a result at decision time is the caller's job.

pub mod arena;
pub mod audit;
pub mod benefit;
pub mod classification;
pub mod domain;
pub mod eligibility;
pub mod income;
pub mod router;
pub mod service;
pub mod units;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use arena::{EntryArena, EntryId};
pub use audit::{
    AuditError, AuditSink, CalculationAudit, CalculationKind, MemoryAuditSink, TracingAuditSink,
};
pub use benefit::{
    Allowances, BenefitCalculation, BenefitCalculator, BenefitConfig, BenefitStatus, ChildBenefit,
};
pub use classification::{
    ClassifierConfig, IncomeAnalysisResult, IncomeBucket, IncomeCategory, IncomeClassifier, Level,
};
pub use domain::{
    ChildEntry, FamilyMember, FinancialAsset, Gender, Household, HouseholdError,
    HouseholdSubmission, IncomeRecord, LandPlot, LandUnit, LivestockEntry, MemberIncome,
    Periodicity, Relation, Vehicle, VehicleKind,
};
pub use eligibility::{
    ApplicationStatus, CriteriaFlags, CriterionFailure, EligibilityConfig, EligibilityEvaluator,
    EligibilityInputs, HouseholdMetrics,
};
pub use income::{aggregate, household_income_records, IncomeAggregate};
pub use router::engine_router;
pub use service::{BenefitEngineService, EngineResult, EngineServiceError};
pub use units::{ConversionConfig, UnitConverter};

/// Complete, externally adjustable engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub conversion: ConversionConfig,
    pub eligibility: EligibilityConfig,
    pub benefit: BenefitConfig,
    pub classifier: ClassifierConfig,
}

/// Structural misuse of the engine, as opposed to inputs that degrade to defaults.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}
