use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which computation an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationKind {
    Benefit,
    IncomeAnalysis,
}

impl CalculationKind {
    pub const fn label(self) -> &'static str {
        match self {
            CalculationKind::Benefit => "BENEFIT",
            CalculationKind::IncomeAnalysis => "INCOME_ANALYSIS",
        }
    }
}

/// Snapshot of one computation's inputs and outputs for provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationAudit {
    pub kind: CalculationKind,
    pub actor_role: String,
    pub recorded_at: DateTime<Utc>,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
}

/// Provenance sink. The engine only writes; it never reads entries back.
pub trait AuditSink: Send + Sync {
    fn log_calculation(&self, entry: CalculationAudit) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit transport unavailable: {0}")]
    Transport(String),
    #[error("audit entry rejected: {0}")]
    Rejected(String),
}

/// Emits every entry as a structured event on the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn log_calculation(&self, entry: CalculationAudit) -> Result<(), AuditError> {
        let input = serde_json::to_string(&entry.input)
            .map_err(|err| AuditError::Rejected(err.to_string()))?;
        let output = serde_json::to_string(&entry.output)
            .map_err(|err| AuditError::Rejected(err.to_string()))?;
        info!(
            target: "audit",
            kind = entry.kind.label(),
            actor_role = %entry.actor_role,
            recorded_at = %entry.recorded_at,
            %input,
            %output,
            "calculation recorded"
        );
        Ok(())
    }
}

/// Keeps entries in memory; used by the `evaluate` CLI command and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    entries: Arc<Mutex<Vec<CalculationAudit>>>,
}

impl MemoryAuditSink {
    pub fn entries(&self) -> Vec<CalculationAudit> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn log_calculation(&self, entry: CalculationAudit) -> Result<(), AuditError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| AuditError::Transport("audit log lock poisoned".to_string()))?;
        guard.push(entry);
        Ok(())
    }
}
