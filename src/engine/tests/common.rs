use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::engine::audit::{AuditError, AuditSink, CalculationAudit};
use crate::engine::domain::{
    FamilyMember, Household, LandPlot, LandUnit, LivestockEntry, MemberIncome, Relation, Vehicle,
    VehicleKind,
};
use crate::engine::{engine_router, BenefitEngineService, EngineConfig, MemoryAuditSink};

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date")
}

pub(super) fn born(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 3, 15).expect("valid date")
}

/// Applicant, spouse, and two school-age children; 40,000 monthly salary in total.
pub(super) fn family_of_four() -> Household {
    let applicant = FamilyMember::new("Dana Serikova", Relation::Applicant)
        .with_birth_date(born(1988))
        .with_income(MemberIncome {
            salary: 25_000.0,
            ..MemberIncome::default()
        });
    let mut household = Household::new(applicant);
    household.add_member(
        FamilyMember::new("Serik Serikov", Relation::Spouse)
            .with_birth_date(born(1986))
            .with_income(MemberIncome {
                salary: 15_000.0,
                ..MemberIncome::default()
            }),
    );
    household.add_member(FamilyMember::new("Aru", Relation::Daughter).with_birth_date(born(2015)));
    household.add_member(FamilyMember::new("Timur", Relation::Son).with_birth_date(born(2018)));
    household
}

pub(super) fn cows_and_sheep() -> [LivestockEntry; 2] {
    [
        LivestockEntry {
            kind: "cow".to_string(),
            count: 5,
        },
        LivestockEntry {
            kind: "sheep".to_string(),
            count: 10,
        },
    ]
}

pub(super) fn garden(area: f64) -> LandPlot {
    LandPlot {
        kind: "garden".to_string(),
        area,
        unit: LandUnit::Sotok,
    }
}

pub(super) fn car(model_year: Option<i32>) -> Vehicle {
    Vehicle {
        kind: VehicleKind::PassengerCar,
        model_year,
        model: "Lada Niva".to_string(),
    }
}

pub(super) fn build_service() -> (BenefitEngineService<MemoryAuditSink>, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::default());
    let service = BenefitEngineService::new(EngineConfig::default(), audit.clone());
    (service, audit)
}

pub(super) struct UnavailableAuditSink;

impl AuditSink for UnavailableAuditSink {
    fn log_calculation(&self, _entry: CalculationAudit) -> Result<(), AuditError> {
        Err(AuditError::Transport("audit store offline".to_string()))
    }
}

pub(super) fn engine_router_with_service(
    service: BenefitEngineService<MemoryAuditSink>,
) -> axum::Router {
    engine_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
