use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::engine::router::{benefit_handler, BenefitRequest};
use crate::engine::MemoryAuditSink;

fn json_request(uri: &str, body: &serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize payload"),
        ))
        .expect("request")
}

#[tokio::test]
async fn benefit_handler_returns_unprocessable_without_child_list() {
    let (service, audit) = build_service();

    let response = benefit_handler::<MemoryAuditSink>(
        State(Arc::new(service)),
        axum::Json(BenefitRequest {
            children: None,
            actor_role: None,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("child list is required"));
    assert!(audit.entries().is_empty());
}

#[tokio::test]
async fn evaluate_route_returns_metrics_and_payable_amount() {
    let (service, audit) = build_service();
    let router = engine_router_with_service(service);

    let payload = json!({
        "as_of": "2025-09-01",
        "actor_role": "caseworker",
        "household": {
            "applicant": {
                "full_name": "Dana Serikova",
                "birth_date": "15.03.1988",
                "income": { "salary": "25000" }
            },
            "members": [
                { "full_name": "Serik", "relation": "spouse", "birth_date": "1986-03-15",
                  "income": { "salary": 15000 } },
                { "full_name": "Aru", "relation": "daughter", "birth_date": "2015-03-15" },
                { "full_name": "Timur", "relation": "son", "birth_date": "2018-03-15" }
            ],
            "land_plots": [{ "kind": "garden", "area": 20, "unit": "sotok" }],
            "livestock": [{ "kind": "cow", "count": 5 }, { "kind": "sheep", "count": 10 }],
            "vehicles": [
                { "kind": "car", "model_year": 2019, "model": "Kia" },
                { "kind": "truck", "model_year": 2012, "model": "GAZ" }
            ]
        }
    });

    let response = router
        .oneshot(json_request("/api/v1/households/evaluate", &payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["as_of"], "2025-09-01");
    assert_eq!(body["metrics"]["family_size"], 4);
    assert_eq!(body["metrics"]["per_capita_income"], 10_000.0);
    assert_eq!(body["metrics"]["property_value"], 9.0);
    assert_eq!(body["metrics"]["application_status"], "INELIGIBLE");
    assert_eq!(body["benefit"]["final_amount"], 10_500.0);
    assert_eq!(body["payable_amount"], 0.0);
    assert_eq!(body["analysis"]["primary_source"], "salary");

    let entries = audit.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| entry.actor_role == "caseworker"));
}

#[tokio::test]
async fn benefit_route_computes_large_family_allowance() {
    let (service, _) = build_service();
    let router = engine_router_with_service(service);

    let payload = json!({
        "children": [
            { "name": "Aru", "age": 10 },
            { "name": "Timur", "age": 7 },
            { "name": "Aisha", "age": 1 }
        ]
    });

    let response = router
        .oneshot(json_request("/api/v1/benefit/calculate", &payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "computed");
    assert_eq!(body["total_amount"], 15_000.0);
    assert_eq!(body["allowances"]["large_family"], 1_000.0);
    assert_eq!(body["final_amount"], 16_500.0);
}

#[tokio::test]
async fn benefit_route_rejects_explicit_null_children() {
    let (service, _) = build_service();
    let router = engine_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "/api/v1/benefit/calculate",
            &json!({ "children": null }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn income_analysis_route_defaults_family_size_to_one() {
    let (service, audit) = build_service();
    let router = engine_router_with_service(service);

    let payload = json!({
        "records": [
            { "category": "Salary", "amount": "3000", "source": "Office" },
            { "category": "deposit", "amount": 12000, "periodicity": "yearly", "source": "Bank" }
        ]
    });

    let response = router
        .oneshot(json_request("/api/v1/income/analysis", &payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["family_size"], 1);
    assert_eq!(body["total_income"], 4_000.0);
    assert_eq!(body["categories"].as_array().map(Vec::len), Some(8));
    assert_eq!(body["categories"][0]["percentage"], 75.0);
    assert_eq!(body["categories"][5]["sources"], json!(["Bank"]));
    assert_eq!(audit.entries()[0].actor_role, "system");
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let (service, _) = build_service();
    let router = engine_router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/households/evaluate")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from("{\"household\": "))
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
