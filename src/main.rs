use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use family_benefit::config::AppConfig;
use family_benefit::engine::{
    engine_router, BenefitEngineService, BenefitStatus, EngineResult, Household,
    HouseholdSubmission, MemoryAuditSink, TracingAuditSink,
};
use family_benefit::error::AppError;
use family_benefit::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Family Benefit Engine",
    about = "Evaluate family benefit applications from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the eligibility, benefit, and income pipeline on a household JSON file
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Household submission in JSON
    #[arg(long)]
    input: PathBuf,
    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,
    /// Role recorded in the audit trail
    #[arg(long, default_value = "caseworker")]
    actor_role: String,
    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Evaluate(args) => run_evaluate(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let service = Arc::new(BenefitEngineService::new(
        config.engine.clone(),
        Arc::new(TracingAuditSink),
    ));

    let probes = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state);

    let app = engine_router(service)
        .merge(probes)
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "family benefit engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        input,
        as_of,
        actor_role,
        json,
    } = args;

    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&input)?;
    let submission: HouseholdSubmission = serde_json::from_str(&raw)?;
    let household = Household::from(submission);
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let audit = Arc::new(MemoryAuditSink::default());
    let service = BenefitEngineService::new(config.engine, audit.clone());
    let result = service.recompute(&household, as_of, &actor_role)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_result(&result);
    }
    println!("\nAudit entries recorded: {}", audit.entries().len());

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn render_result(result: &EngineResult) {
    let metrics = &result.metrics;
    println!("Family benefit evaluation (as of {})", result.as_of);
    println!(
        "Status: {} | {}",
        metrics.application_status.label(),
        metrics.status_message
    );

    println!("\nHousehold metrics");
    println!("- family size: {}", metrics.family_size);
    println!(
        "- income: {:.2} per month, {:.2} per capita (guaranteed minimum {:.2})",
        metrics.total_income_month, metrics.per_capita_income, metrics.guaranteed_minimum_income
    );
    println!(
        "- property: {:.2} MPC, livestock {:.2} conventional units",
        metrics.property_value, metrics.conv_units_total
    );
    let criteria = &metrics.criteria;
    for (label, met) in [
        ("income", criteria.income_eligible),
        ("property", criteria.property_eligible),
        ("family", criteria.family_eligible),
        ("vehicle", criteria.vehicle_eligible),
    ] {
        println!("  - {label}: {}", if met { "met" } else { "not met" });
    }

    println!("\nBenefit");
    match result.benefit.status {
        BenefitStatus::NoBenefitComputed => println!("- {}", result.benefit.summary()),
        BenefitStatus::Computed => {
            for child in &result.benefit.children {
                println!(
                    "- {} (age {}): {:.2} x {:.2} = {:.2}",
                    child.name, child.age, child.base_amount, child.coefficient, child.amount
                );
            }
            let allowances = &result.benefit.allowances;
            println!(
                "- allowances: large family {:.2}, single parent {:.2}, disability {:.2}, other {:.2}",
                allowances.large_family,
                allowances.single_parent,
                allowances.disability,
                allowances.other
            );
            println!("- {}", result.benefit.summary());
        }
    }
    println!("- payable this month: {:.2}", result.payable_amount());

    let analysis = &result.analysis;
    println!("\nIncome analysis");
    println!(
        "- stability {}, diversification {}, primary source {}",
        analysis.stability.label(),
        analysis.diversification.label(),
        analysis
            .primary_source
            .map(|bucket| bucket.display_name())
            .unwrap_or("none")
    );
    for category in analysis.categories.iter().filter(|category| category.amount > 0.0) {
        println!(
            "  - {}: {:.2} ({:.1}%) from {}",
            category.name,
            category.amount,
            category.percentage,
            category.sources.join(", ")
        );
    }
    if !analysis.recommendations.is_empty() {
        println!("\nRecommendations");
        for recommendation in &analysis.recommendations {
            println!("- {recommendation}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("2025-09-24").is_ok());
        let err = parse_date("24/09/2025").expect_err("slash format rejected");
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let (_, handle) = PrometheusMetricLayer::pair();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: handle,
        };

        let response = readiness_endpoint(State(state.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
