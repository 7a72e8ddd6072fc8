use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::engine::EngineConfig;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let engine = load_engine_config()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            engine,
        })
    }
}

/// Engine settings: optional JSON file, then scalar environment overrides.
pub fn load_engine_config() -> Result<EngineConfig, ConfigError> {
    let mut config = match env::var("BENEFIT_CONFIG_PATH") {
        Ok(path) if !path.trim().is_empty() => read_engine_file(PathBuf::from(path))?,
        _ => EngineConfig::default(),
    };

    override_number(
        "BENEFIT_GUARANTEED_MINIMUM_INCOME",
        &mut config.eligibility.guaranteed_minimum_income,
    )?;
    override_number(
        "BENEFIT_ANALYSIS_MINIMUM_INCOME",
        &mut config.classifier.analysis_minimum_income,
    )?;
    override_number(
        "BENEFIT_PROPERTY_CAP_MPC",
        &mut config.eligibility.property_cap_mpc,
    )?;
    override_number(
        "BENEFIT_UNIT_CAP_PER_MEMBER",
        &mut config.eligibility.conventional_unit_cap_per_member,
    )?;
    override_number(
        "BENEFIT_BASE_CHILD_AMOUNT",
        &mut config.benefit.base_child_amount,
    )?;
    override_number(
        "BENEFIT_LARGE_FAMILY_BONUS",
        &mut config.benefit.large_family_bonus,
    )?;
    override_number(
        "BENEFIT_SINGLE_PARENT_BONUS",
        &mut config.benefit.single_parent_bonus,
    )?;

    validate_engine_config(&config)?;
    Ok(config)
}

fn read_engine_file(path: PathBuf) -> Result<EngineConfig, ConfigError> {
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::EngineFile {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::EngineParse { path, source })
}

fn override_number(key: &'static str, target: &mut f64) -> Result<(), ConfigError> {
    if let Ok(raw) = env::var(key) {
        *target = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidNumber { key })?;
    }
    Ok(())
}

fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    let checks: [(&'static str, f64); 13] = [
        (
            "eligibility.guaranteed_minimum_income",
            config.eligibility.guaranteed_minimum_income,
        ),
        ("eligibility.property_cap_mpc", config.eligibility.property_cap_mpc),
        (
            "eligibility.conventional_unit_cap_per_member",
            config.eligibility.conventional_unit_cap_per_member,
        ),
        (
            "conversion.land_weight_per_sotka",
            config.conversion.land_weight_per_sotka,
        ),
        (
            "conversion.conventional_unit_weight",
            config.conversion.conventional_unit_weight,
        ),
        ("conversion.vehicle_weight", config.conversion.vehicle_weight),
        ("benefit.base_child_amount", config.benefit.base_child_amount),
        ("benefit.coefficient", config.benefit.coefficient),
        ("benefit.large_family_bonus", config.benefit.large_family_bonus),
        ("benefit.single_parent_bonus", config.benefit.single_parent_bonus),
        (
            "classifier.analysis_minimum_income",
            config.classifier.analysis_minimum_income,
        ),
        ("classifier.stability_high_pct", config.classifier.stability_high_pct),
        (
            "classifier.stability_medium_pct",
            config.classifier.stability_medium_pct,
        ),
    ];

    for (key, value) in checks {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidNumber { key });
        }
    }

    if config
        .conversion
        .livestock_rates
        .values()
        .any(|rate| !rate.is_finite() || *rate < 0.0)
    {
        return Err(ConfigError::InvalidNumber {
            key: "conversion.livestock_rates",
        });
    }

    let classifier = &config.classifier;
    if classifier.stability_medium_pct > classifier.stability_high_pct {
        return Err(ConfigError::UnorderedCutPoints {
            lower: "classifier.stability_medium_pct",
            upper: "classifier.stability_high_pct",
        });
    }
    if classifier.diversification_medium > classifier.diversification_high {
        return Err(ConfigError::UnorderedCutPoints {
            lower: "classifier.diversification_medium",
            upper: "classifier.diversification_high",
        });
    }

    Ok(())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidNumber {
        key: &'static str,
    },
    UnorderedCutPoints {
        lower: &'static str,
        upper: &'static str,
    },
    EngineFile {
        path: PathBuf,
        source: std::io::Error,
    },
    EngineParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a finite non-negative number")
            }
            ConfigError::UnorderedCutPoints { lower, upper } => {
                write!(f, "{lower} must not exceed {upper}")
            }
            ConfigError::EngineFile { path, .. } => {
                write!(f, "unable to read engine config {}", path.display())
            }
            ConfigError::EngineParse { path, .. } => {
                write!(f, "engine config {} is not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::UnorderedCutPoints { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::EngineFile { source, .. } => Some(source),
            ConfigError::EngineParse { source, .. } => Some(source),
        }
    }
}
