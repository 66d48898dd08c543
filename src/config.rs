use std::env;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::period::PeriodKind;

pub const DEFAULT_SOURCE_URL: &str = "https://github.com/tdulcet/Thunderbird-Metrics";
pub const DEFAULT_SIGNATURE: &str = "Thunderbird Community Metrics";

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub period: PeriodKind,
    pub output_root: PathBuf,
    pub collectors_dir: PathBuf,
    pub interpreter: String,
    pub source_url: String,
    pub signature: String,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            environment: var("APP_ENVIRONMENT", "development"),
            period: var("METRICS_PERIOD", "quarterly").parse()?,
            output_root: absolute(&var("METRICS_OUTPUT_DIR", "."))?,
            collectors_dir: absolute(&var("METRICS_COLLECTORS_DIR", "."))?,
            interpreter: var("METRICS_INTERPRETER", "python3"),
            source_url: var("METRICS_SOURCE_URL", DEFAULT_SOURCE_URL),
            signature: var("METRICS_SIGNATURE", DEFAULT_SIGNATURE),
            otel_service_name: var("OTEL_SERVICE_NAME", "thunderbird-metrics"),
            otel_exporter_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT")
                .filter(|endpoint| !endpoint.trim().is_empty()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

// Collectors run inside their group directory, so relative paths would
// resolve against the wrong place.
fn absolute(path: &str) -> AppResult<PathBuf> {
    if path.trim().is_empty() {
        return Err(AppError::Configuration("empty directory path".to_string()));
    }
    std::path::absolute(Path::new(path)).map_err(|e| AppError::filesystem(path, e))
}
