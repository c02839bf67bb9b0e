use crate::workflows::honors::catalog::{CatalogError, CriterionCatalog};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the host program.
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

/// Top-level configuration for the engine.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
    pub batch: BatchConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("HONOR_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("HONOR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let criteria_path = env::var("HONOR_CRITERIA_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let threads = match env::var("HONOR_BATCH_THREADS") {
            Ok(value) if !value.trim().is_empty() => {
                let parsed = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidBatchThreads)?;
                if parsed == 0 {
                    return Err(ConfigError::InvalidBatchThreads);
                }
                Some(parsed)
            }
            _ => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            catalog: CatalogConfig { criteria_path },
            batch: BatchConfig { threads },
        })
    }

    /// Criterion catalog selected by configuration: the CSV file when one is
    /// configured, the built-in catalog otherwise.
    pub fn criterion_catalog(&self) -> Result<CriterionCatalog, ConfigError> {
        match &self.catalog.criteria_path {
            Some(path) => CriterionCatalog::from_path(path).map_err(|source| {
                ConfigError::Catalog {
                    path: path.clone(),
                    source,
                }
            }),
            None => Ok(CriterionCatalog::standard()),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the criterion catalog comes from.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub criteria_path: Option<PathBuf>,
}

/// Sizing for batch evaluation across students.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchConfig {
    pub threads: Option<usize>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBatchThreads,
    Catalog { path: PathBuf, source: CatalogError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBatchThreads => {
                write!(f, "HONOR_BATCH_THREADS must be a positive integer")
            }
            ConfigError::Catalog { path, .. } => write!(
                f,
                "HONOR_CRITERIA_PATH {} could not be loaded as a criterion catalog",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidBatchThreads => None,
            ConfigError::Catalog { source, .. } => Some(source),
        }
    }
}
