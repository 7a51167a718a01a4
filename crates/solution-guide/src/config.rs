use std::net::SocketAddr;
use std::time::Duration;

use glean_common::glean::GleanClientConfig;
use tracing::Level;

use crate::error::AppError;
use crate::generator::GeneratorSettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Application configuration loaded explicitly from environment variables.
///
/// The Glean credentials are required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Glean connection settings, including the two required credentials.
    pub glean: GleanClientConfig,
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Include error details in 5xx response bodies.
    pub debug: bool,
    /// Default log level when `RUST_LOG` does not say otherwise.
    pub log_level: Level,
    /// Research and generation deadlines.
    pub generator: GeneratorSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Required:
    /// - `GLEAN_INSTANCE`: Glean instance name or base URL
    /// - `GLEAN_API_TOKEN`: Glean API token
    ///
    /// Optional:
    /// - `BIND_ADDR` (default `0.0.0.0:8000`)
    /// - `DEBUG` (default false)
    /// - `LOG_LEVEL` (default `info`)
    /// - `RESEARCH_TIMEOUT_SECS` (default 90)
    /// - `GENERATION_TIMEOUT_SECS` (default 180)
    /// - the `GLEAN_*` client tuning read by [`GleanClientConfig::from_lookup`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let glean = GleanClientConfig::from_lookup(&lookup)?;

        let bind_addr = lookup("BIND_ADDR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|e| {
            AppError::Config(format!("BIND_ADDR {bind_addr:?} is not a socket address: {e}"))
        })?;

        let debug = lookup("DEBUG").map(|v| is_truthy(&v)).unwrap_or(false);

        let log_level = match lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            Some(level) => level.trim().parse::<Level>().map_err(|_| {
                AppError::Config(format!("LOG_LEVEL {level:?} is not a log level"))
            })?,
            None => Level::INFO,
        };

        let defaults = GeneratorSettings::default();
        let generator = GeneratorSettings {
            research_timeout: seconds(&lookup, "RESEARCH_TIMEOUT_SECS")
                .unwrap_or(defaults.research_timeout),
            generation_timeout: seconds(&lookup, "GENERATION_TIMEOUT_SECS")
                .unwrap_or(defaults.generation_timeout),
        };

        Ok(Self {
            glean,
            bind_addr,
            debug,
            log_level,
            generator,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn seconds<F>(lookup: &F, name: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
        .map(Duration::from_secs)
}
