use std::time::Duration;

use qalab_core::dashboard::{
    AlertThresholds, DEFAULT_MAX_OPEN_DEFECTS, DEFAULT_MIN_COVERAGE, DEFAULT_MIN_PASS_RATE,
};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Scheduled aggregation settings.
    pub aggregation: AggregationConfig,
    /// Dashboard alert thresholds.
    pub alert_thresholds: AlertThresholds,
}

/// Settings for the scheduled aggregation pass.
#[derive(Debug, Clone, Copy)]
pub struct AggregationConfig {
    /// Time between scheduled passes.
    pub interval: Duration,
    /// Run one pass immediately at boot.
    pub on_startup: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_AGGREGATION_INTERVAL_SECS),
            on_startup: true,
        }
    }
}

/// Nightly by default.
const DEFAULT_AGGREGATION_INTERVAL_SECS: u64 = 86_400;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: '{raw}'")),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `AGGREGATION_INTERVAL_SECS` | `86400`                 |
    /// | `AGGREGATION_ON_STARTUP`    | `true`                  |
    /// | `ALERT_MIN_PASS_RATE`       | `50`                    |
    /// | `ALERT_MAX_OPEN_DEFECTS`    | `5`                     |
    /// | `ALERT_MIN_COVERAGE`        | `40`                    |
    ///
    /// # Panics
    ///
    /// Panics on a value that does not parse, or when `JWT_SECRET` is unset.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        let interval_secs: u64 = env_or("AGGREGATION_INTERVAL_SECS", DEFAULT_AGGREGATION_INTERVAL_SECS);
        assert!(interval_secs > 0, "AGGREGATION_INTERVAL_SECS must be positive");
        let aggregation = AggregationConfig {
            interval: Duration::from_secs(interval_secs),
            on_startup: env_or("AGGREGATION_ON_STARTUP", true),
        };

        let alert_thresholds = AlertThresholds {
            min_pass_rate: env_or("ALERT_MIN_PASS_RATE", DEFAULT_MIN_PASS_RATE),
            max_open_defects: env_or("ALERT_MAX_OPEN_DEFECTS", DEFAULT_MAX_OPEN_DEFECTS),
            min_coverage: env_or("ALERT_MIN_COVERAGE", DEFAULT_MIN_COVERAGE),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            aggregation,
            alert_thresholds,
        }
    }
}
