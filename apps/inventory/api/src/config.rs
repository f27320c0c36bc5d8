use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, broker::BrokerConfig, env_parse,
    server::ServerConfig,
};
use std::time::Duration;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Tuning for the background inventory worker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerSettings {
    pub processing_delay: Duration,
    pub webhook_timeout: Duration,
}

impl FromEnv for WorkerSettings {
    /// Reads from environment variables with defaults:
    /// - PROCESSING_DELAY_MS: defaults to 5000
    /// - WEBHOOK_TIMEOUT_SECS: defaults to 10
    fn from_env() -> Result<Self, ConfigError> {
        let delay_ms = env_parse(
            "PROCESSING_DELAY_MS",
            domain_inventory::DEFAULT_PROCESSING_DELAY.as_millis() as u64,
        )?;
        let timeout_secs = env_parse(
            "WEBHOOK_TIMEOUT_SECS",
            domain_inventory::DEFAULT_WEBHOOK_TIMEOUT.as_secs(),
        )?;

        Ok(Self {
            processing_delay: Duration::from_millis(delay_ms),
            webhook_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub worker: WorkerSettings,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let broker = BrokerConfig::from_env()?;
        let worker = WorkerSettings::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            broker,
            worker,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKER_VARS: [&str; 2] = ["PROCESSING_DELAY_MS", "WEBHOOK_TIMEOUT_SECS"];

    #[test]
    fn test_worker_settings_defaults() {
        temp_env::with_vars_unset(WORKER_VARS, || {
            let settings = WorkerSettings::from_env().unwrap();
            assert_eq!(settings.processing_delay, Duration::from_millis(5000));
            assert_eq!(settings.webhook_timeout, Duration::from_secs(10));
        });
    }

    #[test]
    fn test_worker_settings_custom_values() {
        temp_env::with_vars(
            [
                ("PROCESSING_DELAY_MS", Some("250")),
                ("WEBHOOK_TIMEOUT_SECS", Some("3")),
            ],
            || {
                let settings = WorkerSettings::from_env().unwrap();
                assert_eq!(settings.processing_delay, Duration::from_millis(250));
                assert_eq!(settings.webhook_timeout, Duration::from_secs(3));
            },
        );
    }

    #[test]
    fn test_worker_settings_invalid_delay() {
        temp_env::with_var("PROCESSING_DELAY_MS", Some("-5"), || {
            let err = WorkerSettings::from_env().unwrap_err();
            assert!(err.to_string().contains("PROCESSING_DELAY_MS"));
        });
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("PORT", Some("6000")),
                ("BROKER_TOPIC", Some("stock-jobs")),
                ("PROCESSING_DELAY_MS", None),
                ("WEBHOOK_TIMEOUT_SECS", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_production());
                assert_eq!(config.server.port, 6000);
                assert_eq!(config.broker.topic, "stock-jobs");
                assert_eq!(config.app.name, "inventory_api");
            },
        );
    }
}
