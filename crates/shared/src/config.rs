//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Engine policy configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Engine policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Date window (in days, either side) for bank-to-ledger matching.
    #[serde(default = "default_tolerance_days")]
    pub reconciliation_date_tolerance_days: i64,
    /// Payment terms used when a terms string cannot be parsed.
    #[serde(default = "default_payment_terms_days")]
    pub default_payment_terms_days: i64,
    /// Zero padding applied to generated document numbers.
    #[serde(default = "default_document_number_width")]
    pub document_number_width: usize,
}

fn default_tolerance_days() -> i64 {
    3
}

fn default_payment_terms_days() -> i64 {
    30
}

fn default_document_number_width() -> usize {
    6
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reconciliation_date_tolerance_days: default_tolerance_days(),
            default_payment_terms_days: default_payment_terms_days(),
            document_number_width: default_document_number_width(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tally=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from `.env`, config files, and environment.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
    /// then `TALLY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
