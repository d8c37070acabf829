//! Handles settings for the application. Configuration is written in
//! `settings.toml` (or the file named by `EDUFINANCE_CONFIG`), and every key
//! can be overridden from the environment, e.g.
//! `EDUFINANCE__SERVER__PORT=8080`.
//!
//! See `settings.toml` for the configuration.
use analysis::ProviderKind;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_PATH_ENV: &str = "EDUFINANCE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "App::default_level")]
    pub level: String,
}

impl App {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "Server::default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: Database,
}

impl Server {
    fn default_port() -> u16 {
        5001
    }
}

#[derive(Debug, Deserialize)]
pub struct Ledger {
    /// Total fee of lazily created accounts, in minor units.
    #[serde(default = "Ledger::default_total_fee")]
    pub default_total_fee: i64,
}

impl Ledger {
    fn default_total_fee() -> i64 {
        engine::DEFAULT_TOTAL_FEE_MINOR
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            default_total_fee: Self::default_total_fee(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub provider: ProviderKind,
    pub url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "Analysis::default_model")]
    pub model: String,
    #[serde(default = "Analysis::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Analysis {
    fn default_model() -> String {
        analysis::generative::DEFAULT_MODEL.to_string()
    }

    fn default_timeout_secs() -> u64 {
        30
    }
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            url: None,
            api_key: None,
            model: Self::default_model(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub ledger: Ledger,
    #[serde(default)]
    pub analysis: Analysis,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("EDUFINANCE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
