use chrono_tz::Tz;
use clap::Args;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/portal.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Persistence endpoint; the operation goes in the `action` query parameter.
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub log_level: String,
    /// IANA name used to display timestamps.
    pub timezone: String,
    pub assistant: AssistantConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8888/.netlify/functions/api".to_string(),
            email: String::new(),
            password: String::new(),
            log_level: "info".to_string(),
            timezone: "Africa/Abidjan".to_string(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| AppError::Setting(format!("timezone {}: {err}", self.timezone)))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Empty disables the assistant; every report then falls back to the apology text.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// Flags overriding the file and environment layers.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override the persistence endpoint URL.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override the login email (password is never read from CLI).
    #[arg(long, global = true)]
    email: Option<String>,
    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long, global = true)]
    timezone: Option<String>,
}

/// Layers, lowest priority first: defaults, TOML file, `PORTAL_*` environment
/// (`PORTAL_ASSISTANT__API_KEY` for nested keys), command line flags.
pub fn load(overrides: Overrides) -> Result<AppConfig> {
    let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("PORTAL")
            .prefix_separator("_")
            .separator("__"),
    );
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = overrides.base_url {
        settings.base_url = base_url;
    }
    if let Some(email) = overrides.email {
        settings.email = email;
    }
    if let Some(log_level) = overrides.log_level {
        settings.log_level = log_level;
    }
    if let Some(timezone) = overrides.timezone {
        settings.timezone = timezone;
    }

    Ok(settings)
}
