/// `load_config` module: reads the credential file and tuning sections into [`AppConfig`].
///
/// # Responsibilities
/// - Resolve the config path: `--config`, else the `CONFIG` env var, else `config.json`
/// - Parse JSON (or YAML for `.yaml`/`.yml` files) into strongly-typed structs
/// - Let environment variables override credential fields
/// - Fail fast with a clear message when anything is missing or malformed
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary, where
/// they terminate the process.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use timeline_relay_core::config::RelaySettings;
use timeline_relay_core::message::MIN_MAX_CHARS;
use tracing::{error, info};

pub const CONFIG_ENV: &str = "CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Static credential bundle for both platforms.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub weibo_access_token: String,
    pub twitter_consumer_key: String,
    pub twitter_consumer_secret: String,
    pub twitter_access_token: String,
    pub twitter_token_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("twitter_consumer_key", &self.twitter_consumer_key)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    fn fields_mut(&mut self) -> [(&'static str, &'static str, &mut String); 5] {
        [
            ("weibo_access_token", "WEIBO_ACCESS_TOKEN", &mut self.weibo_access_token),
            ("twitter_consumer_key", "TWITTER_CONSUMER_KEY", &mut self.twitter_consumer_key),
            ("twitter_consumer_secret", "TWITTER_CONSUMER_SECRET", &mut self.twitter_consumer_secret),
            ("twitter_access_token", "TWITTER_ACCESS_TOKEN", &mut self.twitter_access_token),
            ("twitter_token_secret", "TWITTER_TOKEN_SECRET", &mut self.twitter_token_secret),
        ]
    }

    /// Replace file values with non-empty environment variables.
    fn apply_env_overrides(&mut self) {
        for (field, var, value) in self.fields_mut() {
            if let Ok(from_env) = std::env::var(var) {
                if !from_env.trim().is_empty() {
                    info!(field, env = var, "Credential overridden from environment");
                    *value = from_env;
                }
            }
        }
    }

    fn missing(&self) -> Vec<&'static str> {
        [
            ("weibo_access_token", &self.weibo_access_token),
            ("twitter_consumer_key", &self.twitter_consumer_key),
            ("twitter_consumer_secret", &self.twitter_consumer_secret),
            ("twitter_access_token", &self.twitter_access_token),
            ("twitter_token_secret", &self.twitter_token_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub settings: RelaySettings,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(flatten)]
    credentials: Credentials,
    #[serde(flatten)]
    settings: RelaySettings,
}

/// Path from the CLI flag, else `$CONFIG`, else `config.json`.
pub fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| {
        std::env::var(CONFIG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = if is_yaml(path_ref) {
        serde_yaml::from_str(&config_content).map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            anyhow::anyhow!("Failed to parse config YAML: {e}")
        })?
    } else {
        serde_json::from_str(&config_content).map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config JSON");
            anyhow::anyhow!("Failed to parse config JSON: {e}")
        })?
    };
    info!(config_path = ?path_ref, "Parsed config successfully");

    let mut credentials = raw.credentials;
    credentials.apply_env_overrides();
    let missing = credentials.missing();
    if !missing.is_empty() {
        error!(?missing, "Config is missing credentials");
        anyhow::bail!("Missing credentials in config: {}", missing.join(", "));
    }

    let settings = raw.settings;
    settings
        .schedule
        .validate()
        .context("Invalid schedule section")?;
    if settings.sink.max_chars < MIN_MAX_CHARS {
        error!(max_chars = settings.sink.max_chars, "sink.max_chars is below the minimum");
        anyhow::bail!(
            "sink.max_chars must be at least {MIN_MAX_CHARS}, got {}",
            settings.sink.max_chars
        );
    }
    settings.trace_loaded();

    Ok(AppConfig {
        credentials,
        settings,
    })
}
