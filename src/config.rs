//! TOML configuration for the `mate` client.
//!
//! ```toml
//! [backend]
//! base_url = "http://127.0.0.1:5000"
//! # timeout_secs = 30
//!
//! [ui]
//! reveal_delay_ms = 20
//! add_reset_delay_ms = 2000
//! ```

use anyhow::{Context, Result};
use research_mate_core::workspace::Timing;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Absent means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    #[serde(default = "default_add_reset_delay_ms")]
    pub add_reset_delay_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: default_reveal_delay_ms(),
            add_reset_delay_ms: default_add_reset_delay_ms(),
        }
    }
}

fn default_reveal_delay_ms() -> u64 {
    20
}
fn default_add_reset_delay_ms() -> u64 {
    2000
}

const MAX_REVEAL_DELAY_MS: u64 = 1000;

impl Config {
    /// Defaults for every field; used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            backend: BackendConfig {
                base_url: default_base_url(),
                timeout_secs: None,
            },
            ui: UiConfig::default(),
        }
    }

    pub fn timing(&self) -> Timing {
        Timing {
            reveal_delay: Duration::from_millis(self.ui.reveal_delay_ms),
            add_reset_delay: Duration::from_millis(self.ui.add_reset_delay_ms),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.backend.timeout_secs.map(Duration::from_secs)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
///
/// A file that exists but is invalid is still an error.
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    // Validate backend
    let url = reqwest::Url::parse(&config.backend.base_url)
        .with_context(|| format!("backend.base_url is not a URL: {}", config.backend.base_url))?;
    match url.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!(
            "backend.base_url must use http or https, got '{}'",
            other
        ),
    }
    if config.backend.timeout_secs == Some(0) {
        anyhow::bail!("backend.timeout_secs must be > 0 when set");
    }

    // Validate ui
    if config.ui.reveal_delay_ms > MAX_REVEAL_DELAY_MS {
        anyhow::bail!(
            "ui.reveal_delay_ms must be <= {}",
            MAX_REVEAL_DELAY_MS
        );
    }

    Ok(())
}
