//! Configuration file handling
//!
//! Resolution order for the target base URL: `--base-url` flag, then the
//! `NEXT_PUBLIC_BASE_URL` environment variable, then the config file, then
//! the built-in default.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Environment variable that overrides the target base URL
pub const BASE_URL_ENV: &str = "NEXT_PUBLIC_BASE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// The API under test
    #[serde(default)]
    pub target: TargetConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Pass/fail policy
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Where the API lives and how to authenticate against it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Base URL of the web application (without the `/api` suffix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Placeholder bearer token sent on authenticated scenarios
    #[serde(default = "default_auth_token")]
    pub auth_token: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: default_auth_token(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_auth_token() -> String {
    "mock_token_for_testing".to_string()
}

/// Timeout settings in seconds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Timeouts {
    /// Timeout for plain reads, validation and auth checks
    #[serde(default = "default_request")]
    pub request_secs: u64,

    /// Timeout for LLM-backed generation requests
    #[serde(default = "default_generate")]
    pub generate_secs: u64,

    /// Timeout for hero-tier profile generation (two LLM calls)
    #[serde(default = "default_hero_generate")]
    pub hero_generate_secs: u64,

    /// Delay between a write and the read that should observe it
    #[serde(default = "default_settle")]
    pub settle_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: default_request(),
            generate_secs: default_generate(),
            hero_generate_secs: default_hero_generate(),
            settle_secs: default_settle(),
        }
    }
}

fn default_request() -> u64 {
    10
}
fn default_generate() -> u64 {
    60
}
fn default_hero_generate() -> u64 {
    90
}
fn default_settle() -> u64 {
    2
}

impl Timeouts {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn generate(&self) -> Duration {
        Duration::from_secs(self.generate_secs)
    }

    pub fn hero_generate(&self) -> Duration {
        Duration::from_secs(self.hero_generate_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

/// Pass/fail policy
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PolicyConfig {
    /// Treat heuristic warnings as failures
    #[serde(default)]
    pub strict: bool,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Load the file, then apply the environment and command-line overrides
    pub fn resolve(file: Option<&Path>, base_url: Option<String>, strict: bool) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };

        config.apply_overrides(std::env::var(BASE_URL_ENV).ok(), base_url, strict);
        config.api_base()?;

        Ok(config)
    }

    /// Apply overrides in precedence order; empty values are ignored
    pub fn apply_overrides(
        &mut self,
        env_url: Option<String>,
        flag_url: Option<String>,
        strict: bool,
    ) {
        for url in [env_url, flag_url].into_iter().flatten() {
            let url = url.trim();
            if !url.is_empty() {
                self.target.base_url = url.to_string();
            }
        }

        if strict {
            self.policy.strict = true;
        }
    }

    /// The `/api` root every endpoint hangs off
    pub fn api_base(&self) -> Result<String> {
        let raw = self.target.base_url.trim();
        let url = Url::parse(raw).map_err(|e| Error::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::InvalidBaseUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(format!("{}/api", raw.trim_end_matches('/')))
    }
}
