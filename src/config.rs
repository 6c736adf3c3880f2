use crate::error::{config_error, env_error, ClientResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the persisted key-value store
pub const DEFAULT_STORAGE_PATH: &str = ".gocanvas/storage.json";

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Optional panel toggles file
pub const PANELS_FILE: &str = "config/panels.toml";

/// Main configuration structure for the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Go-Canvas API, without a trailing slash
    pub api_base_url: String,
    /// Timezone used to decide what "today" is
    pub timezone: String,
    /// Login name for the password grant
    pub username: Option<String>,
    /// Password for the password grant
    pub password: Option<String>,
    /// Where the auth token and last selected course are persisted
    pub storage_path: PathBuf,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Map of panel names to their enabled status
    pub panels: HashMap<String, bool>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> ClientResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let api_base_url = env::var("GOCANVAS_API_URL").map_err(|_| env_error("GOCANVAS_API_URL"))?;
        let api_base_url = normalize_base_url(&api_base_url)?;

        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));
        timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid TIMEZONE: {}", timezone)))?;

        let username = env::var("GOCANVAS_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("GOCANVAS_PASSWORD").ok().filter(|s| !s.is_empty());

        let storage_path = env::var("GOCANVAS_STORAGE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH));

        let request_timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid REQUEST_TIMEOUT_SECS format"))?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let panels = load_panels(Path::new(PANELS_FILE));

        Ok(Config {
            api_base_url,
            timezone,
            username,
            password,
            storage_path,
            request_timeout_secs,
            panels,
        })
    }

    /// Configuration pointing at the given server, everything else defaulted
    pub fn with_base_url(api_base_url: &str) -> ClientResult<Self> {
        Ok(Config {
            api_base_url: normalize_base_url(api_base_url)?,
            timezone: "UTC".to_string(),
            username: None,
            password: None,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            panels: default_panels(),
        })
    }

    /// Check if a panel is enabled
    pub fn is_panel_enabled(&self, name: &str) -> bool {
        *self.panels.get(name).unwrap_or(&false)
    }

    /// Parsed timezone; falls back to UTC for a value that no longer parses
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Credentials for the password grant, if both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

/// Trim whitespace and trailing slashes, rejecting an empty URL
pub fn normalize_base_url(raw: &str) -> ClientResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(config_error(
            "API base URL is not configured. Set GOCANVAS_API_URL.",
        ));
    }
    url::Url::parse(trimmed)
        .map_err(|e| config_error(&format!("Invalid API base URL '{}': {}", trimmed, e)))?;
    Ok(trimmed.to_string())
}

fn default_panels() -> HashMap<String, bool> {
    let mut panels = HashMap::new();
    panels.insert("calendar".to_string(), true);
    panels.insert("inbox".to_string(), true);
    panels
}

/// Defaults merged with the optional toggles file
fn load_panels(path: &Path) -> HashMap<String, bool> {
    let mut panels = default_panels();
    if let Ok(content) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, bool>>(&content) {
            Ok(file_panels) => panels.extend(file_panels),
            Err(e) => tracing::warn!("Ignoring malformed {}: {}", path.display(), e),
        }
    }
    panels
}
