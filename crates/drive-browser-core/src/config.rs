//! Configuration and settings management
//!
//! Loads settings from configuration files and environment variables.

use crate::pagination::PageSize;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of files shown per page
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Default local directory for downloaded files
pub const DEFAULT_STAGING_DIR: &str = "downloads";
/// Default maximum number of chats tracked by the session store
pub const DEFAULT_SESSION_CACHE_CAPACITY: u64 = 10_000;
/// Default idle time (seconds) after which a chat session is evicted.
/// Default: 24 hours.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 86_400;

/// Build the layered configuration shared by all crates of the bot.
///
/// Sources, later ones override earlier ones:
/// `config/default`, `config/{RUN_MODE}`, `config/local`, `APP__*` env vars,
/// then plain env vars.
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE env vars map onto snake_case keys
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// File browser settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BrowserSettings {
    /// OAuth client ID of the Google Cloud application
    pub google_client_id: Option<String>,
    /// OAuth client secret of the Google Cloud application
    pub google_client_secret: Option<String>,
    /// Long-lived refresh token authorizing Drive access
    pub google_refresh_token: Option<String>,

    /// Directory downloaded files are written to before being sent
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Number of files per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum number of chats kept in the session store
    #[serde(default = "default_session_cache_capacity")]
    pub session_cache_capacity: u64,

    /// Seconds of inactivity after which a chat session is dropped
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STAGING_DIR)
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

const fn default_session_cache_capacity() -> u64 {
    DEFAULT_SESSION_CACHE_CAPACITY
}

const fn default_session_idle_secs() -> u64 {
    DEFAULT_SESSION_IDLE_SECS
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            google_client_id: None,
            google_client_secret: None,
            google_refresh_token: None,
            staging_dir: default_staging_dir(),
            page_size: DEFAULT_PAGE_SIZE,
            session_cache_capacity: DEFAULT_SESSION_CACHE_CAPACITY,
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
        }
    }
}

impl BrowserSettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use drive_browser_core::config::BrowserSettings;
    ///
    /// let settings = BrowserSettings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or `page_size` is zero.
    pub fn new() -> Result<Self, ConfigError> {
        let mut settings: Self = build_config()?.try_deserialize()?;

        // Fallback for credentials the automatic mapping did not pick up
        for (slot, var) in [
            (&mut settings.google_client_id, "GOOGLE_CLIENT_ID"),
            (&mut settings.google_client_secret, "GOOGLE_CLIENT_SECRET"),
            (&mut settings.google_refresh_token, "GOOGLE_REFRESH_TOKEN"),
        ] {
            if slot.is_none() {
                if let Ok(val) = std::env::var(var) {
                    if !val.is_empty() {
                        *slot = Some(val);
                    }
                }
            }
        }

        settings.page_size()?;
        Ok(settings)
    }

    /// Validated page size
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configured page size is zero.
    pub fn page_size(&self) -> Result<PageSize, ConfigError> {
        PageSize::new(self.page_size)
            .ok_or_else(|| ConfigError::Message("page_size must be greater than zero".into()))
    }

    /// Idle expiry for chat sessions
    #[must_use]
    pub const fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}
