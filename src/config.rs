//! Shell configuration.
//!
//! Configuration for the directory client, the selection store backend, the
//! branch notifier and the shell's routing/locale defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_DIRECTORY_URL: &str = "ORG_SHELL_DIRECTORY_URL";
pub const ENV_DIRECTORY_TOKEN: &str = "ORG_SHELL_DIRECTORY_TOKEN";
pub const ENV_DIRECTORY_TIMEOUT_SECS: &str = "ORG_SHELL_DIRECTORY_TIMEOUT_SECS";
pub const ENV_STORE_PATH: &str = "ORG_SHELL_STORE_PATH";
pub const ENV_NOTIFIER_CAPACITY: &str = "ORG_SHELL_NOTIFIER_CAPACITY";
pub const ENV_LOGIN_PATH: &str = "ORG_SHELL_LOGIN_PATH";
pub const ENV_DEFAULT_LOCALE: &str = "ORG_SHELL_DEFAULT_LOCALE";

/// Top-level shell configuration.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Organization directory connection.
    pub directory: DirectoryConfig,

    /// Where the company/branch selection and theme flag are persisted.
    pub store: StoreConfig,

    /// Per-subscriber buffer of pending "branch changed" signals.
    ///
    /// Signals carry no payload, so a full buffer coalesces rather than
    /// losing information.
    pub notifier_capacity: usize,

    /// Where unauthenticated users are redirected.
    pub login_path: String,

    /// Landing route, also the target of the header logo.
    pub home_path: String,

    /// Locale used before the user toggles it.
    pub default_locale: String,

    /// Organization name shown in the footer.
    pub brand_name: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig::default(),
            store: StoreConfig::default(),
            notifier_capacity: 16,
            login_path: "/login".to_string(),
            home_path: "/dashboard".to_string(),
            default_locale: "vi".to_string(),
            brand_name: "Org Shell".to_string(),
        }
    }
}

impl ShellConfig {
    /// Build a configuration from the process environment.
    ///
    /// A `.env` file is loaded first if present. Unset variables keep their
    /// defaults; malformed numbers are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_DIRECTORY_URL) {
            config.directory.base_url = url;
        }
        if let Some(token) = lookup(ENV_DIRECTORY_TOKEN).filter(|t| !t.is_empty()) {
            config.directory.bearer_token = Some(token);
        }
        if let Some(raw) = lookup(ENV_DIRECTORY_TIMEOUT_SECS) {
            config.directory.timeout_secs = parse_positive(ENV_DIRECTORY_TIMEOUT_SECS, &raw)?;
        }
        if let Some(path) = lookup(ENV_STORE_PATH).filter(|p| !p.is_empty()) {
            config.store = StoreConfig::File {
                path: PathBuf::from(path),
            };
        }
        if let Some(raw) = lookup(ENV_NOTIFIER_CAPACITY) {
            config.notifier_capacity = parse_positive(ENV_NOTIFIER_CAPACITY, &raw)? as usize;
        }
        if let Some(path) = lookup(ENV_LOGIN_PATH) {
            config.login_path = path;
        }
        if let Some(locale) = lookup(ENV_DEFAULT_LOCALE) {
            config.default_locale = locale;
        }

        Ok(config)
    }

    /// Set the directory base URL.
    pub fn directory_url(mut self, url: impl Into<String>) -> Self {
        self.directory.base_url = url.into();
        self
    }

    /// Persist the selection in a JSON file.
    pub fn with_file_store(mut self, path: PathBuf) -> Self {
        self.store = StoreConfig::File { path };
        self
    }

    /// Set the per-subscriber notifier buffer.
    pub fn notifier_capacity(mut self, capacity: usize) -> Self {
        self.notifier_capacity = capacity.max(1);
        self
    }

    /// Set the default locale.
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Set the footer organization name.
    pub fn brand_name(mut self, name: impl Into<String>) -> Self {
        self.brand_name = name.into();
        self
    }
}

/// Directory client configuration.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Base URL; `/companies` and `/companies/{id}/branches` are resolved
    /// against it.
    pub base_url: String,

    /// Optional bearer token sent with every request.
    pub bearer_token: Option<String>,

    /// Request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            bearer_token: None,
            timeout_secs: 15,
        }
    }
}

impl DirectoryConfig {
    /// Get the request timeout as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Selection store backend.
#[derive(Debug, Clone, Default)]
pub enum StoreConfig {
    /// Process-local store, forgotten on exit.
    #[default]
    Memory,

    /// JSON object file, rewritten atomically on every write.
    File { path: PathBuf },
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
