//! # sky-config
//!
//! Layered configuration loading for skyline using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SKYLINE_*` prefix, `__` as separator)
//! 2. Project-level `.skyline/config.toml`
//! 3. User-level `~/.config/skyline/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SKYLINE_SESSION__HANDLE` -> `session.handle`,
//! `SKYLINE_REFRESH__POLL_INTERVAL_MS` -> `refresh.poll_interval_ms`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use sky_config::SkyConfig;
//!
//! let config = SkyConfig::load_with_dotenv().expect("config");
//!
//! if config.session.is_configured() {
//!     println!("logging in to {} as {}", config.server.url, config.session.handle);
//! }
//! ```

mod error;
mod refresh;
mod server;
mod session;

pub use error::ConfigError;
pub use refresh::RefreshConfig;
pub use server::{DEFAULT_SERVER_URL, ServerConfig};
pub use session::SessionConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SkyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl SkyConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.refresh.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root before
    /// building the figment. This is the typical entry point for the CLI.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".skyline/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("SKYLINE_").split("__"))
    }

    /// The login credentials, or an error naming the missing section.
    pub fn require_session(&self) -> Result<&SessionConfig, ConfigError> {
        if self.session.is_configured() {
            Ok(&self.session)
        } else {
            Err(ConfigError::NotConfigured {
                section: "session".into(),
            })
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skyline").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or falls back to the
    /// current dir. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
