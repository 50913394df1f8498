//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use ts_core::UserId;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// User reports are generated for when `--actor` is not given.
    #[serde(default)]
    pub actor_id: Option<UserId>,
    /// Grouping used when `--sort` is not given.
    #[serde(default)]
    pub default_sort: Option<String>,
    /// Period token used when neither `--period` nor dates are given.
    #[serde(default)]
    pub default_period: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("timesheet.db"),
            actor_id: None,
            default_sort: None,
            default_period: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `config.toml` in the config directory,
    /// `path`, then `TIMESHEET_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("TIMESHEET_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("timesheet"))
}

/// Returns the platform-specific data directory.
///
/// On Linux: `~/.local/share/timesheet`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("timesheet"))
}
