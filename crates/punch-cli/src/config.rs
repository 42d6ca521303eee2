//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use punch_core::AggregateOptions;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Worker all commands act as unless `--worker` overrides it.
    pub worker: String,

    /// Arrivals up to this many minutes after the scheduled entry count as
    /// on time.
    pub on_time_tolerance_minutes: i64,

    /// Whether early arrivals count toward the on-time rate.
    pub early_counts_as_on_time: bool,

    /// Daily overtime threshold in minutes. When unset, the worker's
    /// scheduled net day is used.
    pub overtime_threshold_minutes: Option<i64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("worker", &self.worker)
            .field("on_time_tolerance_minutes", &self.on_time_tolerance_minutes)
            .field("early_counts_as_on_time", &self.early_counts_as_on_time)
            .field(
                "overtime_threshold_minutes",
                &self.overtime_threshold_minutes,
            )
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("punch.db"),
            worker: default_worker(),
            on_time_tolerance_minutes: 15,
            early_counts_as_on_time: true,
            overtime_threshold_minutes: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PUNCH_*)
        figment = figment.merge(Env::prefixed("PUNCH_"));

        figment.extract()
    }

    /// Builds aggregation options from the configured knobs.
    #[must_use]
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            on_time_tolerance_seconds: self.on_time_tolerance_minutes * 60,
            early_counts_as_on_time: self.early_counts_as_on_time,
            overtime_threshold_seconds: self.overtime_threshold_minutes.map(|m| m * 60),
        }
    }
}

fn default_worker() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "default".to_string())
}

/// Returns the platform-specific config directory for punch.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("punch"))
}

/// Returns the platform-specific data directory for punch.
///
/// On Linux: `~/.local/share/punch`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("punch"))
}
