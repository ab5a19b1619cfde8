use crate::error::Result;
use crate::util::paths;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_BUFFER_SIZE: usize = 50;
pub const DEFAULT_BUFFER_TIMEOUT_SECS: u64 = 100;
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 100;
const DEFAULT_SEAT: &str = "seat0";

/// Runtime tunables for the capture daemon.
///
/// Values are layered: hard defaults, then the optional
/// `$XDG_CONFIG_HOME/typetrace/config.toml`, then `TYPETRACE_*` environment
/// overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Seat the libinput context binds to.
    pub seat: String,
    /// Keystrokes buffered before a size-triggered flush.
    pub buffer_size: usize,
    /// Longest a non-empty buffer may age before a time-triggered flush.
    pub buffer_timeout_secs: u64,
    /// Upper bound on one wait for input readiness.
    pub poll_timeout_ms: u64,
    /// Overrides the XDG-resolved database location when set.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seat: DEFAULT_SEAT.to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            buffer_timeout_secs: DEFAULT_BUFFER_TIMEOUT_SECS,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            database_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("seat", DEFAULT_SEAT)?
            .set_default("buffer_size", DEFAULT_BUFFER_SIZE as i64)?
            .set_default("buffer_timeout_secs", DEFAULT_BUFFER_TIMEOUT_SECS as i64)?
            .set_default("poll_timeout_ms", DEFAULT_POLL_TIMEOUT_MS as i64)?;

        if let Some(config_path) = paths::config_file_path() {
            if config_path.exists() {
                builder = builder.add_source(File::from(config_path));
            }
        }

        builder = builder.add_source(Environment::with_prefix("TYPETRACE"));

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        Ok(app_config)
    }
}
