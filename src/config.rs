use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::rate::PayPeriod;
use crate::runtime::{FRAME_INTERVAL_MS, FRAME_INTERVAL_RANGE};
use crate::session::SessionConfig;

/// User preferences. Session state (total, running, coins) is never saved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub salary: Option<String>,
    pub pay_period: PayPeriod,
    pub currency_symbol: String,
    pub animation: bool,
    pub sound: bool,
    pub frame_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            salary: None,
            pay_period: PayPeriod::Yearly,
            currency_symbol: "$".to_string(),
            animation: true,
            sound: true,
            frame_ms: FRAME_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Redraw cadence, with out-of-range values from the file pulled back in
    pub fn frame_interval(&self) -> Duration {
        let ms = self
            .frame_ms
            .clamp(*FRAME_INTERVAL_RANGE.start(), *FRAME_INTERVAL_RANGE.end());
        Duration::from_millis(ms)
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            salary: cfg.salary.clone().unwrap_or_default(),
            pay_period: cfg.pay_period,
            feedback_enabled: cfg.animation,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
