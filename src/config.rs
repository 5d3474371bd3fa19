//! Runtime configuration loaded from a YAML file.
//!
//! Only `bark.token` is normally present in the file; every other key falls
//! back to the built-in defaults below.

use crate::alarm::tracker::{DEFAULT_SEED, DEFAULT_STEP};
use crate::error::ConfigError;
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str =
    "http://www.icbc.com.cn/ICBCDynamicSite/Charts/GoldTendencyPicture.aspx";
pub const DEFAULT_PRICE_SELECTOR: &str = "#TABLE1 > tbody > tr:nth-child(2) > td:nth-child(3)";
pub const DEFAULT_WEBHOOK_URL: &str = "http://api.xxxx.com/weixin";
pub const DEFAULT_BARK_URL: &str = "https://api.day.app";
pub const DEFAULT_BARK_TITLE: &str = "黄金价格";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub bark: BarkConfig,
    pub webhook: WebhookConfig,
    pub source: SourceConfig,
    pub alarm: AlarmConfig,
    pub schedule: ScheduleConfig,
    pub http: HttpConfig,
}

/// Bark push targets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BarkConfig {
    pub token: Vec<String>,
    pub url: String,
    pub title: String,
}

impl Default for BarkConfig {
    fn default() -> Self {
        Self {
            token: Vec::new(),
            url: DEFAULT_BARK_URL.to_string(),
            title: DEFAULT_BARK_TITLE.to_string(),
        }
    }
}

/// Form-POST webhook. An empty `url` disables the channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEBHOOK_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    /// CSS selector of the table cell holding the price.
    pub selector: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            selector: DEFAULT_PRICE_SELECTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Initial reference value.
    pub seed: f64,
    pub step: f64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            step: DEFAULT_STEP,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Parses each top-level section on its own: a section with a bad value
    /// is logged and replaced by its defaults, the others are kept.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let root = match serde_yaml::from_str::<Value>(text)? {
            Value::Mapping(root) => root,
            Value::Null => return Ok(Self::default()),
            _ => {
                return Err(ConfigError::Invalid(
                    "top level must be a mapping".to_string(),
                ))
            }
        };

        Ok(Self {
            bark: section(&root, "bark"),
            webhook: section(&root, "webhook"),
            source: section(&root, "source"),
            alarm: section(&root, "alarm"),
            schedule: section(&root, "schedule"),
            http: section(&root, "http"),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Loads `path`, falling back to defaults when the file is missing or
    /// unreadable. Only invalid values are returned as errors.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let config = match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Read '{}' failed: {}", path.display(), e);
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.alarm.seed.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "alarm.seed must be finite, got {}",
                self.alarm.seed
            )));
        }
        if !self.alarm.step.is_finite() || self.alarm.step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "alarm.step must be positive, got {}",
                self.alarm.step
            )));
        }
        if self.schedule.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "schedule.interval_secs must be positive".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn section<T: DeserializeOwned + Default>(root: &Mapping, key: &str) -> T {
    match root.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_yaml::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Ignoring invalid '{}' section, using defaults: {}", key, e);
            T::default()
        }),
    }
}
