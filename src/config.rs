// Configuration - `lcu-monitor.toml`, every section optional

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{BackoffPolicy, CacheSettings};
use crate::lcu::locator::DEFAULT_PROCESS_NAME;
use crate::lcu::GatewaySettings;

pub const CONFIG_PATH: &str = "lcu-monitor.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub client: ClientConfig,
  pub polling: PollingConfig,
  pub mock: MockConfig,
  pub logging: LoggingConfig,
}

/// How to find and talk to the League client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  pub process_name: String,
  /// Install directories searched for a lockfile when the process list has nothing.
  pub install_dirs: Vec<PathBuf>,
  pub request_timeout_secs: u64,
  pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      process_name: DEFAULT_PROCESS_NAME.to_string(),
      install_dirs: Vec::new(),
      request_timeout_secs: 5,
      connect_timeout_secs: 2,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
  pub interval_secs: f64,
  pub min_refresh_interval_secs: f64,
  pub backoff_max_secs: f64,
  pub listener_timeout_ms: u64,
}

impl Default for PollingConfig {
  fn default() -> Self {
    Self {
      interval_secs: 3.0,
      min_refresh_interval_secs: 2.0,
      backoff_max_secs: 30.0,
      listener_timeout_ms: 1000,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
  /// Serve synthetic data locally instead of reading a real client.
  pub enabled: bool,
  pub port: u16,
}

impl Default for MockConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      port: 2999,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Filter directive, overridden by `RUST_LOG`.
  pub level: String,
  pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      file: None,
    }
  }
}

impl AppConfig {
  /// Load config from `path`. A missing file yields the defaults.
  pub fn load(path: &Path) -> Result<Self> {
    if !path.exists() {
      return Ok(Self::default());
    }
    let contents = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Self = toml::from_str(&contents)
      .with_context(|| format!("failed to parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    let polling = &self.polling;
    match Duration::try_from_secs_f64(polling.interval_secs) {
      Ok(interval) if !interval.is_zero() => {}
      _ => bail!("polling.interval_secs must be positive, got {}", polling.interval_secs),
    }
    for (name, value) in [
      ("polling.min_refresh_interval_secs", polling.min_refresh_interval_secs),
      ("polling.backoff_max_secs", polling.backoff_max_secs),
    ] {
      if Duration::try_from_secs_f64(value).is_err() {
        bail!("{} must be a non-negative number of seconds, got {}", name, value);
      }
    }
    if self.client.process_name.trim().is_empty() {
      bail!("client.process_name must not be empty");
    }
    Ok(())
  }

  pub fn poll_interval(&self) -> Duration {
    seconds(self.polling.interval_secs)
  }

  pub fn cache_settings(&self) -> CacheSettings {
    CacheSettings {
      min_refresh_interval: seconds(self.polling.min_refresh_interval_secs),
      backoff: BackoffPolicy::new(seconds(self.polling.backoff_max_secs)),
      listener_timeout: Duration::from_millis(self.polling.listener_timeout_ms),
    }
  }

  pub fn gateway_settings(&self) -> GatewaySettings {
    GatewaySettings {
      request_timeout: Duration::from_secs(self.client.request_timeout_secs),
      connect_timeout: Duration::from_secs(self.client.connect_timeout_secs),
    }
  }
}

// Out-of-range values are rejected by `validate`; saturate instead of panicking.
fn seconds(value: f64) -> Duration {
  Duration::try_from_secs_f64(value).unwrap_or(if value > 0.0 { Duration::MAX } else { Duration::ZERO })
}
