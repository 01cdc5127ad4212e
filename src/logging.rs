// Logging setup - compact stderr output plus an optional plain log file

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` wins over `config.level`.
pub fn init(config: &LoggingConfig) -> Result<()> {
  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(&config.level)
      .with_context(|| format!("invalid log filter {:?}", config.level))?,
  };

  let file_layer = match &config.file {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
      Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
    }
    None => None,
  };

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().compact().with_writer(std::io::stderr))
    .with(file_layer)
    .try_init()
    .context("logging already initialized")?;
  Ok(())
}

/// Keep the first and last two characters of a secret for log output.
pub fn redact(secret: &str) -> String {
  let chars: Vec<char> = secret.chars().collect();
  if chars.len() <= 6 {
    return "***".to_string();
  }
  let head: String = chars[..2].iter().collect();
  let tail: String = chars[chars.len() - 2..].iter().collect();
  format!("{}***{}", head, tail)
}
