use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Logs go to stderr, or are appended to
/// `log_path` when one is configured, so stdout only carries panel output.
pub fn init(level: &str, verbose: u8, log_path: Option<&Path>) -> anyhow::Result<()> {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(effective_level(level, verbose)));

  let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

  match log_path {
    Some(path) => {
      let file = OpenOptions::new().create(true).append(true).open(path)?;
      builder
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!(e))
    }
    None => builder
      .with_writer(std::io::stderr)
      .try_init()
      .map_err(|e| anyhow!(e)),
  }
}

/// Each `-v` raises the configured level by one step.
pub fn effective_level(level: &str, verbose: u8) -> &'static str {
  const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
  let base = LEVELS
    .iter()
    .position(|l| l.eq_ignore_ascii_case(level.trim()))
    .unwrap_or(2);
  LEVELS[(base + verbose as usize).min(LEVELS.len() - 1)]
}
