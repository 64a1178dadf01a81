use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::environment::{default_candidates, CandidateBackend};

pub const DEFAULT_LOCAL_BACKEND: &str = "http://localhost:8000";
pub const DEFAULT_GITHUB_PAGES_BACKEND: &str = "https://rag-iota-jade.vercel.app";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3000;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClientConfig {
  /// Hostname the client pretends to be served from.
  #[serde(default = "default_hostname")]
  pub hostname: String,
  #[serde(default = "default_page_scheme")]
  pub page_scheme: String,
  #[serde(default = "default_local_backend")]
  pub local_backend: String,
  #[serde(default = "default_github_pages_backend")]
  pub github_pages_backend: String,
  /// Probe once per session and fall back to demo mode when it fails.
  #[serde(default = "default_true")]
  pub availability_check: bool,
  #[serde(default = "default_probe_timeout_ms")]
  pub probe_timeout_ms: u64,
  #[serde(default = "default_candidates")]
  pub candidates: Vec<CandidateBackend>,
  #[serde(default)]
  pub log_path: Option<PathBuf>,
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

fn default_hostname() -> String {
  "localhost".to_string()
}

fn default_page_scheme() -> String {
  "https".to_string()
}

fn default_local_backend() -> String {
  DEFAULT_LOCAL_BACKEND.to_string()
}

fn default_github_pages_backend() -> String {
  DEFAULT_GITHUB_PAGES_BACKEND.to_string()
}

fn default_true() -> bool {
  true
}

fn default_probe_timeout_ms() -> u64 {
  DEFAULT_PROBE_TIMEOUT_MS
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      hostname: default_hostname(),
      page_scheme: default_page_scheme(),
      local_backend: default_local_backend(),
      github_pages_backend: default_github_pages_backend(),
      availability_check: true,
      probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
      candidates: default_candidates(),
      log_path: None,
      log_level: default_log_level(),
    }
  }
}

impl ClientConfig {
  /// Origin used for same-origin (empty base) requests.
  pub fn page_origin(&self) -> String {
    format!("{}://{}", self.page_scheme, self.hostname.trim())
  }

  pub fn probe_timeout(&self) -> Duration {
    Duration::from_millis(self.probe_timeout_ms)
  }
}

pub fn default_config_path() -> PathBuf {
  directories::ProjectDirs::from("", "", "ragdesk")
    .map(|dirs| dirs.config_dir().join("config.json"))
    .unwrap_or_else(|| PathBuf::from("config.json"))
}

pub fn load_or_init(path: &Path) -> anyhow::Result<ClientConfig> {
  if path.exists() {
    let data = std::fs::read_to_string(path)
      .with_context(|| format!("reading {}", path.display()))?;
    let config: ClientConfig = serde_json::from_str(&data)
      .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
  } else {
    let config = ClientConfig::default();
    save_config(path, &config)?;
    Ok(config)
  }
}

pub fn save_config(path: &Path, config: &ClientConfig) -> anyhow::Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)?;
  }
  let json = serde_json::to_string_pretty(config)?;
  std::fs::write(path, json)?;
  Ok(())
}
