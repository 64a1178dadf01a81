use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

/// Where the client believes it is deployed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
  Local,
  Vercel,
  GithubPages,
  Render,
  ReplitFallback,
}

impl Environment {
  /// Hostname matching only ever yields `Local`, `Vercel` or `GithubPages`.
  /// `Render` and `ReplitFallback` come from tagged discovery candidates.
  pub fn detect(hostname: &str) -> Self {
    let host = hostname.trim().to_ascii_lowercase();
    if host.contains("vercel.app") {
      Environment::Vercel
    } else if host.contains("github.io") {
      Environment::GithubPages
    } else {
      Environment::Local
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Environment::Local => "local",
      Environment::Vercel => "vercel",
      Environment::GithubPages => "github-pages",
      Environment::Render => "render",
      Environment::ReplitFallback => "replit-fallback",
    }
  }

  /// Extra line shown under every failed action.
  pub fn availability_hint(&self) -> &'static str {
    match self {
      Environment::Render => {
        "The backend runs on a free tier and may take up to a minute to wake up. Try again shortly."
      }
      _ => "The backend server might be unavailable.",
    }
  }
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
  pub environment: Environment,
  /// Empty means same-origin.
  pub api_base: String,
}

pub fn resolve(config: &ClientConfig) -> Resolution {
  resolve_host(
    &config.hostname,
    &config.local_backend,
    &config.github_pages_backend,
  )
}

pub fn resolve_host(hostname: &str, local_backend: &str, github_pages_backend: &str) -> Resolution {
  let environment = Environment::detect(hostname);
  let api_base = match environment {
    Environment::Vercel => String::new(),
    Environment::GithubPages => github_pages_backend.to_string(),
    _ => local_backend.to_string(),
  };
  Resolution {
    environment,
    api_base,
  }
}

/// An entry in the ordered discovery list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CandidateBackend {
  pub environment: Environment,
  pub url: String,
}

pub fn default_candidates() -> Vec<CandidateBackend> {
  vec![
    CandidateBackend {
      environment: Environment::Render,
      url: "https://rag-backend.onrender.com".to_string(),
    },
    CandidateBackend {
      environment: Environment::Local,
      url: crate::config::DEFAULT_LOCAL_BACKEND.to_string(),
    },
  ]
}
