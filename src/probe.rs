use std::time::Duration;

use tracing::{info, warn};

use crate::environment::CandidateBackend;
use crate::error::ClientError;
use crate::transport::{ApiRequest, RequestBody, Transport};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Availability {
  /// Probe not run yet, or not run at all. Treated as unavailable.
  #[default]
  Unknown,
  Available,
  Unavailable,
}

impl Availability {
  pub fn is_available(self) -> bool {
    self == Availability::Available
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Availability::Unknown => "unknown",
      Availability::Available => "available",
      Availability::Unavailable => "unavailable",
    }
  }
}

fn probe_request() -> ApiRequest {
  ApiRequest::post("/query", RequestBody::Json(serde_json::json!({ "query": "test" })))
}

/// One `POST /query` with a throwaway payload. Never retried.
pub async fn probe_backend(transport: &dyn Transport, timeout: Duration) -> Availability {
  let result = match tokio::time::timeout(timeout, transport.send(probe_request())).await {
    Ok(res) => res.and_then(|r| r.error_for_status()),
    Err(_) => Err(ClientError::Timeout(timeout.as_millis() as u64)),
  };

  match result {
    Ok(_) => {
      info!(backend = %transport.describe(), "Backend is available");
      Availability::Available
    }
    Err(err) => {
      warn!(backend = %transport.describe(), "Backend check failed: {err}");
      Availability::Unavailable
    }
  }
}

/// Probes each candidate in order and returns the first that answers.
pub async fn discover<F, T>(
  candidates: &[CandidateBackend],
  timeout: Duration,
  connect: F,
) -> Option<CandidateBackend>
where
  F: Fn(&CandidateBackend) -> T,
  T: Transport,
{
  for candidate in candidates {
    let transport = connect(candidate);
    if probe_backend(&transport, timeout).await.is_available() {
      info!(environment = %candidate.environment, url = %candidate.url, "using discovered backend");
      return Some(candidate.clone());
    }
  }
  warn!("no candidate backend responded");
  None
}
