//! In-memory network double for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

pub struct Reply {
  result: Result<ApiResponse, String>,
  delay: Option<Duration>,
}

impl Reply {
  pub fn json(status: u16, body: serde_json::Value) -> Self {
    Self {
      result: Ok(ApiResponse {
        status,
        body: body.to_string().into_bytes(),
      }),
      delay: None,
    }
  }

  pub fn raw(status: u16, body: &str) -> Self {
    Self {
      result: Ok(ApiResponse {
        status,
        body: body.as_bytes().to_vec(),
      }),
      delay: None,
    }
  }

  pub fn status(status: u16) -> Self {
    Self::raw(status, "")
  }

  pub fn network(message: &str) -> Self {
    Self {
      result: Err(message.to_string()),
      delay: None,
    }
  }

  pub fn delayed(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }
}

/// Answers with scripted replies in order and records every request.
pub struct FakeTransport {
  replies: Mutex<VecDeque<Reply>>,
  calls: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
  pub fn new(replies: Vec<Reply>) -> Self {
    Self {
      replies: Mutex::new(replies.into()),
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn calls(&self) -> Vec<ApiRequest> {
    self.calls.lock().map(|c| c.clone()).unwrap_or_default()
  }

  pub fn call_count(&self) -> usize {
    self.calls().len()
  }
}

#[async_trait]
impl Transport for FakeTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
    if let Ok(mut calls) = self.calls.lock() {
      calls.push(request);
    }
    let reply = self.replies.lock().ok().and_then(|mut r| r.pop_front());
    let Some(reply) = reply else {
      return Err(ClientError::Network("no scripted reply".to_string()));
    };
    if let Some(delay) = reply.delay {
      tokio::time::sleep(delay).await;
    }
    reply.result.map_err(ClientError::Network)
  }

  fn describe(&self) -> String {
    "fake".to_string()
  }
}
