//! Network seam between the controller and the backend.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;
use crate::models::{UploadFile, UPLOAD_FIELD};

#[derive(Clone, Debug)]
pub enum RequestBody {
  Empty,
  Json(serde_json::Value),
  Multipart(Vec<UploadFile>),
}

#[derive(Clone, Debug)]
pub struct ApiRequest {
  pub method: Method,
  pub path: &'static str,
  pub body: RequestBody,
}

impl ApiRequest {
  pub fn post(path: &'static str, body: RequestBody) -> Self {
    Self {
      method: Method::POST,
      path,
      body,
    }
  }
}

#[derive(Clone, Debug)]
pub struct ApiResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

impl ApiResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
    Ok(serde_json::from_slice(&self.body)?)
  }

  /// Non-2xx becomes `ClientError::Http`.
  pub fn error_for_status(self) -> Result<Self, ClientError> {
    if self.is_success() {
      Ok(self)
    } else {
      Err(ClientError::Http {
        status: self.status,
      })
    }
  }
}

#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;

  /// Base the paths are joined onto, for diagnostics.
  fn describe(&self) -> String;
}

pub struct HttpTransport {
  client: reqwest::Client,
  api_base: String,
  origin: String,
}

impl HttpTransport {
  /// `origin` is only used when `api_base` is empty.
  pub fn new(api_base: impl Into<String>, origin: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      api_base: api_base.into(),
      origin: origin.into(),
    }
  }

  pub fn url(&self, path: &str) -> String {
    let base = if self.api_base.is_empty() {
      &self.origin
    } else {
      &self.api_base
    };
    format!("{}{}", base.trim_end_matches('/'), path)
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
    let url = self.url(request.path);
    debug!(method = %request.method, %url, "sending request");

    let mut builder = self.client.request(request.method, &url);
    builder = match request.body {
      RequestBody::Empty => builder,
      RequestBody::Json(value) => builder.json(&value),
      RequestBody::Multipart(files) => {
        let mut form = Form::new();
        for file in files {
          let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str("application/pdf")?;
          form = form.part(UPLOAD_FIELD, part);
        }
        builder.multipart(form)
      }
    };

    let resp = builder.send().await?;
    let status = resp.status().as_u16();
    let body = resp.bytes().await?.to_vec();
    debug!(%url, status, bytes = body.len(), "response received");
    Ok(ApiResponse { status, body })
  }

  fn describe(&self) -> String {
    if self.api_base.is_empty() {
      format!("{} (same-origin)", self.origin)
    } else {
      self.api_base.clone()
    }
  }
}
