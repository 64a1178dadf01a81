//! Upload, query and clear actions wired to the backend.
//!
//! Every action follows the same path: guard, optional demo short-circuit,
//! "in progress" status, one request, then a success or failure rendering.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::DEFAULT_PROBE_TIMEOUT_MS;
use crate::environment::Environment;
use crate::error::ClientError;
use crate::models::{ClearResponse, QueryRequest, QueryResponse, UploadFile, UploadResponse};
use crate::panel::{PanelContent, ResultsPanel};
use crate::probe::{probe_backend, Availability};
use crate::transport::{ApiRequest, RequestBody, Transport};

pub const CLEAR_PROMPT: &str = "Are you sure you want to clear the database? This will delete all uploaded documents and cannot be undone.";

const DEMO_TITLE: &str = "Demo Mode";
const DEMO_INTRO: &str = "This session is running without a reachable backend.";

/// How an action ended. Everything user-facing has already been rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
  /// Guard rejected the input; nothing rendered, nothing sent.
  Skipped,
  /// User declined the confirmation.
  Cancelled,
  Demo,
  Succeeded,
  Failed,
}

impl Outcome {
  pub fn is_failure(self) -> bool {
    self == Outcome::Failed
  }
}

/// Blocking yes/no question put to the user before destructive actions.
pub trait Confirmer {
  fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmer for F
where
  F: Fn(&str) -> bool,
{
  fn confirm(&self, prompt: &str) -> bool {
    self(prompt)
  }
}

/// Answers yes without asking (`--yes`).
pub struct AssumeYes;

impl Confirmer for AssumeYes {
  fn confirm(&self, _prompt: &str) -> bool {
    true
  }
}

pub struct FormController {
  transport: Arc<dyn Transport>,
  panel: Arc<dyn ResultsPanel>,
  environment: Environment,
  demo_gate: bool,
  probe_timeout: Duration,
  availability: RwLock<Availability>,
}

impl FormController {
  pub fn new(
    transport: Arc<dyn Transport>,
    panel: Arc<dyn ResultsPanel>,
    environment: Environment,
  ) -> Self {
    Self {
      transport,
      panel,
      environment,
      demo_gate: false,
      probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
      availability: RwLock::new(Availability::Unknown),
    }
  }

  /// When enabled, upload and query render demo text unless the probe
  /// marked the backend available.
  pub fn with_demo_gate(mut self, enabled: bool) -> Self {
    self.demo_gate = enabled;
    self
  }

  pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
    self.probe_timeout = timeout;
    self
  }

  pub fn environment(&self) -> Environment {
    self.environment
  }

  pub async fn availability(&self) -> Availability {
    *self.availability.read().await
  }

  pub async fn set_availability(&self, availability: Availability) {
    *self.availability.write().await = availability;
  }

  /// Runs the availability probe and records its verdict.
  pub async fn check_backend(&self) -> Availability {
    let availability = probe_backend(self.transport.as_ref(), self.probe_timeout).await;
    self.set_availability(availability).await;
    availability
  }

  async fn in_demo_mode(&self) -> bool {
    self.demo_gate && !self.availability().await.is_available()
  }

  pub async fn upload_paths(&self, paths: &[PathBuf]) -> Outcome {
    if paths.is_empty() {
      return Outcome::Skipped;
    }
    // Demo mode never touches the files.
    if self.in_demo_mode().await {
      self.render_upload_demo(paths.len());
      return Outcome::Demo;
    }
    match read_upload_files(paths).await {
      Ok(files) => self.upload_files(files).await,
      Err(err) => {
        error!("Upload failed: {err}");
        // A local read error says nothing about the backend, so no hint.
        self.panel.render(PanelContent::Failure {
          title: "Upload Failed".to_string(),
          reason: err.to_string(),
          hint: None,
        });
        Outcome::Failed
      }
    }
  }

  pub async fn upload_files(&self, files: Vec<UploadFile>) -> Outcome {
    if files.is_empty() {
      return Outcome::Skipped;
    }
    let count = files.len();

    if self.in_demo_mode().await {
      self.render_upload_demo(count);
      return Outcome::Demo;
    }

    info!(count, "uploading files");
    self
      .execute(
        format!("Uploading {count} file(s)..."),
        ApiRequest::post("/upload", RequestBody::Multipart(files)),
        |res: UploadResponse| PanelContent::Success {
          title: "Upload Successful".to_string(),
          lines: vec![res.message_or_default()],
        },
        |err| self.failure("Upload Failed", err),
      )
      .await
  }

  fn render_upload_demo(&self, count: usize) {
    self.panel.render(PanelContent::Demo {
      title: DEMO_TITLE.to_string(),
      lines: vec![
        DEMO_INTRO.to_string(),
        "Full functionality requires the backend server which handles PDF processing.".to_string(),
        format!("File upload simulation complete for {count} file(s)."),
      ],
    });
  }

  pub async fn submit_query(&self, query: &str) -> Outcome {
    if query.trim().is_empty() {
      return Outcome::Skipped;
    }

    if self.in_demo_mode().await {
      self.panel.render(PanelContent::Demo {
        title: DEMO_TITLE.to_string(),
        lines: vec![
          DEMO_INTRO.to_string(),
          format!("Query: \"{query}\""),
          "In the full version, this would return relevant information from your uploaded PDFs using RAG technology.".to_string(),
          "Start the backend server and run again to use the complete functionality.".to_string(),
        ],
      });
      return Outcome::Demo;
    }

    let body = match serde_json::to_value(QueryRequest {
      query: query.to_string(),
    }) {
      Ok(body) => body,
      Err(err) => {
        let err = ClientError::from(err);
        self.panel.render(self.failure("Query Failed", &err));
        return Outcome::Failed;
      }
    };

    let asked = query.to_string();
    self
      .execute(
        "Processing query...".to_string(),
        ApiRequest::post("/query", RequestBody::Json(body)),
        move |res: QueryResponse| PanelContent::Success {
          title: "Query Results".to_string(),
          lines: vec![
            format!("Query: \"{asked}\""),
            res.answer_or_default(),
          ],
        },
        |err| self.failure("Query Failed", err),
      )
      .await
  }

  pub async fn clear_database(&self, confirmer: &dyn Confirmer) -> Outcome {
    if !confirmer.confirm(CLEAR_PROMPT) {
      info!("clear cancelled");
      return Outcome::Cancelled;
    }

    self
      .execute(
        "Clearing database...".to_string(),
        ApiRequest::post("/clear", RequestBody::Empty),
        |res: ClearResponse| PanelContent::Success {
          title: "Database Cleared".to_string(),
          lines: vec![res.message_or_default()],
        },
        |err| self.failure("Clear Failed", err),
      )
      .await
  }

  /// Renders `pending`, sends `request` and renders whichever of
  /// `on_success` / `on_failure` applies.
  async fn execute<R, S, F>(
    &self,
    pending: String,
    request: ApiRequest,
    on_success: S,
    on_failure: F,
  ) -> Outcome
  where
    R: DeserializeOwned,
    S: FnOnce(R) -> PanelContent,
    F: FnOnce(&ClientError) -> PanelContent,
  {
    let path = request.path;
    self.panel.render(PanelContent::Status(pending));

    let result = self
      .transport
      .send(request)
      .await
      .and_then(|resp| resp.error_for_status())
      .and_then(|resp| resp.json::<R>());

    match result {
      Ok(body) => {
        info!(path, "request succeeded");
        self.panel.render(on_success(body));
        Outcome::Succeeded
      }
      Err(err) => {
        error!(path, "request failed: {err}");
        self.panel.render(on_failure(&err));
        Outcome::Failed
      }
    }
  }

  fn failure(&self, title: &str, err: &ClientError) -> PanelContent {
    PanelContent::Failure {
      title: title.to_string(),
      reason: err.to_string(),
      hint: Some(self.environment.availability_hint().to_string()),
    }
  }
}

pub async fn read_upload_files(paths: &[PathBuf]) -> Result<Vec<UploadFile>, ClientError> {
  let mut files = Vec::with_capacity(paths.len());
  for path in paths {
    let bytes = tokio::fs::read(path).await.map_err(|err| ClientError::File {
      path: path.clone(),
      reason: err.to_string(),
    })?;
    files.push(UploadFile {
      file_name: file_name(path),
      bytes,
    });
  }
  Ok(files)
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "upload.pdf".to_string())
}
