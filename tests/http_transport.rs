use std::sync::Arc;
use std::time::Duration;

use ragdesk::controller::{AssumeYes, FormController, Outcome};
use ragdesk::environment::{CandidateBackend, Environment};
use ragdesk::models::UploadFile;
use ragdesk::panel::MemoryPanel;
use ragdesk::probe::{discover, probe_backend, Availability};
use ragdesk::transport::HttpTransport;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn controller_for(api_base: &str) -> (FormController, Arc<MemoryPanel>) {
  let transport = Arc::new(HttpTransport::new(api_base, "https://unused.example"));
  let panel = Arc::new(MemoryPanel::new());
  let controller = FormController::new(transport, panel.clone(), Environment::Local);
  (controller, panel)
}

fn pdf(name: &str) -> UploadFile {
  UploadFile {
    file_name: name.to_string(),
    bytes: b"%PDF-1.4\n%fake".to_vec(),
  }
}

fn dead_url() -> String {
  let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
  let port = listener.local_addr().unwrap().port();
  drop(listener);
  format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn upload_sends_every_file_under_pdfs_field() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/upload"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
    .expect(1)
    .mount(&server)
    .await;

  let (controller, panel) = controller_for(&server.uri());
  let outcome = controller.upload_files(vec![pdf("one.pdf"), pdf("two.pdf")]).await;

  assert_eq!(outcome, Outcome::Succeeded);
  assert!(panel.current_text().contains("ok"));

  let requests = server.received_requests().await.unwrap();
  let body = String::from_utf8_lossy(&requests[0].body);
  assert_eq!(body.matches("name=\"pdfs\"").count(), 2);
  assert!(body.contains("filename=\"one.pdf\""));
  assert!(body.contains("filename=\"two.pdf\""));
  assert!(body.contains("application/pdf"));
}

#[tokio::test]
async fn query_posts_json_body() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/query"))
    .and(header("content-type", "application/json"))
    .and(body_json(json!({"query": "what is RAG?"})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "Retrieval."})))
    .expect(1)
    .mount(&server)
    .await;

  let (controller, panel) = controller_for(&server.uri());
  assert_eq!(controller.submit_query("what is RAG?").await, Outcome::Succeeded);
  assert!(panel.current_text().contains("Retrieval."));
}

#[tokio::test]
async fn blank_query_never_reaches_server() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200))
    .expect(0)
    .mount(&server)
    .await;

  let (controller, panel) = controller_for(&server.uri());
  assert_eq!(controller.submit_query("  ").await, Outcome::Skipped);
  assert!(panel.current().is_none());
}

#[tokio::test]
async fn clear_reports_server_error() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/clear"))
    .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
    .expect(1)
    .mount(&server)
    .await;

  let (controller, panel) = controller_for(&server.uri());
  assert_eq!(controller.clear_database(&AssumeYes).await, Outcome::Failed);
  let text = panel.current_text();
  assert!(text.contains("Clear Failed"));
  assert!(text.contains("500"));
}

#[tokio::test]
async fn same_origin_requests_use_page_origin() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/clear"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "cleared"})))
    .expect(1)
    .mount(&server)
    .await;

  let transport = Arc::new(HttpTransport::new("", server.uri()));
  let panel = Arc::new(MemoryPanel::new());
  let controller = FormController::new(transport, panel.clone(), Environment::Vercel);

  assert_eq!(controller.clear_database(&AssumeYes).await, Outcome::Succeeded);
  assert!(panel.current_text().contains("cleared"));
}

#[tokio::test]
async fn network_failure_renders_error_panel() {
  let (controller, panel) = controller_for(&dead_url());

  assert_eq!(controller.submit_query("anyone there?").await, Outcome::Failed);
  let current = panel.current().unwrap();
  assert!(current.is_failure());
  assert!(!current.text().contains("No answer found."));
}

#[tokio::test]
async fn probe_times_out_on_slow_backend() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/query"))
    .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
    .mount(&server)
    .await;

  let transport = HttpTransport::new(server.uri(), "https://unused.example");
  let availability = probe_backend(&transport, Duration::from_millis(100)).await;
  assert_eq!(availability, Availability::Unavailable);
}

#[tokio::test]
async fn probe_sends_test_query() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/query"))
    .and(body_json(json!({"query": "test"})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "pong"})))
    .expect(1)
    .mount(&server)
    .await;

  let transport = HttpTransport::new(server.uri(), "https://unused.example");
  let availability = probe_backend(&transport, Duration::from_secs(3)).await;
  assert_eq!(availability, Availability::Available);
}

#[tokio::test]
async fn gated_controller_uses_demo_mode_when_backend_down() {
  let (controller, panel) = controller_for(&dead_url());
  let controller = controller.with_demo_gate(true).with_probe_timeout(Duration::from_secs(1));

  assert_eq!(controller.check_backend().await, Availability::Unavailable);
  assert_eq!(controller.upload_files(vec![pdf("a.pdf")]).await, Outcome::Demo);
  assert!(panel.current_text().contains("Demo Mode"));
}

#[tokio::test]
async fn discover_picks_first_live_candidate() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/query"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
    .mount(&server)
    .await;

  let candidates = vec![
    CandidateBackend {
      environment: Environment::Render,
      url: dead_url(),
    },
    CandidateBackend {
      environment: Environment::ReplitFallback,
      url: server.uri(),
    },
  ];

  let found = discover(&candidates, Duration::from_secs(1), |c| {
    HttpTransport::new(c.url.clone(), "https://unused.example")
  })
  .await
  .expect("live candidate");
  assert_eq!(found.environment, Environment::ReplitFallback);
}
