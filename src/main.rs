use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use ragdesk::config::{default_config_path, load_or_init, ClientConfig};
use ragdesk::controller::{AssumeYes, Confirmer, FormController, Outcome};
use ragdesk::environment::{self, Environment};
use ragdesk::logger;
use ragdesk::panel::{ResultsPanel, TerminalPanel};
use ragdesk::probe::{discover, probe_backend, Availability};
use ragdesk::session::{run_session, HELP};
use ragdesk::transport::{HttpTransport, Transport};

#[derive(Parser)]
#[command(name = "ragdesk")]
#[command(about = "Upload PDFs to the RAG backend and ask questions about them")]
#[command(version)]
struct Cli {
  /// Configuration file path
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Hostname the client is served from (drives backend selection)
  #[arg(long)]
  host: Option<String>,

  /// Use this backend base URL instead of resolving one
  #[arg(long)]
  base_url: Option<String>,

  /// Skip the availability probe and always talk to the backend
  #[arg(long)]
  no_probe: bool,

  /// Verbosity level
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the detected environment and backend URL
  Resolve,

  /// Check whether the backend answers
  Probe,

  /// Try the configured candidate backends in order
  Discover,

  /// Upload PDF files
  Upload {
    #[arg(required = true)]
    files: Vec<PathBuf>,
  },

  /// Ask a question about the uploaded documents
  Query { text: Vec<String> },

  /// Delete every uploaded document
  Clear {
    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
  },

  /// Interactive session
  Session {
    /// Pick the backend from the candidate list instead of the hostname
    #[arg(long)]
    discover: bool,
  },

  /// Print the effective configuration
  Config,
}

struct DialogConfirmer;

impl Confirmer for DialogConfirmer {
  fn confirm(&self, prompt: &str) -> bool {
    dialoguer::Confirm::new()
      .with_prompt(prompt)
      .default(false)
      .interact()
      .unwrap_or(false)
  }
}

struct Backend {
  environment: Environment,
  api_base: String,
  transport: Arc<HttpTransport>,
}

fn backend_for(config: &ClientConfig, base_url: Option<&str>) -> Backend {
  let resolution = environment::resolve(config);
  let api_base = base_url
    .map(str::to_string)
    .unwrap_or(resolution.api_base);
  let transport = Arc::new(HttpTransport::new(api_base.clone(), config.page_origin()));
  Backend {
    environment: resolution.environment,
    api_base,
    transport,
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
    Ok(rt) => rt,
    Err(err) => {
      eprintln!("error: {err}");
      return ExitCode::FAILURE;
    }
  };
  match runtime.block_on(run(cli)) {
    Ok(code) => code,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
  let config_path = cli.config.clone().unwrap_or_else(default_config_path);
  let mut config = load_or_init(&config_path)
    .with_context(|| format!("loading config from {}", config_path.display()))?;
  if let Some(host) = cli.host.clone() {
    config.hostname = host;
  }
  if cli.no_probe {
    config.availability_check = false;
  }

  logger::init(&config.log_level, cli.verbose, config.log_path.as_deref())?;
  info!(config = %config_path.display(), host = %config.hostname, "ragdesk starting");

  let panel: Arc<dyn ResultsPanel> = Arc::new(TerminalPanel);

  match cli.command {
    Commands::Config => {
      println!("{}", serde_json::to_string_pretty(&config)?);
      Ok(ExitCode::SUCCESS)
    }
    Commands::Resolve => {
      let backend = backend_for(&config, cli.base_url.as_deref());
      println!("environment: {}", backend.environment);
      println!("api base:    {:?}", backend.api_base);
      println!("requests go: {}", backend.transport.describe());
      Ok(ExitCode::SUCCESS)
    }
    Commands::Probe => {
      let backend = backend_for(&config, cli.base_url.as_deref());
      let availability = probe_backend(backend.transport.as_ref(), config.probe_timeout()).await;
      println!("{}: {}", backend.transport.describe(), availability.as_str());
      Ok(exit_for(availability.is_available()))
    }
    Commands::Discover => {
      let origin = config.page_origin();
      let found = discover(&config.candidates, config.probe_timeout(), |c| {
        HttpTransport::new(c.url.clone(), origin.clone())
      })
      .await;
      match found {
        Some(candidate) => {
          println!("{}: {}", candidate.environment, candidate.url);
          Ok(ExitCode::SUCCESS)
        }
        None => {
          println!("no candidate backend responded");
          Ok(ExitCode::FAILURE)
        }
      }
    }
    Commands::Upload { files } => {
      let controller = start_controller(&config, cli.base_url.as_deref(), panel).await;
      Ok(exit_for_outcome(controller.upload_paths(&files).await))
    }
    Commands::Query { text } => {
      let controller = start_controller(&config, cli.base_url.as_deref(), panel).await;
      Ok(exit_for_outcome(controller.submit_query(&text.join(" ")).await))
    }
    Commands::Clear { yes } => {
      let controller = start_controller(&config, cli.base_url.as_deref(), panel).await;
      let outcome = if yes {
        controller.clear_database(&AssumeYes).await
      } else {
        controller.clear_database(&DialogConfirmer).await
      };
      Ok(exit_for_outcome(outcome))
    }
    Commands::Session { discover: use_discovery } => {
      let (controller, backend) = if use_discovery {
        session_from_discovery(&config, cli.base_url.as_deref(), panel.clone()).await
      } else {
        let backend = backend_for(&config, cli.base_url.as_deref());
        let description = backend.transport.describe();
        (build_controller(&config, backend, panel.clone()).await, description)
      };

      println!("{HELP}");
      let stdin = tokio::io::BufReader::new(tokio::io::stdin());
      let failures = run_session(&controller, panel.as_ref(), &DialogConfirmer, &backend, stdin).await?;
      Ok(exit_for(failures == 0))
    }
  }
}

async fn start_controller(
  config: &ClientConfig,
  base_url: Option<&str>,
  panel: Arc<dyn ResultsPanel>,
) -> FormController {
  build_controller(config, backend_for(config, base_url), panel).await
}

/// Builds the controller and runs the one-time probe when gating is on.
async fn build_controller(
  config: &ClientConfig,
  backend: Backend,
  panel: Arc<dyn ResultsPanel>,
) -> FormController {
  info!(environment = %backend.environment, backend = %backend.transport.describe(), "backend resolved");
  let controller = FormController::new(backend.transport, panel, backend.environment)
    .with_demo_gate(config.availability_check)
    .with_probe_timeout(config.probe_timeout());
  if config.availability_check {
    controller.check_backend().await;
  }
  controller
}

/// Picks the session backend from the candidate list. When nothing answers,
/// falls back to `--base-url` or hostname resolution like any other command.
async fn session_from_discovery(
  config: &ClientConfig,
  base_url: Option<&str>,
  panel: Arc<dyn ResultsPanel>,
) -> (FormController, String) {
  let origin = config.page_origin();
  let found = discover(&config.candidates, config.probe_timeout(), |c| {
    HttpTransport::new(c.url.clone(), origin.clone())
  })
  .await;

  match found {
    Some(candidate) => {
      let transport = Arc::new(HttpTransport::new(candidate.url.clone(), origin));
      let controller = FormController::new(transport, panel, candidate.environment)
        .with_demo_gate(config.availability_check)
        .with_probe_timeout(config.probe_timeout());
      controller.set_availability(Availability::Available).await;
      (controller, candidate.url)
    }
    None => {
      let backend = backend_for(config, base_url);
      let description = backend.transport.describe();
      (build_controller(config, backend, panel).await, description)
    }
  }
}

fn exit_for(ok: bool) -> ExitCode {
  if ok {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  }
}

fn exit_for_outcome(outcome: Outcome) -> ExitCode {
  exit_for(!outcome.is_failure())
}
