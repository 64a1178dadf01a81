//! Interactive loop: one controller, many actions, one probe.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::controller::{Confirmer, FormController, Outcome};
use crate::panel::{PanelContent, ResultsPanel};

pub const HELP: &str = "commands:
  upload <file.pdf> [more.pdf ...]   upload PDFs
  query <question>                   ask about the uploaded documents
  clear                              delete every uploaded document
  status                             show backend and availability
  help                               show this text
  quit                               leave the session";

#[derive(Debug, PartialEq, Eq)]
pub enum SessionCommand {
  Upload(Vec<PathBuf>),
  Query(String),
  Clear,
  Status,
  Help,
  Quit,
  Unknown(String),
}

pub fn parse_line(line: &str) -> Option<SessionCommand> {
  let line = line.trim();
  if line.is_empty() {
    return None;
  }
  let (word, rest) = match line.split_once(char::is_whitespace) {
    Some((word, rest)) => (word, rest.trim()),
    None => (line, ""),
  };
  let command = match word.to_ascii_lowercase().as_str() {
    "upload" => SessionCommand::Upload(rest.split_whitespace().map(PathBuf::from).collect()),
    "query" | "ask" => SessionCommand::Query(rest.to_string()),
    "clear" => SessionCommand::Clear,
    "status" => SessionCommand::Status,
    "help" | "?" => SessionCommand::Help,
    "quit" | "exit" => SessionCommand::Quit,
    other => SessionCommand::Unknown(other.to_string()),
  };
  Some(command)
}

/// Runs until `quit` or end of input. Returns the number of failed actions.
pub async fn run_session<R>(
  controller: &FormController,
  panel: &dyn ResultsPanel,
  confirmer: &dyn Confirmer,
  backend: &str,
  input: R,
) -> anyhow::Result<usize>
where
  R: AsyncBufRead + Unpin,
{
  let mut lines = input.lines();
  let mut failures = 0;

  while let Some(line) = lines.next_line().await? {
    let Some(command) = parse_line(&line) else {
      continue;
    };
    debug!(?command, "session command");

    let outcome = match command {
      SessionCommand::Upload(paths) => controller.upload_paths(&paths).await,
      SessionCommand::Query(text) => controller.submit_query(&text).await,
      SessionCommand::Clear => controller.clear_database(confirmer).await,
      SessionCommand::Status => {
        panel.render(PanelContent::Success {
          title: "Status".to_string(),
          lines: vec![
            format!("environment: {}", controller.environment()),
            format!("backend: {backend}"),
            format!("availability: {}", controller.availability().await.as_str()),
          ],
        });
        continue;
      }
      SessionCommand::Help => {
        panel.render(PanelContent::status(HELP));
        continue;
      }
      SessionCommand::Quit => break,
      SessionCommand::Unknown(word) => {
        panel.render(PanelContent::status(format!("unknown command `{word}`, try `help`")));
        continue;
      }
    };

    if outcome == Outcome::Failed {
      failures += 1;
    }
  }

  Ok(failures)
}
