use std::fmt;
use std::sync::Mutex;

/// What the results panel is currently showing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelContent {
  Status(String),
  Success { title: String, lines: Vec<String> },
  Failure { title: String, reason: String, hint: Option<String> },
  Demo { title: String, lines: Vec<String> },
}

impl PanelContent {
  pub fn status(text: impl Into<String>) -> Self {
    PanelContent::Status(text.into())
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, PanelContent::Failure { .. })
  }

  pub fn text(&self) -> String {
    self.to_string()
  }
}

impl fmt::Display for PanelContent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PanelContent::Status(text) => write!(f, "{text}"),
      PanelContent::Success { title, lines } | PanelContent::Demo { title, lines } => {
        write!(f, "{title}")?;
        for line in lines {
          write!(f, "\n{line}")?;
        }
        Ok(())
      }
      PanelContent::Failure { title, reason, hint } => {
        write!(f, "{title}\nError: {reason}")?;
        if let Some(hint) = hint {
          write!(f, "\n{hint}")?;
        }
        Ok(())
      }
    }
  }
}

/// The single region every action writes its outcome to.
pub trait ResultsPanel: Send + Sync {
  fn render(&self, content: PanelContent);
}

/// Prints each rendering to stdout.
#[derive(Default)]
pub struct TerminalPanel;

impl ResultsPanel for TerminalPanel {
  fn render(&self, content: PanelContent) {
    match &content {
      PanelContent::Status(text) => println!("... {text}"),
      PanelContent::Failure { .. } => println!("\n[!] {content}\n"),
      _ => println!("\n{content}\n"),
    }
  }
}

/// Keeps every rendering; the last one is what a user would see.
#[derive(Default)]
pub struct MemoryPanel {
  renders: Mutex<Vec<PanelContent>>,
}

impl MemoryPanel {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn current(&self) -> Option<PanelContent> {
    self.renders.lock().ok().and_then(|r| r.last().cloned())
  }

  pub fn history(&self) -> Vec<PanelContent> {
    self.renders.lock().map(|r| r.clone()).unwrap_or_default()
  }

  pub fn current_text(&self) -> String {
    self.current().map(|c| c.text()).unwrap_or_default()
  }
}

impl ResultsPanel for MemoryPanel {
  fn render(&self, content: PanelContent) {
    if let Ok(mut renders) = self.renders.lock() {
      renders.push(content);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failure_text_includes_reason_and_hint() {
    let content = PanelContent::Failure {
      title: "Query Failed".to_string(),
      reason: "connection refused".to_string(),
      hint: Some("The backend server might be unavailable.".to_string()),
    };
    assert_eq!(
      content.text(),
      "Query Failed\nError: connection refused\nThe backend server might be unavailable."
    );
    assert!(content.is_failure());
  }

  #[test]
  fn memory_panel_tracks_last_render() {
    let panel = MemoryPanel::new();
    assert!(panel.current().is_none());
    assert_eq!(panel.current_text(), "");

    panel.render(PanelContent::status("Uploading 1 file(s)..."));
    panel.render(PanelContent::Success {
      title: "Upload Successful".to_string(),
      lines: vec!["ok".to_string()],
    });

    assert_eq!(panel.history().len(), 2);
    assert_eq!(panel.current_text(), "Upload Successful\nok");
  }
}
