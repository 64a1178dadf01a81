use serde::{Deserialize, Serialize};

pub const UPLOAD_FALLBACK: &str = "Upload complete.";
pub const ANSWER_FALLBACK: &str = "No answer found.";
pub const CLEAR_FALLBACK: &str = "Database cleared successfully.";

/// Multipart field every uploaded PDF is attached under.
pub const UPLOAD_FIELD: &str = "pdfs";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QueryRequest {
  pub query: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UploadResponse {
  #[serde(default)]
  pub message: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct QueryResponse {
  #[serde(default)]
  pub answer: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ClearResponse {
  #[serde(default)]
  pub message: Option<serde_json::Value>,
}

impl UploadResponse {
  pub fn message_or_default(&self) -> String {
    display_or(self.message.as_ref(), UPLOAD_FALLBACK)
  }
}

impl QueryResponse {
  pub fn answer_or_default(&self) -> String {
    display_or(self.answer.as_ref(), ANSWER_FALLBACK)
  }
}

impl ClearResponse {
  pub fn message_or_default(&self) -> String {
    display_or(self.message.as_ref(), CLEAR_FALLBACK)
  }
}

/// Falsy values (null, false, 0, "") fall back; strings are shown bare and
/// anything else as JSON.
fn display_or(value: Option<&serde_json::Value>, fallback: &str) -> String {
  use serde_json::Value;

  match value {
    None | Some(Value::Null) | Some(Value::Bool(false)) => fallback.to_string(),
    Some(Value::String(s)) if s.is_empty() => fallback.to_string(),
    Some(Value::String(s)) => s.clone(),
    Some(Value::Number(n)) if n.as_f64() == Some(0.0) => fallback.to_string(),
    Some(other) => other.to_string(),
  }
}

/// One selected PDF, already read into memory.
#[derive(Clone, Debug)]
pub struct UploadFile {
  pub file_name: String,
  pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_message_uses_fallback() {
    let res: UploadResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(res.message_or_default(), "Upload complete.");
  }

  #[test]
  fn empty_answer_uses_fallback() {
    let res: QueryResponse = serde_json::from_str(r#"{"answer": ""}"#).unwrap();
    assert_eq!(res.answer_or_default(), "No answer found.");
  }

  #[test]
  fn extra_fields_are_ignored() {
    let res: ClearResponse =
      serde_json::from_str(r#"{"message": "gone", "deleted": 12}"#).unwrap();
    assert_eq!(res.message_or_default(), "gone");
  }

  #[test]
  fn non_string_values_are_shown() {
    let res: QueryResponse = serde_json::from_str(r#"{"answer": 42}"#).unwrap();
    assert_eq!(res.answer_or_default(), "42");
    let res: UploadResponse = serde_json::from_str(r#"{"message": ["a", "b"]}"#).unwrap();
    assert_eq!(res.message_or_default(), r#"["a","b"]"#);
  }

  #[test]
  fn falsy_values_use_fallback() {
    for body in [r#"{"answer": null}"#, r#"{"answer": false}"#, r#"{"answer": 0}"#] {
      let res: QueryResponse = serde_json::from_str(body).unwrap();
      assert_eq!(res.answer_or_default(), "No answer found.", "body {body}");
    }
  }

  #[test]
  fn query_request_shape() {
    let body = serde_json::to_value(QueryRequest { query: "what?".to_string() }).unwrap();
    assert_eq!(body, serde_json::json!({ "query": "what?" }));
  }
}
