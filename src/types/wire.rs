//! Request and response bodies exchanged with the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::Message;
use super::session_info::SessionInfo;
use crate::error::GENERIC_FAILURE;

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    /// The trimmed text the user typed.
    pub user_input: &'a str,
}

/// Successful body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    /// The backend's reply.
    pub response: String,
}

/// Body of `GET /session_info`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionInfoResponse {
    /// Absent and `null` both deserialize to `None`.
    #[serde(default)]
    pub session_info: Option<SessionInfo>,
}

/// Body of `GET /conversation_history`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryResponse {
    /// Every entry the backend remembers, oldest first.
    pub history: Vec<Message>,
}

/// Body of `GET /current_mode`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModeResponse {
    /// The backend's operating mode label.
    pub mode: String,
}

/// Error body returned with a non-success status.
///
/// `detail` is usually a string, but request validation failures carry a list
/// of objects instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong, in whatever shape the backend chose.
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorResponse {
    /// The detail as display text; `None` when it is missing, `null` or empty.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Extracts the failure text from a raw error body.
    ///
    /// Falls back to [`GENERIC_FAILURE`] when the body is empty, not JSON, or
    /// carries no usable detail.
    pub fn failure_text(body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|err| err.detail_text())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    }
}
