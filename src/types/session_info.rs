use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque session metadata reported by the backend.
///
/// The client never interprets it; it is only pretty-printed for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionInfo(pub Value);

impl SessionInfo {
    /// Renders the metadata as JSON indented by two spaces, keeping key order.
    pub fn pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}

impl From<Value> for SessionInfo {
    fn from(value: Value) -> Self {
        SessionInfo(value)
    }
}
