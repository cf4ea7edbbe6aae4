use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who a chat log entry is attributed to.
///
/// The backend reports history roles as lowercase strings.  Labels it does not
/// know about are kept verbatim in [`Role::Other`] so nothing is lost on display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Text typed by the person at the keyboard.
    User,

    /// A reply produced by the backend.
    Assistant,

    /// Backend bookkeeping, such as the initial session snapshot.
    System,

    /// A failure surfaced inline in the conversation.
    Error,

    /// Any other label the backend sent.
    Other(String),
}

impl Role {
    /// The wire form of this role.
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Error => "error",
            Role::Other(label) => label,
        }
    }

    /// The sender label shown in front of an entry in the chat log.
    pub fn label(&self) -> &str {
        match self {
            Role::User => "You",
            Role::Assistant => "AI",
            Role::System => "System",
            Role::Error => "Error",
            Role::Other(label) => label,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s.to_string()))
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "user" | "you" => Role::User,
            "assistant" | "ai" => Role::Assistant,
            "system" => Role::System,
            "error" => Role::Error,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}
