use serde::{Deserialize, Serialize};

use super::role::Role;

/// One entry of the conversation, as stored by the backend and shown in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who the entry is attributed to.
    pub role: Role,

    /// The text of the entry.
    pub content: String,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user `Message`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new error `Message`.
    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Error, content)
    }
}
