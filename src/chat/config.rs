//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling the client.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::backend::DEFAULT_BASE_URL;

/// Environment variable consulted when `--base-url` is not given.
pub const BASE_URL_ENV: &str = "ABLETON_CHAT_BASE_URL";

/// Command-line arguments for the ableton-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Backend base address.
    #[arrrg(optional, "Backend address (default: http://127.0.0.1:8000)", "URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for the chat client.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Where the backend lives.
    pub base_url: String,

    /// Per-request timeout.  `None` waits indefinitely.
    pub timeout: Option<Duration>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: http://127.0.0.1:8000
    /// - Timeout: none
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            use_color: true,
        }
    }

    /// Sets the backend base address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Resolves arguments, consulting `env_base_url` when no flag was given.
    pub fn resolve(args: ChatArgs, env_base_url: Option<String>) -> Self {
        let base_url = args
            .base_url
            .or(env_base_url.filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        ChatConfig {
            base_url,
            timeout: args.timeout.map(Duration::from_secs),
            use_color: !args.no_color,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        Self::resolve(args, None)
    }
}
