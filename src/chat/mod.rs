//! Terminal front-end for the chat client.
//!
//! This module provides the pieces the `ableton-chat` binary is built from:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing and handling
//!
//! The binary reads lines with rustyline.  A plain line is placed in the
//! client's input field and sent, which is the terminal equivalent of pressing
//! Enter or clicking send.

mod commands;
mod config;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{BASE_URL_ENV, ChatArgs, ChatConfig};
