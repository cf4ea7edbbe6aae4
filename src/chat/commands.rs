//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to refresh the client's displays without sending a message.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Re-fetch the conversation history and redraw the log.
    History,

    /// Re-fetch and show the session info.
    Session,

    /// Re-fetch and show the current mode.
    ShowMode,

    /// Ask the backend to switch modes (sends `set mode to <name>`).
    SetMode(String),

    /// Ask the backend to save the project (sends `save project to <path>`).
    SaveProject(String),

    /// Write the local chat log to a file.
    SaveTranscript(String),

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

impl ChatCommand {
    /// The chat message this command stands for, if it is sent to the backend.
    pub fn backend_message(&self) -> Option<String> {
        match self {
            ChatCommand::SetMode(mode) => Some(format!("set mode to {mode}")),
            ChatCommand::SaveProject(path) => Some(format!("save project to {path}")),
            _ => None,
        }
    }
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be sent as a regular message.
///
/// # Examples
///
/// ```
/// # use ableton_chat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/mode mixing").is_some());
/// assert!(parse_command("add a compressor to the drums").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "history" => ChatCommand::History,
        "session" => ChatCommand::Session,
        "mode" => match argument {
            Some(mode) => ChatCommand::SetMode(mode.to_string()),
            None => ChatCommand::ShowMode,
        },
        "save-project" => match argument {
            Some(path) => ChatCommand::SaveProject(path.to_string()),
            None => ChatCommand::Invalid("/save-project requires a path".to_string()),
        },
        "save" => match argument {
            Some(path) => ChatCommand::SaveTranscript(path.to_string()),
            None => ChatCommand::Invalid("/save requires a file path".to_string()),
        },
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /history               Reload the conversation from the backend
  /session               Show the session info
  /mode                  Show the current mode
  /mode <name>           Switch the backend to another mode
  /save-project <path>   Ask the backend to save the project
  /save <file>           Save the conversation shown here to a file
  /help                  Show this help message
  /quit                  Exit the chat
Anything else is sent as a message."#
}
