//! Display surfaces for the chat client.
//!
//! The chat client owns four surfaces: the chat log, the input field, the
//! session-info display and the mode display.  It keeps the model of each
//! surface itself and pushes every change through a [`Renderer`], so the same
//! client drives a terminal, a test recorder, or anything else.
//!
//! Everything the backend sends is untrusted.  [`PlainTextRenderer`] passes it
//! through [`sanitize`] so a message cannot smuggle escape sequences into the
//! terminal.

use std::io::{self, Write};

use crate::types::{Message, Role};

/// ANSI escape code for bold text (used for sender labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for session info).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the user label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for the assistant label).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for magenta text (used for the mode display).
const ANSI_MAGENTA: &str = "\x1b[35m";

/// Printed where a redrawn chat log begins.
///
/// The log shares the terminal with the other surfaces, so it is never cleared
/// by clearing the screen.
pub const LOG_BOUNDARY: &str = "----- conversation -----";

/// Trait for rendering the chat client's surfaces.
pub trait Renderer: Send {
    /// Append one entry to the visible chat log.
    fn append_entry(&mut self, message: &Message);

    /// Remove every entry from the visible chat log.
    fn clear_log(&mut self);

    /// Bring the latest log entry into view.
    fn scroll_to_bottom(&mut self);

    /// Replace the contents of the session-info display.
    fn show_session_info(&mut self, text: &str);

    /// Replace the contents of the mode display.
    fn show_mode(&mut self, mode: &str);

    /// Print an informational message outside the chat log.
    fn print_info(&mut self, info: &str);

    /// Print an error message outside the chat log.
    fn print_error(&mut self, error: &str);
}

/// Strips control characters, keeping newlines and tabs.
///
/// Backend text is shown as text: an embedded escape sequence would otherwise
/// restyle or rewrite the terminal.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer writes each surface change as it happens: errors to one
/// writer (stderr by default), everything else to another (stdout).
pub struct PlainTextRenderer {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writers(use_color, io::stdout(), io::stderr())
    }

    /// Creates a renderer that writes to `out` and `err` instead of the terminal.
    pub fn with_writers(
        use_color: bool,
        out: impl Write + Send + 'static,
        err: impl Write + Send + 'static,
    ) -> Self {
        Self {
            out: Box::new(out),
            err: Box::new(err),
            use_color,
        }
    }

    // Terminal output is best effort.
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn label_color(role: &Role) -> &'static str {
        match role {
            Role::User => ANSI_CYAN,
            Role::Assistant => ANSI_YELLOW,
            Role::Error => ANSI_RED,
            Role::System | Role::Other(_) => ANSI_DIM,
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats one log entry as `Label: content`, without styling.
pub fn format_entry(message: &Message) -> String {
    format!(
        "{}: {}",
        sanitize(message.role.label()),
        sanitize(&message.content)
    )
}

impl Renderer for PlainTextRenderer {
    fn append_entry(&mut self, message: &Message) {
        if self.use_color {
            let color = Self::label_color(&message.role);
            self.line(&format!(
                "{ANSI_BOLD}{color}{}:{ANSI_RESET} {}",
                sanitize(message.role.label()),
                sanitize(&message.content)
            ));
        } else {
            self.line(&format_entry(message));
        }
    }

    fn clear_log(&mut self) {
        if self.use_color {
            self.line(&format!("{ANSI_DIM}{LOG_BOUNDARY}{ANSI_RESET}"));
        } else {
            self.line(LOG_BOUNDARY);
        }
    }

    fn scroll_to_bottom(&mut self) {
        let _ = self.out.flush();
    }

    fn show_session_info(&mut self, text: &str) {
        let text = sanitize(text);
        if self.use_color {
            self.line(&format!(
                "{ANSI_BOLD}Session info:{ANSI_RESET}\n{ANSI_DIM}{text}{ANSI_RESET}"
            ));
        } else {
            self.line(&format!("Session info:\n{text}"));
        }
    }

    fn show_mode(&mut self, mode: &str) {
        let mode = sanitize(mode);
        if self.use_color {
            self.line(&format!("{ANSI_MAGENTA}[mode: {mode}]{ANSI_RESET}"));
        } else {
            self.line(&format!("[mode: {mode}]"));
        }
    }

    fn print_info(&mut self, info: &str) {
        let info = sanitize(info);
        self.line(&info);
    }

    fn print_error(&mut self, error: &str) {
        let error = sanitize(error);
        let _ = if self.use_color {
            writeln!(self.err, "{ANSI_RED}Error: {error}{ANSI_RESET}")
        } else {
            writeln!(self.err, "Error: {error}")
        };
        let _ = self.err.flush();
    }
}
