//! The chat controller.
//!
//! [`ChatClient`] sits between the display surfaces and the backend.  Each
//! operation is self-contained: it catches its own failures, logs them, and
//! leaves the surfaces in a defined state.  Nothing it does returns an error to
//! the front-end.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::to_writer_pretty;
use tokio::task::JoinHandle;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::observability::{CHAT_SEND_FAILURES, CHAT_SENDS, FETCH_FAILURES, HISTORY_REFRESHES};
use crate::render::Renderer;
use crate::types::{Message, Role};

/// Shown in the session display when session info cannot be fetched.
pub const SESSION_INFO_FALLBACK: &str = "Could not retrieve session information.";

/// Prefix of the error entry added when a send fails.
pub const SEND_FAILURE_PREFIX: &str = "Failed to get response";

/// What a call to [`ChatClient::send_message`] did.
#[derive(Debug)]
pub enum SendOutcome {
    /// The input was empty after trimming; nothing happened.
    Skipped,

    /// The send failed and an error entry was appended.
    Failed(Error),

    /// The reply was appended and a mode refresh was started.
    ///
    /// Dropping the handle does not cancel the refresh.
    Delivered {
        /// The fire-and-forget mode refresh.
        mode_refresh: JoinHandle<()>,
    },
}

impl SendOutcome {
    /// Returns true if a reply was received.
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }
}

/// The surfaces as the client last rendered them.
struct View<R> {
    renderer: R,
    input: String,
    log: Vec<Message>,
    session_info: Option<String>,
    mode: Option<String>,
}

impl<R: Renderer> View<R> {
    fn append(&mut self, message: Message) {
        self.renderer.append_entry(&message);
        self.log.push(message);
        self.renderer.scroll_to_bottom();
    }

    fn replace_log(&mut self, history: Vec<Message>) {
        self.renderer.clear_log();
        self.log.clear();
        for message in history {
            self.renderer.append_entry(&message);
            self.log.push(message);
        }
        self.renderer.scroll_to_bottom();
    }

    fn set_session_info(&mut self, text: String) {
        self.renderer.show_session_info(&text);
        self.session_info = Some(text);
    }

    fn set_mode(&mut self, mode: String) {
        self.renderer.show_mode(&mode);
        self.mode = Some(mode);
    }
}

struct Inner<B, R> {
    backend: B,
    view: Mutex<View<R>>,
}

/// Mediates between the display surfaces and the backend.
///
/// Cloning is cheap; clones drive the same surfaces.  The surfaces sit behind a
/// mutex that is never held across an `.await`, so concurrent operations only
/// interleave at network suspension points.
pub struct ChatClient<B, R> {
    inner: Arc<Inner<B, R>>,
}

impl<B, R> Clone for ChatClient<B, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend + 'static, R: Renderer + 'static> ChatClient<B, R> {
    /// Creates a client with empty surfaces.
    pub fn new(backend: B, renderer: R) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                view: Mutex::new(View {
                    renderer,
                    input: String::new(),
                    log: Vec::new(),
                    session_info: None,
                    mode: None,
                }),
            }),
        }
    }

    fn view(&self) -> MutexGuard<'_, View<R>> {
        self.inner
            .view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches session info, history and mode concurrently.
    ///
    /// Each fetch handles its own failure, so one failing never holds up the
    /// others.
    pub async fn initialize(&self) {
        futures::join!(
            self.fetch_session_info(),
            self.fetch_conversation_history(),
            self.fetch_current_mode(),
        );
    }

    /// Shows the backend's session info, or [`SESSION_INFO_FALLBACK`].
    pub async fn fetch_session_info(&self) {
        let result = self.inner.backend.session_info().await;
        match result.and_then(|info| info.pretty()) {
            Ok(text) => self.view().set_session_info(text),
            Err(err) => {
                FETCH_FAILURES.click();
                tracing::error!(error = %err, "error fetching session info");
                self.view().set_session_info(SESSION_INFO_FALLBACK.to_string());
            }
        }
    }

    /// Rebuilds the chat log from the backend's history.
    ///
    /// On failure the log is left exactly as it was.
    pub async fn fetch_conversation_history(&self) {
        match self.inner.backend.conversation_history().await {
            Ok(history) => {
                HISTORY_REFRESHES.click();
                self.view().replace_log(history);
            }
            Err(err) => {
                FETCH_FAILURES.click();
                tracing::error!(error = %err, "error fetching conversation history");
            }
        }
    }

    /// Updates the mode display; on failure the previous mode stays.
    pub async fn fetch_current_mode(&self) {
        match self.inner.backend.current_mode().await {
            Ok(mode) => self.view().set_mode(mode),
            Err(err) => {
                FETCH_FAILURES.click();
                tracing::error!(error = %err, "error fetching current mode");
            }
        }
    }

    /// Appends one entry to the chat log and scrolls to it.
    pub fn append_message(&self, role: Role, content: impl Into<String>) {
        self.view().append(Message::new(role, content));
    }

    /// Sends whatever is in the input field.
    ///
    /// The user entry is appended and the input cleared before the request goes
    /// out.  A failure of any kind becomes a single error entry.  On success the
    /// reply is appended and a mode refresh is spawned without waiting on it.
    pub async fn send_message(&self) -> SendOutcome {
        let text = {
            let mut view = self.view();
            let text = view.input.trim().to_string();
            if text.is_empty() {
                return SendOutcome::Skipped;
            }
            view.append(Message::user(text.clone()));
            view.input.clear();
            text
        };

        CHAT_SENDS.click();
        match self.inner.backend.chat(&text).await {
            Ok(response) => {
                self.view().append(Message::assistant(response));
                let this = self.clone();
                let mode_refresh = tokio::spawn(async move { this.fetch_current_mode().await });
                SendOutcome::Delivered { mode_refresh }
            }
            Err(err) => {
                CHAT_SEND_FAILURES.click();
                tracing::error!(error = %err, "error sending message");
                self.view().append(Message::error(format!(
                    "{SEND_FAILURE_PREFIX}: {}",
                    err.message()
                )));
                SendOutcome::Failed(err)
            }
        }
    }

    /// Replaces the contents of the input field.
    pub fn set_input(&self, text: impl Into<String>) {
        self.view().input = text.into();
    }

    /// The current contents of the input field.
    pub fn input(&self) -> String {
        self.view().input.clone()
    }

    /// A snapshot of the chat log.
    pub fn log(&self) -> Vec<Message> {
        self.view().log.clone()
    }

    /// The last mode shown, if any.
    pub fn mode(&self) -> Option<String> {
        self.view().mode.clone()
    }

    /// The last session info text shown, if any.
    pub fn session_info(&self) -> Option<String> {
        self.view().session_info.clone()
    }

    /// Runs `f` against the renderer, for front-end output outside the log.
    pub fn with_renderer<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        f(&mut self.view().renderer)
    }

    /// Writes the current chat log to `path` as pretty JSON.
    pub fn save_transcript_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let messages = self.log();
        let transcript = TranscriptFile {
            version: 1,
            messages: &messages,
        };
        let file = File::create(path.as_ref())
            .map_err(|err| Error::io("failed to create transcript file", err))?;
        let writer = BufWriter::new(file);
        to_writer_pretty(writer, &transcript).map_err(|err| {
            Error::serialization("failed to serialize transcript", Some(Box::new(err)))
        })
    }
}

#[derive(Serialize)]
struct TranscriptFile<'a> {
    version: u8,
    messages: &'a [Message],
}
