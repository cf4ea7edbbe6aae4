//! Behaviour of the chat controller against a scripted backend.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::Notify;

use ableton_chat::{
    Backend, ChatClient, Error, GENERIC_FAILURE, Message, PlainTextRenderer, Renderer, Result, Role,
    SESSION_INFO_FALLBACK, SendOutcome, SessionInfo,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Get(&'static str),
    Post(String),
    Entry(Role, String),
    ClearLog,
    Scroll,
    SessionInfo(String),
    Mode(String),
}

#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    fn position(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

struct Script {
    session_info: Mutex<Result<SessionInfo>>,
    history: Mutex<Result<Vec<Message>>>,
    mode: Mutex<Result<String>>,
    chat: Mutex<Result<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    slow_history: Mutex<bool>,
}

impl Script {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            session_info: Mutex::new(Ok(SessionInfo::from(json!({"tempo": 120, "tracks": 8})))),
            history: Mutex::new(Ok(Vec::new())),
            mode: Mutex::new(Ok("default".to_string())),
            chat: Mutex::new(Ok("ok".to_string())),
            gate: Mutex::new(None),
            slow_history: Mutex::new(false),
        })
    }
}

struct FakeBackend {
    journal: Journal,
    script: Arc<Script>,
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn session_info(&self) -> Result<SessionInfo> {
        self.journal.push(Event::Get("session_info"));
        self.script.session_info.lock().unwrap().clone()
    }

    async fn conversation_history(&self) -> Result<Vec<Message>> {
        self.journal.push(Event::Get("conversation_history"));
        let slow = *self.script.slow_history.lock().unwrap();
        if slow {
            tokio::task::yield_now().await;
        }
        self.script.history.lock().unwrap().clone()
    }

    async fn current_mode(&self) -> Result<String> {
        self.journal.push(Event::Get("current_mode"));
        self.script.mode.lock().unwrap().clone()
    }

    async fn chat(&self, user_input: &str) -> Result<String> {
        self.journal.push(Event::Post(user_input.to_string()));
        let gate = self.script.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.script.chat.lock().unwrap().clone()
    }
}

struct RecordingRenderer {
    journal: Journal,
}

impl Renderer for RecordingRenderer {
    fn append_entry(&mut self, message: &Message) {
        self.journal
            .push(Event::Entry(message.role.clone(), message.content.clone()));
    }

    fn clear_log(&mut self) {
        self.journal.push(Event::ClearLog);
    }

    fn scroll_to_bottom(&mut self) {
        self.journal.push(Event::Scroll);
    }

    fn show_session_info(&mut self, text: &str) {
        self.journal.push(Event::SessionInfo(text.to_string()));
    }

    fn show_mode(&mut self, mode: &str) {
        self.journal.push(Event::Mode(mode.to_string()));
    }

    fn print_info(&mut self, _: &str) {}

    fn print_error(&mut self, _: &str) {}
}

type TestClient = ChatClient<FakeBackend, RecordingRenderer>;

fn client() -> (TestClient, Journal, Arc<Script>) {
    let journal = Journal::default();
    let script = Script::new();
    let backend = FakeBackend {
        journal: journal.clone(),
        script: Arc::clone(&script),
    };
    let renderer = RecordingRenderer {
        journal: journal.clone(),
    };
    (ChatClient::new(backend, renderer), journal, script)
}

fn is_entry(role: Role) -> impl Fn(&Event) -> bool {
    move |e| matches!(e, Event::Entry(r, _) if *r == role)
}

#[tokio::test]
async fn send_appends_user_entry_before_request() {
    let (client, journal, _) = client();
    client.set_input("  add reverb to vocals  ");

    let outcome = client.send_message().await;
    assert!(outcome.is_delivered());
    assert_eq!(client.input(), "");

    let entry = journal
        .position(&Event::Entry(Role::User, "add reverb to vocals".to_string()))
        .unwrap();
    let post = journal
        .position(&Event::Post("add reverb to vocals".to_string()))
        .unwrap();
    assert!(entry < post);
    assert_eq!(journal.count(is_entry(Role::User)), 1);
}

#[tokio::test]
async fn input_is_cleared_while_request_is_in_flight() {
    let (client, journal, script) = client();
    let gate = Arc::new(Notify::new());
    *script.gate.lock().unwrap() = Some(Arc::clone(&gate));
    client.set_input("hello");

    let sender = client.clone();
    let task = tokio::spawn(async move { sender.send_message().await });
    while journal.position(&Event::Post("hello".to_string())).is_none() {
        tokio::task::yield_now().await;
    }

    assert_eq!(client.input(), "");
    assert_eq!(client.log(), vec![Message::user("hello")]);
    assert_eq!(journal.count(is_entry(Role::Assistant)), 0);

    gate.notify_one();
    let outcome = task.await.unwrap();
    assert!(outcome.is_delivered());
    assert_eq!(client.log(), vec![Message::user("hello"), Message::assistant("ok")]);
}

#[tokio::test]
async fn blank_input_does_nothing() {
    let (client, journal, _) = client();
    for input in ["", "   ", "\n\t "] {
        client.set_input(input);
        let outcome = client.send_message().await;
        assert!(matches!(outcome, SendOutcome::Skipped));
    }
    assert!(journal.events().is_empty());
    assert!(client.log().is_empty());
}

#[tokio::test]
async fn reply_is_appended_then_mode_refreshed() {
    let (client, journal, script) = client();
    *script.chat.lock().unwrap() = Ok("Hi there".to_string());
    *script.mode.lock().unwrap() = Ok("mixing".to_string());
    client.set_input("hello");

    let SendOutcome::Delivered { mode_refresh } = client.send_message().await else {
        panic!("send should succeed");
    };
    mode_refresh.await.unwrap();

    assert_eq!(journal.count(is_entry(Role::Assistant)), 1);
    let reply = journal
        .position(&Event::Entry(Role::Assistant, "Hi there".to_string()))
        .unwrap();
    let refresh = journal.position(&Event::Get("current_mode")).unwrap();
    assert!(reply < refresh);
    assert_eq!(client.mode(), Some("mixing".to_string()));
}

#[tokio::test]
async fn error_detail_becomes_error_entry() {
    let (client, journal, script) = client();
    *script.chat.lock().unwrap() = Err(Error::api(429, "rate limited"));
    client.set_input("hello");

    let outcome = client.send_message().await;
    assert!(matches!(outcome, SendOutcome::Failed(ref err) if err.status_code() == Some(429)));

    assert_eq!(journal.count(is_entry(Role::Error)), 1);
    assert_eq!(journal.count(is_entry(Role::Assistant)), 0);
    let log = client.log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].role, Role::Error);
    assert!(log[1].content.contains("rate limited"));
    assert!(journal.position(&Event::Get("current_mode")).is_none());
}

#[tokio::test]
async fn error_without_detail_uses_generic_text() {
    let (client, _, script) = client();
    *script.chat.lock().unwrap() = Err(Error::api(500, GENERIC_FAILURE));
    client.set_input("hello");

    client.send_message().await;
    let last = client.log().pop().unwrap();
    assert_eq!(last, Message::error("Failed to get response: Something went wrong"));
}

#[tokio::test]
async fn transport_failure_becomes_error_entry() {
    let (client, _, script) = client();
    *script.chat.lock().unwrap() = Err(Error::connection("connection refused", None));
    client.set_input("hello");

    let outcome = client.send_message().await;
    assert!(matches!(outcome, SendOutcome::Failed(ref err) if err.is_connection()));
    let last = client.log().pop().unwrap();
    assert_eq!(last.role, Role::Error);
    assert!(!last.content.is_empty());
    assert!(last.content.contains("connection refused"));
}

#[tokio::test]
async fn failed_mode_refresh_after_send_keeps_reply() {
    let (client, _, script) = client();
    *script.mode.lock().unwrap() = Err(Error::connection("down", None));
    client.set_input("hello");

    let SendOutcome::Delivered { mode_refresh } = client.send_message().await else {
        panic!("send should succeed");
    };
    mode_refresh.await.unwrap();
    assert_eq!(client.log(), vec![Message::user("hello"), Message::assistant("ok")]);
    assert_eq!(client.mode(), None);
}

#[tokio::test]
async fn history_replaces_log_and_scrolls() {
    let (client, journal, script) = client();
    client.append_message(Role::System, "stale");
    *script.history.lock().unwrap() = Ok(vec![
        Message::new(Role::User, "hi"),
        Message::new(Role::Assistant, "yo"),
    ]);

    client.fetch_conversation_history().await;

    assert_eq!(
        client.log(),
        vec![Message::user("hi"), Message::assistant("yo")]
    );
    let events = journal.events();
    let clear = events.iter().position(|e| *e == Event::ClearLog).unwrap();
    assert_eq!(
        &events[clear..],
        &[
            Event::ClearLog,
            Event::Entry(Role::User, "hi".to_string()),
            Event::Entry(Role::Assistant, "yo".to_string()),
            Event::Scroll,
        ]
    );
}

#[tokio::test]
async fn history_failure_leaves_log_alone() {
    let (client, journal, script) = client();
    client.append_message(Role::User, "still here");
    *script.history.lock().unwrap() =
        Err(Error::serialization("Failed to parse response", None));

    client.fetch_conversation_history().await;

    assert_eq!(client.log(), vec![Message::user("still here")]);
    assert!(journal.position(&Event::ClearLog).is_none());
}

#[tokio::test]
async fn session_info_is_pretty_printed() {
    let (client, journal, _) = client();
    client.fetch_session_info().await;

    let expected = "{\n  \"tempo\": 120,\n  \"tracks\": 8\n}".to_string();
    assert_eq!(client.session_info(), Some(expected.clone()));
    assert!(journal.position(&Event::SessionInfo(expected)).is_some());
}

#[tokio::test]
async fn session_info_failure_shows_fallback() {
    let (client, _, script) = client();
    *script.session_info.lock().unwrap() = Err(Error::api(404, "Not Found"));

    client.fetch_session_info().await;
    assert_eq!(client.session_info(), Some(SESSION_INFO_FALLBACK.to_string()));
}

#[tokio::test]
async fn mode_failure_keeps_previous_mode() {
    let (client, _, script) = client();
    client.fetch_current_mode().await;
    assert_eq!(client.mode(), Some("default".to_string()));

    *script.mode.lock().unwrap() = Err(Error::timeout("Request timed out", None));
    client.fetch_current_mode().await;
    assert_eq!(client.mode(), Some("default".to_string()));
}

#[tokio::test]
async fn initialize_isolates_failures() {
    let (client, journal, script) = client();
    *script.session_info.lock().unwrap() = Err(Error::connection("refused", None));
    *script.history.lock().unwrap() = Ok(vec![Message::new(
        Role::System,
        "Initial Ableton Session Info: {}",
    )]);
    *script.mode.lock().unwrap() = Err(Error::connection("refused", None));

    client.initialize().await;

    for path in ["session_info", "conversation_history", "current_mode"] {
        assert!(journal.position(&Event::Get(path)).is_some(), "{path} not fetched");
    }
    assert_eq!(client.session_info(), Some(SESSION_INFO_FALLBACK.to_string()));
    assert_eq!(client.log().len(), 1);
    assert_eq!(client.mode(), None);
}

#[tokio::test]
async fn append_message_scrolls_to_new_entry() {
    let (client, journal, _) = client();
    client.append_message(Role::Assistant, "<b>not markup</b>");

    assert_eq!(
        journal.events(),
        vec![
            Event::Entry(Role::Assistant, "<b>not markup</b>".to_string()),
            Event::Scroll,
        ]
    );
}

#[tokio::test]
async fn transcript_round_trips_through_json() {
    let (client, _, _) = client();
    client.set_input("hello");
    client.send_message().await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.json");
    tokio_test::assert_ok!(client.save_transcript_to(&path));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        saved,
        json!({
            "version": 1,
            "messages": [
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "ok"}
            ]
        })
    );
}

#[tokio::test]
async fn transcript_to_missing_directory_fails() {
    let (client, _, _) = client();
    let dir = tempfile::tempdir().unwrap();
    let result = client.save_transcript_to(dir.path().join("missing").join("chat.json"));
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[derive(Clone, Default)]
struct Screen(Arc<Mutex<Vec<u8>>>);

impl Screen {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Screen {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn late_history_leaves_session_and_mode_on_screen() {
    let journal = Journal::default();
    let script = Script::new();
    *script.slow_history.lock().unwrap() = true;
    *script.mode.lock().unwrap() = Ok("mixing".to_string());
    *script.history.lock().unwrap() = Ok(vec![Message::user("hi"), Message::assistant("yo")]);
    let backend = FakeBackend {
        journal: journal.clone(),
        script: Arc::clone(&script),
    };
    let screen = Screen::default();
    let renderer = PlainTextRenderer::with_writers(true, screen.clone(), io::sink());
    let client = ChatClient::new(backend, renderer);

    client.initialize().await;

    let text = screen.text();
    assert!(!text.contains("\x1b[2J"), "screen cleared: {text:?}");
    let session = text.find("Session info:").unwrap();
    let mode = text.find("[mode: mixing]").unwrap();
    let reply = text.find("yo").unwrap();
    assert!(session < reply && mode < reply);
    assert_eq!(client.mode(), Some("mixing".to_string()));
}
