use biometrics::{Collector, Counter, Moments};

pub(crate) static BACKEND_REQUESTS: Counter = Counter::new("ableton_chat.backend.requests");
pub(crate) static BACKEND_REQUEST_ERRORS: Counter =
    Counter::new("ableton_chat.backend.request_errors");
pub(crate) static BACKEND_REQUEST_DURATION: Moments =
    Moments::new("ableton_chat.backend.request_duration_seconds");

pub(crate) static CHAT_SENDS: Counter = Counter::new("ableton_chat.chat.sends");
pub(crate) static CHAT_SEND_FAILURES: Counter = Counter::new("ableton_chat.chat.send_failures");
pub(crate) static FETCH_FAILURES: Counter = Counter::new("ableton_chat.chat.fetch_failures");
pub(crate) static HISTORY_REFRESHES: Counter = Counter::new("ableton_chat.chat.history_refreshes");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&BACKEND_REQUESTS);
    collector.register_counter(&BACKEND_REQUEST_ERRORS);
    collector.register_moments(&BACKEND_REQUEST_DURATION);

    collector.register_counter(&CHAT_SENDS);
    collector.register_counter(&CHAT_SEND_FAILURES);
    collector.register_counter(&FETCH_FAILURES);
    collector.register_counter(&HISTORY_REFRESHES);
}
