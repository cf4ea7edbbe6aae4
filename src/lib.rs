// Public modules
pub mod backend;
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod types;

// Re-exports
pub use backend::{Backend, DEFAULT_BASE_URL, HttpBackend};
pub use client::{ChatClient, SESSION_INFO_FALLBACK, SendOutcome};
pub use error::{Error, GENERIC_FAILURE, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer, sanitize};
pub use types::*;
