// Public modules
pub mod message;
pub mod role;
pub mod session_info;
pub mod wire;

// Re-exports
pub use message::Message;
pub use role::Role;
pub use session_info::SessionInfo;
pub use wire::{
    ChatRequest, ChatResponse, ErrorResponse, HistoryResponse, ModeResponse, SessionInfoResponse,
};
