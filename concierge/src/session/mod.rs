//! Chat sessions: messages, guest profile, lifecycle, and persistence.
//!
//! A [`SessionEngine`] owns the live [`Session`]. When the session ends it
//! produces an immutable [`SessionRecord`] and hands it to a
//! [`SessionSink`].

mod engine;
mod message;
mod profile;
mod record;
mod storage;

pub use engine::{
    DEFAULT_GREETING, DEFAULT_GUEST_NAME, EndedSession, EngineConfig, Session, SessionEngine,
    SessionState,
};
pub use message::{HistoryTurn, Message, Role};
pub use profile::ClientProfile;
pub use record::{DATE_FORMAT, SessionRecord, TIME_FORMAT};
pub use storage::{FileSink, HttpSink, MemorySink, SessionSink, persist};
