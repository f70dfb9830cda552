//! Concierge - chat session engine for a hotel concierge chatbot.
//!
//! This crate keeps the conversation with a guest, pulls their contact
//! details out of what they type, and turns each finished conversation into
//! a canonical record that can be saved to a backend or downloaded as a
//! plain-text transcript.
//!
//! # Architecture
//!
//! - **Session** ([`session`]) - messages, guest profile, lifecycle, sinks
//! - **Extraction** ([`extract`]) - name / email / phone heuristics
//! - **Transcript** ([`transcript`]) - transcript text and download document
//! - **Completion** ([`completion`]) - the AI gateway client
//! - **Console** ([`console`]) - line-oriented driver used by the binary
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use concierge::prelude::*;
//!
//! let mut engine = SessionEngine::default();
//! engine.greet();
//! engine.send("I'm Ana, ana@example.com", &HttpCompletion::new(url)).await?;
//! let ended = engine.end_session(&HttpSink::new(url)).await;
//! println!("{}", render_download(&ended.record));
//! ```

// Core modules
pub mod best_effort;
pub mod completion;
pub mod config;
pub mod error;
pub mod extract;
pub mod session;
pub mod transcript;
pub mod util;

// Driver
pub mod console;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error types (centralized)
    pub use crate::error::{
        CompletionError, CompletionResult, ConciergeError, ConfigError, ConfigResult,
        DisplayError, ErrorContext, Result, SinkError, SinkResult, TranscriptError,
    };

    pub use crate::best_effort::BestEffort;

    // Completion
    pub use crate::completion::{ChatCompletion, EchoCompletion, HttpCompletion};

    // Config
    pub use crate::config::{
        BackendConfig, ConciergeConfig, ConfigIssue, IssueLevel, SessionConfig, StorageConfig,
        config_path, init_config, load_config, load_config_from, save_config,
    };

    // Console
    pub use crate::console::{Command, Console, ConsoleConfig};

    // Extraction
    pub use crate::extract::{Extraction, FieldExtractor, PatternExtractor};

    // Session
    pub use crate::session::{
        ClientProfile, EndedSession, EngineConfig, FileSink, HistoryTurn, HttpSink, MemorySink,
        Message, Role, Session, SessionEngine, SessionRecord, SessionSink, SessionState, persist,
    };

    // Transcript
    pub use crate::transcript::{
        download_file_name, format_transcript, parse_download, render_download, write_download,
    };

    // Utilities
    pub use crate::util::{generate_chat_id, generate_client_id, generate_message_id};
}
