//! Session engine: the live conversation and its lifecycle.
//!
//! ```text
//! Idle --greet / first message--> Active --end_session--> (record) --> Idle
//!   ^                               |
//!   +---------- start_new ----------+
//! ```

use super::message::{HistoryTurn, Message};
use super::profile::ClientProfile;
use super::record::SessionRecord;
use super::storage::{SessionSink, persist};
use crate::best_effort::BestEffort;
use crate::completion::ChatCompletion;
use crate::error::CompletionResult;
use crate::extract::{FieldExtractor, PatternExtractor};
use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

/// Default greeting posted at the start of each session.
pub const DEFAULT_GREETING: &str = "Hello! Welcome to our hotel concierge. Please provide your Name, Email, and Phone so we can assist you better.";

/// Default name sent to the completion backend before the guest is known.
pub const DEFAULT_GUEST_NAME: &str = "Guest";

/// Configuration for the session engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Assistant greeting; `None` disables it.
    pub greeting: Option<String>,
    /// Name used for the guest until one is extracted.
    pub guest_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            greeting: Some(DEFAULT_GREETING.to_string()),
            guest_name: DEFAULT_GUEST_NAME.to_string(),
        }
    }
}

/// Lifecycle state of the live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been said yet.
    Idle,
    /// The conversation is under way.
    Active,
}

/// A live conversation.
#[derive(Debug, Clone)]
pub struct Session {
    messages: Vec<Message>,
    profile: ClientProfile,
    started_at: DateTime<Local>,
}

impl Session {
    /// Create an empty session starting now.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Local::now())
    }

    /// Create an empty session with an explicit start instant.
    #[must_use]
    pub fn starting_at(started_at: DateTime<Local>) -> Self {
        Self {
            messages: Vec::new(),
            profile: ClientProfile::new(),
            started_at,
        }
    }

    /// Messages in transcript order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Contact details extracted so far.
    #[must_use]
    pub const fn profile(&self) -> &ClientProfile {
        &self.profile
    }

    /// When the session began.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Snapshot into a record. The session is left untouched.
    #[must_use]
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord::build(
            &self.messages,
            &self.profile,
            self.started_at.naive_local(),
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// A session that has just ended.
#[derive(Debug)]
pub struct EndedSession {
    /// The canonical record.
    pub record: SessionRecord,
    /// Outcome of handing the record to the sink.
    pub saved: BestEffort<()>,
}

/// Drives one conversation at a time.
///
/// [`send`](Self::send) borrows the engine mutably for the whole round trip,
/// so a second request cannot start while one is in flight.
pub struct SessionEngine {
    session: Session,
    config: EngineConfig,
    extractor: Box<dyn FieldExtractor>,
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("session", &self.session)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SessionEngine {
    /// Create an engine using the regex extractor.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_extractor(config, PatternExtractor::new())
    }

    /// Create an engine with a custom field extractor.
    #[must_use]
    pub fn with_extractor(config: EngineConfig, extractor: impl FieldExtractor + 'static) -> Self {
        Self {
            session: Session::new(),
            config,
            extractor: Box::new(extractor),
        }
    }

    /// The live session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.session.messages.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Active
        }
    }

    /// Whether the guest has said anything. The greeting alone does not count.
    #[must_use]
    pub fn has_messages(&self) -> bool {
        self.session.messages.iter().any(Message::is_user)
    }

    /// Name to address the guest by.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.session.profile.display_name(&self.config.guest_name)
    }

    /// Post the configured greeting.
    ///
    /// Only an idle session is greeted; returns the greeting if one was posted.
    pub fn greet(&mut self) -> Option<&Message> {
        if self.state() != SessionState::Idle {
            return None;
        }
        let text = self.config.greeting.clone()?;
        Some(self.push(Message::assistant(text)))
    }

    /// Append a guest message and update the profile from it.
    pub fn record_user_message(&mut self, text: impl Into<String>) -> &Message {
        let msg = Message::user(text);
        let profile = std::mem::take(&mut self.session.profile);
        self.session.profile = profile.observe(&msg, self.extractor.as_ref());
        self.push(msg)
    }

    /// Send a guest message and wait for the assistant's reply.
    ///
    /// The guest message stays in the history even when the backend fails,
    /// so the caller can report the error and let the guest resend.
    pub async fn send(
        &mut self,
        text: &str,
        completion: &dyn ChatCompletion,
    ) -> CompletionResult<&Message> {
        let history: Vec<HistoryTurn> = self
            .session
            .messages
            .iter()
            .map(HistoryTurn::from)
            .collect();
        self.record_user_message(text);

        let display_name = self.display_name().to_string();
        match completion.complete(&history, text, &display_name).await {
            Ok(reply) => Ok(self.push(Message::assistant(reply))),
            Err(e) => {
                warn!(backend = completion.name(), error = %e, "completion failed");
                Err(e)
            }
        }
    }

    /// End the session: build its record, save it, and start afresh.
    ///
    /// A failed save is reported in [`EndedSession::saved`] only; the record
    /// is returned either way.
    pub async fn end_session(&mut self, sink: &dyn SessionSink) -> EndedSession {
        let record = self.finish();
        let saved = persist(sink, &record).await;
        EndedSession { record, saved }
    }

    /// Build the record for the live session and reset to a fresh one,
    /// without saving anywhere.
    pub fn finish(&mut self) -> SessionRecord {
        let ended = std::mem::take(&mut self.session);
        let record = ended.to_record();
        info!(
            chat_id = %record.chat_id,
            messages = ended.messages.len(),
            "session ended"
        );
        record
    }

    /// Discard the live session without producing a record.
    ///
    /// When the guest has said something, `confirm` is asked first and a
    /// `false` answer keeps the session. Returns whether a reset happened.
    pub fn start_new(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if self.has_messages() && !confirm() {
            debug!("start new declined");
            return false;
        }
        self.session = Session::new();
        debug!("new session started");
        true
    }

    fn push(&mut self, msg: Message) -> &Message {
        self.session.messages.push(msg);
        &self.session.messages[self.session.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::EchoCompletion;
    use crate::error::{CompletionError, SinkError, SinkResult};
    use crate::session::MemorySink;
    use crate::session::Role;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Completion backend that records what it was asked.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(Vec<HistoryTurn>, String, String)>>,
    }

    #[async_trait]
    impl ChatCompletion for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn complete(
            &self,
            history: &[HistoryTurn],
            new_message: &str,
            display_name: &str,
        ) -> CompletionResult<String> {
            self.calls.lock().unwrap().push((
                history.to_vec(),
                new_message.to_string(),
                display_name.to_string(),
            ));
            Ok("noted".into())
        }
    }

    struct Offline;

    #[async_trait]
    impl ChatCompletion for Offline {
        fn name(&self) -> &'static str {
            "offline"
        }

        async fn complete(&self, _: &[HistoryTurn], _: &str, _: &str) -> CompletionResult<String> {
            Err(CompletionError::network("connection refused"))
        }
    }

    struct BrokenSink;

    #[async_trait]
    impl SessionSink for BrokenSink {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn save(&self, _: &SessionRecord) -> SinkResult<()> {
            Err(SinkError::remote("backend down"))
        }
    }

    #[test]
    fn test_greeting_moves_to_active() {
        let mut engine = SessionEngine::default();
        assert_eq!(engine.state(), SessionState::Idle);

        let greeting = engine.greet().unwrap();
        assert_eq!(greeting.role(), Role::Assistant);
        assert_eq!(engine.state(), SessionState::Active);
        assert!(!engine.has_messages());

        // Already active: no second greeting.
        assert!(engine.greet().is_none());
    }

    #[test]
    fn test_first_user_message_moves_to_active() {
        let mut engine = SessionEngine::new(EngineConfig {
            greeting: None,
            ..EngineConfig::default()
        });
        assert!(engine.greet().is_none());
        engine.record_user_message("hello");
        assert_eq!(engine.state(), SessionState::Active);
        assert!(engine.has_messages());
    }

    #[tokio::test]
    async fn test_send_passes_prior_history_and_name() {
        let mut engine = SessionEngine::default();
        engine.greet();
        let backend = Recorder::default();

        engine.send("do you have a spa?", &backend).await.unwrap();
        engine
            .send("I am Paula, paula@example.com", &backend)
            .await
            .unwrap();

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].0.len(), 1);
        assert_eq!(calls[0].1, "do you have a spa?");
        assert_eq!(calls[0].2, "Guest");
        // greeting, user, reply
        assert_eq!(calls[1].0.len(), 3);
        assert_eq!(calls[1].2, "Paula");
        drop(calls);

        let roles: Vec<_> = engine.session().messages().iter().map(Message::role).collect();
        assert_eq!(
            roles,
            [
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
        assert_eq!(engine.session().profile().email(), Some("paula@example.com"));
    }

    #[tokio::test]
    async fn test_failed_send_keeps_history() {
        let mut engine = SessionEngine::default();
        engine.greet();

        let err = engine.send("anyone there?", &Offline).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(engine.session().messages().len(), 2);
        assert!(engine.has_messages());

        // Retry by resending.
        engine.send("anyone there?", &EchoCompletion).await.unwrap();
        assert_eq!(engine.session().messages().len(), 4);
    }

    #[tokio::test]
    async fn test_end_session_saves_and_resets() {
        let mut engine = SessionEngine::default();
        engine.greet();
        engine
            .send("Hi, I'm John Smith, john.smith@example.com, +1 415-555-2671", &EchoCompletion)
            .await
            .unwrap();

        let sink = MemorySink::new();
        let ended = engine.end_session(&sink).await;

        assert!(ended.saved.is_completed());
        assert_eq!(sink.records().await, vec![ended.record.clone()]);
        assert_eq!(ended.record.client_email, "john.smith@example.com");
        assert_eq!(ended.record.client_phone, "+1 415-555-2671");
        assert_eq!(ended.record.transcript_text.lines().count(), 3);

        assert_eq!(engine.state(), SessionState::Idle);
        assert!(engine.session().messages().is_empty());
        assert_eq!(engine.session().profile(), &ClientProfile::new());
    }

    #[tokio::test]
    async fn test_failed_save_still_returns_record() {
        let mut engine = SessionEngine::default();
        engine.record_user_message("hello");

        let ended = engine.end_session(&BrokenSink).await;
        assert_eq!(ended.saved.failure(), Some("remote: backend down"));
        assert_eq!(ended.record.transcript_text, "Client: hello");
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn test_empty_session_end() {
        let mut engine = SessionEngine::default();
        let sink = MemorySink::new();
        let ended = tokio_test::block_on(engine.end_session(&sink));
        assert_eq!(ended.record.transcript_text, "");
        assert!(!ended.record.chat_id.is_empty());
    }

    #[test]
    fn test_start_new_without_messages_asks_nothing() {
        let mut engine = SessionEngine::default();
        engine.greet();
        let mut asked = 0;
        assert!(engine.start_new(|| {
            asked += 1;
            true
        }));
        assert!(engine.start_new(|| {
            asked += 1;
            true
        }));
        assert_eq!(asked, 0);
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn test_start_new_declined_keeps_session() {
        let mut engine = SessionEngine::default();
        engine.greet();
        engine.record_user_message("hi");

        assert!(!engine.start_new(|| false));
        assert_eq!(engine.session().messages().len(), 2);

        assert!(engine.start_new(|| true));
        assert!(engine.session().messages().is_empty());
    }

    #[test]
    fn test_custom_extractor() {
        struct Fixed;
        impl FieldExtractor for Fixed {
            fn extract(&self, _: &str) -> crate::extract::Extraction {
                crate::extract::Extraction {
                    name: Some("Fixed Name".into()),
                    ..Default::default()
                }
            }
        }

        let mut engine = SessionEngine::with_extractor(EngineConfig::default(), Fixed);
        engine.record_user_message("whatever");
        assert_eq!(engine.display_name(), "Fixed Name");
    }
}
