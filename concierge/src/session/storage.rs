//! Session persistence sinks.
//!
//! A sink receives each finished [`SessionRecord`] exactly once. Callers go
//! through [`persist`], which turns any failure into a logged
//! [`BestEffort::Failed`].

use super::record::SessionRecord;
use crate::best_effort::BestEffort;
use crate::error::{SinkError, SinkResult};
use crate::util::http_client;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Trait for session persistence backends.
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Store a finished session.
    async fn save(&self, record: &SessionRecord) -> SinkResult<()>;
}

/// Save through `sink`, logging and swallowing failures.
pub async fn persist(sink: &dyn SessionSink, record: &SessionRecord) -> BestEffort<()> {
    let outcome = BestEffort::from_result("save_session", sink.save(record).await);
    if outcome.is_completed() {
        info!(sink = sink.name(), chat_id = %record.chat_id, "session saved");
    }
    outcome
}

/// In-memory sink.
///
/// Keeps every record in arrival order. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: RwLock<Vec<SessionRecord>>,
}

impl MemorySink {
    /// Create a new memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records saved so far.
    pub async fn records(&self) -> Vec<SessionRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl SessionSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn save(&self, record: &SessionRecord) -> SinkResult<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

/// File-based sink.
///
/// Writes each record as a pretty JSON file named after its chat id.
#[derive(Debug)]
pub struct FileSink {
    base_path: PathBuf,
}

impl FileSink {
    /// Create a new file sink rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Path of the file holding the record for `chat_id`.
    #[must_use]
    pub fn record_path(&self, chat_id: &str) -> PathBuf {
        let safe_id = chat_id.replace([':', '/', '\\'], "_");
        self.base_path.join(format!("{safe_id}.json"))
    }

    /// Load a previously saved record.
    pub async fn load(&self, chat_id: &str) -> SinkResult<Option<SessionRecord>> {
        let path = self.record_path(chat_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

#[async_trait]
impl SessionSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn save(&self, record: &SessionRecord) -> SinkResult<()> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        let path = self.record_path(&record.chat_id);
        let content = record.to_json_pretty()?;
        tokio::fs::write(&path, content).await?;
        debug!(chat_id = %record.chat_id, path = %path.display(), "saved session to file");
        Ok(())
    }
}

/// Backend sink.
///
/// POSTs the record JSON to `<base_url>/save-chat`. The backend forwards it
/// to a spreadsheet and reports errors in-band, so a `"status": "error"`
/// body counts as a failure even with HTTP 200.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    /// Create a sink for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    /// Create a sink with a request timeout.
    #[must_use]
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = http_client(timeout);
        Self {
            client,
            endpoint: format!("{}/save-chat", base_url.trim_end_matches('/')),
        }
    }

    /// Full URL records are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SessionSink for HttpSink {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn save(&self, record: &SessionRecord) -> SinkResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| SinkError::remote(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::remote(format!("HTTP {status}")));
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body)
            && json["status"] == "error"
        {
            let message = json["message"].as_str().unwrap_or("unknown error");
            return Err(SinkError::remote(message.to_string()));
        }

        debug!(chat_id = %record.chat_id, "backend accepted session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record() -> SessionRecord {
        SessionRecord {
            client_id: "CLIENT-000001".into(),
            chat_id: "CHAT-00000A".into(),
            client_name: "Ana".into(),
            client_email: String::new(),
            client_phone: String::new(),
            date: "01/01/2025".into(),
            time: "10:00:00 AM".into(),
            transcript_text: "AI: Hi\nAna: Hello".into(),
        }
    }

    /// Sink that always fails.
    struct BrokenSink;

    #[async_trait]
    impl SessionSink for BrokenSink {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn save(&self, _record: &SessionRecord) -> SinkResult<()> {
            Err(SinkError::remote("unreachable"))
        }
    }

    #[tokio::test]
    async fn test_memory_sink() {
        let sink = MemorySink::new();
        assert!(persist(&sink, &record()).await.is_completed());
        assert_eq!(sink.records().await, vec![record()]);
    }

    #[tokio::test]
    async fn test_persist_swallows_failure() {
        let outcome = persist(&BrokenSink, &record()).await;
        assert_eq!(outcome.failure(), Some("remote: unreachable"));
    }

    #[tokio::test]
    async fn test_file_sink() {
        let dir = assert_fs::TempDir::new().unwrap();
        let sink = FileSink::new(dir.path().join("sessions"));

        assert!(sink.load("CHAT-00000A").await.unwrap().is_none());
        sink.save(&record()).await.unwrap();

        let loaded = sink.load("CHAT-00000A").await.unwrap();
        assert_eq!(loaded, Some(record()));
    }

    #[tokio::test]
    async fn test_http_sink_posts_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/save-chat"))
            .and(body_partial_json(serde_json::json!({
                "chatId": "CHAT-00000A",
                "transcriptText": "AI: Hi\nAna: Hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sink = HttpSink::new(&format!("{}/", server.uri()));
        assert_eq!(sink.endpoint(), format!("{}/save-chat", server.uri()));
        sink.save(&record()).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_sink_in_band_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/save-chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "message": "Apps Script URL not configured"
            })))
            .mount(&server)
            .await;

        let sink = HttpSink::new(&server.uri());
        let err = sink.save(&record()).await.unwrap_err();
        assert!(err.to_string().contains("Apps Script URL not configured"));
    }

    #[tokio::test]
    async fn test_http_sink_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let outcome = persist(&HttpSink::new(&server.uri()), &record()).await;
        assert!(!outcome.is_completed());
    }
}
