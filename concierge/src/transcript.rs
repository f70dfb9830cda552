//! Transcript text and the downloadable transcript document.

use crate::error::TranscriptError;
use crate::session::{Message, Role, SessionRecord};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sender label for assistant lines.
pub const ASSISTANT_LABEL: &str = "AI";

/// Sender label for guest lines when no name is known.
pub const CLIENT_LABEL: &str = "Client";

const BANNER: &str = "Chat Transcript\n================\n";
const BODY_SEPARATOR: &str = "\n\nTranscript:\n-----------\n";

/// Render messages as `"<Sender>: <content>"` lines joined by `\n`.
///
/// Guest lines use `client_name`, or `Client` when it is empty. There is no
/// trailing newline; an empty slice gives an empty string.
#[must_use]
pub fn format_transcript(messages: &[Message], client_name: &str) -> String {
    let client = if client_name.is_empty() {
        CLIENT_LABEL
    } else {
        client_name
    };
    messages
        .iter()
        .map(|msg| {
            let sender = match msg.role() {
                Role::Assistant => ASSISTANT_LABEL,
                Role::User => client,
            };
            format!("{sender}: {}", msg.content())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// File name of the downloadable transcript, `chat-<chatId>.txt`.
#[must_use]
pub fn download_file_name(record: &SessionRecord) -> String {
    format!("chat-{}.txt", record.chat_id)
}

/// Header values are single lines; line breaks become spaces.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Render the downloadable transcript document.
///
/// Line breaks inside header fields (a phone captured across lines, say)
/// are rendered as spaces so each header stays on one line.
#[must_use]
pub fn render_download(record: &SessionRecord) -> String {
    format!(
        "{BANNER}\
         Client ID: {}\n\
         Chat ID: {}\n\
         Client: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Date: {}\n\
         Time: {}\
         {BODY_SEPARATOR}\
         {}\n",
        header_value(&record.client_id),
        header_value(&record.chat_id),
        header_value(&record.client_name),
        header_value(&record.client_email),
        header_value(&record.client_phone),
        header_value(&record.date),
        header_value(&record.time),
        record.transcript_text,
    )
}

/// Parse a document produced by [`render_download`] back into a record.
///
/// Everything after the transcript separator, minus the final newline, is
/// the transcript text, so multi-line messages survive.
pub fn parse_download(document: &str) -> Result<SessionRecord, TranscriptError> {
    let rest = document
        .strip_prefix(BANNER)
        .ok_or(TranscriptError::MissingBanner)?;
    let (header, body) = rest
        .split_once(BODY_SEPARATOR)
        .ok_or(TranscriptError::MissingBody)?;

    let field = |key: &'static str| -> Result<String, TranscriptError> {
        header
            .lines()
            .find_map(|line| {
                line.strip_prefix(key)
                    .and_then(|v| v.strip_prefix(':'))
                    .map(|v| v.strip_prefix(' ').unwrap_or(v).to_string())
            })
            .ok_or(TranscriptError::MissingHeader(key))
    };

    Ok(SessionRecord {
        client_id: field("Client ID")?,
        chat_id: field("Chat ID")?,
        client_name: field("Client")?,
        client_email: field("Email")?,
        client_phone: field("Phone")?,
        date: field("Date")?,
        time: field("Time")?,
        transcript_text: body.strip_suffix('\n').unwrap_or(body).to_string(),
    })
}

/// Write the transcript document into `dir`, returning the file path.
pub async fn write_download(record: &SessionRecord, dir: &Path) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(download_file_name(record));
    tokio::fs::write(&path, render_download(record)).await?;
    debug!(chat_id = %record.chat_id, path = %path.display(), "transcript written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(transcript: &str) -> SessionRecord {
        SessionRecord {
            client_id: "CLIENT-AB12CD".into(),
            chat_id: "CHAT-9Z8Y7X".into(),
            client_name: "John Smith".into(),
            client_email: "john@example.com".into(),
            client_phone: String::new(),
            date: "11/02/2025".into(),
            time: "09:15:00 AM".into(),
            transcript_text: transcript.into(),
        }
    }

    #[test]
    fn test_format_labels() {
        let messages = vec![
            Message::assistant("Welcome!"),
            Message::user("Hello"),
            Message::assistant("How can I help?"),
        ];
        let text = format_transcript(&messages, "Ana");
        assert_eq!(text, "AI: Welcome!\nAna: Hello\nAI: How can I help?");

        let text = format_transcript(&messages, "");
        assert_eq!(text.lines().nth(1), Some("Client: Hello"));
    }

    #[test]
    fn test_format_line_count_matches_messages() {
        let messages: Vec<_> = (0..5)
            .map(|i| {
                if i % 2 == 0 {
                    Message::assistant(format!("a{i}"))
                } else {
                    Message::user(format!("u{i}"))
                }
            })
            .collect();
        let text = format_transcript(&messages, "Bo");
        assert_eq!(text.lines().count(), messages.len());
        assert!(
            text.lines()
                .all(|l| l.starts_with("AI: ") || l.starts_with("Bo: "))
        );
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_transcript(&[], "Ana"), "");
    }

    #[test]
    fn test_render_layout() {
        let doc = render_download(&record("AI: Hi\nJohn Smith: Hey"));
        assert!(doc.starts_with("Chat Transcript\n================\nClient ID: CLIENT-AB12CD\n"));
        assert!(doc.contains("Phone: \nDate: 11/02/2025\nTime: 09:15:00 AM\n\nTranscript:\n-----------\n"));
        assert!(doc.ends_with("John Smith: Hey\n"));
        assert_eq!(download_file_name(&record("")), "chat-CHAT-9Z8Y7X.txt");
    }

    #[test]
    fn test_render_then_parse() {
        for transcript in ["", "AI: Hi", "AI: Hi\nJohn Smith: line one\nline two\n"] {
            let original = record(transcript);
            let parsed = parse_download(&render_download(&original)).unwrap();
            assert_eq!(parsed.client_id, original.client_id);
            assert_eq!(parsed.chat_id, original.chat_id);
            assert_eq!(parsed.transcript_text, original.transcript_text);
            assert_eq!(parsed, original);
        }
    }

    #[test]
    fn test_multiline_header_stays_on_one_line() {
        let mut rec = record("AI: Hi");
        rec.client_phone = "+1 415\n555-2671".into();
        let doc = render_download(&rec);
        assert!(doc.contains("Phone: +1 415 555-2671\nDate: 11/02/2025\n"));

        let parsed = parse_download(&doc).unwrap();
        assert_eq!(parsed.client_phone, "+1 415 555-2671");
        assert_eq!(parsed.date, "11/02/2025");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_download("hello"),
            Err(TranscriptError::MissingBanner)
        ));
        assert!(matches!(
            parse_download("Chat Transcript\n================\nClient ID: x\n"),
            Err(TranscriptError::MissingBody)
        ));
        assert!(matches!(
            parse_download("Chat Transcript\n================\nClient ID: x\n\nTranscript:\n-----------\n\n"),
            Err(TranscriptError::MissingHeader("Chat ID"))
        ));
    }

    #[tokio::test]
    async fn test_write_download() {
        let dir = assert_fs::TempDir::new().unwrap();
        let rec = record("AI: Hi");
        let path = write_download(&rec, dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "chat-CHAT-9Z8Y7X.txt");
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(parse_download(&content).unwrap(), rec);
    }
}
