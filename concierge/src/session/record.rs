//! Immutable snapshot of a finished session.

use super::message::Message;
use super::profile::ClientProfile;
use crate::transcript::format_transcript;
use crate::util::{generate_chat_id, generate_client_id};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Date layout of [`SessionRecord::date`] (`MM/DD/YYYY`).
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Time layout of [`SessionRecord::time`] (`hh:mm:ss AM`).
pub const TIME_FORMAT: &str = "%I:%M:%S %p";

/// The canonical record of one completed session.
///
/// This is the payload sent to the save backend and the source of the
/// downloadable transcript. Absent profile fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Fresh client identifier (`CLIENT-XXXXXX`).
    pub client_id: String,
    /// Fresh chat identifier (`CHAT-XXXXXX`).
    pub chat_id: String,
    /// Guest name, or empty.
    pub client_name: String,
    /// Guest email, or empty.
    pub client_email: String,
    /// Guest phone, or empty.
    pub client_phone: String,
    /// Session start date, `MM/DD/YYYY`.
    pub date: String,
    /// Session start time, `hh:mm:ss AM|PM`.
    pub time: String,
    /// Plain-text transcript.
    pub transcript_text: String,
}

impl SessionRecord {
    /// Snapshot messages and profile into a new record.
    ///
    /// `started_at` is the local wall-clock time the session began. Each call
    /// draws new client and chat identifiers.
    #[must_use]
    pub fn build(messages: &[Message], profile: &ClientProfile, started_at: NaiveDateTime) -> Self {
        let client_name = profile.name().unwrap_or_default();
        Self {
            client_id: generate_client_id(),
            chat_id: generate_chat_id(),
            client_name: client_name.to_string(),
            client_email: profile.email().unwrap_or_default().to_string(),
            client_phone: profile.phone().unwrap_or_default().to_string(),
            date: started_at.format(DATE_FORMAT).to_string(),
            time: started_at.format(TIME_FORMAT).to_string(),
            transcript_text: format_transcript(messages, client_name),
        }
    }

    /// Pretty JSON payload, as shown to operators and posted to the backend.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
