//! Small shared helpers: identifiers, timestamps, and well-known paths.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Uppercase base-36 alphabet used for identifier suffixes.
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the random suffix on client and chat identifiers.
pub const ID_SUFFIX_LEN: usize = 6;

/// Prefix of generated client identifiers.
pub const CLIENT_ID_PREFIX: &str = "CLIENT";

/// Prefix of generated chat identifiers.
pub const CHAT_ID_PREFIX: &str = "CHAT";

/// Random uppercase base-36 token of the given length.
#[must_use]
pub fn base36_token(len: usize) -> String {
    (0..len)
        .map(|_| char::from(BASE36[fastrand::usize(..BASE36.len())]))
        .collect()
}

/// Generate an identifier of the form `<PREFIX>-<6 base-36 chars>`.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", base36_token(ID_SUFFIX_LEN))
}

/// Generate a fresh client identifier (`CLIENT-XXXXXX`).
#[must_use]
pub fn generate_client_id() -> String {
    generate_id(CLIENT_ID_PREFIX)
}

/// Generate a fresh chat identifier (`CHAT-XXXXXX`).
#[must_use]
pub fn generate_chat_id() -> String {
    generate_id(CHAT_ID_PREFIX)
}

/// Generate a message identifier (`msg-<unix ms>-<4 chars>`).
#[must_use]
pub fn generate_message_id() -> String {
    format!("msg-{}-{}", timestamp_ms(), base36_token(4).to_lowercase())
}

/// Current Unix time in milliseconds.
#[must_use]
pub fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// HTTP client with a request timeout.
///
/// If the builder fails, the failure is logged and a default client without
/// the timeout is returned.
///
/// # Panics
///
/// Panics if the default client cannot be built either.
#[must_use]
pub fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, ?timeout, "http client build failed, using defaults without timeout");
            reqwest::Client::new()
        }
    }
}

/// User home directory, falling back to the working directory.
#[must_use]
pub fn home_dir() -> PathBuf {
    dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Root directory for concierge state (`~/.concierge`).
#[must_use]
pub fn config_dir() -> PathBuf {
    home_dir().join(".concierge")
}

/// Default directory for persisted session records.
#[must_use]
pub fn sessions_dir() -> PathBuf {
    config_dir().join("sessions")
}

/// Default directory for downloaded transcripts.
#[must_use]
pub fn downloads_dir() -> PathBuf {
    config_dir().join("downloads")
}
