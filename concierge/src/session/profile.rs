//! Guest contact details gathered during a session.

use super::message::Message;
use crate::extract::{Extraction, FieldExtractor};
use serde::{Deserialize, Serialize};

/// Best-effort contact fields for the guest.
///
/// Every field is write-once: the first candidate seen wins and later
/// candidates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl ClientProfile {
    /// Create an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Guest name, if found.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Guest email, if found.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Guest phone, if found.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Whether all three fields are known.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.name.is_some() && self.email.is_some() && self.phone.is_some()
    }

    /// Name to show for the guest, or `fallback` when unknown.
    #[must_use]
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }

    /// Fold an extraction into the profile, filling only unset fields.
    #[must_use]
    pub fn apply(self, found: &Extraction) -> Self {
        Self {
            name: self.name.or_else(|| found.name.clone()),
            email: self.email.or_else(|| found.email.clone()),
            phone: self.phone.or_else(|| found.phone.clone()),
        }
    }

    /// Fold a message into the profile.
    ///
    /// Assistant messages are ignored, as is extraction once every field is
    /// already set.
    #[must_use]
    pub fn observe(self, msg: &Message, extractor: &dyn FieldExtractor) -> Self {
        if !msg.is_user() || self.is_complete() {
            return self;
        }
        let found = extractor.extract(msg.content());
        self.apply(&found)
    }
}
