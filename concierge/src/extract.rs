//! Client contact extraction from free text.
//!
//! [`PatternExtractor`] is a regex heuristic, not a parser. It favours
//! capture over precision:
//!
//! - the phone pattern accepts most digit groups ending in 3-4 digits, so
//!   room numbers, dates, or prices can be captured as a phone;
//! - the name pattern takes the first one or two capitalised words, and is
//!   not filtered against the email or phone match, so a greeting such as
//!   `"Hi"` or a capitalised word inside an address can become the name.
//!
//! Both are kept as-is; swap in another [`FieldExtractor`] for anything
//! smarter.
//!
//! All three patterns are ASCII-only (`(?-u)`): letters, digits, whitespace
//! and word boundaries never match outside ASCII.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i-u)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)(\+?\d{1,3}[-.\s]?)?(\(?\d{2,4}\)?[-.\s]?){1,2}\d{3,4}")
        .expect("valid phone regex")
});

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)\b[A-Z][a-z]+(?:\s[A-Z][a-z]+)?\b").expect("valid name regex")
});

/// Fields found in one message. `None` means no candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Candidate guest name.
    pub name: Option<String>,
    /// Candidate email address.
    pub email: Option<String>,
    /// Candidate phone number.
    pub phone: Option<String>,
}

impl Extraction {
    /// Whether nothing was found.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Pulls contact fields out of a single message.
pub trait FieldExtractor: Send + Sync {
    /// Extract every candidate field from `text`.
    fn extract(&self, text: &str) -> Extraction;
}

/// Regex-backed extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    /// Create a new pattern extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// First email-looking substring.
    #[must_use]
    pub fn email(text: &str) -> Option<&str> {
        EMAIL_RE.find(text).map(|m| m.as_str())
    }

    /// First phone-looking substring.
    #[must_use]
    pub fn phone(text: &str) -> Option<&str> {
        PHONE_RE.find(text).map(|m| m.as_str())
    }

    /// First one- or two-word capitalised sequence.
    #[must_use]
    pub fn name(text: &str) -> Option<&str> {
        NAME_RE.find(text).map(|m| m.as_str())
    }
}

impl FieldExtractor for PatternExtractor {
    fn extract(&self, text: &str) -> Extraction {
        Extraction {
            name: Self::name(text).map(String::from),
            email: Self::email(text).map(String::from),
            phone: Self::phone(text).map(String::from),
        }
    }
}
