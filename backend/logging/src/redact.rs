//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens, phone numbers and email local parts from
//! strings prior to logging. Chat logins are masked before they get here.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(AIza[0-9A-Za-z\-_]{35})|(hf_[A-Za-z0-9]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)|([?&]key=[^&\s]+)").unwrap()
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@([A-Za-z0-9.\-]+\.[A-Za-z]{2,})").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    // Keys first so a `?key=` query is not half-eaten by the phone pattern.
    let mut redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]").to_string();
    redacted = EMAIL_RE.replace_all(&redacted, "[REDACTED]@$1").to_string();
    redacted = TELEPHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]").to_string();

    redacted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Sending to +1-555-123-4567 with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("+1-555-123-4567"));
        assert!(!clean.contains("Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
    }

    #[test]
    fn test_email_keeps_domain() {
        let clean = redact_sensitive_data("login from guest.user@example.com");
        assert_eq!(clean, "login from [REDACTED]@example.com");
    }

    #[test]
    fn test_ordinary_sentences_untouched() {
        assert_eq!(redact_sensitive_data("I am very happy today"), "I am very happy today");
        assert_eq!(redact_sensitive_data("I am Shreyash ****"), "I am Shreyash ****");
    }

    #[test]
    fn test_gemini_key_in_url() {
        let clean = redact_sensitive_data("POST /v1beta/models/m:generateContent?key=abc123 failed");
        assert!(!clean.contains("abc123"));
    }
}
