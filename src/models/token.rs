use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque bearer credential used to authenticate API calls.
///
/// The value is never printed through `Debug`, so tokens can flow through
/// `tracing` fields and error messages without leaking.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string. Empty or whitespace-only strings are not tokens.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(AccessToken(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value of an `Authorization` header carrying this token.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(AccessToken::new("").is_none());
        assert!(AccessToken::new("   ").is_none());
    }

    #[test]
    fn test_bearer_header_format() {
        let token = AccessToken::new("abc.def").unwrap();
        assert_eq!(token.bearer_header(), "Bearer abc.def");
    }

    #[test]
    fn test_debug_does_not_leak_value() {
        let token = AccessToken::new("secret-value").unwrap();
        let printed = format!("{:?}", token);
        assert!(!printed.contains("secret-value"));
    }
}
