// Error taxonomy shared by the storage adapter, the viewer, the editor and
// the command-line operator. The binary wraps these in `anyhow` for context;
// the library always returns `BlogResult`.

use thiserror::Error;

/// Every failure the blog can report.
#[derive(Debug, Error)]
pub enum BlogError {
    /// The requested article or storage key does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or malformed input, detected before any network call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The store rejected a write because the revision marker was stale.
    #[error("revision conflict on {0}")]
    Conflict(String),

    /// Non-success response, network failure or undecodable payload.
    #[error("remote store failure: {0}")]
    Transient(String),
}

pub type BlogResult<T> = Result<T, BlogError>;

impl BlogError {
    pub fn validation(message: impl Into<String>) -> Self {
        BlogError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogError::NotFound(_))
    }
}

impl From<reqwest::Error> for BlogError {
    fn from(e: reqwest::Error) -> Self {
        BlogError::Transient(e.to_string())
    }
}

impl From<serde_json::Error> for BlogError {
    fn from(e: serde_json::Error) -> Self {
        BlogError::Transient(format!("malformed JSON: {}", e))
    }
}

impl From<base64::DecodeError> for BlogError {
    fn from(e: base64::DecodeError) -> Self {
        BlogError::Transient(format!("malformed base64 content: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        assert!(BlogError::NotFound("articles/x.json".into()).is_not_found());
        assert!(!BlogError::Transient("502".into()).is_not_found());
    }

    #[test]
    fn messages_carry_detail() {
        let err = BlogError::validation("title is required");
        assert_eq!(err.to_string(), "invalid input: title is required");
    }
}
