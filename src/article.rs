// Article record and the naming rules that turn it into a storage key.

use crate::error::{BlogError, BlogResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Directory used when no `--path` (or editor path) is given.
pub const DEFAULT_PATH: &str = "articles";

/// Length of freshly minted ids.
pub const ID_LEN: usize = 12;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One blog article exactly as persisted in `<path>/<id>.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub publish_date: String,
    pub content: String,
    /// Directory the record was written under. Informational only: the
    /// key is always derived from the directory the caller addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Article {
    /// Build a new record with a fresh id and today's date.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Article {
            id: mint_id(),
            title: title.into(),
            publish_date: today(),
            content: content.into(),
            path: None,
        }
    }

    /// Storage key of this article under `dir`.
    pub fn key(&self, dir: &str) -> BlogResult<String> {
        article_key(dir, &self.id)
    }
}

/// Random base-36 identifier. Not collision-checked.
pub fn mint_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Current UTC calendar date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// `<dir>/<id>.json`, after validating both parts.
pub fn article_key(dir: &str, id: &str) -> BlogResult<String> {
    let dir = normalize_path(dir)?;
    validate_id(id)?;
    Ok(format!("{}/{}.json", dir, id))
}

/// Trim surrounding slashes and reject empty, `.` or `..` segments.
pub fn normalize_path(dir: &str) -> BlogResult<String> {
    let trimmed = dir.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(BlogError::validation("storage path must not be empty"));
    }
    if trimmed
        .split('/')
        .any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return Err(BlogError::validation(format!(
            "invalid storage path '{}'",
            dir
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_id(id: &str) -> BlogResult<()> {
    if id.trim().is_empty() {
        return Err(BlogError::validation("article id must not be empty"));
    }
    if id.contains('/') || id.contains('\\') {
        return Err(BlogError::validation(format!("invalid article id '{}'", id)));
    }
    Ok(())
}
