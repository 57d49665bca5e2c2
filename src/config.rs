// Connection settings for the remote content store. Built once at process
// start and handed to the API client; nothing reads the environment after
// that.

use crate::error::{BlogError, BlogResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BRANCH: &str = "main";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub token: Option<String>,
}

/// Shape of the optional JSON config file. Every field may be omitted.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub token: Option<String>,
}

impl FileConfig {
    /// Read a config file. A missing file yields the empty config.
    pub fn load(path: &Path) -> BlogResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|e| {
            BlogError::validation(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            BlogError::validation(format!("invalid config {}: {}", path.display(), e))
        })
    }
}

/// `<config dir>/repoblog/config.json`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("repoblog").join("config.json"))
}

impl Config {
    /// Load the config file (explicit path or the default location) and
    /// apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> BlogResult<Self> {
        let file = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                FileConfig::load(&path)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merge defaults, file values and variables from `env` (highest wins).
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> BlogResult<Self> {
        let pick = |var: &str, from_file: Option<String>| {
            env(var).filter(|v| !v.trim().is_empty()).or(from_file)
        };

        let owner = pick("REPOBLOG_OWNER", file.owner)
            .ok_or_else(|| BlogError::validation("repository owner is not configured (REPOBLOG_OWNER)"))?;
        let repo = pick("REPOBLOG_REPO", file.repo)
            .ok_or_else(|| BlogError::validation("repository name is not configured (REPOBLOG_REPO)"))?;
        let api_url = pick("REPOBLOG_API_URL", file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let branch = pick("REPOBLOG_BRANCH", file.branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.into());
        let token = env("MY_GITHUB_TOKEN")
            .or_else(|| env("GITHUB_TOKEN"))
            .filter(|t| !t.trim().is_empty())
            .or(file.token);

        Ok(Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            owner,
            repo,
            branch,
            token,
        })
    }
}
