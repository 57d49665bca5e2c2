// API client module: a small blocking HTTP client for the repository
// "contents" endpoints of the hosting API. Every article lives as one JSON
// file in the repository, so the whole database surface is list / read /
// write / delete of files on a single branch.

use crate::config::Config;
use crate::error::{BlogError, BlogResult};
use crate::store::{ContentStore, DirEntry, FileBlob};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = concat!("repoblog/", env!("CARGO_PKG_VERSION"));

/// Client bound to one repository and branch. Holds the reqwest blocking
/// client, the API base URL and the optional access token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    owner: String,
    repo: String,
    branch: String,
    token: Option<String>,
}

/// Body of a create-or-update request.
#[derive(Serialize, Debug)]
pub struct PutFileRequest<'a> {
    pub message: &'a str,
    pub content: &'a str,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

/// Body of a delete request.
#[derive(Serialize, Debug)]
pub struct DeleteFileRequest<'a> {
    pub message: &'a str,
    pub sha: &'a str,
    pub branch: &'a str,
}

/// The part of a write response we use: the new blob revision.
#[derive(Deserialize, Debug)]
struct PutFileResponse {
    content: CommittedFile,
}

#[derive(Deserialize, Debug)]
struct CommittedFile {
    sha: String,
}

impl ApiClient {
    /// Build a client from resolved configuration.
    pub fn new(config: &Config) -> BlogResult<Self> {
        let base_url = Url::parse(&config.api_url).map_err(|e| {
            BlogError::validation(format!("invalid API url '{}': {}", config.api_url, e))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(ApiClient {
            client,
            base_url,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            token: config.token.clone(),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// `{base}/repos/{owner}/{repo}/contents/{key}`; each key segment is
    /// percent-encoded separately.
    fn contents_url(&self, key: &str) -> BlogResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BlogError::validation(format!("API url '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
            .extend(key.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Attach the bearer token when one is configured.
    fn authorized(&self, req: RequestBuilder) -> BlogResult<RequestBuilder> {
        match &self.token {
            Some(t) => {
                let val = HeaderValue::from_str(&format!("Bearer {}", t))
                    .map_err(|_| BlogError::validation("access token contains invalid characters"))?;
                Ok(req.header(AUTHORIZATION, val))
            }
            None => Ok(req),
        }
    }

    fn send(&self, req: RequestBuilder, key: &str) -> BlogResult<Response> {
        let res = self.authorized(req)?.send()?;
        check_status(res, key)
    }
}

/// Map a non-success status onto the error taxonomy. 409, and a 422 that
/// complains about the `sha`, mean the revision marker was stale; any other
/// 422 is a rejected request like every other non-2xx.
pub fn status_error(status: StatusCode, key: &str, body: &str) -> BlogError {
    match status {
        StatusCode::NOT_FOUND => BlogError::NotFound(key.to_string()),
        StatusCode::CONFLICT => BlogError::Conflict(format!("{} ({})", key, status)),
        StatusCode::UNPROCESSABLE_ENTITY if body.contains("sha") => {
            BlogError::Conflict(format!("{} ({})", key, status))
        }
        _ => BlogError::Transient(format!("{} - {}", status, body)),
    }
}

fn check_status(res: Response, key: &str) -> BlogResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let txt = res.text().unwrap_or_else(|_| "".into());
    tracing::debug!(%status, key, body = %txt, "Remote store rejected request");
    Err(status_error(status, key, &txt))
}

impl ContentStore for ApiClient {
    fn list(&self, dir: &str) -> BlogResult<Vec<DirEntry>> {
        let url = self.contents_url(dir)?;
        tracing::debug!(%url, "Listing directory");
        let res = self.send(self.client.get(url).query(&[("ref", &self.branch)]), dir)?;
        let body: serde_json::Value = res.json()?;
        if !body.is_array() {
            return Err(BlogError::Transient(format!("{} is not a directory", dir)));
        }
        Ok(serde_json::from_value(body)?)
    }

    fn read(&self, key: &str) -> BlogResult<FileBlob> {
        let url = self.contents_url(key)?;
        tracing::debug!(%url, "Reading file");
        let res = self.send(self.client.get(url).query(&[("ref", &self.branch)]), key)?;
        Ok(res.json()?)
    }

    fn fetch_raw(&self, entry: &DirEntry) -> BlogResult<Vec<u8>> {
        match &entry.download_url {
            Some(link) => {
                tracing::debug!(url = %link, "Downloading file");
                let res = self.send(self.client.get(link), &entry.path)?;
                Ok(res.bytes()?.to_vec())
            }
            None => self.read(&entry.path)?.decode(),
        }
    }

    fn write(&self, key: &str, content: &str, message: &str, sha: Option<&str>) -> BlogResult<String> {
        let url = self.contents_url(key)?;
        let body = PutFileRequest {
            message,
            content,
            branch: &self.branch,
            sha,
        };
        tracing::debug!(%url, update = sha.is_some(), "Writing file");
        let res = self.send(self.client.put(url).json(&body), key)?;
        let committed: PutFileResponse = res.json()?;
        Ok(committed.content.sha)
    }

    fn delete(&self, key: &str, message: &str, sha: &str) -> BlogResult<()> {
        let url = self.contents_url(key)?;
        let body = DeleteFileRequest {
            message,
            sha,
            branch: &self.branch,
        };
        tracing::debug!(%url, "Deleting file");
        self.send(self.client.delete(url).json(&body), key)?;
        Ok(())
    }
}
