// Remote content store seam. `ContentStore` mirrors the file-level shape of
// the hosting API (directory listing, base64 blobs keyed by path, a revision
// marker per file) so the article adapter can run against the real HTTP
// client or an in-process double.

use crate::error::{BlogError, BlogResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// One item of a directory listing.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    /// `"file"` or `"dir"`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl DirEntry {
    pub fn is_json_file(&self) -> bool {
        self.kind == "file" && self.name.ends_with(".json")
    }
}

/// A file as returned by a contents read: base64 body plus revision marker.
#[derive(Deserialize, Debug, Clone)]
pub struct FileBlob {
    pub content: String,
    pub sha: String,
}

impl FileBlob {
    pub fn decode(&self) -> BlogResult<Vec<u8>> {
        decode_content(&self.content)
    }
}

/// File-level operations against the remote store.
///
/// `read`, `write` and `delete` must report a missing key as
/// [`BlogError::NotFound`] and a stale or missing revision as
/// [`BlogError::Conflict`].
pub trait ContentStore: Send + Sync {
    fn list(&self, dir: &str) -> BlogResult<Vec<DirEntry>>;

    fn read(&self, key: &str) -> BlogResult<FileBlob>;

    /// Raw bytes of a listed file. Stores with a direct download link
    /// override this; the default goes through `read`.
    fn fetch_raw(&self, entry: &DirEntry) -> BlogResult<Vec<u8>> {
        self.read(&entry.path)?.decode()
    }

    /// Create (`sha == None`) or replace (`sha == Some(current)`) a file.
    /// Returns the new revision marker.
    fn write(&self, key: &str, content: &str, message: &str, sha: Option<&str>)
        -> BlogResult<String>;

    fn delete(&self, key: &str, message: &str, sha: &str) -> BlogResult<()>;
}

pub fn encode_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 body, ignoring the line wrapping the hosting API adds.
pub fn decode_content(content: &str) -> BlogResult<Vec<u8>> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

#[derive(Debug, Clone)]
struct MemFile {
    content: String,
    sha: String,
}

/// In-process store with the same revision rules as the hosting API.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<String, MemFile>>,
    failing: Mutex<HashSet<String>>,
    revisions: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `fetch_raw` fail for `key` with a transient error.
    pub fn fail_fetches_of(&self, key: &str) {
        lock(&self.failing).insert(key.to_string());
    }

    /// Number of successful `write` and `delete` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.files).contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        lock(&self.files).keys().cloned().collect()
    }

    fn next_sha(&self) -> String {
        let n = self.revisions.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{:040x}", n)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ContentStore for MemoryStore {
    fn list(&self, dir: &str) -> BlogResult<Vec<DirEntry>> {
        let prefix = format!("{}/", dir.trim_matches('/'));
        let files = lock(&self.files);
        let mut entries = Vec::new();
        let mut subdirs = BTreeSet::new();
        for key in files.keys().filter(|k| k.starts_with(&prefix)) {
            let rest = &key[prefix.len()..];
            match rest.split_once('/') {
                Some((sub, _)) => {
                    subdirs.insert(sub.to_string());
                }
                None => entries.push(DirEntry {
                    name: rest.to_string(),
                    path: key.clone(),
                    kind: "file".into(),
                    download_url: Some(format!("memory://{}", key)),
                }),
            }
        }
        if entries.is_empty() && subdirs.is_empty() {
            return Err(BlogError::NotFound(dir.to_string()));
        }
        entries.extend(subdirs.into_iter().map(|sub| DirEntry {
            path: format!("{}{}", prefix, sub),
            name: sub,
            kind: "dir".into(),
            download_url: None,
        }));
        Ok(entries)
    }

    fn read(&self, key: &str) -> BlogResult<FileBlob> {
        lock(&self.files)
            .get(key)
            .map(|f| FileBlob {
                content: f.content.clone(),
                sha: f.sha.clone(),
            })
            .ok_or_else(|| BlogError::NotFound(key.to_string()))
    }

    fn fetch_raw(&self, entry: &DirEntry) -> BlogResult<Vec<u8>> {
        if lock(&self.failing).contains(&entry.path) {
            return Err(BlogError::Transient(format!("fetch of {} failed", entry.path)));
        }
        self.read(&entry.path)?.decode()
    }

    fn write(
        &self,
        key: &str,
        content: &str,
        _message: &str,
        sha: Option<&str>,
    ) -> BlogResult<String> {
        let mut files = lock(&self.files);
        match (files.get(key), sha) {
            (Some(existing), Some(sha)) if existing.sha == sha => {}
            (None, None) => {}
            (None, Some(_)) => return Err(BlogError::NotFound(key.to_string())),
            _ => return Err(BlogError::Conflict(key.to_string())),
        }
        let sha = self.next_sha();
        files.insert(
            key.to_string(),
            MemFile {
                content: content.to_string(),
                sha: sha.clone(),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(sha)
    }

    fn delete(&self, key: &str, _message: &str, sha: &str) -> BlogResult<()> {
        let mut files = lock(&self.files);
        match files.get(key) {
            None => return Err(BlogError::NotFound(key.to_string())),
            Some(existing) if existing.sha != sha => {
                return Err(BlogError::Conflict(key.to_string()))
            }
            Some(_) => {}
        }
        files.remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
