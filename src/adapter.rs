// Article-level storage on top of a `ContentStore`: JSON + base64 codec,
// key derivation, and the read / create / read-modify-write / delete
// sequences shared by the viewer, the editor and the CLI operator.

use crate::article::{article_key, normalize_path, Article};
use crate::error::{BlogError, BlogResult};
use crate::store::{decode_content, encode_content, ContentStore, DirEntry};
use std::thread;

/// Upper bound on concurrent detail fetches while listing.
pub const MAX_CONCURRENT_FETCHES: usize = 8;

/// An article together with the revision marker it was read at.
#[derive(Debug, Clone)]
pub struct Revisioned {
    pub article: Article,
    pub sha: String,
}

/// Serialize an article into the base64 body the store expects.
pub fn encode_article(article: &Article) -> BlogResult<String> {
    let json = serde_json::to_vec(article)?;
    Ok(encode_content(&json))
}

/// Decode a base64 body back into an article.
pub fn decode_article(content: &str) -> BlogResult<Article> {
    let bytes = decode_content(content)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub struct ArticleStore<S> {
    store: S,
}

impl<S: ContentStore> ArticleStore<S> {
    pub fn new(store: S) -> Self {
        ArticleStore { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Every article under `dir`, in listing order.
    ///
    /// Detail fetches run concurrently. An entry that fails to fetch or to
    /// parse is logged and skipped; only a failed listing fails the call.
    /// A directory that does not exist yet lists as empty.
    #[tracing::instrument(skip(self))]
    pub fn list(&self, dir: &str) -> BlogResult<Vec<Article>> {
        let dir = normalize_path(dir)?;
        let entries = match self.store.list(&dir) {
            Ok(entries) => entries,
            Err(BlogError::NotFound(_)) => {
                tracing::info!(dir = %dir, "Article directory does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        let files: Vec<&DirEntry> = entries.iter().filter(|e| e.is_json_file()).collect();

        let mut articles = Vec::with_capacity(files.len());
        for chunk in files.chunks(MAX_CONCURRENT_FETCHES) {
            let results: Vec<(&DirEntry, BlogResult<Article>)> = thread::scope(|scope| {
                let handles: Vec<_> = chunk
                    .iter()
                    .map(|entry| (*entry, scope.spawn(move || self.fetch_entry(entry))))
                    .collect();
                handles
                    .into_iter()
                    .map(|(entry, handle)| {
                        let result = handle.join().unwrap_or_else(|_| {
                            Err(BlogError::Transient(format!("fetch of {} panicked", entry.path)))
                        });
                        (entry, result)
                    })
                    .collect()
            });
            for (entry, result) in results {
                match result {
                    Ok(article) => articles.push(article),
                    Err(e) => tracing::warn!(path = %entry.path, error = %e, "Skipping article"),
                }
            }
        }
        tracing::debug!(count = articles.len(), "Listed articles");
        Ok(articles)
    }

    fn fetch_entry(&self, entry: &DirEntry) -> BlogResult<Article> {
        let bytes = self.store.fetch_raw(entry)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// One article, or `NotFound`.
    pub fn get(&self, dir: &str, id: &str) -> BlogResult<Article> {
        Ok(self.load(dir, id)?.article)
    }

    /// One article plus the revision it was read at.
    pub fn load(&self, dir: &str, id: &str) -> BlogResult<Revisioned> {
        let key = article_key(dir, id)?;
        let blob = self.store.read(&key)?;
        Ok(Revisioned {
            article: decode_article(&blob.content)?,
            sha: blob.sha,
        })
    }

    /// Write a brand-new article at `<dir>/<id>.json`. Returns the key.
    #[tracing::instrument(skip(self, article), fields(id = %article.id))]
    pub fn create(&self, dir: &str, article: &Article) -> BlogResult<String> {
        let key = article.key(dir)?;
        let content = encode_article(article)?;
        self.store.write(
            &key,
            &content,
            &format!("Publish article: {}", article.title),
            None,
        )?;
        tracing::info!(key = %key, "Published article");
        Ok(key)
    }

    /// Read-modify-write. Only the supplied fields change; the write is
    /// conditional on the revision observed by the read. Returns the key
    /// written and the merged record.
    #[tracing::instrument(skip(self, title, content))]
    pub fn update(
        &self,
        dir: &str,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> BlogResult<(String, Article)> {
        let key = article_key(dir, id)?;
        let Revisioned { mut article, sha } = self.load(dir, id)?;
        if let Some(title) = title {
            article.title = title.to_string();
        }
        if let Some(content) = content {
            article.content = content.to_string();
        }
        let encoded = encode_article(&article)?;
        self.store.write(
            &key,
            &encoded,
            &format!("Update article: {}", article.title),
            Some(&sha),
        )?;
        tracing::info!(key = %key, "Updated article");
        Ok((key, article))
    }

    /// Resolve the current revision, then delete at exactly that revision.
    #[tracing::instrument(skip(self))]
    pub fn remove(&self, dir: &str, id: &str) -> BlogResult<String> {
        let key = article_key(dir, id)?;
        let blob = self.store.read(&key)?;
        self.store
            .delete(&key, &format!("Delete article: {}", key), &blob.sha)?;
        tracing::info!(key = %key, "Deleted article");
        Ok(key)
    }
}
