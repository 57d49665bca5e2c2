// Command-line operator: maps the flag bag onto one validated request and
// runs it against the article store. Validation never touches the network;
// the binary turns any error into exit status 1.

use crate::adapter::ArticleStore;
use crate::article::{normalize_path, validate_id, Article, DEFAULT_PATH};
use crate::error::{BlogError, BlogResult};
use crate::store::ContentStore;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Publish,
    Update,
    Delete,
    List,
    Show,
    Edit,
}

impl FromStr for Action {
    type Err = BlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(Action::Publish),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "list" => Ok(Action::List),
            "show" => Ok(Action::Show),
            "edit" => Ok(Action::Edit),
            other => Err(BlogError::validation(format!("invalid action '{}'", other))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Publish => "publish",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::List => "list",
            Action::Show => "show",
            Action::Edit => "edit",
        };
        f.write_str(name)
    }
}

/// Raw flag values. Empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub action: Option<String>,
    pub article_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub path: Option<String>,
}

/// A fully validated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Publish {
        dir: String,
        title: String,
        content: String,
    },
    Update {
        dir: String,
        id: String,
        title: Option<String>,
        content: Option<String>,
    },
    Delete {
        dir: String,
        id: String,
    },
    List {
        dir: String,
    },
    Show {
        dir: String,
        id: String,
    },
    Edit {
        dir: String,
        id: String,
    },
}

/// What a completed request produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    Published { key: String, article: Article },
    Updated { key: String, article: Article },
    Deleted { key: String },
    Listed(Vec<Article>),
    Shown(Article),
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required_id(id: Option<String>, action: Action) -> BlogResult<String> {
    let id = present(id)
        .ok_or_else(|| BlogError::validation(format!("{} requires --articleId", action)))?;
    validate_id(&id)?;
    Ok(id)
}

impl Request {
    pub fn from_options(opts: Options) -> BlogResult<Self> {
        let action: Action = present(opts.action)
            .ok_or_else(|| BlogError::validation("missing --action"))?
            .parse()?;
        let dir = normalize_path(
            present(opts.path).as_deref().unwrap_or(DEFAULT_PATH),
        )?;
        let title = present(opts.title);
        let content = present(opts.content);

        Ok(match action {
            Action::Publish => match (title, content) {
                (Some(title), Some(content)) => Request::Publish {
                    dir,
                    title,
                    content,
                },
                _ => {
                    return Err(BlogError::validation(
                        "publishing requires both --title and --content",
                    ))
                }
            },
            Action::Update => {
                let id = required_id(opts.article_id, action)?;
                if title.is_none() && content.is_none() {
                    return Err(BlogError::validation(
                        "update requires --title or --content",
                    ));
                }
                Request::Update {
                    dir,
                    id,
                    title,
                    content,
                }
            }
            Action::Delete => Request::Delete {
                id: required_id(opts.article_id, action)?,
                dir,
            },
            Action::List => Request::List { dir },
            Action::Show => Request::Show {
                id: required_id(opts.article_id, action)?,
                dir,
            },
            Action::Edit => Request::Edit {
                id: required_id(opts.article_id, action)?,
                dir,
            },
        })
    }

    /// Whether running this request commits to the repository (the
    /// interactive session can save and delete).
    pub fn writes(&self) -> bool {
        !matches!(self, Request::List { .. } | Request::Show { .. })
    }
}

/// Run a non-interactive request.
pub fn execute<S: ContentStore>(articles: &ArticleStore<S>, request: &Request) -> BlogResult<Outcome> {
    tracing::debug!(?request, "Executing request");
    match request {
        Request::Publish {
            dir,
            title,
            content,
        } => {
            let mut article = Article::new(title.as_str(), content.as_str());
            article.path = Some(dir.clone());
            let key = articles.create(dir, &article)?;
            Ok(Outcome::Published { key, article })
        }
        Request::Update {
            dir,
            id,
            title,
            content,
        } => {
            let (key, article) =
                articles.update(dir, id, title.as_deref(), content.as_deref())?;
            Ok(Outcome::Updated { key, article })
        }
        Request::Delete { dir, id } => Ok(Outcome::Deleted {
            key: articles.remove(dir, id)?,
        }),
        Request::List { dir } => Ok(Outcome::Listed(articles.list(dir)?)),
        Request::Show { dir, id } => Ok(Outcome::Shown(articles.get(dir, id)?)),
        Request::Edit { .. } => Err(BlogError::validation(
            "the edit action needs an interactive terminal session",
        )),
    }
}
