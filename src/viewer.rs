// Viewer: turns stored articles into the fragments the index and detail
// pages expose, and degrades every failure into a transient banner instead
// of an error.

use crate::adapter::ArticleStore;
use crate::article::{validate_id, Article};
use crate::error::{BlogError, BlogResult};
use crate::store::ContentStore;
use comrak::ComrakOptions;
use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;
use std::time::Duration;

/// How long a banner stays on screen.
pub const BANNER_TTL: Duration = Duration::from_secs(3);

/// Preview length in characters, before the ellipsis.
pub const PREVIEW_CHARS: usize = 150;

pub const DETAIL_PAGE: &str = "/article-detail.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// A self-dismissing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub ttl: Duration,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Banner {
            kind: BannerKind::Success,
            message: message.into(),
            ttl: BANNER_TTL,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Banner {
            kind: BannerKind::Error,
            message: message.into(),
            ttl: BANNER_TTL,
        }
    }

    pub fn is_expired(&self, elapsed: Duration) -> bool {
        elapsed >= self.ttl
    }
}

/// Rendered page body plus an optional banner. Loading a page never fails;
/// failures show up as an empty body and an error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub body: String,
    pub banner: Option<Banner>,
}

/// The three detail-page slots: `#article-title`, `#publish-date`,
/// `#article-content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFragments {
    pub title: String,
    pub publish_date: String,
    pub content_html: String,
}

fn markdown_options() -> ComrakOptions {
    let mut option = ComrakOptions::default();
    option.extension.strikethrough = true;
    option.extension.footnotes = true;
    option.extension.autolink = true;
    option.extension.table = true;
    option.render.unsafe_ = true;
    option
}

fn tag_regex() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

pub fn markdown_to_html(markdown: &str) -> String {
    comrak::markdown_to_html(markdown, &markdown_options())
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain-text teaser: rendered content without tags, whitespace collapsed,
/// cut at `PREVIEW_CHARS`.
pub fn preview(content: &str) -> String {
    let html = markdown_to_html(content);
    let text = tag_regex().replace_all(&html, " ");
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"");
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= PREVIEW_CHARS {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut.trim_end())
    }
}

pub fn detail_link(id: &str) -> String {
    format!("{}?id={}", DETAIL_PAGE, id)
}

/// Body of `#articles-container`.
pub fn render_index(articles: &[Article]) -> String {
    let mut html = String::new();
    for article in articles {
        html.push_str(&format!(
            concat!(
                "<div class=\"article-item\">\n",
                "  <h2>{title}</h2>\n",
                "  <p class=\"publish-date\">Published: {date}</p>\n",
                "  <p>{preview}</p>\n",
                "  <a href=\"{link}\" class=\"read-more\">Read more</a>\n",
                "</div>\n"
            ),
            title = escape_html(&article.title),
            date = escape_html(&article.publish_date),
            preview = escape_html(&preview(&article.content)),
            link = escape_html(&detail_link(&article.id)),
        ));
    }
    html
}

pub fn render_detail(article: &Article) -> DetailFragments {
    DetailFragments {
        title: article.title.clone(),
        publish_date: format!("Published: {}", article.publish_date),
        content_html: markdown_to_html(&article.content),
    }
}

impl DetailFragments {
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                "<h1 id=\"article-title\">{}</h1>\n",
                "<p id=\"publish-date\">{}</p>\n",
                "<div id=\"article-content\">\n{}</div>\n"
            ),
            escape_html(&self.title),
            escape_html(&self.publish_date),
            self.content_html
        )
    }
}

/// Terminal rendering of the index: one line per article.
pub fn render_index_text(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|a| format!("{}  {}  {}\n", a.id, a.publish_date, a.title))
        .collect()
}

/// Terminal rendering of one article.
pub fn render_detail_text(article: &Article) -> String {
    format!(
        "{}\nPublished: {}\n\n{}\n",
        article.title, article.publish_date, article.content
    )
}

/// The `id` query parameter of a detail-page URL (absolute, or just a
/// path plus query string).
pub fn article_id_from_url(link: &str) -> BlogResult<String> {
    let url = Url::parse(link)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(link)))
        .map_err(|_| BlogError::validation("invalid article id"))?;
    let id = url
        .query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BlogError::validation("invalid article id"))?;
    validate_id(&id)?;
    Ok(id)
}

/// Index page: listing rendered into `#articles-container`.
pub fn index_page<S: ContentStore>(articles: &ArticleStore<S>, dir: &str) -> Page {
    match articles.list(dir) {
        Ok(list) => Page {
            body: render_index(&list),
            banner: None,
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to load article list");
            Page {
                body: String::new(),
                banner: Some(Banner::error(
                    "Failed to load the article list, please try again later",
                )),
            }
        }
    }
}

/// Detail page for the article named by `link`'s `id` parameter.
pub fn detail_page<S: ContentStore>(articles: &ArticleStore<S>, dir: &str, link: &str) -> Page {
    let id = match article_id_from_url(link) {
        Ok(id) => id,
        Err(_) => {
            return Page {
                body: String::new(),
                banner: Some(Banner::error("Invalid article id")),
            }
        }
    };
    match articles.get(dir, &id) {
        Ok(article) => Page {
            body: render_detail(&article).to_html(),
            banner: None,
        },
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Failed to load article");
            let message = if e.is_not_found() {
                "Article not found"
            } else {
                "Failed to load the article, please try again later"
            };
            Page {
                body: String::new(),
                banner: Some(Banner::error(message)),
            }
        }
    }
}
