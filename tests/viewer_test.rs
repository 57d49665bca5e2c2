//! Listing and page rendering against the in-memory store.

use repoblog::adapter::encode_article;
use repoblog::store::{ContentStore, MemoryStore};
use repoblog::viewer::{detail_page, index_page, BannerKind};
use repoblog::{Article, ArticleStore};

fn article(id: &str, title: &str) -> Article {
    Article {
        id: id.into(),
        title: title.into(),
        publish_date: "2024-06-01".into(),
        content: format!("Body of *{}*", title),
        path: None,
    }
}

fn seeded(ids: &[&str]) -> ArticleStore<MemoryStore> {
    let store = MemoryStore::new();
    for id in ids {
        let a = article(id, &format!("Title {}", id));
        store
            .write(&format!("articles/{}.json", id), &encode_article(&a).unwrap(), "seed", None)
            .unwrap();
    }
    ArticleStore::new(store)
}

#[test]
fn test_listing_preserves_listing_order() {
    let ids = ["a1", "b2", "c3", "d4", "e5", "f6", "g7", "h8", "i9", "j10"];
    let articles = seeded(&ids);
    let listed = articles.list("articles").unwrap();
    let mut expected: Vec<&str> = ids.to_vec();
    expected.sort();
    let got: Vec<&str> = listed.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(got, expected);
}

#[test]
fn test_one_failed_fetch_is_skipped_not_fatal() {
    let articles = seeded(&["a", "b", "c"]);
    articles.inner().fail_fetches_of("articles/b.json");

    let listed = articles.list("articles").unwrap();
    let ids: Vec<&str> = listed.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn test_malformed_article_is_skipped() {
    let articles = seeded(&["a"]);
    articles
        .inner()
        .write("articles/broken.json", "bm90IGpzb24=", "seed", None)
        .unwrap();
    let listed = articles.list("articles").unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn test_missing_directory_lists_empty() {
    let articles = ArticleStore::new(MemoryStore::new());
    assert!(articles.list("articles").unwrap().is_empty());
    let page = index_page(&articles, "articles");
    assert!(page.body.is_empty());
    assert!(page.banner.is_none());
}

#[test]
fn test_index_page_renders_each_article() {
    let articles = seeded(&["a", "b"]);
    let page = index_page(&articles, "articles");
    assert_eq!(page.body.matches("class=\"article-item\"").count(), 2);
    assert!(page.body.contains("/article-detail.html?id=b"));
    assert!(page.body.contains("Body of Title a"));
}

#[test]
fn test_detail_page_for_known_and_unknown_ids() {
    let articles = seeded(&["a"]);

    let page = detail_page(&articles, "articles", "/article-detail.html?id=a");
    assert!(page.banner.is_none());
    assert!(page.body.contains("<h1 id=\"article-title\">Title a</h1>"));
    assert!(page.body.contains("<em>Title a</em>"));

    let page = detail_page(&articles, "articles", "/article-detail.html?id=zzz");
    assert!(page.body.is_empty());
    let banner = page.banner.unwrap();
    assert_eq!(banner.kind, BannerKind::Error);
    assert_eq!(banner.message, "Article not found");

    let page = detail_page(&articles, "articles", "/article-detail.html");
    assert_eq!(page.banner.unwrap().message, "Invalid article id");
}
