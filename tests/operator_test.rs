//! End-to-end operator behavior against the in-memory store.

use repoblog::article::today;
use repoblog::adapter::encode_article;
use repoblog::editor::{DetailEditor, Phase};
use repoblog::operator::{execute, Options, Outcome, Request};
use repoblog::store::{ContentStore, MemoryStore};
use repoblog::{Article, ArticleStore, BlogError};
use std::collections::HashSet;

fn request(action: &str, id: Option<&str>, title: Option<&str>, content: Option<&str>) -> Request {
    Request::from_options(Options {
        action: Some(action.to_string()),
        article_id: id.map(String::from),
        title: title.map(String::from),
        content: content.map(String::from),
        path: None,
    })
    .unwrap()
}

fn publish(articles: &ArticleStore<MemoryStore>, title: &str, content: &str) -> (String, String) {
    match execute(articles, &request("publish", None, Some(title), Some(content))).unwrap() {
        Outcome::Published { key, article } => (key, article.id),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_publish_then_update_title_only() {
    let articles = ArticleStore::new(MemoryStore::new());
    let (key, id) = publish(&articles, "Hello", "World");

    assert_eq!(key, format!("articles/{}.json", id));
    let stored = articles.get("articles", &id).unwrap();
    assert_eq!(stored.title, "Hello");
    assert_eq!(stored.content, "World");
    assert_eq!(stored.publish_date, today());

    execute(&articles, &request("update", Some(&id), Some("Hi"), None)).unwrap();
    let stored = articles.get("articles", &id).unwrap();
    assert_eq!(stored.title, "Hi");
    assert_eq!(stored.content, "World");
    assert_eq!(stored.publish_date, today());
    assert_eq!(stored.id, id);
}

#[test]
fn test_update_content_only_keeps_title() {
    let articles = ArticleStore::new(MemoryStore::new());
    let (_, id) = publish(&articles, "Hello", "World");
    execute(&articles, &request("update", Some(&id), None, Some("Everyone"))).unwrap();
    let stored = articles.get("articles", &id).unwrap();
    assert_eq!(stored.title, "Hello");
    assert_eq!(stored.content, "Everyone");
}

#[test]
fn test_published_ids_are_distinct_within_a_run() {
    let articles = ArticleStore::new(MemoryStore::new());
    let ids: HashSet<String> = (0..20)
        .map(|i| publish(&articles, &format!("Post {}", i), "body").1)
        .collect();
    assert_eq!(ids.len(), 20);
    assert!(ids.iter().all(|id| !id.is_empty()));
}

#[test]
fn test_update_missing_article_is_not_found_without_write() {
    let articles = ArticleStore::new(MemoryStore::new());
    publish(&articles, "Hello", "World");
    let writes_before = articles.inner().write_count();

    let err = execute(&articles, &request("update", Some("nope"), Some("Hi"), None)).unwrap_err();
    assert!(matches!(err, BlogError::NotFound(_)));
    assert_eq!(articles.inner().write_count(), writes_before);
}

#[test]
fn test_delete_removes_article() {
    let articles = ArticleStore::new(MemoryStore::new());
    let (key, id) = publish(&articles, "Hello", "World");

    match execute(&articles, &request("delete", Some(&id), None, None)).unwrap() {
        Outcome::Deleted { key: deleted } => assert_eq!(deleted, key),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(articles.get("articles", &id).unwrap_err().is_not_found());
    assert!(!articles.inner().contains(&key));
}

#[test]
fn test_delete_missing_article_fails_cleanly() {
    let articles = ArticleStore::new(MemoryStore::new());
    let err = execute(&articles, &request("delete", Some("ghost"), None, None)).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(articles.inner().write_count(), 0);
}

#[test]
fn test_custom_path_changes_storage_key() {
    let articles = ArticleStore::new(MemoryStore::new());
    let req = Request::from_options(Options {
        action: Some("publish".into()),
        title: Some("Notes".into()),
        content: Some("text".into()),
        path: Some("notes/2024".into()),
        ..Default::default()
    })
    .unwrap();
    let Outcome::Published { key, article } = execute(&articles, &req).unwrap() else {
        panic!("expected a publish outcome");
    };
    assert_eq!(key, format!("notes/2024/{}.json", article.id));
    assert_eq!(articles.inner().keys(), vec![key]);
}

#[test]
fn test_edit_is_refused_outside_a_terminal_session() {
    let articles = ArticleStore::new(MemoryStore::new());
    let err = execute(&articles, &request("edit", Some("abc"), None, None)).unwrap_err();
    assert!(matches!(err, BlogError::Validation(_)));
}

#[test]
fn test_update_reports_the_key_it_wrote() {
    let store = MemoryStore::new();
    let record = Article {
        id: "other".into(),
        title: "Hello".into(),
        publish_date: "2024-01-01".into(),
        content: "World".into(),
        path: None,
    };
    store
        .write("articles/abc.json", &encode_article(&record).unwrap(), "seed", None)
        .unwrap();
    let articles = ArticleStore::new(store);

    match execute(&articles, &request("update", Some("abc"), Some("Hi"), None)).unwrap() {
        Outcome::Updated { key, article } => {
            assert_eq!(key, "articles/abc.json");
            assert_eq!(article.title, "Hi");
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(articles.inner().keys(), vec!["articles/abc.json".to_string()]);
}

#[test]
fn test_update_succeeds_when_stored_id_is_blank() {
    let store = MemoryStore::new();
    let record = Article {
        id: String::new(),
        title: "Hello".into(),
        publish_date: "2024-01-01".into(),
        content: "World".into(),
        path: None,
    };
    store
        .write("articles/abc.json", &encode_article(&record).unwrap(), "seed", None)
        .unwrap();
    let articles = ArticleStore::new(store);

    let outcome = execute(&articles, &request("update", Some("abc"), None, Some("Body")));
    assert!(matches!(outcome, Ok(Outcome::Updated { .. })));
}

#[test]
fn test_editor_save_commits_through_article_store() {
    let articles = ArticleStore::new(MemoryStore::new());
    let (_, id) = publish(&articles, "Hello", "World");
    let original = articles.get("articles", &id).unwrap();

    let mut editor = DetailEditor::new(&original, "articles");
    editor.enter_edit().unwrap();
    editor.set_title("Hello again").unwrap();
    editor.set_path("drafts").unwrap();
    let key = editor.save(&articles).unwrap();

    assert!(key.starts_with("drafts/"));
    assert_eq!(editor.phase(), Phase::Viewing);
    assert!(articles.inner().contains(&key));
    let saved = articles.list("drafts").unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].title, "Hello again");
    assert_eq!(saved[0].content, "World");
    assert_ne!(saved[0].id, id);
}
