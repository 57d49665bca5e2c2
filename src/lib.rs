// Library root
// -----------
// A blog whose articles are JSON files in a repository reached through the
// hosting API's "contents" endpoints. The binary (`main.rs`) is a thin
// command-line front-end over these modules.
//
// Module responsibilities:
// - `article`: the article record, id minting and storage keys.
// - `store`: the file-level `ContentStore` seam plus an in-memory store.
// - `api`: the blocking HTTP client implementing `ContentStore`.
// - `adapter`: JSON/base64 codec and article-level operations.
// - `viewer`: index/detail rendering and transient banners.
// - `editor`: the detail page's edit-mode state machine.
// - `operator`: flag validation and non-interactive actions.
// - `ui`: the interactive terminal session driving the editor.
// - `cli`, `config`, `error`: command-line surface, settings, errors.
pub mod adapter;
pub mod api;
pub mod article;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod operator;
pub mod store;
pub mod ui;
pub mod viewer;

pub use adapter::ArticleStore;
pub use article::Article;
pub use error::{BlogError, BlogResult};
