// Command-line surface. Flag names follow the publishing workflow that
// drives this tool (`--action`, `--articleId`, ...), so they are spelled
// explicitly rather than derived from the field names.

use crate::operator::Options;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repoblog", version, about = "Publish, update and delete blog articles stored in a repository")]
pub struct Cli {
    /// publish | update | delete | list | show | edit
    #[arg(long, allow_hyphen_values = true)]
    pub action: Option<String>,

    #[arg(long = "articleId", allow_hyphen_values = true)]
    pub article_id: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub title: Option<String>,

    /// Markdown body; may start with `-` (lists, rules)
    #[arg(long, allow_hyphen_values = true)]
    pub content: Option<String>,

    /// Storage directory inside the repository
    #[arg(long, default_value = crate::article::DEFAULT_PATH, allow_hyphen_values = true)]
    pub path: String,

    /// Print list/show output as the page HTML fragments
    #[arg(long)]
    pub html: bool,

    /// Config file (defaults to <config dir>/repoblog/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            action: self.action.clone(),
            article_id: self.article_id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            path: Some(self.path.clone()),
        }
    }
}
