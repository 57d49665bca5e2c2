// Entrypoint for the CLI application.
// - Validates the flags before anything touches the config or network.
// - Builds one API client from the resolved config and hands it to the
//   requested operation.
// - Every failure ends with a diagnostic on stderr and exit status 1.

use anyhow::Context;
use clap::Parser;
use repoblog::api::ApiClient;
use repoblog::cli::Cli;
use repoblog::config::Config;
use repoblog::operator::{execute, Outcome, Request};
use repoblog::viewer::{render_detail, render_detail_text, render_index, render_index_text};
use repoblog::{ui, ArticleStore};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let request = Request::from_options(cli.options())?;

    let config = Config::load(cli.config.as_deref()).context("Loading configuration")?;
    tracing::debug!(owner = %config.owner, repo = %config.repo, branch = %config.branch, "Using repository");
    let api = ApiClient::new(&config)?;
    if request.writes() && !api.has_token() {
        tracing::warn!("No access token configured; writes will be rejected");
    }
    let articles = ArticleStore::new(api);

    if let Request::Edit { dir, id } = &request {
        return ui::edit_session(&articles, dir, id);
    }

    let outcome = ui::with_spinner("Talking to the repository...", || execute(&articles, &request))?;
    match outcome {
        Outcome::Published { key, article } => {
            println!("Article published at {} (id {})", key, article.id)
        }
        Outcome::Updated { key, .. } => println!("Article updated at {}", key),
        Outcome::Deleted { key } => println!("Article deleted: {}", key),
        Outcome::Listed(list) if cli.html => print!("{}", render_index(&list)),
        Outcome::Listed(list) => print!("{}", render_index_text(&list)),
        Outcome::Shown(article) if cli.html => print!("{}", render_detail(&article).to_html()),
        Outcome::Shown(article) => print!("{}", render_detail_text(&article)),
    }
    Ok(())
}
