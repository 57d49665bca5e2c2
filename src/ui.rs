// UI layer: an interactive terminal session for one article, built on
// `dialoguer` prompts. The session only feeds user input into the
// `DetailEditor` state machine and redraws whatever view it renders.

use crate::adapter::ArticleStore;
use crate::editor::{ContentWidget, Controls, DetailEditor, DetailView, Navigation, TitleWidget};
use crate::error::BlogResult;
use crate::store::ContentStore;
use crate::viewer::{render_index_text, Banner, BannerKind};
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Confirm, Editor, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Edit,
    ChangeFields,
    Save,
    Cancel,
    Delete,
    Quit,
}

impl MenuItem {
    fn label(self) -> &'static str {
        match self {
            MenuItem::Edit => "Edit",
            MenuItem::ChangeFields => "Change title / content / path",
            MenuItem::Save => "Save",
            MenuItem::Cancel => "Cancel",
            MenuItem::Delete => "Delete",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Menu entries for the visible controls, in page order.
fn menu_items(controls: &Controls) -> Vec<MenuItem> {
    let mut items = Vec::new();
    if controls.edit {
        items.push(MenuItem::Edit);
    }
    if controls.save {
        items.push(MenuItem::ChangeFields);
        items.push(MenuItem::Save);
    }
    if controls.cancel {
        items.push(MenuItem::Cancel);
    }
    if controls.delete {
        items.push(MenuItem::Delete);
    }
    items.push(MenuItem::Quit);
    items
}

/// Spinner shown while a remote call is in flight.
pub fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Run `f` behind a spinner.
pub fn with_spinner<T>(message: &'static str, f: impl FnOnce() -> BlogResult<T>) -> BlogResult<T> {
    let pb = spinner(message);
    let result = f();
    pb.finish_and_clear();
    result
}

pub fn print_banner(banner: &Banner) {
    match banner.kind {
        BannerKind::Success => println!("{}", format!("✔ {}", banner.message).green()),
        BannerKind::Error => eprintln!("{}", format!("✘ {}", banner.message).red()),
    }
}

fn draw(view: &DetailView) {
    println!();
    match &view.title {
        TitleWidget::Heading(title) => println!("{}", title.as_str().bold()),
        TitleWidget::Input(title) => println!("{} {}", "[title]".cyan(), title),
    }
    println!("{}", format!("Published: {}", view.publish_date).dark_grey());
    if let Some(path) = &view.path_input {
        let shown = if path.is_empty() { "(default)" } else { path.as_str() };
        println!("{} {}", "[path]".cyan(), shown);
    }
    println!();
    match &view.content {
        ContentWidget::Rendered { source, .. } => println!("{}", source),
        ContentWidget::Editor(source) => {
            println!("{}", "[content]".cyan());
            println!("{}", source);
        }
        ContentWidget::Busy => println!("{}", "…".dark_grey()),
    }
    println!();
}

/// Prompt for every editable field, starting from the current values.
fn prompt_fields(editor: &mut DetailEditor, view: &DetailView) -> Result<()> {
    let current_title = match &view.title {
        TitleWidget::Input(t) | TitleWidget::Heading(t) => t.clone(),
    };
    let title: String = Input::new()
        .with_prompt("Title")
        .with_initial_text(current_title)
        .interact_text()?;
    editor.set_title(title)?;

    let path: String = Input::new()
        .with_prompt("Storage path (optional)")
        .with_initial_text(view.path_input.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    editor.set_path(path)?;

    if let ContentWidget::Editor(source) = &view.content {
        // `None` means the editor was closed without saving.
        if let Some(edited) = Editor::new().extension(".md").edit(source)? {
            editor.set_content(edited)?;
        }
    }
    Ok(())
}

/// Interactive detail page for `<dir>/<id>.json`.
pub fn edit_session<S: ContentStore>(articles: &ArticleStore<S>, dir: &str, id: &str) -> Result<()> {
    let article = with_spinner("Loading article...", || articles.get(dir, id))?;
    let mut editor = DetailEditor::new(&article, dir);

    loop {
        let view = editor.render();
        draw(&view);
        if let Some(banner) = &view.banner {
            print_banner(banner);
        }
        editor.expire_banner(Duration::MAX);

        let items = menu_items(&view.controls);
        let labels: Vec<&str> = items.iter().map(|i| i.label()).collect();
        let selection = Select::new().items(&labels).default(0).interact()?;
        match items[selection] {
            MenuItem::Edit => {
                editor.enter_edit()?;
                let view = editor.render();
                prompt_fields(&mut editor, &view)?;
            }
            MenuItem::ChangeFields => prompt_fields(&mut editor, &view)?,
            MenuItem::Save => {
                // Errors already surface as a banner on the next redraw.
                if let Err(e) = with_spinner("Publishing...", || editor.save(articles)) {
                    tracing::debug!(error = %e, "Save did not complete");
                }
            }
            MenuItem::Cancel => editor.cancel()?,
            MenuItem::Delete => {
                editor.request_delete();
                let prompt = editor.render().confirm_dialog.unwrap_or_default();
                let confirmed = Confirm::new().with_prompt(prompt).default(false).interact()?;
                if !confirmed {
                    editor.dismiss_delete();
                    continue;
                }
                let nav = with_spinner("Deleting...", || Ok(editor.confirm_delete(articles)))?;
                if let Navigation::Index { after } = nav {
                    if let Some(banner) = editor.banner() {
                        print_banner(banner);
                    }
                    thread::sleep(after);
                    let remaining = with_spinner("Loading articles...", || articles.list(dir))?;
                    print!("{}", render_index_text(&remaining));
                    return Ok(());
                }
            }
            MenuItem::Quit => return Ok(()),
        }
    }
}
