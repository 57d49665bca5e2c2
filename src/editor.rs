// Inline edit mode of the detail page as an explicit state machine:
//
//   Viewing -> Editing -> (Saving | Cancelling) -> Viewing
//
// Each phase has its own render function producing a `DetailView`, so a
// front-end only ever redraws from the view and never patches widgets by
// hand.

use crate::adapter::ArticleStore;
use crate::article::{mint_id, normalize_path, today, Article, DEFAULT_PATH};
use crate::error::{BlogError, BlogResult};
use crate::store::ContentStore;
use crate::viewer::{markdown_to_html, Banner};
use std::time::Duration;

/// Delay before returning to the index after a delete.
pub const DELETE_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this article? This cannot be undone.";

/// Receives the record built by `save`.
pub trait Publisher {
    /// Persist `article` under `dir`; returns the storage key.
    fn publish(&self, dir: &str, article: &Article) -> BlogResult<String>;
}

/// Removes the article shown on the page.
pub trait Deleter {
    fn delete(&self, dir: &str, id: &str) -> BlogResult<String>;
}

impl<S: ContentStore> Publisher for ArticleStore<S> {
    fn publish(&self, dir: &str, article: &Article) -> BlogResult<String> {
        self.create(dir, article)
    }
}

impl<S: ContentStore> Deleter for ArticleStore<S> {
    fn delete(&self, dir: &str, id: &str) -> BlogResult<String> {
        self.remove(dir, id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Viewing,
    Editing,
    Saving,
    Cancelling,
}

/// What `cancel` puts back on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelBehavior {
    /// Re-display the text currently in the edit fields. This is what the
    /// page has always done, so it stays the default until the product
    /// owner decides otherwise.
    #[default]
    KeepEditedText,
    /// Discard the edits and re-display the values from before `enter_edit`.
    RestoreOriginal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleWidget {
    Heading(String),
    Input(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentWidget {
    /// Rendered HTML plus the Markdown it came from.
    Rendered { html: String, source: String },
    /// Markdown source inside the editor widget.
    Editor(String),
    /// Submission in flight.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub edit: bool,
    pub save: bool,
    pub cancel: bool,
    pub delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub title: TitleWidget,
    pub content: ContentWidget,
    pub publish_date: String,
    /// Value of the optional storage-path input, when shown.
    pub path_input: Option<String>,
    pub controls: Controls,
    pub edit_mode: bool,
    pub confirm_dialog: Option<String>,
    pub banner: Option<Banner>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Index { after: Duration },
}

#[derive(Debug, Clone)]
struct EditBuffer {
    title: String,
    content: String,
    path: String,
}

/// Detail page controller for one loaded article.
#[derive(Debug, Clone)]
pub struct DetailEditor {
    id: String,
    dir: String,
    publish_date: String,
    title: String,
    content: String,
    phase: Phase,
    buffer: Option<EditBuffer>,
    confirm_open: bool,
    banner: Option<Banner>,
    cancel_behavior: CancelBehavior,
}

impl DetailEditor {
    pub fn new(article: &Article, dir: &str) -> Self {
        DetailEditor {
            id: article.id.clone(),
            dir: dir.to_string(),
            publish_date: article.publish_date.clone(),
            title: article.title.clone(),
            content: article.content.clone(),
            phase: Phase::Viewing,
            buffer: None,
            confirm_open: false,
            banner: None,
            cancel_behavior: CancelBehavior::default(),
        }
    }

    pub fn with_cancel_behavior(mut self, behavior: CancelBehavior) -> Self {
        self.cancel_behavior = behavior;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Drop the banner once its time-to-live has passed.
    pub fn expire_banner(&mut self, elapsed: Duration) {
        if self.banner.as_ref().is_some_and(|b| b.is_expired(elapsed)) {
            self.banner = None;
        }
    }

    fn transition(&mut self, next: Phase) {
        tracing::debug!(from = ?self.phase, to = ?next, id = %self.id, "Editor transition");
        self.phase = next;
    }

    /// Swap the static title and content for editable copies.
    pub fn enter_edit(&mut self) -> BlogResult<()> {
        if self.phase != Phase::Viewing {
            return Err(BlogError::validation("already editing"));
        }
        self.buffer = Some(EditBuffer {
            title: self.title.clone(),
            content: self.content.clone(),
            path: String::new(),
        });
        self.transition(Phase::Editing);
        Ok(())
    }

    fn buffer_mut(&mut self) -> BlogResult<&mut EditBuffer> {
        match (self.phase, self.buffer.as_mut()) {
            (Phase::Editing, Some(buffer)) => Ok(buffer),
            _ => Err(BlogError::validation("edit mode is not active")),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> BlogResult<()> {
        self.buffer_mut()?.title = title.into();
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> BlogResult<()> {
        self.buffer_mut()?.content = content.into();
        Ok(())
    }

    pub fn set_path(&mut self, path: impl Into<String>) -> BlogResult<()> {
        self.buffer_mut()?.path = path.into();
        Ok(())
    }

    /// Leave `Editing` for `Saving` and return the record to submit: a
    /// fresh id, the edited title and content, today's date, and the chosen
    /// directory (or the default one).
    pub fn begin_save(&mut self) -> BlogResult<(String, Article)> {
        let buffer = match (self.phase, self.buffer.as_ref()) {
            (Phase::Editing, Some(buffer)) => buffer,
            _ => {
                self.banner = Some(Banner::error("Edit mode was not initialised properly"));
                return Err(BlogError::validation("edit mode is not active"));
            }
        };
        if buffer.title.trim().is_empty() {
            self.banner = Some(Banner::error("A title is required"));
            return Err(BlogError::validation("title is required"));
        }
        let dir = if buffer.path.trim().is_empty() {
            DEFAULT_PATH.to_string()
        } else {
            match normalize_path(&buffer.path) {
                Ok(dir) => dir,
                Err(e) => {
                    self.banner = Some(Banner::error(e.to_string()));
                    return Err(e);
                }
            }
        };
        let article = Article {
            id: mint_id(),
            title: buffer.title.clone(),
            publish_date: today(),
            content: buffer.content.clone(),
            path: Some(dir.clone()),
        };
        self.transition(Phase::Saving);
        Ok((dir, article))
    }

    /// Settle a submission started by `begin_save`. Success returns to
    /// `Viewing` showing the saved values; failure returns to `Editing`
    /// with the edits intact.
    pub fn finish_save(&mut self, result: &BlogResult<String>) {
        if self.phase != Phase::Saving {
            return;
        }
        match result {
            Ok(key) => {
                if let Some(buffer) = self.buffer.take() {
                    self.title = buffer.title;
                    self.content = buffer.content;
                }
                self.banner = Some(Banner::success("Article saved and committed"));
                tracing::info!(key = %key, "Saved from editor");
                self.transition(Phase::Viewing);
            }
            Err(e) => {
                self.banner = Some(Banner::error(format!("Saving failed: {}", e)));
                self.transition(Phase::Editing);
            }
        }
    }

    /// `begin_save`, hand the record to `publisher`, `finish_save`.
    pub fn save(&mut self, publisher: &dyn Publisher) -> BlogResult<String> {
        let (dir, article) = self.begin_save()?;
        let result = publisher.publish(&dir, &article);
        self.finish_save(&result);
        result
    }

    /// Leave edit mode without publishing.
    pub fn cancel(&mut self) -> BlogResult<()> {
        if self.phase != Phase::Editing {
            return Err(BlogError::validation("edit mode is not active"));
        }
        self.transition(Phase::Cancelling);
        if let Some(buffer) = self.buffer.take() {
            if self.cancel_behavior == CancelBehavior::KeepEditedText {
                self.title = buffer.title;
                self.content = buffer.content;
            }
        }
        self.transition(Phase::Viewing);
        Ok(())
    }

    /// Open the delete confirmation dialog.
    pub fn request_delete(&mut self) {
        if matches!(self.phase, Phase::Viewing | Phase::Editing) {
            self.confirm_open = true;
        }
    }

    /// Close the dialog without deleting.
    pub fn dismiss_delete(&mut self) {
        self.confirm_open = false;
    }

    /// Confirmed: delete through `deleter` and, on success, schedule the
    /// return to the index.
    pub fn confirm_delete(&mut self, deleter: &dyn Deleter) -> Navigation {
        if !self.confirm_open {
            return Navigation::Stay;
        }
        self.confirm_open = false;
        match deleter.delete(&self.dir, &self.id) {
            Ok(key) => {
                tracing::info!(key = %key, "Deleted from editor");
                self.banner = Some(Banner::success("Article deleted"));
                Navigation::Index {
                    after: DELETE_REDIRECT_DELAY,
                }
            }
            Err(e) => {
                self.banner = Some(Banner::error(format!("Deleting failed: {}", e)));
                Navigation::Stay
            }
        }
    }

    pub fn render(&self) -> DetailView {
        let mut view = match self.phase {
            Phase::Viewing => self.render_viewing(),
            Phase::Editing => self.render_editing(),
            Phase::Saving => self.render_saving(),
            Phase::Cancelling => self.render_cancelling(),
        };
        view.confirm_dialog = self.confirm_open.then(|| DELETE_PROMPT.to_string());
        view.banner = self.banner.clone();
        view
    }

    fn render_viewing(&self) -> DetailView {
        DetailView {
            title: TitleWidget::Heading(self.title.clone()),
            content: ContentWidget::Rendered {
                html: markdown_to_html(&self.content),
                source: self.content.clone(),
            },
            publish_date: self.publish_date.clone(),
            path_input: None,
            controls: Controls {
                edit: true,
                save: false,
                cancel: false,
                delete: true,
            },
            edit_mode: false,
            confirm_dialog: None,
            banner: None,
        }
    }

    fn render_editing(&self) -> DetailView {
        let (title, content, path) = match &self.buffer {
            Some(b) => (b.title.clone(), b.content.clone(), b.path.clone()),
            None => (self.title.clone(), self.content.clone(), String::new()),
        };
        DetailView {
            title: TitleWidget::Input(title),
            content: ContentWidget::Editor(content),
            publish_date: self.publish_date.clone(),
            path_input: Some(path),
            controls: Controls {
                edit: false,
                save: true,
                cancel: true,
                delete: true,
            },
            edit_mode: true,
            confirm_dialog: None,
            banner: None,
        }
    }

    fn render_saving(&self) -> DetailView {
        let title = self
            .buffer
            .as_ref()
            .map_or_else(|| self.title.clone(), |b| b.title.clone());
        DetailView {
            title: TitleWidget::Heading(title),
            content: ContentWidget::Busy,
            publish_date: self.publish_date.clone(),
            path_input: None,
            controls: Controls {
                edit: false,
                save: false,
                cancel: false,
                delete: false,
            },
            edit_mode: true,
            confirm_dialog: None,
            banner: None,
        }
    }

    // Cancelling never outlives `cancel`; it draws like Viewing.
    fn render_cancelling(&self) -> DetailView {
        self.render_viewing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        published: RefCell<Vec<(String, Article)>>,
        deleted: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Publisher for Recorder {
        fn publish(&self, dir: &str, article: &Article) -> BlogResult<String> {
            if self.fail {
                return Err(BlogError::Transient("503 Service Unavailable".into()));
            }
            self.published
                .borrow_mut()
                .push((dir.to_string(), article.clone()));
            Ok(format!("{}/{}.json", dir, article.id))
        }
    }

    impl Deleter for Recorder {
        fn delete(&self, dir: &str, id: &str) -> BlogResult<String> {
            if self.fail {
                return Err(BlogError::NotFound(id.to_string()));
            }
            let key = format!("{}/{}.json", dir, id);
            self.deleted.borrow_mut().push(key.clone());
            Ok(key)
        }
    }

    fn loaded() -> DetailEditor {
        DetailEditor::new(
            &Article {
                id: "abc".into(),
                title: "Hello".into(),
                publish_date: "2024-01-01".into(),
                content: "World".into(),
                path: None,
            },
            "articles",
        )
    }

    #[test]
    fn entering_edit_toggles_controls() {
        let mut editor = loaded();
        let view = editor.render();
        assert_eq!(view.title, TitleWidget::Heading("Hello".into()));
        assert!(view.controls.edit && !view.controls.save && !view.controls.cancel);

        editor.enter_edit().unwrap();
        let view = editor.render();
        assert_eq!(view.title, TitleWidget::Input("Hello".into()));
        assert_eq!(view.content, ContentWidget::Editor("World".into()));
        assert_eq!(view.path_input.as_deref(), Some(""));
        assert!(!view.controls.edit && view.controls.save && view.controls.cancel);
        assert!(view.edit_mode);
    }

    #[test]
    fn cancel_restores_viewing_controls() {
        let mut editor = loaded();
        editor.enter_edit().unwrap();
        editor.set_title("Edited").unwrap();
        editor.cancel().unwrap();

        assert_eq!(editor.phase(), Phase::Viewing);
        let view = editor.render();
        assert!(view.controls.edit && !view.controls.save && !view.controls.cancel);
        assert!(!view.edit_mode);
        assert!(view.path_input.is_none());
        // Default keeps what was typed.
        assert_eq!(view.title, TitleWidget::Heading("Edited".into()));
    }

    #[test]
    fn cancel_can_restore_original_values() {
        let mut editor = loaded().with_cancel_behavior(CancelBehavior::RestoreOriginal);
        editor.enter_edit().unwrap();
        editor.set_title("Edited").unwrap();
        editor.set_content("Changed").unwrap();
        editor.cancel().unwrap();
        let view = editor.render();
        assert_eq!(view.title, TitleWidget::Heading("Hello".into()));
        assert_eq!(
            view.content,
            ContentWidget::Rendered {
                html: "<p>World</p>\n".into(),
                source: "World".into()
            }
        );
    }

    #[test]
    fn save_publishes_fresh_record_under_default_path() {
        let recorder = Recorder::default();
        let mut editor = loaded();
        editor.enter_edit().unwrap();
        editor.set_content("New body").unwrap();
        let key = editor.save(&recorder).unwrap();

        let published = recorder.published.borrow();
        let (dir, article) = &published[0];
        assert_eq!(dir, "articles");
        assert_ne!(article.id, "abc");
        assert_eq!(article.title, "Hello");
        assert_eq!(article.content, "New body");
        assert_eq!(article.publish_date, today());
        assert_eq!(key, format!("articles/{}.json", article.id));

        assert_eq!(editor.phase(), Phase::Viewing);
        assert_eq!(editor.banner().unwrap().kind, crate::viewer::BannerKind::Success);
    }

    #[test]
    fn save_uses_custom_path() {
        let recorder = Recorder::default();
        let mut editor = loaded();
        editor.enter_edit().unwrap();
        editor.set_path("/notes/").unwrap();
        editor.save(&recorder).unwrap();
        assert_eq!(recorder.published.borrow()[0].0, "notes");
    }

    #[test]
    fn save_outside_edit_mode_shows_error() {
        let recorder = Recorder::default();
        let mut editor = loaded();
        assert!(editor.save(&recorder).is_err());
        assert_eq!(editor.phase(), Phase::Viewing);
        assert_eq!(editor.banner().unwrap().kind, crate::viewer::BannerKind::Error);
        assert!(recorder.published.borrow().is_empty());
    }

    #[test]
    fn failed_publish_keeps_edits() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut editor = loaded();
        editor.enter_edit().unwrap();
        editor.set_title("Draft").unwrap();
        assert!(editor.save(&recorder).is_err());
        assert_eq!(editor.phase(), Phase::Editing);
        assert_eq!(editor.render().title, TitleWidget::Input("Draft".into()));
    }

    #[test]
    fn saving_phase_hides_controls() {
        let mut editor = loaded();
        editor.enter_edit().unwrap();
        editor.begin_save().unwrap();
        let view = editor.render();
        assert_eq!(editor.phase(), Phase::Saving);
        assert_eq!(view.content, ContentWidget::Busy);
        assert!(!view.controls.save && !view.controls.cancel && !view.controls.edit);
    }

    #[test]
    fn delete_requires_confirmation() {
        let recorder = Recorder::default();
        let mut editor = loaded();
        assert_eq!(editor.confirm_delete(&recorder), Navigation::Stay);

        editor.request_delete();
        assert_eq!(editor.render().confirm_dialog.as_deref(), Some(DELETE_PROMPT));
        editor.dismiss_delete();
        assert!(editor.render().confirm_dialog.is_none());
        assert!(recorder.deleted.borrow().is_empty());

        editor.request_delete();
        let nav = editor.confirm_delete(&recorder);
        assert_eq!(nav, Navigation::Index { after: DELETE_REDIRECT_DELAY });
        assert_eq!(recorder.deleted.borrow().as_slice(), ["articles/abc.json"]);
    }

    #[test]
    fn failed_delete_stays_on_page() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut editor = loaded();
        editor.request_delete();
        assert_eq!(editor.confirm_delete(&recorder), Navigation::Stay);
        assert_eq!(editor.banner().unwrap().kind, crate::viewer::BannerKind::Error);
    }

    #[test]
    fn banner_expires() {
        let mut editor = loaded();
        editor.request_delete();
        editor.confirm_delete(&Recorder::default());
        editor.expire_banner(Duration::from_secs(1));
        assert!(editor.banner().is_some());
        editor.expire_banner(Duration::from_secs(3));
        assert!(editor.banner().is_none());
    }
}
