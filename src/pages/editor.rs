//! Editor playground (`/editor`)

use anyhow::Result;
use std::sync::Arc;

use super::SitePages;
use crate::config::EditorConfig;
use crate::editor::{
    render_toolbar, Command, EditorCapability, ImageUploadButton, MemoryEditor, Platform,
    ToolbarAdapter, UploadButtonConfig,
};
use crate::templates::EditorView;

/// One editor instance with its toolbar and upload button attached
pub struct EditorSession {
    editor: Arc<MemoryEditor>,
    toolbar: Option<ToolbarAdapter<MemoryEditor>>,
    upload: ImageUploadButton<MemoryEditor>,
}

impl EditorSession {
    pub fn new(config: &EditorConfig) -> Self {
        let editor = Arc::new(MemoryEditor::new(&config.initial_content));
        let toolbar = ToolbarAdapter::attach(Some(editor.clone()));
        let upload = ImageUploadButton::new(
            Some(editor.clone()),
            UploadButtonConfig {
                show_shortcut: true,
                ..UploadButtonConfig::default()
            },
        );

        Self {
            editor,
            toolbar,
            upload,
        }
    }

    pub fn editor(&self) -> &Arc<MemoryEditor> {
        &self.editor
    }

    /// Apply a button press rendered at `generation`
    pub fn press(&self, command: Command, generation: u64) -> bool {
        let Some(toolbar) = &self.toolbar else {
            return false;
        };

        if command == Command::InsertImageUpload {
            if !toolbar.claim(generation) {
                tracing::debug!("Ignoring stale image upload press");
                return false;
            }
            return self.upload.click(|_| {});
        }
        toolbar.press_command(command, generation)
    }

    /// Append typed text to the selected block
    pub fn append_text(&self, text: &str) -> bool {
        let text = text.trim_end_matches(['\r', '\n']);
        let appended = self.editor.insert_text(text);
        if appended {
            self.editor.focus();
        }
        appended
    }

    pub fn view(&self, config: &EditorConfig, platform: Platform) -> EditorView {
        EditorView {
            title: config.title.clone(),
            lead: config.lead.clone(),
            placeholder: config.placeholder.clone(),
            content_html: self.editor.to_html(),
            is_empty: self
                .toolbar
                .as_ref()
                .map(ToolbarAdapter::is_empty)
                .unwrap_or(true),
            is_focused: self
                .toolbar
                .as_ref()
                .map(ToolbarAdapter::is_focused)
                .unwrap_or(false),
            editable: self.editor.is_editable(),
            mac: platform == Platform::Mac,
            toolbar: render_toolbar(self.toolbar.as_ref()),
            upload: self.upload.state(platform),
        }
    }
}

impl SitePages {
    /// Render the playground for `session`
    pub fn editor(&self, session: &EditorSession, platform: Platform) -> Result<String> {
        let config = &self.config.editor;
        let meta = self.page_meta(&config.title, &config.lead, "/editor");
        let view = session.view(config, platform);

        self.render_page("editor.html", "/editor", &meta, |context| {
            context.insert("editor", &view);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::editor::Attrs;

    fn session() -> EditorSession {
        EditorSession::new(&EditorConfig::default())
    }

    #[test]
    fn test_renders_toolbar_and_content() {
        let pages = SitePages::new(SiteConfig::default()).unwrap();
        let html = pages.editor(&session(), Platform::Mac).unwrap();

        assert!(html.contains("<h1>Editor Playground</h1>"));
        assert!(html.contains(r#"value="toggleBold""#));
        assert!(html.contains(r#"title="Bold (⌘B)""#));
        assert!(html.contains(r#"<input type="hidden" name="level" value="2">"#));
        assert!(html.contains("Capture a wild idea"));
        assert!(html.contains("<kbd>⌘⇧I</kbd>"));
    }

    #[test]
    fn test_press_and_stale_generation() {
        let session = session();
        let generation = session.toolbar.as_ref().unwrap().generation();

        assert!(session.press(Command::ToggleItalic, generation));
        assert!(session.editor().is_active("italic", Attrs::none()));
        // A resubmitted form carries the old generation.
        assert!(!session.press(Command::ToggleItalic, generation));
        assert!(session.editor().is_active("italic", Attrs::none()));
    }

    #[test]
    fn test_image_upload_press() {
        let session = session();
        let generation = session.toolbar.as_ref().unwrap().generation();

        assert!(session.press(Command::InsertImageUpload, generation));
        assert!(session.editor().is_active("imageUpload", Attrs::none()));
        assert!(!session.press(Command::InsertImageUpload, generation));
    }

    #[test]
    fn test_concurrent_image_upload_presses_insert_once() {
        let session = Arc::new(session());
        let generation = session.toolbar.as_ref().unwrap().generation();
        let barrier = Arc::new(std::sync::Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let session = session.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    session.press(Command::InsertImageUpload, generation)
                })
            })
            .collect();
        let inserted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&inserted| inserted)
            .count();

        assert_eq!(inserted, 1);
        let uploads = session
            .editor()
            .blocks()
            .iter()
            .filter(|block| block.kind == crate::editor::BlockKind::ImageUpload)
            .count();
        assert_eq!(uploads, 1);
    }

    #[test]
    fn test_placeholder_after_clear() {
        let session = session();
        let generation = session.toolbar.as_ref().unwrap().generation();
        assert!(session.press(Command::ClearContent, generation));

        let view = session.view(&EditorConfig::default(), Platform::Other);
        assert!(view.is_empty);
        assert!(view.is_focused);
        assert_eq!(view.placeholder, "Write something unforgettable...");
    }

    #[test]
    fn test_append_text() {
        let session = session();
        assert!(session.append_text(" More.\r\n"));
        assert!(!session.append_text(""));
        assert!(session.editor().blocks()[0].text.ends_with("tinkering with. More."));
    }
}
