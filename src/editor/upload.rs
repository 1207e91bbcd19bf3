//! Image upload toolbar button
//!
//! Inserts an upload placeholder node into the same editor the toolbar
//! drives. The upload itself is handled by whatever renders the node.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::capability::{Attrs, EditorCapability};
use super::command::Command;
use super::shortcut::{shortcut_label, Platform};

pub const IMAGE_UPLOAD_SHORTCUT_KEY: &str = "Mod+Shift+I";

const LABEL: &str = "Add image";

/// Called after a placeholder was inserted
pub type InsertedCallback = Arc<dyn Fn() + Send + Sync>;

/// Button options
#[derive(Clone)]
pub struct UploadButtonConfig {
    /// Hide the button instead of disabling it when insertion is impossible
    pub hide_when_unavailable: bool,
    /// Text shown next to the icon
    pub text: Option<String>,
    pub show_shortcut: bool,
    pub shortcut_keys: String,
    pub on_inserted: Option<InsertedCallback>,
}

impl Default for UploadButtonConfig {
    fn default() -> Self {
        Self {
            hide_when_unavailable: false,
            text: None,
            show_shortcut: false,
            shortcut_keys: IMAGE_UPLOAD_SHORTCUT_KEY.to_string(),
            on_inserted: None,
        }
    }
}

impl fmt::Debug for UploadButtonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadButtonConfig")
            .field("hide_when_unavailable", &self.hide_when_unavailable)
            .field("text", &self.text)
            .field("show_shortcut", &self.show_shortcut)
            .field("shortcut_keys", &self.shortcut_keys)
            .field("on_inserted", &self.on_inserted.is_some())
            .finish()
    }
}

/// Click passed to the caller's handler before the button acts
#[derive(Debug, Default)]
pub struct ClickEvent {
    default_prevented: bool,
}

impl ClickEvent {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Rendered button
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadButtonState {
    pub label: &'static str,
    pub text: Option<String>,
    pub is_active: bool,
    pub disabled: bool,
    pub shortcut_keys: String,
    /// Parsed shortcut, present when `show_shortcut` is set
    pub shortcut_badge: Option<String>,
}

/// Adapter for the image upload button
pub struct ImageUploadButton<E: EditorCapability + ?Sized> {
    editor: Option<Arc<E>>,
    config: UploadButtonConfig,
}

impl<E: EditorCapability + ?Sized> ImageUploadButton<E> {
    pub fn new(editor: Option<Arc<E>>, config: UploadButtonConfig) -> Self {
        Self { editor, config }
    }

    /// Editor exists, is editable, no upload node is selected and the
    /// insert dry-run passes
    pub fn can_insert(&self) -> bool {
        let Some(editor) = &self.editor else {
            return false;
        };
        editor.is_editable()
            && !editor.is_active("imageUpload", Attrs::none())
            && !editor.is_active("image", Attrs::none())
            && editor.can_run(Command::InsertImageUpload)
    }

    pub fn is_active(&self) -> bool {
        self.editor
            .as_ref()
            .map(|editor| editor.is_active("imageUpload", Attrs::none()))
            .unwrap_or(false)
    }

    pub fn is_visible(&self) -> bool {
        match &self.editor {
            Some(editor) if editor.is_editable() => {
                !self.config.hide_when_unavailable || self.can_insert()
            }
            _ => false,
        }
    }

    /// Current button state, or `None` when it should not render
    pub fn state(&self, platform: Platform) -> Option<UploadButtonState> {
        if !self.is_visible() {
            return None;
        }

        Some(UploadButtonState {
            label: LABEL,
            text: self.config.text.clone(),
            is_active: self.is_active(),
            disabled: !self.can_insert(),
            shortcut_keys: self.config.shortcut_keys.clone(),
            shortcut_badge: self
                .config
                .show_shortcut
                .then(|| shortcut_label(&self.config.shortcut_keys, platform)),
        })
    }

    /// Insert the upload placeholder; fires `on_inserted` on success
    pub fn handle_image(&self) -> bool {
        if !self.can_insert() {
            return false;
        }
        let Some(editor) = &self.editor else {
            return false;
        };

        let inserted = editor.dispatch(Command::InsertImageUpload);
        if inserted {
            tracing::debug!("Inserted image upload placeholder");
            if let Some(callback) = &self.config.on_inserted {
                callback();
            }
        }
        inserted
    }

    /// Handle a click: the caller's handler runs first and may cancel
    pub fn click<F>(&self, on_click: F) -> bool
    where
        F: FnOnce(&mut ClickEvent),
    {
        let mut event = ClickEvent::default();
        on_click(&mut event);
        if event.default_prevented() {
            return false;
        }
        self.handle_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::MemoryEditor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn button(config: UploadButtonConfig) -> (Arc<MemoryEditor>, ImageUploadButton<MemoryEditor>) {
        let editor = Arc::new(MemoryEditor::new("text"));
        (editor.clone(), ImageUploadButton::new(Some(editor), config))
    }

    #[test]
    fn test_state() {
        let (_editor, button) = button(UploadButtonConfig {
            show_shortcut: true,
            ..UploadButtonConfig::default()
        });
        let state = button.state(Platform::Mac).unwrap();
        assert_eq!(state.label, "Add image");
        assert!(!state.disabled);
        assert!(!state.is_active);
        assert_eq!(state.shortcut_badge.as_deref(), Some("⌘⇧I"));
    }

    #[test]
    fn test_missing_editor_is_invisible() {
        let button = ImageUploadButton::<MemoryEditor>::new(None, UploadButtonConfig::default());
        assert!(!button.is_visible());
        assert!(button.state(Platform::Other).is_none());
        assert!(!button.handle_image());
    }

    #[test]
    fn test_insert_fires_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let (editor, button) = button(UploadButtonConfig {
            on_inserted: Some(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            ..UploadButtonConfig::default()
        });

        assert!(button.click(|_| {}));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(editor.is_active("imageUpload", Attrs::none()));

        // Placeholder is selected now, so a second insert is refused.
        let state = button.state(Platform::Other).unwrap();
        assert!(state.is_active);
        assert!(state.disabled);
        assert!(!button.click(|_| {}));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prevent_default_cancels() {
        let (editor, button) = button(UploadButtonConfig::default());
        assert!(!button.click(|event| event.prevent_default()));
        assert!(!editor.is_active("imageUpload", Attrs::none()));
    }

    #[test]
    fn test_hide_when_unavailable() {
        let (editor, button) = button(UploadButtonConfig {
            hide_when_unavailable: true,
            ..UploadButtonConfig::default()
        });
        assert!(button.is_visible());

        editor.dispatch(Command::ToggleCodeBlock);
        assert!(!button.can_insert());
        assert!(!button.is_visible());
    }

    #[test]
    fn test_read_only_editor_hides_button() {
        let (editor, button) = button(UploadButtonConfig::default());
        editor.set_editable(false);
        assert!(button.state(Platform::Other).is_none());
    }
}
