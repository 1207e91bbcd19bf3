//! Formatting toolbar state adapter
//!
//! Mirrors the editor's live state into button descriptors and sends
//! presses back as commands. Descriptors carry the generation they were
//! computed at; once the editor changes, older descriptors no longer
//! dispatch, so one click applies at most once.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::capability::{Attrs, EditorCapability, EditorEvent};
use super::command::Command;
use super::subscription::Subscription;

/// How a button decides whether it is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    /// Dry-run the command
    CanRun,
    /// Enabled whenever the document has content
    NotEmpty,
}

/// Static description of one toolbar button
#[derive(Debug, Clone)]
struct ItemDef {
    icon: String,
    label: String,
    shortcut: Option<&'static str>,
    command: Command,
    active: Option<(&'static str, Attrs)>,
    availability: Availability,
}

impl ItemDef {
    fn new(icon: &str, label: &str, command: Command) -> Self {
        Self {
            icon: icon.to_string(),
            label: label.to_string(),
            shortcut: None,
            command,
            active: None,
            availability: Availability::CanRun,
        }
    }

    fn shortcut(mut self, keys: &'static str) -> Self {
        self.shortcut = Some(keys);
        self
    }

    fn active(mut self, name: &'static str, attrs: Attrs) -> Self {
        self.active = Some((name, attrs));
        self
    }

    fn when_not_empty(mut self) -> Self {
        self.availability = Availability::NotEmpty;
        self
    }
}

/// Button groups, in display order
fn toolbar_layout() -> Vec<Vec<ItemDef>> {
    let none = Attrs::none();

    let mut blocks = vec![
        ItemDef::new("P", "Paragraph", Command::SetParagraph).active("paragraph", none),
    ];
    blocks.extend((1..=3).map(|level| {
        ItemDef::new(
            &format!("H{}", level),
            &format!("Heading {}", level),
            Command::ToggleHeading { level },
        )
        .active("heading", Attrs::level(level))
    }));

    vec![
        vec![
            ItemDef::new("B", "Bold", Command::ToggleBold)
                .shortcut("Mod+B")
                .active("bold", none),
            ItemDef::new("I", "Italic", Command::ToggleItalic)
                .shortcut("Mod+I")
                .active("italic", none),
            ItemDef::new("S", "Strikethrough", Command::ToggleStrike)
                .shortcut("Mod+Shift+X")
                .active("strike", none),
            ItemDef::new("</>", "Code", Command::ToggleCode)
                .shortcut("Mod+E")
                .active("code", none),
        ],
        blocks,
        vec![
            ItemDef::new("UL", "Bullet List", Command::ToggleBulletList)
                .shortcut("Mod+Shift+8")
                .active("bulletList", none),
            ItemDef::new("OL", "Ordered List", Command::ToggleOrderedList)
                .shortcut("Mod+Shift+7")
                .active("orderedList", none),
            ItemDef::new("\u{201C}", "Quote", Command::ToggleBlockquote).active("blockquote", none),
            ItemDef::new("{}", "Code Block", Command::ToggleCodeBlock)
                .shortcut("Mod+Alt+C")
                .active("codeBlock", none),
            ItemDef::new("HR", "Horizontal Rule", Command::SetHorizontalRule),
        ],
        vec![
            ItemDef::new("Undo", "Undo", Command::Undo).shortcut("Mod+Z"),
            ItemDef::new("Redo", "Redo", Command::Redo).shortcut("Mod+Shift+Z"),
            ItemDef::new("Clear", "Clear", Command::ClearContent).when_not_empty(),
        ],
    ]
}

/// A rendered toolbar button
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolbarItem {
    pub icon: String,
    pub label: String,
    pub shortcut: Option<&'static str>,
    /// Tooltip: `"{label} ({shortcut})"` or just the label
    pub title: String,
    pub is_active: bool,
    pub disabled: bool,
    pub command: Command,
    /// Adapter generation this descriptor was computed at
    pub generation: u64,
}

/// A visual group of buttons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolbarGroup {
    pub items: Vec<ToolbarItem>,
}

/// Snapshot of the whole toolbar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toolbar {
    pub groups: Vec<ToolbarGroup>,
    pub is_empty: bool,
    pub is_focused: bool,
    pub generation: u64,
}

impl Toolbar {
    /// Find a button by label
    pub fn item(&self, label: &str) -> Option<&ToolbarItem> {
        self.groups
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|item| item.label == label)
    }
}

/// State mirrored from editor events
#[derive(Debug, Default)]
struct SyncState {
    generation: AtomicU64,
    focused: AtomicBool,
    empty: AtomicBool,
}

/// Keeps a toolbar in sync with one editor instance
///
/// Subscriptions live as long as the adapter and are released on drop.
pub struct ToolbarAdapter<E: EditorCapability + ?Sized> {
    editor: Arc<E>,
    state: Arc<SyncState>,
    _subscriptions: Vec<Subscription<E>>,
}

impl<E: EditorCapability + ?Sized + 'static> ToolbarAdapter<E> {
    /// Attach to an editor; `None` while the editor is not initialized
    pub fn attach(editor: Option<Arc<E>>) -> Option<Self> {
        let editor = editor?;
        let state = Arc::new(SyncState::default());
        state.empty.store(editor.is_empty(), Ordering::SeqCst);

        let subscriptions = EditorEvent::ALL
            .iter()
            .map(|&event| {
                let state = state.clone();
                let weak: Weak<E> = Arc::downgrade(&editor);
                Subscription::new(
                    editor.clone(),
                    event,
                    Arc::new(move |event| sync(&state, &weak, event)),
                )
            })
            .collect();

        tracing::debug!("Toolbar attached to editor");
        Some(Self {
            editor,
            state,
            _subscriptions: subscriptions,
        })
    }
}

/// Event handler shared by all subscriptions
fn sync<E: EditorCapability + ?Sized>(state: &SyncState, editor: &Weak<E>, event: EditorEvent) {
    match event {
        EditorEvent::Focus => state.focused.store(true, Ordering::SeqCst),
        EditorEvent::Blur => state.focused.store(false, Ordering::SeqCst),
        EditorEvent::Create | EditorEvent::Update | EditorEvent::SelectionUpdate => {
            if let Some(editor) = editor.upgrade() {
                state.empty.store(editor.is_empty(), Ordering::SeqCst);
            }
            state.generation.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl<E: EditorCapability + ?Sized> ToolbarAdapter<E> {
    pub fn editor(&self) -> &Arc<E> {
        &self.editor
    }

    pub fn generation(&self) -> u64 {
        self.state.generation.load(Ordering::SeqCst)
    }

    pub fn is_focused(&self) -> bool {
        self.state.focused.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.state.empty.load(Ordering::SeqCst)
    }

    /// Recompute every button from the current editor state
    pub fn toolbar(&self) -> Toolbar {
        let generation = self.generation();
        let groups = toolbar_layout()
            .into_iter()
            .map(|defs| ToolbarGroup {
                items: defs
                    .into_iter()
                    .map(|def| self.describe(def, generation))
                    .collect(),
            })
            .collect();

        Toolbar {
            groups,
            is_empty: self.is_empty(),
            is_focused: self.is_focused(),
            generation,
        }
    }

    fn describe(&self, def: ItemDef, generation: u64) -> ToolbarItem {
        let is_active = def
            .active
            .map(|(name, attrs)| self.editor.is_active(name, attrs))
            .unwrap_or(false);
        let disabled = !self.is_available(def.command, def.availability);
        let title = match def.shortcut {
            Some(keys) => format!("{} ({})", def.label, keys),
            None => def.label.clone(),
        };

        ToolbarItem {
            icon: def.icon,
            label: def.label,
            shortcut: def.shortcut,
            title,
            is_active,
            disabled,
            command: def.command,
            generation,
        }
    }

    fn is_available(&self, command: Command, availability: Availability) -> bool {
        match availability {
            Availability::CanRun => self.editor.can_run(command),
            Availability::NotEmpty => !self.editor.is_empty(),
        }
    }

    /// Take ownership of the render at `generation`
    ///
    /// Exactly one caller wins per generation; the winner moves the adapter
    /// past it, so every other descriptor from that render goes stale.
    pub fn claim(&self, generation: u64) -> bool {
        self.state
            .generation
            .compare_exchange(generation, generation + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Dispatch a button press
    ///
    /// Stale or disabled descriptors never reach the editor. Legality is
    /// checked again at press time.
    pub fn press(&self, item: &ToolbarItem) -> bool {
        if item.generation != self.generation() {
            tracing::debug!("Ignoring stale press of {}", item.label);
            return false;
        }
        if item.disabled {
            return false;
        }

        let availability = toolbar_layout()
            .into_iter()
            .flatten()
            .find(|def| def.command == item.command)
            .map(|def| def.availability)
            .unwrap_or(Availability::CanRun);
        if !self.is_available(item.command, availability) {
            tracing::debug!("{} became unavailable before dispatch", item.label);
            return false;
        }

        if !self.claim(item.generation) {
            tracing::debug!("Ignoring concurrent press of {}", item.label);
            return false;
        }

        let applied = self.editor.dispatch(item.command);
        tracing::debug!("Dispatched {}: applied={}", item.command, applied);
        applied
    }

    /// Press the button for `command` as rendered at `generation`
    pub fn press_command(&self, command: Command, generation: u64) -> bool {
        let toolbar = self.toolbar();
        let Some(item) = toolbar
            .groups
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|item| item.command == command)
        else {
            return false;
        };

        self.press(&ToolbarItem {
            generation,
            ..item.clone()
        })
    }
}

/// Toolbar for an editor that may not be mounted yet
pub fn render_toolbar<E: EditorCapability + ?Sized>(
    adapter: Option<&ToolbarAdapter<E>>,
) -> Option<Toolbar> {
    adapter.map(ToolbarAdapter::toolbar)
}
