//! The narrow interface the toolbar needs from an editor instance

use std::sync::Arc;

use super::command::Command;

/// Events an editor emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorEvent {
    Create,
    Update,
    SelectionUpdate,
    Focus,
    Blur,
}

impl EditorEvent {
    pub const ALL: [EditorEvent; 5] = [
        EditorEvent::Create,
        EditorEvent::Update,
        EditorEvent::SelectionUpdate,
        EditorEvent::Focus,
        EditorEvent::Blur,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EditorEvent::Create => "create",
            EditorEvent::Update => "update",
            EditorEvent::SelectionUpdate => "selectionUpdate",
            EditorEvent::Focus => "focus",
            EditorEvent::Blur => "blur",
        }
    }
}

/// Callback registered for an event
pub type EventHandler = Arc<dyn Fn(EditorEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Attributes narrowing an `is_active` query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attrs {
    pub level: Option<u8>,
}

impl Attrs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn level(level: u8) -> Self {
        Self { level: Some(level) }
    }
}

/// Editor capability consumed by the toolbar adapters
///
/// Implementations are shared handles: every method takes `&self`.
pub trait EditorCapability: Send + Sync {
    /// Whether a mark or node type is active in the current selection
    fn is_active(&self, name: &str, attrs: Attrs) -> bool;

    /// Dry run: would `focus().<command>().run()` succeed right now?
    fn can_run(&self, command: Command) -> bool;

    /// Focus the document and run the command; returns whether it applied
    fn dispatch(&self, command: Command) -> bool;

    fn is_empty(&self) -> bool;

    fn is_editable(&self) -> bool;

    fn subscribe(&self, event: EditorEvent, handler: EventHandler) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}
