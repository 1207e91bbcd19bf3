//! Scoped event subscriptions

use std::sync::Arc;

use super::capability::{EditorCapability, EditorEvent, EventHandler, SubscriptionId};

/// Unsubscribes its handler when dropped
pub struct Subscription<E: EditorCapability + ?Sized> {
    editor: Arc<E>,
    id: SubscriptionId,
    event: EditorEvent,
}

impl<E: EditorCapability + ?Sized> Subscription<E> {
    pub fn new(editor: Arc<E>, event: EditorEvent, handler: EventHandler) -> Self {
        let id = editor.subscribe(event, handler);
        Self { editor, id, event }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn event(&self) -> EditorEvent {
        self.event
    }
}

impl<E: EditorCapability + ?Sized> Drop for Subscription<E> {
    fn drop(&mut self) {
        tracing::trace!("Unsubscribing from {}", self.event.name());
        self.editor.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::MemoryEditor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_drop_unsubscribes() {
        let editor = Arc::new(MemoryEditor::new("hello"));
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let subscription = Subscription::new(
            editor.clone(),
            EditorEvent::Update,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(editor.subscriber_count(), 1);

        editor.insert_text(" world");
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(subscription);
        assert_eq!(editor.subscriber_count(), 0);
        editor.insert_text("!");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribes_on_panic() {
        let editor = Arc::new(MemoryEditor::new(""));
        let handle = editor.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _subscription = Subscription::new(handle, EditorEvent::Focus, Arc::new(|_| {}));
            panic!("render failed");
        }));
        assert!(result.is_err());
        assert_eq!(editor.subscriber_count(), 0);
    }
}
