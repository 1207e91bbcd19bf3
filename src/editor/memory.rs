//! In-memory editor backing the playground
//!
//! Flat list of blocks with one cursor block. Marks are stored per block
//! and undo/redo keeps whole-document snapshots.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use super::capability::{Attrs, EditorCapability, EditorEvent, EventHandler, SubscriptionId};
use super::command::{Command, Mark};
use crate::helpers::html_escape;

/// Maximum number of undo steps kept
const HISTORY_DEPTH: usize = 100;

/// Node type of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    BulletList,
    OrderedList,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    ImageUpload,
}

impl BlockKind {
    /// Whether the block holds editable text
    fn is_textual(&self) -> bool {
        !matches!(self, BlockKind::HorizontalRule | BlockKind::ImageUpload)
    }
}

/// One block of the document
#[derive(Debug, Clone, PartialEq)]
pub struct EditorBlock {
    pub kind: BlockKind,
    pub text: String,
    pub marks: BTreeSet<Mark>,
}

impl EditorBlock {
    fn new(kind: BlockKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            marks: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Document {
    blocks: Vec<EditorBlock>,
    cursor: usize,
}

impl Document {
    fn with_text(text: &str) -> Self {
        Self {
            blocks: vec![EditorBlock::new(BlockKind::Paragraph, text)],
            cursor: 0,
        }
    }

    fn current(&self) -> &EditorBlock {
        &self.blocks[self.cursor]
    }

    fn current_mut(&mut self) -> &mut EditorBlock {
        &mut self.blocks[self.cursor]
    }

    fn insert_after_cursor(&mut self, block: EditorBlock) {
        self.cursor += 1;
        self.blocks.insert(self.cursor, block);
    }

    fn is_empty(&self) -> bool {
        self.blocks.len() == 1
            && self.blocks[0].kind == BlockKind::Paragraph
            && self.blocks[0].text.is_empty()
    }
}

struct Inner {
    doc: Document,
    undo: Vec<Document>,
    redo: Vec<Document>,
    focused: bool,
    editable: bool,
    revision: u64,
    handlers: Vec<(SubscriptionId, EditorEvent, EventHandler)>,
    next_id: u64,
}

impl Inner {
    fn can_run(&self, command: Command) -> bool {
        if !self.editable {
            return false;
        }
        let current = self.doc.current().kind;

        match command {
            Command::Undo => !self.undo.is_empty(),
            Command::Redo => !self.redo.is_empty(),
            Command::ClearContent => true,
            Command::SetHorizontalRule => current != BlockKind::CodeBlock,
            Command::InsertImageUpload => {
                current != BlockKind::CodeBlock && current != BlockKind::ImageUpload
            }
            Command::ToggleBold
            | Command::ToggleItalic
            | Command::ToggleStrike
            | Command::ToggleCode => current.is_textual() && current != BlockKind::CodeBlock,
            Command::SetParagraph
            | Command::ToggleHeading { .. }
            | Command::ToggleBulletList
            | Command::ToggleOrderedList
            | Command::ToggleBlockquote
            | Command::ToggleCodeBlock => current.is_textual(),
        }
    }

    fn record(&mut self) {
        self.undo.push(self.doc.clone());
        if self.undo.len() > HISTORY_DEPTH {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Undo => {
                if let Some(previous) = self.undo.pop() {
                    let current = std::mem::replace(&mut self.doc, previous);
                    self.redo.push(current);
                }
                return;
            }
            Command::Redo => {
                if let Some(next) = self.redo.pop() {
                    let current = std::mem::replace(&mut self.doc, next);
                    self.undo.push(current);
                }
                return;
            }
            _ => self.record(),
        }

        if let Some(mark) = command.mark() {
            let marks = &mut self.doc.current_mut().marks;
            if !marks.remove(&mark) {
                marks.insert(mark);
            }
            return;
        }

        let toggle = |current: BlockKind, target: BlockKind| {
            if current == target {
                BlockKind::Paragraph
            } else {
                target
            }
        };
        let current = self.doc.current().kind;

        match command {
            Command::SetParagraph => self.doc.current_mut().kind = BlockKind::Paragraph,
            Command::ToggleHeading { level } => {
                self.doc.current_mut().kind = toggle(current, BlockKind::Heading(level))
            }
            Command::ToggleBulletList => {
                self.doc.current_mut().kind = toggle(current, BlockKind::BulletList)
            }
            Command::ToggleOrderedList => {
                self.doc.current_mut().kind = toggle(current, BlockKind::OrderedList)
            }
            Command::ToggleBlockquote => {
                self.doc.current_mut().kind = toggle(current, BlockKind::Blockquote)
            }
            Command::ToggleCodeBlock => {
                let block = self.doc.current_mut();
                block.kind = toggle(current, BlockKind::CodeBlock);
                if block.kind == BlockKind::CodeBlock {
                    block.marks.clear();
                }
            }
            Command::SetHorizontalRule => {
                self.doc
                    .insert_after_cursor(EditorBlock::new(BlockKind::HorizontalRule, ""));
                self.doc
                    .insert_after_cursor(EditorBlock::new(BlockKind::Paragraph, ""));
            }
            Command::InsertImageUpload => {
                self.doc
                    .insert_after_cursor(EditorBlock::new(BlockKind::ImageUpload, ""));
            }
            Command::ClearContent => self.doc = Document::with_text(""),
            _ => {}
        }
    }

    fn handlers_for(&self, events: &[EditorEvent]) -> Vec<(EditorEvent, EventHandler)> {
        events
            .iter()
            .flat_map(|event| {
                self.handlers
                    .iter()
                    .filter(move |(_, e, _)| e == event)
                    .map(move |(_, _, handler)| (*event, handler.clone()))
            })
            .collect()
    }
}

/// Thread-safe in-memory editor
pub struct MemoryEditor {
    inner: Mutex<Inner>,
}

impl MemoryEditor {
    /// Create an editor holding one paragraph of text
    pub fn new(initial_text: &str) -> Self {
        Self {
            inner: Mutex::new(Inner {
                doc: Document::with_text(initial_text),
                undo: Vec::new(),
                redo: Vec::new(),
                focused: false,
                editable: true,
                revision: 0,
                handlers: Vec::new(),
                next_id: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Handlers never run under the lock.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` under the lock, then fire the events it reports
    fn mutate<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Inner) -> Option<Vec<EditorEvent>>,
    {
        let handlers = {
            let mut inner = self.lock();
            match f(&mut inner) {
                Some(events) => {
                    inner.revision += 1;
                    inner.handlers_for(&events)
                }
                None => return false,
            }
        };

        for (event, handler) in handlers {
            handler(event);
        }
        true
    }

    /// Replace the document and emit `create`
    pub fn reset(&self, text: &str) {
        self.mutate(|inner| {
            inner.doc = Document::with_text(text);
            inner.undo.clear();
            inner.redo.clear();
            Some(vec![EditorEvent::Create])
        });
    }

    pub fn set_editable(&self, editable: bool) {
        self.mutate(|inner| {
            inner.editable = editable;
            Some(vec![EditorEvent::Update])
        });
    }

    /// Append text to the cursor block
    pub fn insert_text(&self, text: &str) -> bool {
        self.mutate(|inner| {
            if !inner.editable || !inner.doc.current().kind.is_textual() || text.is_empty() {
                return None;
            }
            inner.record();
            inner.doc.current_mut().text.push_str(text);
            Some(vec![EditorEvent::Update])
        })
    }

    /// Move the cursor to another block
    pub fn select_block(&self, index: usize) -> bool {
        self.mutate(|inner| {
            if index >= inner.doc.blocks.len() {
                return None;
            }
            inner.doc.cursor = index;
            Some(vec![EditorEvent::SelectionUpdate])
        })
    }

    pub fn focus(&self) {
        self.mutate(|inner| {
            if inner.focused {
                return None;
            }
            inner.focused = true;
            Some(vec![EditorEvent::Focus])
        });
    }

    pub fn blur(&self) {
        self.mutate(|inner| {
            if !inner.focused {
                return None;
            }
            inner.focused = false;
            Some(vec![EditorEvent::Blur])
        });
    }

    pub fn blocks(&self) -> Vec<EditorBlock> {
        self.lock().doc.blocks.clone()
    }

    pub fn cursor(&self) -> usize {
        self.lock().doc.cursor
    }

    /// Bumped on every state change
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    pub fn is_focused(&self) -> bool {
        self.lock().focused
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().handlers.len()
    }

    /// Render the document as HTML
    pub fn to_html(&self) -> String {
        let inner = self.lock();
        let mut html = String::new();
        let mut open_list: Option<&'static str> = None;

        for (index, block) in inner.doc.blocks.iter().enumerate() {
            let list = match block.kind {
                BlockKind::BulletList => Some("ul"),
                BlockKind::OrderedList => Some("ol"),
                _ => None,
            };
            if open_list != list {
                if let Some(tag) = open_list {
                    html.push_str(&format!("</{}>", tag));
                }
                if let Some(tag) = list {
                    html.push_str(&format!("<{}>", tag));
                }
                open_list = list;
            }

            let selected = if index == inner.doc.cursor {
                r#" class="is-selected""#
            } else {
                ""
            };
            let text = render_marks(&html_escape(&block.text), &block.marks);

            let rendered = match block.kind {
                BlockKind::Paragraph => format!("<p{}>{}</p>", selected, text),
                BlockKind::Heading(level) => {
                    format!("<h{level}{}>{}</h{level}>", selected, text)
                }
                BlockKind::BulletList | BlockKind::OrderedList => {
                    format!("<li{}>{}</li>", selected, text)
                }
                BlockKind::Blockquote => {
                    format!("<blockquote{}><p>{}</p></blockquote>", selected, text)
                }
                BlockKind::CodeBlock => format!(
                    "<pre{}><code>{}</code></pre>",
                    selected,
                    html_escape(&block.text)
                ),
                BlockKind::HorizontalRule => format!("<hr{}>", selected),
                BlockKind::ImageUpload => format!(
                    r#"<div data-type="image-upload"{}>Drop an image here</div>"#,
                    selected
                ),
            };
            html.push_str(&rendered);
        }

        if let Some(tag) = open_list {
            html.push_str(&format!("</{}>", tag));
        }
        html
    }
}

fn render_marks(text: &str, marks: &BTreeSet<Mark>) -> String {
    marks.iter().rev().fold(text.to_string(), |inner, mark| match mark {
        Mark::Bold => format!("<strong>{}</strong>", inner),
        Mark::Italic => format!("<em>{}</em>", inner),
        Mark::Strike => format!("<s>{}</s>", inner),
        Mark::Code => format!("<code>{}</code>", inner),
    })
}

impl EditorCapability for MemoryEditor {
    fn is_active(&self, name: &str, attrs: Attrs) -> bool {
        let inner = self.lock();
        let block = inner.doc.current();

        match name {
            "bold" => block.marks.contains(&Mark::Bold),
            "italic" => block.marks.contains(&Mark::Italic),
            "strike" => block.marks.contains(&Mark::Strike),
            "code" => block.marks.contains(&Mark::Code),
            "paragraph" => block.kind == BlockKind::Paragraph,
            "heading" => match block.kind {
                BlockKind::Heading(level) => attrs.level.map_or(true, |l| l == level),
                _ => false,
            },
            "bulletList" => block.kind == BlockKind::BulletList,
            "orderedList" => block.kind == BlockKind::OrderedList,
            "blockquote" => block.kind == BlockKind::Blockquote,
            "codeBlock" => block.kind == BlockKind::CodeBlock,
            "horizontalRule" => block.kind == BlockKind::HorizontalRule,
            "imageUpload" => block.kind == BlockKind::ImageUpload,
            _ => false,
        }
    }

    fn can_run(&self, command: Command) -> bool {
        self.lock().can_run(command)
    }

    fn dispatch(&self, command: Command) -> bool {
        self.mutate(|inner| {
            if !inner.can_run(command) {
                tracing::debug!("Rejected unavailable command {}", command);
                return None;
            }
            let mut events = Vec::new();
            if !inner.focused {
                inner.focused = true;
                events.push(EditorEvent::Focus);
            }
            inner.apply(command);
            events.push(EditorEvent::Update);
            Some(events)
        })
    }

    fn is_empty(&self) -> bool {
        self.lock().doc.is_empty()
    }

    fn is_editable(&self) -> bool {
        self.lock().editable
    }

    fn subscribe(&self, event: EditorEvent, handler: EventHandler) -> SubscriptionId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.handlers.push((id, event, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().handlers.retain(|(existing, _, _)| *existing != id);
    }
}
