//! Rich-text editor adapters
//!
//! The toolbar and upload button talk to an editor only through
//! [`EditorCapability`]. [`MemoryEditor`] is the in-process implementation
//! used by the playground page.

mod capability;
mod command;
mod memory;
mod shortcut;
mod subscription;
mod toolbar;
mod upload;

pub use capability::{Attrs, EditorCapability, EditorEvent, EventHandler, SubscriptionId};
pub use command::{Command, Mark};
pub use memory::{BlockKind, EditorBlock, MemoryEditor};
pub use shortcut::{parse_shortcut_keys, shortcut_label, Platform};
pub use subscription::Subscription;
pub use toolbar::{render_toolbar, Toolbar, ToolbarAdapter, ToolbarGroup, ToolbarItem};
pub use upload::{
    ClickEvent, ImageUploadButton, InsertedCallback, UploadButtonConfig, UploadButtonState,
    IMAGE_UPLOAD_SHORTCUT_KEY,
};
