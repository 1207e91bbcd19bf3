//! Formatting commands understood by the editor

use serde::Serialize;
use std::fmt;

/// Inline marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Strike,
    Code,
}

impl Mark {
    pub fn name(&self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Strike => "strike",
            Mark::Code => "code",
        }
    }
}

/// A command that can be chained onto `focus()` and run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum Command {
    ToggleBold,
    ToggleItalic,
    ToggleStrike,
    ToggleCode,
    SetParagraph,
    ToggleHeading { level: u8 },
    ToggleBulletList,
    ToggleOrderedList,
    ToggleBlockquote,
    ToggleCodeBlock,
    SetHorizontalRule,
    Undo,
    Redo,
    ClearContent,
    InsertImageUpload,
}

impl Command {
    /// Command name as used on the wire (`toggleBold`, `toggleHeading`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            Command::ToggleBold => "toggleBold",
            Command::ToggleItalic => "toggleItalic",
            Command::ToggleStrike => "toggleStrike",
            Command::ToggleCode => "toggleCode",
            Command::SetParagraph => "setParagraph",
            Command::ToggleHeading { .. } => "toggleHeading",
            Command::ToggleBulletList => "toggleBulletList",
            Command::ToggleOrderedList => "toggleOrderedList",
            Command::ToggleBlockquote => "toggleBlockquote",
            Command::ToggleCodeBlock => "toggleCodeBlock",
            Command::SetHorizontalRule => "setHorizontalRule",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::ClearContent => "clearContent",
            Command::InsertImageUpload => "insertImageUpload",
        }
    }

    /// Parse a command name plus the optional heading level
    pub fn parse(name: &str, level: Option<u8>) -> Option<Self> {
        let command = match name {
            "toggleBold" => Command::ToggleBold,
            "toggleItalic" => Command::ToggleItalic,
            "toggleStrike" => Command::ToggleStrike,
            "toggleCode" => Command::ToggleCode,
            "setParagraph" => Command::SetParagraph,
            "toggleHeading" => match level? {
                level @ 1..=6 => Command::ToggleHeading { level },
                _ => return None,
            },
            "toggleBulletList" => Command::ToggleBulletList,
            "toggleOrderedList" => Command::ToggleOrderedList,
            "toggleBlockquote" => Command::ToggleBlockquote,
            "toggleCodeBlock" => Command::ToggleCodeBlock,
            "setHorizontalRule" => Command::SetHorizontalRule,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "clearContent" => Command::ClearContent,
            "insertImageUpload" => Command::InsertImageUpload,
            _ => return None,
        };
        Some(command)
    }

    /// Mark toggled by this command, if it is a mark command
    pub fn mark(&self) -> Option<Mark> {
        match self {
            Command::ToggleBold => Some(Mark::Bold),
            Command::ToggleItalic => Some(Mark::Italic),
            Command::ToggleStrike => Some(Mark::Strike),
            Command::ToggleCode => Some(Mark::Code),
            _ => None,
        }
    }

    pub fn level(&self) -> Option<u8> {
        match self {
            Command::ToggleHeading { level } => Some(*level),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level() {
            Some(level) => write!(f, "{}({})", self.name(), level),
            None => f.write_str(self.name()),
        }
    }
}
