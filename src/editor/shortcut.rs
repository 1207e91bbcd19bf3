//! Keyboard shortcut labels

/// Platform the shortcut is shown on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Other,
}

impl Platform {
    /// Guess the platform from a `User-Agent` header
    pub fn from_user_agent(user_agent: &str) -> Self {
        if ["Mac OS", "iPhone", "iPad"]
            .iter()
            .any(|needle| user_agent.contains(needle))
        {
            Platform::Mac
        } else {
            Platform::Other
        }
    }
}

fn format_key(key: &str, platform: Platform) -> String {
    let mac = platform == Platform::Mac;
    let symbol = match key.to_ascii_lowercase().as_str() {
        "mod" | "cmd" | "meta" => if mac { "⌘" } else { "Ctrl" },
        "ctrl" | "control" => if mac { "⌃" } else { "Ctrl" },
        "alt" | "option" => if mac { "⌥" } else { "Alt" },
        "shift" => if mac { "⇧" } else { "Shift" },
        _ => return key.to_uppercase(),
    };
    symbol.to_string()
}

/// Split `Mod+Shift+I` into display keys for the platform
pub fn parse_shortcut_keys(shortcut: &str, platform: Platform) -> Vec<String> {
    shortcut
        .split('+')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| format_key(key, platform))
        .collect()
}

/// Shortcut as a single badge string (`⌘⇧I`, `Ctrl+Shift+I`)
pub fn shortcut_label(shortcut: &str, platform: Platform) -> String {
    let keys = parse_shortcut_keys(shortcut, platform);
    match platform {
        Platform::Mac => keys.concat(),
        Platform::Other => keys.join("+"),
    }
}
