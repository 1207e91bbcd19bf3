//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary, so the server and the generator
//! need nothing on disk besides `_config.yml`.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::editor::{shortcut_label, Platform, Toolbar, UploadButtonState};
use crate::helpers::html_escape;

/// Site stylesheet, served at [`STYLESHEET_PATH`]
pub const STYLESHEET: &str = include_str!("site/style.css");
pub const STYLESHEET_PATH: &str = "/assets/style.css";

/// Page renderer with the embedded site templates
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Values are escaped explicitly with `esc`; rendered rich text is not
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("posts.html", include_str!("site/posts.html")),
            ("post.html", include_str!("site/post.html")),
            ("links.html", include_str!("site/links.html")),
            ("editor.html", include_str!("site/editor.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("error.html", include_str!("site/error.html")),
        ])?;

        tera.register_filter("esc", esc_filter);
        tera.register_filter("shortcut", shortcut_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: escape text or attribute values
fn esc_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = match value {
        tera::Value::String(s) => s.clone(),
        tera::Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(tera::Value::String(html_escape(&s)))
}

/// Tera filter: display form of a shortcut (`Mod+B` -> `⌘B` or `Ctrl+B`)
fn shortcut_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let keys = tera::try_get_value!("shortcut", "value", String, value);
    let mac = match args.get("mac") {
        Some(val) => tera::try_get_value!("shortcut", "mac", bool, val),
        None => false,
    };
    let platform = if mac { Platform::Mac } else { Platform::Other };
    Ok(tera::Value::String(shortcut_label(&keys, platform)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub kicker: String,
    pub url: String,
    pub language: String,
    pub stylesheet: &'static str,
    pub nav: Vec<NavLink>,
    pub current_year: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    pub active: bool,
}

/// `<head>` metadata of a page
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub og: Option<OpenGraph>,
    pub twitter: TwitterCard,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenGraph {
    pub kind: &'static str,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_time: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub image: Option<SizedImage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TwitterCard {
    pub card: &'static str,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizedImage {
    pub url: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

/// One entry of the post list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCard {
    pub title: String,
    pub href: String,
    /// Formatted date, or "Draft"
    pub date: String,
    pub date_iso: Option<String>,
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub title: String,
    pub date: String,
    pub date_iso: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<String>,
    pub hero: Option<SizedImage>,
    pub body_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkData {
    pub label: String,
    pub href: String,
    pub description: Option<String>,
    pub external: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub title: String,
    pub lead: String,
    pub placeholder: String,
    pub content_html: String,
    pub is_empty: bool,
    pub is_focused: bool,
    pub editable: bool,
    pub mac: bool,
    pub toolbar: Option<Toolbar>,
    pub upload: Option<UploadButtonState>,
}
