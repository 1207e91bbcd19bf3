//! Portable Text to HTML rendering with syntax highlighting

use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::blocks::{BlockNode, CodeBlock, ImageRef, InlineNode, TextBlock};
use crate::cms::{Fit, ImageUrlBuilder};
use crate::helpers::{html_escape, link_to};

/// Inline images are requested at this width
const INLINE_IMAGE_WIDTH: u32 = 1200;
const INLINE_IMAGE_HEIGHT: u32 = 675;

/// Rich-text renderer for CMS bodies
pub struct PortableTextRenderer {
    images: ImageUrlBuilder,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl PortableTextRenderer {
    /// Create a new renderer
    pub fn new(images: ImageUrlBuilder) -> Self {
        Self::with_theme(images, "base16-ocean.dark")
    }

    /// Create with a custom highlight theme
    pub fn with_theme(images: ImageUrlBuilder, theme: &str) -> Self {
        Self {
            images,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    pub fn images(&self) -> &ImageUrlBuilder {
        &self.images
    }

    /// Render a body to HTML
    pub fn render(&self, blocks: &[BlockNode]) -> String {
        let mut html = String::new();
        let mut lists = ListStack::default();

        for block in blocks {
            match block {
                BlockNode::Text(text) if text.list_item.is_some() => {
                    lists.item(&mut html, text);
                    html.push_str(&self.render_inline(text));
                }
                BlockNode::Text(text) => {
                    lists.close_all(&mut html);
                    html.push_str(&self.render_text_block(text));
                }
                BlockNode::Image(image) => {
                    lists.close_all(&mut html);
                    html.push_str(&self.render_image(image));
                }
                BlockNode::Code(code) => {
                    lists.close_all(&mut html);
                    html.push_str(&self.render_code(code));
                }
                BlockNode::Unknown => {
                    tracing::debug!("Skipping unsupported block type");
                }
            }
        }

        lists.close_all(&mut html);
        html
    }

    fn render_text_block(&self, block: &TextBlock) -> String {
        let tag = match block.style() {
            style @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => style,
            "blockquote" => "blockquote",
            _ => "p",
        };
        format!("<{tag}>{}</{tag}>", self.render_inline(block))
    }

    /// Render spans with decorators and annotations
    fn render_inline(&self, block: &TextBlock) -> String {
        let mut html = String::new();

        for child in block.children.iter().flatten() {
            let InlineNode::Span(span) = child else {
                continue;
            };
            let Some(text) = span.text.as_deref() else {
                continue;
            };

            let mut inner = html_escape(text).replace('\n', "<br/>");
            // First mark ends up outermost.
            for mark in span.marks.iter().rev() {
                inner = self.apply_mark(block, mark, inner);
            }
            html.push_str(&inner);
        }

        html
    }

    fn apply_mark(&self, block: &TextBlock, mark: &str, inner: String) -> String {
        match mark {
            "strong" => format!("<strong>{}</strong>", inner),
            "em" => format!("<em>{}</em>", inner),
            "code" => format!("<code>{}</code>", inner),
            "underline" => format!(r#"<span style="text-decoration:underline">{}</span>"#, inner),
            "strike-through" => format!("<del>{}</del>", inner),
            key => match block.mark_def(key) {
                Some(def) if def.kind == "link" => match def.href.as_deref() {
                    Some(href) if !href.is_empty() => link_to(href, &inner, Some("link")),
                    _ => inner,
                },
                _ => inner,
            },
        }
    }

    /// Inline figure; references that cannot be resolved render nothing
    fn render_image(&self, image: &ImageRef) -> String {
        let Some(src) = self
            .images
            .image(image)
            .width(INLINE_IMAGE_WIDTH)
            .fit(Fit::Max)
            .url()
        else {
            tracing::debug!("Skipping image without a resolvable asset");
            return String::new();
        };

        let alt = image.alt().unwrap_or("");
        let caption = image
            .alt()
            .map(|alt| format!("<figcaption>{}</figcaption>", html_escape(alt)))
            .unwrap_or_default();

        format!(
            r#"<figure class="inline-image"><img src="{}" alt="{}" width="{}" height="{}" loading="lazy">{}</figure>"#,
            html_escape(&src),
            html_escape(alt),
            INLINE_IMAGE_WIDTH,
            INLINE_IMAGE_HEIGHT,
            caption
        )
    }

    /// Highlight a code block
    fn render_code(&self, block: &CodeBlock) -> String {
        let lang = block.language.as_deref().unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
            .and_then(|theme| {
                highlighted_html_for_string(&block.code, &self.syntax_set, syntax, theme).ok()
            })
            .unwrap_or_else(|| {
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    html_escape(lang),
                    html_escape(&block.code)
                )
            });

        let caption = block
            .filename
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| format!("<figcaption>{}</figcaption>", html_escape(name)))
            .unwrap_or_default();

        format!(
            r#"<figure class="highlight {}">{}{}</figure>"#,
            html_escape(lang),
            caption,
            highlighted
        )
    }
}

/// Open `<ul>`/`<ol>` elements while walking consecutive list items
#[derive(Default)]
struct ListStack {
    open: Vec<(&'static str, u32)>,
}

impl ListStack {
    /// Open the `<li>` for a list block, closing or nesting lists as needed
    fn item(&mut self, html: &mut String, block: &TextBlock) {
        let tag = match block.list_item.as_deref() {
            Some("number") => "ol",
            _ => "ul",
        };
        let level = block.level.unwrap_or(1).max(1);

        while let Some(&(open_tag, open_level)) = self.open.last() {
            if open_level > level || (open_level == level && open_tag != tag) {
                self.open.pop();
                html.push_str(&format!("</li></{}>", open_tag));
            } else {
                break;
            }
        }

        match self.open.last() {
            Some(&(_, open_level)) if open_level == level => html.push_str("</li>"),
            _ => {
                self.open.push((tag, level));
                html.push_str(&format!("<{}>", tag));
            }
        }
        html.push_str("<li>");
    }

    fn close_all(&mut self, html: &mut String) {
        while let Some((tag, _)) = self.open.pop() {
            html.push_str(&format!("</li></{}>", tag));
        }
    }
}
