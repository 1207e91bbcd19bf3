//! Plain-text projections of rich-text bodies (excerpts, meta descriptions)

use lazy_static::lazy_static;
use regex::Regex;

use super::blocks::BlockNode;

/// Character budget for list excerpts
pub const EXCERPT_LENGTH: usize = 200;

/// Character budget for metadata descriptions
pub const DESCRIPTION_LENGTH: usize = 160;

const ELLIPSIS: &str = "…";

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Flatten a body to plain text
///
/// Only `block` nodes contribute; their span texts are concatenated, blocks
/// are joined by newlines and whitespace runs collapse to a single space.
pub fn blocks_to_plain_text(blocks: &[BlockNode]) -> String {
    let joined = blocks
        .iter()
        .map(|block| match block {
            BlockNode::Text(text) => text.spans().map(|span| span.text()).collect::<String>(),
            _ => String::new(),
        })
        .collect::<Vec<_>>()
        .join("\n");

    WHITESPACE.replace_all(&joined, " ").trim().to_string()
}

/// Shorten plain text to `budget` characters, ending in an ellipsis when cut
pub fn summarize(blocks: &[BlockNode], budget: usize) -> Option<String> {
    let text = blocks_to_plain_text(blocks);
    if text.is_empty() {
        return None;
    }
    // Three characters stay reserved even though the ellipsis is one.
    if text.chars().count() > budget {
        let kept: String = text.chars().take(budget.saturating_sub(3)).collect();
        Some(format!("{}{}", kept.trim_end(), ELLIPSIS))
    } else {
        Some(text)
    }
}

/// Excerpt for the post list
pub fn build_excerpt(blocks: &[BlockNode]) -> Option<String> {
    summarize(blocks, EXCERPT_LENGTH)
}

/// Description for page metadata
pub fn build_description(blocks: &[BlockNode]) -> Option<String> {
    summarize(blocks, DESCRIPTION_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::blocks::{ImageRef, InlineNode, Span, TextBlock};

    fn paragraph(texts: &[&str]) -> BlockNode {
        BlockNode::Text(TextBlock {
            children: Some(
                texts
                    .iter()
                    .map(|t| InlineNode::Span(Span::new(t)))
                    .collect(),
            ),
            ..TextBlock::default()
        })
    }

    #[test]
    fn test_plain_text_joins_and_collapses() {
        let blocks = vec![
            paragraph(&["Hello ", "  world"]),
            BlockNode::Image(ImageRef::from_ref("image-a-1x1-png")),
            paragraph(&["\tsecond\n\nline "]),
        ];
        assert_eq!(blocks_to_plain_text(&blocks), "Hello world second line");
    }

    #[test]
    fn test_plain_text_ignores_non_span_children() {
        let block = BlockNode::Text(TextBlock {
            children: Some(vec![
                InlineNode::Unknown,
                InlineNode::Span(Span::new("kept")),
                InlineNode::Span(Span::default()),
            ]),
            ..TextBlock::default()
        });
        assert_eq!(blocks_to_plain_text(&[block]), "kept");
    }

    #[test]
    fn test_short_text_is_verbatim() {
        let blocks = vec![paragraph(&["A short note."])];
        assert_eq!(build_excerpt(&blocks).as_deref(), Some("A short note."));
        assert_eq!(build_description(&blocks).as_deref(), Some("A short note."));
    }

    #[test]
    fn test_exact_budget_is_verbatim() {
        let text = "x".repeat(EXCERPT_LENGTH);
        let excerpt = build_excerpt(&[paragraph(&[&text])]).unwrap();
        assert_eq!(excerpt, text);
    }

    #[test]
    fn test_long_text_is_truncated_with_ellipsis() {
        let words = "lorem ipsum dolor sit amet ".repeat(20);
        let blocks = vec![paragraph(&[&words])];

        let excerpt = build_excerpt(&blocks).unwrap();
        assert!(excerpt.chars().count() <= EXCERPT_LENGTH);
        assert!(excerpt.ends_with('…'));
        assert!(!excerpt.trim_end_matches('…').ends_with(' '));

        let description = build_description(&blocks).unwrap();
        assert!(description.chars().count() <= DESCRIPTION_LENGTH);
        assert!(description.ends_with('…'));
    }

    #[test]
    fn test_multibyte_text_counts_characters() {
        let text = "é".repeat(250);
        let excerpt = build_excerpt(&[paragraph(&[&text])]).unwrap();
        assert_eq!(excerpt.chars().count(), 198);
    }

    #[test]
    fn test_empty_body_has_no_excerpt() {
        assert_eq!(build_excerpt(&[]), None);
        assert_eq!(build_excerpt(&[paragraph(&["   "])]), None);
    }
}
