//! Content module - CMS records, rich-text blocks and their renderings

mod blocks;
pub mod plain;
mod post;
mod render;

pub use blocks::{AssetRef, BlockNode, CodeBlock, ImageRef, InlineNode, MarkDef, Span, TextBlock};
pub use post::{Author, Category, Post, PostListItem, Slug};
pub use render::PortableTextRenderer;
