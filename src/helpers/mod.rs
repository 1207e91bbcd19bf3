//! Helper functions shared by the renderers and page builders

mod date;
mod html;

pub use date::*;
pub use html::*;
