//! Content fetch layer
//!
//! Pages talk to the CMS through [`ContentRepository`], a read-only
//! repository injected at startup. The live implementation is
//! [`SanityClient`]; [`FixtureRepository`] serves JSON fixtures and
//! [`CachedRepository`] adds revalidation windows on top of either.

mod cache;
mod client;
mod fixture;
mod image;
pub mod queries;

pub use cache::{CachedRepository, RevalidateWindows};
pub use client::{QueryParams, SanityClient};
pub use fixture::FixtureRepository;
pub use image::{AssetId, Fit, ImageUrl, ImageUrlBuilder};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::content::{Post, PostListItem};

/// Errors raised while fetching content
#[derive(Error, Debug)]
pub enum CmsError {
    /// CMS settings are missing or unusable
    #[error("CMS is not configured: {0}")]
    Config(String),

    /// Transport-level failure
    #[error("CMS request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The CMS answered with a non-success status
    #[error("CMS returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload did not match the expected shape
    #[error("Failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Fixture file could not be read
    #[error("Failed to read fixtures '{path}': {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only access to published posts
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Most recent posts that have a slug, newest first
    async fn list_posts(&self) -> Result<Vec<PostListItem>, CmsError>;

    /// A single post by slug; empty slugs never match
    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, CmsError>;

    /// Every known post slug
    async fn post_slugs(&self) -> Result<Vec<String>, CmsError>;
}
