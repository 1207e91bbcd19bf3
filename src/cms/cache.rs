//! Revalidation cache for CMS reads
//!
//! Each result is kept for its window. Once the window passes the next read
//! refetches; if that fetch fails and an older value exists, the older value
//! is served instead of an error. Lookups that find nothing are not kept.

use async_trait::async_trait;
use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{CmsError, ContentRepository};
use crate::config::SiteConfig;
use crate::content::{Post, PostListItem};

/// Detail records kept when no capacity is configured
pub const DEFAULT_POST_CAPACITY: usize = 256;

/// How long each kind of read stays fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevalidateWindows {
    pub list: Duration,
    pub post: Duration,
}

impl RevalidateWindows {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            list: config.posts.revalidate(),
            post: config.post.revalidate(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

impl<T> Entry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, window: Duration) -> bool {
        self.fetched_at.elapsed() < window
    }
}

/// Outcome of a revalidation
enum Revalidated<T> {
    Fetched(T),
    Stale(T),
}

/// Run `fetch`, falling back to `stale` when the fetch fails
async fn revalidate<T, F>(fetch: F, stale: Option<T>) -> Result<Revalidated<T>, CmsError>
where
    F: Future<Output = Result<T, CmsError>>,
{
    match fetch.await {
        Ok(value) => Ok(Revalidated::Fetched(value)),
        Err(e) => match stale {
            Some(value) => {
                tracing::warn!("Revalidation failed, serving stale content: {}", e);
                Ok(Revalidated::Stale(value))
            }
            None => Err(e),
        },
    }
}

/// Repository wrapper that caches reads per revalidation window
///
/// Detail records live in a bounded LRU keyed by slug.
pub struct CachedRepository {
    inner: Arc<dyn ContentRepository>,
    windows: RevalidateWindows,
    list: Mutex<Option<Entry<Vec<PostListItem>>>>,
    slugs: Mutex<Option<Entry<Vec<String>>>>,
    posts: Mutex<LruCache<String, Entry<Post>>>,
}

impl CachedRepository {
    pub fn new(inner: Arc<dyn ContentRepository>, windows: RevalidateWindows) -> Self {
        Self::with_capacity(inner, windows, DEFAULT_POST_CAPACITY)
    }

    /// Keep at most `capacity` detail records (at least one)
    pub fn with_capacity(
        inner: Arc<dyn ContentRepository>,
        windows: RevalidateWindows,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            windows,
            list: Mutex::new(None),
            slugs: Mutex::new(None),
            posts: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn windows(&self) -> RevalidateWindows {
        self.windows
    }

    /// Number of detail records currently held
    pub async fn cached_posts(&self) -> usize {
        self.posts.lock().await.len()
    }
}

async fn cached<T, F>(
    slot: &Mutex<Option<Entry<T>>>,
    window: Duration,
    fetch: F,
) -> Result<T, CmsError>
where
    T: Clone,
    F: Future<Output = Result<T, CmsError>>,
{
    let stale = match slot.lock().await.as_ref() {
        Some(entry) if entry.is_fresh(window) => return Ok(entry.value.clone()),
        Some(entry) => Some(entry.value.clone()),
        None => None,
    };

    match revalidate(fetch, stale).await? {
        Revalidated::Fetched(value) => {
            *slot.lock().await = Some(Entry::new(value.clone()));
            Ok(value)
        }
        Revalidated::Stale(value) => Ok(value),
    }
}

#[async_trait]
impl ContentRepository for CachedRepository {
    async fn list_posts(&self) -> Result<Vec<PostListItem>, CmsError> {
        cached(&self.list, self.windows.list, self.inner.list_posts()).await
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, CmsError> {
        if slug.is_empty() {
            return Ok(None);
        }

        let stale = match self.posts.lock().await.get(slug) {
            Some(entry) if entry.is_fresh(self.windows.post) => {
                return Ok(Some(entry.value.clone()))
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        };

        match revalidate(self.inner.post_by_slug(slug), stale.map(Some)).await? {
            Revalidated::Fetched(Some(post)) => {
                self.posts
                    .lock()
                    .await
                    .put(slug.to_string(), Entry::new(post.clone()));
                Ok(Some(post))
            }
            Revalidated::Fetched(None) => {
                // Misses are never cached.
                self.posts.lock().await.pop(slug);
                Ok(None)
            }
            Revalidated::Stale(post) => Ok(post),
        }
    }

    async fn post_slugs(&self) -> Result<Vec<String>, CmsError> {
        cached(&self.slugs, self.windows.post, self.inner.post_slugs()).await
    }
}
