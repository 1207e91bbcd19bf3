//! JSON fixture repository for offline runs and tests

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{CmsError, ContentRepository};
use crate::content::{Post, PostListItem};

/// On-disk fixture layout
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Serves posts from memory, mirroring the live queries
#[derive(Debug, Clone, Default)]
pub struct FixtureRepository {
    posts: Vec<Post>,
    list_limit: usize,
}

impl FixtureRepository {
    pub fn new(posts: Vec<Post>, list_limit: usize) -> Self {
        Self { posts, list_limit }
    }

    /// Load posts from a JSON file (`{"posts": [...]}`)
    pub fn load<P: AsRef<Path>>(path: P, list_limit: usize) -> Result<Self, CmsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CmsError::Fixture {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FixtureFile = serde_json::from_str(&content)?;
        tracing::info!("Loaded {} fixture posts from {:?}", file.posts.len(), path);
        Ok(Self::new(file.posts, list_limit))
    }
}

#[async_trait]
impl ContentRepository for FixtureRepository {
    async fn list_posts(&self) -> Result<Vec<PostListItem>, CmsError> {
        let mut posts: Vec<&Post> = self.posts.iter().filter(|p| p.slug().is_some()).collect();
        // ISO timestamps sort lexically; undated posts go last.
        posts.sort_by(|a, b| match (&a.published_at, &b.published_at) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        Ok(posts
            .into_iter()
            .take(self.list_limit)
            .map(Post::to_list_item)
            .collect())
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, CmsError> {
        if slug.is_empty() {
            return Ok(None);
        }
        Ok(self.posts.iter().find(|p| p.slug() == Some(slug)).cloned())
    }

    async fn post_slugs(&self) -> Result<Vec<String>, CmsError> {
        Ok(self
            .posts
            .iter()
            .filter_map(|p| p.slug().map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Slug;

    fn post(id: &str, slug: Option<&str>, published_at: Option<&str>) -> Post {
        Post {
            id: id.to_string(),
            title: format!("Post {}", id),
            slug: slug.map(Slug::new),
            published_at: published_at.map(str::to_string),
            ..Post::default()
        }
    }

    fn repo() -> FixtureRepository {
        FixtureRepository::new(
            vec![
                post("old", Some("old"), Some("2023-01-01T00:00:00Z")),
                post("draft", Some("draft"), None),
                post("new", Some("new"), Some("2024-06-01T00:00:00Z")),
                post("noslug", None, Some("2025-01-01T00:00:00Z")),
            ],
            20,
        )
    }

    #[tokio::test]
    async fn test_list_orders_and_filters() {
        let ids: Vec<_> = repo()
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["new", "old", "draft"]);
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let mut repo = repo();
        repo.list_limit = 1;
        assert_eq!(repo.list_posts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_by_slug() {
        let repo = repo();
        assert_eq!(repo.post_by_slug("old").await.unwrap().unwrap().id, "old");
        assert!(repo.post_by_slug("missing").await.unwrap().is_none());
        assert!(repo.post_by_slug("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_slugs() {
        let slugs = repo().post_slugs().await.unwrap();
        assert_eq!(slugs, vec!["old", "draft", "new"]);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(
            &path,
            r#"{"posts": [{"_id": "p1", "title": "Hi", "slug": {"current": "hi"}}]}"#,
        )
        .unwrap();
        let repo = FixtureRepository::load(&path, 20).unwrap();
        assert_eq!(repo.posts.len(), 1);

        let missing = FixtureRepository::load(dir.path().join("nope.json"), 20);
        assert!(matches!(missing, Err(CmsError::Fixture { .. })));
    }

    #[tokio::test]
    async fn test_bundled_fixtures() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/posts.json");
        let repo = FixtureRepository::load(&path, 20).unwrap();

        let posts = repo.list_posts().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].slug(), Some("signal-chains-at-dawn"));

        let post = repo
            .post_by_slug("signal-chains-at-dawn")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.category_titles(), vec!["Music", "Gear"]);
        assert_eq!(post.body().len(), 6);
    }
}
