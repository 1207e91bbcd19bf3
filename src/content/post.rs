//! Post records as returned by the CMS

use serde::{Deserialize, Serialize};

use super::blocks::{lenient_blocks, BlockNode, ImageRef};

/// Slug object (`{ current: "..." }`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default)]
    pub current: Option<String>,
}

impl Slug {
    pub fn new(current: &str) -> Self {
        Self {
            current: Some(current.to_string()),
        }
    }
}

/// Post author (dereferenced)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// Post category (dereferenced)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// A blog post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub slug: Option<Slug>,

    /// Rich-text body
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub body: Option<Vec<BlockNode>>,

    /// Publication timestamp, as stored (not validated)
    #[serde(default)]
    pub published_at: Option<String>,

    #[serde(default)]
    pub main_image: Option<ImageRef>,

    #[serde(default)]
    pub author: Option<Author>,

    /// Categories; null entries from broken references are dropped
    #[serde(default)]
    pub categories: Option<Vec<Option<Category>>>,
}

impl Post {
    /// Current slug, if the record has a non-empty one
    pub fn slug(&self) -> Option<&str> {
        slug_of(self.slug.as_ref())
    }

    pub fn body(&self) -> &[BlockNode] {
        self.body.as_deref().unwrap_or(&[])
    }

    /// Titles of all categories that have one
    pub fn category_titles(&self) -> Vec<String> {
        self.categories
            .iter()
            .flatten()
            .flatten()
            .filter_map(|category| category.title.clone())
            .filter(|title| !title.is_empty())
            .collect()
    }

    /// Author name, if present and non-empty
    pub fn author_name(&self) -> Option<&str> {
        self.author
            .as_ref()
            .and_then(|author| author.name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Project the record down to what the list page needs
    pub fn to_list_item(&self) -> PostListItem {
        PostListItem {
            id: self.id.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            published_at: self.published_at.clone(),
            body: self.body.clone(),
        }
    }
}

/// Post projection used by the list page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListItem {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub slug: Option<Slug>,

    #[serde(default)]
    pub published_at: Option<String>,

    #[serde(default, deserialize_with = "lenient_blocks")]
    pub body: Option<Vec<BlockNode>>,
}

impl PostListItem {
    pub fn slug(&self) -> Option<&str> {
        slug_of(self.slug.as_ref())
    }

    pub fn body(&self) -> &[BlockNode] {
        self.body.as_deref().unwrap_or(&[])
    }
}

fn slug_of(slug: Option<&Slug>) -> Option<&str> {
    slug.and_then(|s| s.current.as_deref())
        .filter(|current| !current.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_post() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Hello",
            "slug": {"current": "hello", "_type": "slug"},
            "publishedAt": "2024-01-15T10:30:00Z",
            "mainImage": {"asset": {"_ref": "image-abc-1600x900-jpg"}, "alt": "Cover"},
            "author": {"_id": "a1", "name": "Ada"},
            "categories": [{"_id": "c1", "title": "Music"}, null, {"_id": "c2"}],
            "body": [{"_type": "block", "children": [{"_type": "span", "text": "Hi"}]}]
        }))
        .unwrap();

        assert_eq!(post.slug(), Some("hello"));
        assert_eq!(post.author_name(), Some("Ada"));
        assert_eq!(post.category_titles(), vec!["Music".to_string()]);
        assert_eq!(post.body().len(), 1);
        assert!(post.main_image.is_some());
    }

    #[test]
    fn test_nulls_and_missing_fields() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p2",
            "title": "Bare",
            "slug": null,
            "body": null,
            "mainImage": null,
            "author": null,
            "categories": null
        }))
        .unwrap();

        assert_eq!(post.slug(), None);
        assert!(post.body().is_empty());
        assert!(post.category_titles().is_empty());
        assert_eq!(post.author_name(), None);
    }

    #[test]
    fn test_empty_slug_is_missing() {
        let item: PostListItem =
            serde_json::from_value(json!({"_id": "p3", "title": "T", "slug": {"current": ""}}))
                .unwrap();
        assert_eq!(item.slug(), None);
    }
}
