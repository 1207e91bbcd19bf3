//! Post list (`/posts`) and post detail (`/post/{slug}`)

use anyhow::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{PageOutcome, SitePages};
use crate::cms::{ContentRepository, Fit};
use crate::content::plain::summarize;
use crate::content::{ImageRef, Post, PostListItem};
use crate::helpers::{date_xml, format_date, parse_date};
use crate::templates::{OpenGraph, PageMeta, PostCard, PostView, SizedImage, TwitterCard};

/// Characters kept as-is in a slug path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const HERO_SIZE: (u32, u32) = (1600, 900);
const OG_IMAGE_SIZE: (u32, u32) = (1200, 630);

/// Site path of a post
pub fn post_path(slug: &str) -> String {
    format!("/post/{}", utf8_percent_encode(slug, PATH_SEGMENT))
}

impl SitePages {
    /// Cards for the list page; records without a slug are skipped
    pub fn post_cards(&self, items: &[PostListItem]) -> Vec<PostCard> {
        items
            .iter()
            .filter_map(|item| {
                let slug = item.slug()?;
                let date = format_date(item.published_at.as_deref(), &self.tz);

                Some(PostCard {
                    title: item.title.clone(),
                    href: post_path(slug),
                    date: if date.is_empty() {
                        "Draft".to_string()
                    } else {
                        date
                    },
                    date_iso: iso_date(item.published_at.as_deref()),
                    excerpt: summarize(item.body(), self.config.posts.excerpt_length),
                })
            })
            .collect()
    }

    /// Render the list page from already fetched records
    pub fn posts_page(&self, items: &[PostListItem]) -> Result<String> {
        let posts = &self.config.posts;
        let meta = self.page_meta(&posts.title, &posts.description, "/posts");
        let cards = self.post_cards(items);

        self.render_page("posts.html", "/posts", &meta, |context| {
            context.insert("title", &posts.title);
            context.insert("heading", &posts.heading);
            context.insert("subheading", &posts.subheading);
            context.insert("posts", &cards);
        })
    }

    /// Fetch and render the list page
    pub async fn posts(&self, repo: &dyn ContentRepository) -> Result<String> {
        let items = repo.list_posts().await?;
        tracing::debug!("Rendering {} posts", items.len());
        self.posts_page(&items)
    }

    /// Fetch and render one post; unknown or empty slugs are not found
    pub async fn post(&self, repo: &dyn ContentRepository, slug: &str) -> Result<PageOutcome> {
        if slug.is_empty() {
            return Ok(PageOutcome::NotFound);
        }

        match repo.post_by_slug(slug).await? {
            Some(post) => Ok(PageOutcome::Found(self.post_page(&post)?)),
            None => {
                tracing::debug!("No post for slug {:?}", slug);
                Ok(PageOutcome::NotFound)
            }
        }
    }

    /// Render the detail page of a fetched record
    pub fn post_page(&self, post: &Post) -> Result<String> {
        let path = post.slug().map(post_path).unwrap_or_else(|| "/posts".to_string());
        let view = self.post_view(post);
        let meta = self.post_meta(post, &path);

        self.render_page("post.html", &path, &meta, |context| {
            context.insert("post", &view);
        })
    }

    pub fn post_view(&self, post: &Post) -> PostView {
        PostView {
            title: post.title.clone(),
            date: format_date(post.published_at.as_deref(), &self.tz),
            date_iso: iso_date(post.published_at.as_deref()),
            author: post.author_name().map(str::to_string),
            categories: post.category_titles(),
            hero: post
                .main_image
                .as_ref()
                .and_then(|image| self.cropped(image, HERO_SIZE, &post.title)),
            body_html: self.rich_text.render(post.body()),
        }
    }

    /// Title, description, Open Graph and Twitter card of a post
    pub fn post_meta(&self, post: &Post, path: &str) -> PageMeta {
        let description = summarize(post.body(), self.config.post.description_length)
            .unwrap_or_else(|| self.config.description.clone());
        let image = post
            .main_image
            .as_ref()
            .and_then(|image| self.cropped(image, OG_IMAGE_SIZE, &post.title));
        let url = self.absolute_url(path);

        PageMeta {
            title: post.title.clone(),
            description: description.clone(),
            canonical: url.clone(),
            twitter: TwitterCard {
                card: if image.is_some() {
                    "summary_large_image"
                } else {
                    "summary"
                },
                title: post.title.clone(),
                description: description.clone(),
                image: image.as_ref().map(|image| image.url.clone()),
            },
            og: Some(OpenGraph {
                kind: "article",
                title: post.title.clone(),
                description,
                url,
                published_time: iso_date(post.published_at.as_deref()),
                authors: post.author_name().map(str::to_string).into_iter().collect(),
                tags: post.category_titles(),
                image,
            }),
        }
    }

    fn cropped(
        &self,
        image: &ImageRef,
        (width, height): (u32, u32),
        title: &str,
    ) -> Option<SizedImage> {
        let url = self
            .rich_text
            .images()
            .image(image)
            .width(width)
            .height(height)
            .fit(Fit::Crop)
            .url()?;

        Some(SizedImage {
            url,
            alt: image
                .alt()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} cover image", title)),
            width,
            height,
        })
    }
}

fn iso_date(value: Option<&str>) -> Option<String> {
    value.and_then(parse_date).map(|date| date_xml(&date))
}
