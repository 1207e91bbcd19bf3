//! Generator module - pre-renders every route to static HTML files

use anyhow::Result;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::cms::ContentRepository;
use crate::editor::Platform;
use crate::pages::{EditorSession, PageOutcome, SitePages};
use crate::templates::{STYLESHEET, STYLESHEET_PATH};
use crate::Site;

/// Static site generator
pub struct Generator {
    site: Site,
    pages: SitePages,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            pages: SitePages::new(site.config.clone())?,
        })
    }

    /// Generate the entire site, returning the number of pages written
    pub async fn generate(&self, repo: &dyn ContentRepository) -> Result<usize> {
        fs::create_dir_all(&self.site.public_dir)?;

        // Copy static assets (images, robots.txt, etc.)
        self.copy_static_assets()?;
        self.write(STYLESHEET_PATH.trim_start_matches('/'), STYLESHEET)?;

        let mut written = 0;

        self.write("index.html", &self.pages.home()?)?;
        self.write("links/index.html", &self.pages.links()?)?;
        self.write("404.html", &self.pages.not_found()?)?;

        let session = EditorSession::new(&self.site.config.editor);
        self.write("editor/index.html", &self.pages.editor(&session, Platform::Other)?)?;
        written += 4;

        self.write("posts/index.html", &self.pages.posts(repo).await?)?;
        written += 1;

        written += self.generate_post_pages(repo).await?;

        Ok(written)
    }

    /// Generate one page per known slug
    async fn generate_post_pages(&self, repo: &dyn ContentRepository) -> Result<usize> {
        let mut written = 0;

        for slug in repo.post_slugs().await? {
            if !is_safe_slug(&slug) {
                tracing::warn!("Skipping post with unsafe slug {:?}", slug);
                continue;
            }

            match self.pages.post(repo, &slug).await? {
                PageOutcome::Found(html) => {
                    self.write(&format!("post/{}/index.html", slug), &html)?;
                    written += 1;
                }
                PageOutcome::NotFound => {
                    tracing::warn!("Slug {:?} listed but not found", slug);
                }
            }
        }

        Ok(written)
    }

    fn write(&self, relative: &str, content: &str) -> Result<()> {
        let output_path = self.site.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, content)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy the static directory to the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}

/// Slugs become directory names, so they must stay a single component
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\'])
        && Path::new(slug).components().count() == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::FixtureRepository;
    use crate::config::SiteConfig;
    use crate::content::{Post, Slug};

    fn record(slug: Option<&str>) -> Post {
        Post {
            id: format!("post-{}", slug.unwrap_or("none")),
            title: "Generated".to_string(),
            slug: slug.map(Slug::new),
            body: None,
            published_at: None,
            main_image: None,
            author: None,
            categories: None,
        }
    }

    #[test]
    fn test_safe_slugs() {
        assert!(is_safe_slug("hello-world"));
        assert!(!is_safe_slug("../etc"));
        assert!(!is_safe_slug("a/b"));
        assert!(!is_safe_slug(".hidden"));
        assert!(!is_safe_slug(""));
    }

    #[tokio::test]
    async fn test_generate_site() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        fs::create_dir_all(site.static_dir.join("img")).unwrap();
        fs::write(site.static_dir.join("img/logo.svg"), "<svg/>").unwrap();

        let repo = FixtureRepository::new(
            vec![record(Some("first")), record(Some("../escape")), record(None)],
            20,
        );
        let written = Generator::new(&site).unwrap().generate(&repo).await.unwrap();
        assert_eq!(written, 6);

        let public = &site.public_dir;
        for path in [
            "index.html",
            "posts/index.html",
            "post/first/index.html",
            "links/index.html",
            "editor/index.html",
            "404.html",
            "assets/style.css",
            "img/logo.svg",
        ] {
            assert!(public.join(path).exists(), "missing {}", path);
        }
        assert!(!dir.path().join("escape").exists());

        let list = fs::read_to_string(public.join("posts/index.html")).unwrap();
        assert!(list.contains(r#"href="/post/first""#));
    }
}
