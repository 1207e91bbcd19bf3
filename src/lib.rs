//! synthetic-site: personal site and blog front-end over a headless CMS
//!
//! Posts are fetched from a Sanity-compatible query API, their Portable
//! Text bodies rendered to HTML with Tera templates, and the result served
//! over HTTP or written out as static files. An editor playground exercises
//! the formatting toolbar adapters against an in-memory editor.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod editor;
pub mod generator;
pub mod helpers;
pub mod pages;
pub mod server;
pub mod templates;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{CachedRepository, ContentRepository, FixtureRepository, RevalidateWindows, SanityClient};

/// The site application
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied into the output and served as-is
    pub static_dir: PathBuf,
}

impl Site {
    /// Load `_config.yml` from a directory, then apply environment overrides
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env_overrides();

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a site around an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            public_dir,
            static_dir,
        }
    }

    /// Content source: a fixture file when given, the CMS otherwise
    ///
    /// Either way reads go through the revalidation cache.
    pub fn repository(&self, fixtures: Option<&Path>) -> Result<Arc<dyn ContentRepository>> {
        let limit = self.config.posts.limit;
        let inner: Arc<dyn ContentRepository> = match fixtures {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.base_dir.join(path)
                };
                tracing::info!("Serving content from fixtures {:?}", path);
                Arc::new(FixtureRepository::load(&path, limit)?)
            }
            None => Arc::new(
                SanityClient::new(&self.config.cms, limit)
                    .context("Set cms.project_id in _config.yml or SANITY_PROJECT_ID")?,
            ),
        };

        Ok(Arc::new(CachedRepository::with_capacity(
            inner,
            RevalidateWindows::from_config(&self.config),
            self.config.post.cache_capacity,
        )))
    }

    /// Generate the static site
    pub async fn generate(&self, repo: &dyn ContentRepository) -> Result<()> {
        commands::generate::run(self, repo).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.public_dir, dir.path().join("public"));
        assert_eq!(site.static_dir, dir.path().join("static"));
    }

    #[test]
    fn test_loads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("_config.yml"),
            "title: Test Site\npublic_dir: out\n",
        )
        .unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "Test Site");
        assert_eq!(site.public_dir, dir.path().join("out"));
    }

    #[test]
    fn test_repository_requires_project_or_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::SiteConfig::default();
        config.cms.project_id = String::new();
        let site = Site::with_config(dir.path(), config);

        assert!(site.repository(None).is_err());

        std::fs::write(dir.path().join("posts.json"), r#"{"posts": []}"#).unwrap();
        assert!(site.repository(Some(Path::new("posts.json"))).is_ok());
    }
}
