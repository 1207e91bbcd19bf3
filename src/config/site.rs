//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub kicker: String,
    pub language: String,
    pub timezone: String,
    pub url: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Rendering
    pub highlight_theme: String,

    // Sections
    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub posts: PostsConfig,
    #[serde(default)]
    pub post: PostConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "All Too Synthetic".to_string(),
            description: "Writing, links, and experiments.".to_string(),
            kicker: "ALL TOO SYNTHETIC".to_string(),
            language: "en".to_string(),
            timezone: "UTC".to_string(),
            url: "http://localhost:4000".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            highlight_theme: "base16-ocean.dark".to_string(),

            cms: CmsConfig::default(),
            posts: PostsConfig::default(),
            post: PostConfig::default(),
            links: LinksConfig::default(),
            editor: EditorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Apply `SANITY_*` environment overrides on top of the file values
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup("SANITY_PROJECT_ID") {
            self.cms.project_id = project_id;
        }
        if let Some(dataset) = lookup("SANITY_DATASET") {
            self.cms.dataset = dataset;
        }
        if let Some(api_version) = lookup("SANITY_API_VERSION") {
            self.cms.api_version = api_version;
        }
        if let Some(token) = lookup("SANITY_API_TOKEN").filter(|t| !t.is_empty()) {
            tracing::debug!("Using CMS token from environment");
            self.cms.token = Some(token);
        }
    }

    /// Parsed display time zone, falling back to UTC
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            chrono_tz::UTC
        })
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            token: None,
            timeout_secs: 10,
        }
    }
}

/// Post list page (`/posts`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    pub title: String,
    pub description: String,
    pub heading: String,
    pub subheading: String,
    pub limit: usize,
    pub excerpt_length: usize,
    pub revalidate_secs: u64,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            title: "Sanity Blog".to_string(),
            description: "Latest posts from the Sanity-powered blog.".to_string(),
            heading: "Communication".to_string(),
            subheading: "Published communication".to_string(),
            limit: 20,
            excerpt_length: 200,
            revalidate_secs: 120,
        }
    }
}

impl PostsConfig {
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

/// Post detail page (`/post/{id}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub description_length: usize,
    pub revalidate_secs: u64,
    /// Most detail records held in memory between revalidations
    pub cache_capacity: usize,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            description_length: 160,
            revalidate_secs: 60,
            cache_capacity: 256,
        }
    }
}

impl PostConfig {
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

/// A single profile link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SocialLink {
    fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
            description: None,
        }
    }
}

/// Links page (`/links`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub title: String,
    pub description: String,
    pub kicker: String,
    pub heading: String,
    pub subheading: String,
    pub items: Vec<SocialLink>,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            title: "Links".to_string(),
            description: "Connect across the internet.".to_string(),
            kicker: "Connect".to_string(),
            heading: "Profiles".to_string(),
            subheading: "Various profiles on the internet.".to_string(),
            items: vec![
                SocialLink::new("Email", "mailto:tbutler1132@gmail.com"),
                SocialLink::new("Instagram", "https://www.instagram.com/alltoosynthetic"),
                SocialLink::new("X", "https://x.com/alltoosynthetic"),
                SocialLink::new("YouTube", "https://www.youtube.com/@alltoosynthetic"),
                SocialLink::new("SoundCloud", "https://soundcloud.com/alltoosynthetic"),
                SocialLink::new("GitHub", "https://github.com/tbutler1132"),
            ],
        }
    }
}

/// Editor playground (`/editor`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub title: String,
    pub lead: String,
    pub initial_content: String,
    pub placeholder: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            title: "Editor Playground".to_string(),
            lead: "Compose rich stories, capture notes, and experiment with formatting using the controls below.".to_string(),
            initial_content: "Capture a wild idea, draft a post, or remix something you have been tinkering with.".to_string(),
            placeholder: "Write something unforgettable...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts.limit, 20);
        assert_eq!(config.posts.excerpt_length, 200);
        assert_eq!(config.post.description_length, 160);
        assert_eq!(config.posts.revalidate(), Duration::from_secs(120));
        assert_eq!(config.post.revalidate(), Duration::from_secs(60));
        assert_eq!(config.cms.dataset, "production");
        assert_eq!(config.post.cache_capacity, 256);

        let labels: Vec<_> = config.links.items.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Email", "Instagram", "X", "YouTube", "SoundCloud", "GitHub"]
        );
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
timezone: America/New_York
cms:
  project_id: abc123
  use_cdn: false
posts:
  limit: 5
links:
  items:
    - label: GitHub
      href: https://github.com/example
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.cms.project_id, "abc123");
        assert!(!config.cms.use_cdn);
        assert_eq!(config.cms.dataset, "production");
        assert_eq!(config.posts.limit, 5);
        assert_eq!(config.posts.excerpt_length, 200);
        assert_eq!(config.links.items.len(), 1);
        assert_eq!(config.tz(), chrono_tz::America::New_York);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "title: On Disk\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "On Disk");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SANITY_PROJECT_ID", "proj"),
            ("SANITY_DATASET", "staging"),
            ("SANITY_API_TOKEN", ""),
        ]
        .into_iter()
        .collect();
        let mut config = SiteConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.cms.project_id, "proj");
        assert_eq!(config.cms.dataset, "staging");
        assert_eq!(config.cms.api_version, "2024-01-01");
        assert_eq!(config.cms.token, None);
    }

    #[test]
    fn test_unknown_timezone_falls_back() {
        let config = SiteConfig {
            timezone: "Mars/Olympus".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(config.tz(), chrono_tz::UTC);
    }
}
