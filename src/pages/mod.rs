//! Page composition: CMS records + rich text + templates -> HTML

mod editor;
mod posts;

pub use editor::EditorSession;
pub use posts::post_path;

use anyhow::Result;
use chrono::Datelike;
use tera::Context;

use crate::cms::ImageUrlBuilder;
use crate::config::SiteConfig;
use crate::content::PortableTextRenderer;
use crate::helpers::is_external;
use crate::templates::{
    LinkData, NavLink, PageMeta, PageRenderer, SiteData, TwitterCard, STYLESHEET_PATH,
};

/// Result of rendering a route that may not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Found(String),
    NotFound,
}

/// Top navigation entries
const NAV: [(&str, &str); 4] = [
    ("Home", "/"),
    ("Posts", "/posts"),
    ("Links", "/links"),
    ("Editor", "/editor"),
];

/// Renders every page of the site
pub struct SitePages {
    config: SiteConfig,
    tz: chrono_tz::Tz,
    templates: PageRenderer,
    rich_text: PortableTextRenderer,
}

impl SitePages {
    pub fn new(config: SiteConfig) -> Result<Self> {
        let images = ImageUrlBuilder::new(&config.cms);
        let rich_text = PortableTextRenderer::with_theme(images, &config.highlight_theme);

        Ok(Self {
            tz: config.tz(),
            templates: PageRenderer::new()?,
            rich_text,
            config,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    fn site_data(&self, current_path: &str) -> SiteData {
        let nav = NAV
            .iter()
            .map(|(label, href)| NavLink {
                label: label.to_string(),
                href: href.to_string(),
                active: is_current(href, current_path),
            })
            .collect();

        SiteData {
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            kicker: self.config.kicker.clone(),
            url: self.config.url.clone(),
            language: self.config.language.clone(),
            stylesheet: STYLESHEET_PATH,
            nav,
            current_year: chrono::Utc::now()
                .with_timezone(&self.tz)
                .year()
                .to_string(),
        }
    }

    /// Absolute URL of a site path
    fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Metadata for pages without Open Graph article data
    fn page_meta(&self, title: &str, description: &str, path: &str) -> PageMeta {
        PageMeta {
            title: title.to_string(),
            description: description.to_string(),
            canonical: self.absolute_url(path),
            og: None,
            twitter: TwitterCard {
                card: "summary",
                title: title.to_string(),
                description: description.to_string(),
                image: None,
            },
        }
    }

    /// Render `template` inside the layout
    fn render_page<F>(&self, template: &str, path: &str, meta: &PageMeta, fill: F) -> Result<String>
    where
        F: FnOnce(&mut Context),
    {
        let mut context = Context::new();
        context.insert("site", &self.site_data(path));
        context.insert("meta", meta);
        fill(&mut context);
        self.templates.render(template, &context)
    }

    /// Landing page (`/`)
    pub fn home(&self) -> Result<String> {
        let meta = self.page_meta(&self.config.title, &self.config.description, "/");
        self.render_page("home.html", "/", &meta, |_| {})
    }

    /// Social profiles (`/links`)
    pub fn links(&self) -> Result<String> {
        let links = &self.config.links;
        let meta = self.page_meta(&links.title, &links.description, "/links");
        let items: Vec<LinkData> = links
            .items
            .iter()
            .map(|item| LinkData {
                label: item.label.clone(),
                href: item.href.clone(),
                description: item.description.clone(),
                external: is_external(&item.href),
            })
            .collect();

        self.render_page("links.html", "/links", &meta, |context| {
            context.insert("kicker", &links.kicker);
            context.insert("heading", &links.heading);
            context.insert("subheading", &links.subheading);
            context.insert("links", &items);
        })
    }

    pub fn not_found(&self) -> Result<String> {
        let meta = self.page_meta(
            "Not found",
            "The page you were looking for does not exist.",
            "/404",
        );
        self.render_page("not_found.html", "/404", &meta, |_| {})
    }

    /// Error page with a short message
    pub fn error(&self, message: &str) -> Result<String> {
        let meta = self.page_meta(message, &self.config.description, "/");
        self.render_page("error.html", "/", &meta, |context| {
            context.insert("message", message);
        })
    }
}

fn is_current(href: &str, current_path: &str) -> bool {
    if href == "/" {
        current_path == "/"
    } else {
        current_path == href || current_path.starts_with(&format!("{}/", href))
    }
}
