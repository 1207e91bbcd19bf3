//! List site content

use anyhow::Result;

use crate::cms::ContentRepository;
use crate::content::plain::build_excerpt;
use crate::helpers::format_date;
use crate::pages::post_path;
use crate::Site;

/// Routes that exist regardless of content
const STATIC_ROUTES: [&str; 4] = ["/", "/posts", "/links", "/editor"];

/// List site content by type
pub async fn run(site: &Site, repo: &dyn ContentRepository, content_type: &str) -> Result<()> {
    for line in lines(site, repo, content_type).await? {
        println!("{}", line);
    }
    Ok(())
}

async fn lines(
    site: &Site,
    repo: &dyn ContentRepository,
    content_type: &str,
) -> Result<Vec<String>> {
    let mut out = Vec::new();

    match content_type {
        "post" | "posts" => {
            let posts = repo.list_posts().await?;
            let tz = site.config.tz();
            out.push(format!("Posts ({}):", posts.len()));
            for post in posts {
                let date = format_date(post.published_at.as_deref(), &tz);
                out.push(format!(
                    "  {} - {} [{}]",
                    if date.is_empty() { "Draft" } else { date.as_str() },
                    post.title,
                    post.slug().unwrap_or_default()
                ));
                if let Some(excerpt) = build_excerpt(post.body()) {
                    out.push(format!("      {}", excerpt));
                }
            }
        }
        "slug" | "slugs" => {
            let slugs = repo.post_slugs().await?;
            out.push(format!("Slugs ({}):", slugs.len()));
            out.extend(slugs.into_iter().map(|slug| format!("  {}", slug)));
        }
        "route" | "routes" => {
            let slugs = repo.post_slugs().await?;
            out.push(format!("Routes ({}):", STATIC_ROUTES.len() + slugs.len()));
            out.extend(STATIC_ROUTES.iter().map(|route| format!("  {}", route)));
            out.extend(slugs.iter().map(|slug| format!("  {}", post_path(slug))));
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, slug, route",
                content_type
            );
        }
    }

    Ok(out)
}
