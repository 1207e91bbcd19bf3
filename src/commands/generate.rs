//! Generate static files

use anyhow::Result;

use crate::cms::ContentRepository;
use crate::generator::Generator;
use crate::Site;

/// Pre-render every route into the public directory
pub async fn run(site: &Site, repo: &dyn ContentRepository) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site)?;
    let written = generator.generate(repo).await?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} pages into {:?} in {:.2}s",
        written,
        site.public_dir,
        duration.as_secs_f64()
    );

    Ok(())
}
