//! CLI entry point for synthetic-site

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use synthetic_site::Site;

#[derive(Parser)]
#[command(name = "synthetic-site")]
#[command(version)]
#[command(about = "Personal site and blog front-end over a headless CMS", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Read posts from a JSON fixture file instead of the CMS
    #[arg(short, long, global = true)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-render every route into the public folder
    #[command(alias = "g")]
    Generate,

    /// Start the site server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Clean the public folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, slug, route)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "synthetic_site=debug,tower_http=debug,info"
    } else {
        "synthetic_site=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot read current directory")?,
    };
    let fixtures = cli.fixtures.as_deref();

    match cli.command {
        Commands::Generate => {
            let site = Site::new(&base_dir)?;
            let repo = site.repository(fixtures)?;
            tracing::info!("Generating static files...");
            site.generate(repo.as_ref()).await?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip } => {
            let site = Site::new(&base_dir)?;
            let repo = site.repository(fixtures)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            synthetic_site::server::start(&site, repo, &ip, port).await?;
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = Site::new(&base_dir)?;
            let repo = site.repository(fixtures)?;
            synthetic_site::commands::list::run(&site, repo.as_ref(), &r#type).await?;
        }

        Commands::Version => {
            println!("synthetic-site version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
