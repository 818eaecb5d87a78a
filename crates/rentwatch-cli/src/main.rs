mod run;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "rentwatch-cli")]
#[command(about = "rentwatch scraper monitoring command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one platform (or all of them) and print the outcomes as JSON.
    Run {
        /// Platform name; every configured platform when omitted.
        #[arg(long)]
        platform: Option<String>,
        /// Print what would be scraped without fetching anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch a page once and rank selector candidates against it.
    TestSelector {
        #[arg(long)]
        url: String,
        #[arg(long)]
        selector: String,
    },
    /// List the configured platforms.
    Platforms,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = rentwatch_core::load_app_config_from_env()?;

    match cli.command {
        Commands::Run { platform, dry_run } => {
            run::run_scrapes(&config, platform.as_deref(), dry_run).await
        }
        Commands::TestSelector { url, selector } => {
            run::run_test_selector(&config, &url, &selector).await
        }
        Commands::Platforms => run::list_platforms(&config),
    }
}
