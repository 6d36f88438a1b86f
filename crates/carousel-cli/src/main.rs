use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carousel_core::AppConfig;
use carousel_host::Scenario;

mod commands;

#[derive(Parser)]
#[command(name = "carousel")]
#[command(author, version, about = "Simulator for an auto-advancing media carousel")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a carousel against a scripted scenario
    Simulate {
        /// Scenario file (TOML); an idle carousel is simulated when omitted
        #[arg(short = 's', long)]
        scenario: Option<PathBuf>,
        /// Number of generated items when no scenario is given
        #[arg(short = 'n', long, default_value_t = 5)]
        items: usize,
        /// How long to run when the scenario does not say
        #[arg(short = 'd', long, default_value_t = 10_000)]
        duration_ms: u64,
        /// Print runtime events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Show which item is active at a scroll offset
    Resolve {
        /// Horizontal scroll offset
        #[arg(long, allow_hyphen_values = true)]
        offset: f64,
        /// Number of items
        #[arg(short = 'n', long, default_value_t = 5)]
        items: usize,
        /// Item width (defaults to the configured value)
        #[arg(long)]
        item_width: Option<f64>,
        /// Container width (defaults to the configured value)
        #[arg(long)]
        container_width: Option<f64>,
        /// Visibility threshold (defaults to the configured value)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Print the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging on stderr so JSON output stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Some(Commands::Simulate {
            scenario,
            items,
            duration_ms,
            json,
        }) => {
            let scenario = match scenario {
                Some(path) => Scenario::load(&path)?,
                None => Scenario::idle(items),
            };
            commands::simulate::run(&config, scenario, Duration::from_millis(duration_ms), json)
                .await
        }
        None => {
            commands::simulate::run(&config, Scenario::idle(5), Duration::from_secs(10), false)
                .await
        }
        Some(Commands::Resolve {
            offset,
            items,
            item_width,
            container_width,
            threshold,
        }) => {
            let mut carousel = config.carousel.clone();
            carousel.item_width = item_width.unwrap_or(carousel.item_width);
            carousel.container_width = container_width.unwrap_or(carousel.container_width);
            carousel.visibility_threshold = threshold.unwrap_or(carousel.visibility_threshold);
            commands::resolve::run(&carousel, offset, items)
        }
        Some(Commands::Config { init }) => commands::config::run(&config, init),
    }
}
