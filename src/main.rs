use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use brawl_meta::auth::TokenManager;
use brawl_meta::calculate::{self, RankError};
use brawl_meta::catalog::{self, GameMode, GAME_MODES};
use brawl_meta::config::AppConfig;
use brawl_meta::fetch::{CubeClient, StatsSource};
use brawl_meta::render;

#[derive(Parser)]
#[command(name = "brawl-meta")]
#[command(about = "Per-map Brawl Stars brawler rankings")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank brawlers for one mode and map
    Rank {
        /// Mode key or display name (e.g. "brawlBall" or "Brawl Ball")
        #[arg(long)]
        mode: String,

        /// Map name within the mode
        #[arg(long)]
        map: String,

        /// Number of least-picked brawlers to drop (default from config)
        #[arg(long)]
        remove: Option<usize>,

        /// Season lower bound override (YYYY-MM-DD)
        #[arg(long)]
        min_date: Option<String>,
    },

    /// Pick mode and map from menus; 'q' quits
    Interactive,

    /// List available modes and their maps
    Modes,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    let fmt_layer = if cli.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Starting brawl-meta v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    match cli.command {
        Commands::Rank {
            mode,
            map,
            remove,
            min_date,
        } => {
            let Some(game_mode) = catalog::mode_by_name(&mode) else {
                bail!(
                    "Unknown mode: {}. Run `brawl-meta modes` to list them.",
                    mode
                );
            };
            if !game_mode.has_map(&map) {
                bail!(
                    "Map {:?} is not in {}. Its maps: {}",
                    map,
                    game_mode.display_name,
                    game_mode.maps.join(", ")
                );
            }

            let source = build_source(&config).await?;
            run_rank(
                source.as_ref(),
                game_mode,
                &map,
                min_date.as_deref().unwrap_or(&config.min_date),
                remove.unwrap_or(config.brawlers_to_remove),
            )
            .await?;
        }

        Commands::Interactive => {
            run_interactive(&config).await?;
        }

        Commands::Modes => {
            println!("Available Game Modes:");
            for (i, mode) in GAME_MODES.iter().enumerate() {
                println!("{}. {} ({})", i + 1, mode.display_name, mode.key);
                for (j, map) in mode.maps.iter().enumerate() {
                    println!("   {}. {}", j + 1, map);
                }
            }
        }
    }

    Ok(())
}

/// Obtain a token and build the cube client behind the source trait.
async fn build_source(config: &AppConfig) -> Result<Box<dyn StatsSource>> {
    let token_manager =
        TokenManager::new(config.auth_config()?).context("Failed to create token manager")?;
    let token = token_manager
        .token()
        .await
        .context("Cannot proceed without an authentication token")?;

    let client =
        CubeClient::new(config.cube_config()?, &token).context("Failed to create cube client")?;
    Ok(Box::new(client))
}

/// Fetch, rank, and print one mode/map report.
async fn run_rank(
    source: &dyn StatsSource,
    mode: &GameMode,
    map_name: &str,
    min_date: &str,
    brawlers_to_remove: usize,
) -> Result<()> {
    tracing::info!(
        "Fetching stats for {} - {} (since {})",
        mode.display_name,
        map_name,
        min_date
    );

    let observations = source.fetch_map_stats(mode.key, map_name, min_date).await?;

    match calculate::rank(&observations, brawlers_to_remove) {
        Ok(ranking) => {
            println!(
                "\n{}",
                render::ranking_report(mode.display_name, map_name, &ranking)
            );
        }
        Err(RankError::NoData) => {
            println!("No data available to process.");
        }
    }

    Ok(())
}

/// Menu loop: select mode and map, rank, repeat until 'q'.
async fn run_interactive(config: &AppConfig) -> Result<()> {
    loop {
        println!("\nAvailable Game Modes:");
        for (i, mode) in GAME_MODES.iter().enumerate() {
            println!("{}. {}", i + 1, mode.display_name);
        }
        println!("q. Quit");

        let choice = prompt("\nSelect game mode (enter number): ")?;
        if is_quit(&choice) {
            return Ok(());
        }
        let Some(mode) = choice.parse().ok().and_then(catalog::mode_at) else {
            println!("Invalid selection. Please try again.");
            continue;
        };

        println!("\nAvailable Maps for {}:", mode.display_name);
        for (i, map) in mode.maps.iter().enumerate() {
            println!("{}. {}", i + 1, map);
        }

        let choice = prompt("\nSelect map (enter number): ")?;
        if is_quit(&choice) {
            return Ok(());
        }
        let Some(map_name) = choice.parse().ok().and_then(|i| mode.map_at(i)) else {
            println!("Invalid selection. Please try again.");
            continue;
        };

        let brawlers_to_remove = read_remove(config.brawlers_to_remove)?;

        // Token and client are rebuilt per run; the token cache makes
        // this cheap, and a failed run must not end the loop.
        let result = match build_source(config).await {
            Ok(source) => {
                run_rank(
                    source.as_ref(),
                    mode,
                    map_name,
                    &config.min_date,
                    brawlers_to_remove,
                )
                .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::error!("Run failed: {:#}", e);
            println!("Failed to retrieve data. Please try again.");
        }
    }
}

fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit")
}

/// Print a prompt and read one trimmed line from stdin.
fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Prompt for the brawlers-to-remove count; blank takes the default.
fn read_remove(default: usize) -> io::Result<usize> {
    loop {
        let input = prompt(&format!(
            "\nEnter number of least picked brawlers to remove (default is {}): ",
            default
        ))?;

        if input.is_empty() {
            return Ok(default);
        }
        match input.parse() {
            Ok(n) => return Ok(n),
            Err(_) => println!("Invalid number. Please enter a non-negative integer."),
        }
    }
}
