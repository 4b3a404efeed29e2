//! Frontline - headless match runner
//!
//! Generates a map, spawns bots and runs the simulation for a number of
//! ticks, then prints a JSON summary.

use std::path::PathBuf;

use clap::Parser;
use frontline::core::config::GameSettings;
use frontline::core::error::Result;
use frontline::headless::{run_match, MatchConfig};
use frontline::map::MapGenConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "frontline")]
#[command(about = "Run a headless bot match and print a JSON summary")]
struct Args {
    /// Map width in tiles
    #[arg(long, default_value_t = 200)]
    width: u32,

    /// Map height in tiles
    #[arg(long, default_value_t = 120)]
    height: u32,

    /// Seed for map generation and spawn placement
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of bots
    #[arg(long, default_value_t = 8)]
    bots: u32,

    /// Tick limit
    #[arg(long, default_value_t = 2_000)]
    ticks: u64,

    /// Game settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also print the full end-of-match snapshot
    #[arg(long)]
    snapshot: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => GameSettings::from_file(path)?,
        None => GameSettings::default(),
    };
    let config = MatchConfig {
        map: MapGenConfig {
            width: args.width,
            height: args.height,
            seed: args.seed,
            ..Default::default()
        },
        bots: args.bots,
        ticks: args.ticks,
    };

    let (game, summary) = run_match(settings, &config)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if args.snapshot {
        println!("{}", game.snapshot().to_json()?);
    }
    Ok(())
}
