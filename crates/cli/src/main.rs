//! Seeded duel runner.
//!
//! Loads combat content, pits a configurable player against one monster and
//! logs the narration of every attack.

mod config;
mod duel;
mod messages;

use anyhow::Result;
use clap::Parser;
use combat_content::ContentFactory;

use config::{DuelArgs, DuelConfig};
use duel::Duel;

/// Run a seeded duel between the player and a monster
#[derive(Parser, Debug)]
#[command(name = "duel")]
#[command(about = "Resolve a melee duel round by round", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    duel: DuelArgs,

    /// List the species in the data directory and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    // Load .env file if it exists (for COMBAT_DATA_DIR and friends)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DuelConfig::from_env().with_args(&cli.duel);
    let factory = ContentFactory::new(&config.data_dir);

    if cli.list {
        let catalog = factory.load_species()?;
        for id in catalog.ids() {
            println!("{id}");
        }
        return Ok(());
    }

    let summary = Duel::prepare(&factory, &cli.duel, &config)?.run()?;
    println!("{summary}");
    Ok(())
}
