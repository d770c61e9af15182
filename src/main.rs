use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ml_2048::config::AppConfig;
use ml_2048::session::{Mode, Session};
use ml_2048::training::Trainer;

/// Run the 2048 weight search or an autoplay baseline, headless.
#[derive(Parser)]
#[command(name = "ml-2048", about = "2048 driven by a hill-climbed neural network")]
struct Cli {
    /// Driver: search, heuristic, or random
    #[arg(long, default_value = "search")]
    mode: String,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Override number of search iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Override episodes per iteration
    #[arg(long)]
    episodes: Option<usize>,

    /// Number of games to play in heuristic/random mode
    #[arg(long, default_value_t = 100)]
    games: usize,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mode = match cli.mode.as_str() {
        "search" => Mode::Search,
        "heuristic" => Mode::Heuristic,
        "random" => Mode::Random,
        other => bail!(
            "unknown mode '{}' (expected 'search', 'heuristic', or 'random')",
            other
        ),
    };

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(iterations) = cli.iterations {
        config.search.max_iterations = iterations;
    }
    if let Some(episodes) = cli.episodes {
        config.search.episodes_per_iteration = episodes;
    }
    config.validate().context("validating config overrides")?;

    let trainer = Trainer::new(config.training.clone());
    let mut session = Session::new(config, cli.seed).context("creating session")?;
    session.set_mode(mode)?;

    let mut out = std::io::stdout().lock();
    match mode {
        Mode::Search => {
            trainer.run(&mut session, &mut out)?;
        }
        Mode::Heuristic | Mode::Random => {
            trainer.run_games(&mut session, cli.games, &mut out)?;
        }
        Mode::Manual => unreachable!(),
    }
    Ok(())
}
