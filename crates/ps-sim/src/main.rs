//! Pachislot batch simulator
//!
//! Usage:
//!   ps-sim --games 10000 --sessions 8 --setting 6
//!   ps-sim --config machine.yaml --stop-order random --json
//!
//! Log verbosity follows `RUST_LOG`.

mod player;
mod report;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use ps_machine::{MachineConfig, TimingConfig, TimingProfile};

use crate::player::{SessionOutcome, SessionPlan, StopOrder, run_session};
use crate::report::SimReport;

#[derive(Parser)]
#[command(name = "ps-sim", about = "Headless pachislot batch simulator")]
struct Cli {
    /// Games per session
    #[arg(short, long, default_value_t = 1000)]
    games: u64,

    /// Independent sessions, run in parallel
    #[arg(short, long, default_value_t = 1)]
    sessions: usize,

    /// Odds setting (defaults to the config's default setting)
    #[arg(long)]
    setting: Option<u8>,

    /// Master seed for machines and players
    #[arg(long)]
    seed: Option<u64>,

    /// Round pacing (defaults to the config's timing, or instant)
    #[arg(long, value_enum)]
    profile: Option<Pacing>,

    /// Longest pause before each stop press (frames)
    #[arg(long, default_value_t = 40)]
    max_wait: u32,

    /// Stop button order
    #[arg(long, value_enum, default_value_t = StopOrder::LeftToRight)]
    stop_order: StopOrder,

    /// Machine config file (.json, .yaml, .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Pacing profiles selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Pacing {
    Normal,
    Turbo,
    Instant,
}

impl From<Pacing> for TimingProfile {
    fn from(pacing: Pacing) -> Self {
        match pacing {
            Pacing::Normal => TimingProfile::Normal,
            Pacing::Turbo => TimingProfile::Turbo,
            Pacing::Instant => TimingProfile::Instant,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let setting = config.default_setting;
    let profile = config.timing.profile.display_name();

    let mut master = match cli.seed.or(config.seed) {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };
    let plans: Vec<SessionPlan> = (0..cli.sessions)
        .map(|index| SessionPlan {
            index,
            machine_seed: master.random(),
            player_seed: master.random(),
        })
        .collect();

    log::info!(
        "Running {} sessions x {} games at setting {} ({} pacing)",
        cli.sessions,
        cli.games,
        setting,
        profile
    );

    let start = Instant::now();
    let outcomes: Vec<SessionOutcome> = plans
        .into_par_iter()
        .map(|plan| run_session(&config, cli.games, cli.stop_order, cli.max_wait, plan))
        .collect::<Result<_>>()?;
    let duration_ms = start.elapsed().as_millis() as u64;

    let table = config
        .settings
        .get(&setting)
        .context("active setting missing from config")?;
    let report = SimReport::new(
        setting,
        profile,
        cli.stop_order,
        cli.games,
        table,
        outcomes,
        duration_ms,
    );

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<MachineConfig> {
    let mut config = match &cli.config {
        Some(path) => MachineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MachineConfig::standard().with_timing(TimingConfig::instant()),
    };

    if let Some(pacing) = cli.profile {
        config.timing = TimingConfig::from_profile(pacing.into());
    }
    if let Some(setting) = cli.setting {
        ensure!(
            config.settings.contains_key(&setting),
            "setting {} is not configured (available: {:?})",
            setting,
            config.settings.keys().collect::<Vec<_>>()
        );
        config.default_setting = setting;
    }

    config.validate().context("Invalid machine config")?;
    Ok(config)
}
