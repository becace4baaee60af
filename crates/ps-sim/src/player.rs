//! Automatic player
//!
//! Drives a machine the way a host with a button panel would: bet, lever,
//! a random pause before each stop, then wait out the payout.

use anyhow::{Result, bail};
use clap::ValueEnum;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use ps_machine::{
    Counters, Ledger, Machine, MachineConfig, MachineState, REEL_COUNT, SessionStats,
};

/// Frames a single round may take before the player gives up
const MAX_ROUND_FRAMES: u32 = 100_000;

/// Order in which the player presses the stop buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopOrder {
    /// Left, center, right
    #[default]
    LeftToRight,
    /// Shuffled every round
    Random,
}

/// Automatic player
pub struct AutoPlayer {
    rng: ChaCha8Rng,
    order: StopOrder,
    /// Upper bound of the pause before each stop press (frames)
    max_wait_frames: u32,
}

impl AutoPlayer {
    /// Create a player with optional seed
    pub fn new(order: StopOrder, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            rng,
            order,
            max_wait_frames: 40,
        }
    }

    /// Set the longest pause before a stop press
    pub fn with_max_wait(mut self, frames: u32) -> Self {
        self.max_wait_frames = frames;
        self
    }

    /// Play one round. Returns false if the bet was refused.
    pub fn play_round<L: Ledger>(&mut self, machine: &mut Machine<L>) -> Result<bool> {
        machine.on_bet();
        if machine.state() != MachineState::Bet {
            return Ok(false);
        }
        machine.on_lever();
        run_until(machine, MachineState::Spinning)?;

        let mut order: [usize; REEL_COUNT] = std::array::from_fn(|i| i);
        if self.order == StopOrder::Random {
            order.shuffle(&mut self.rng);
        }
        for reel in order {
            let wait = self.rng.random_range(0..=self.max_wait_frames);
            machine.advance_frames(wait);
            machine.on_stop(reel);
        }

        run_until(machine, MachineState::Idle)?;
        Ok(true)
    }
}

fn run_until<L: Ledger>(machine: &mut Machine<L>, state: MachineState) -> Result<()> {
    for _ in 0..MAX_ROUND_FRAMES {
        if machine.state() == state {
            return Ok(());
        }
        machine.step();
    }
    bail!(
        "machine stuck in {} waiting for {} (frame {})",
        machine.state(),
        state,
        machine.frame()
    )
}

/// Seeds for one session
#[derive(Debug, Clone, Copy)]
pub struct SessionPlan {
    pub index: usize,
    pub machine_seed: u64,
    pub player_seed: u64,
}

/// Result of one session
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub index: usize,
    /// Rounds actually played (fewer than requested if credit ran out)
    pub rounds: u64,
    pub stats: SessionStats,
    pub ledger: Counters,
}

/// Play up to `games` rounds on a fresh machine
pub fn run_session(
    config: &MachineConfig,
    games: u64,
    order: StopOrder,
    max_wait_frames: u32,
    plan: SessionPlan,
) -> Result<SessionOutcome> {
    let config = MachineConfig {
        seed: Some(plan.machine_seed),
        ..config.clone()
    };
    let mut machine = Machine::with_config(config)?;
    machine.set_event_recording(false);
    let mut player =
        AutoPlayer::new(order, Some(plan.player_seed)).with_max_wait(max_wait_frames);

    let mut rounds = 0;
    while rounds < games {
        if !player.play_round(&mut machine)? {
            log::warn!(
                "Session {}: bet refused at credit {} after {} games",
                plan.index,
                machine.ledger().credit(),
                rounds
            );
            break;
        }
        rounds += 1;
    }

    log::debug!(
        "Session {} done: {} games, credit {}",
        plan.index,
        rounds,
        machine.ledger().credit()
    );

    Ok(SessionOutcome {
        index: plan.index,
        rounds,
        stats: machine.stats().clone(),
        ledger: machine.into_ledger(),
    })
}
