//! Machine — the authoritative per-round state machine
//!
//! ```text
//!   IDLE ──bet──▶ BET ──lever──▶ LEVER_ON ──settle──▶ SPINNING
//!    ▲                                                   │ 3 stops, reels at rest
//!    └────────reset delay──── PAYOUT ◀───────────────────┘
//! ```
//!
//! The flag is drawn at lever pull, before any reel moves, and stop positions
//! never depend on it. Input that the current state does not accept is
//! dropped without side effects. Pacing delays run on a virtual clock driven
//! by [`Machine::step`], so a round can be replayed frame by frame in tests.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::MachineConfig;
use crate::error::MachineResult;
use crate::event::{ControlState, EventKind, MachineEvent};
use crate::ledger::{Counters, Ledger};
use crate::lottery::{Lottery, Outcome};
use crate::paytable::{BonusKind, LineResult};
use crate::reel::{Reel, ReelPhase};
use crate::scheduler::Scheduler;
use crate::stats::SessionStats;
use crate::symbols::SymbolId;

/// Number of reels on the cabinet
pub const REEL_COUNT: usize = 3;

/// Most frames a single [`Machine::advance`] call will run
pub const MAX_CATCH_UP_FRAMES: u32 = 240;

/// Round state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineState {
    /// Waiting for a bet
    Idle,
    /// Bet placed, waiting for the lever
    Bet,
    /// Lever pulled, flag drawn, reels spinning up
    LeverOn,
    /// Stop buttons live
    Spinning,
    /// All reels at rest, payout pending
    Payout,
}

impl MachineState {
    pub fn name(self) -> &'static str {
        match self {
            MachineState::Idle => "IDLE",
            MachineState::Bet => "BET",
            MachineState::LeverOn => "LEVER_ON",
            MachineState::Spinning => "SPINNING",
            MachineState::Payout => "PAYOUT",
        }
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Deferred round-pacing work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    /// LEVER_ON -> SPINNING
    AcceptStops,
    /// Evaluate the pay line and credit it
    EvaluatePayout,
    /// PAYOUT -> IDLE
    ResetRound,
}

/// Per-round bookkeeping, cleared at reset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundState {
    /// Flag drawn at lever pull
    pub outcome: Option<Outcome>,
    /// Stop requests accepted this round
    pub stopped: usize,
    /// Reel indices in the order they were stopped
    pub stop_order: Vec<u8>,
    /// Evaluated pay line, once known
    pub line: Option<LineResult>,
}

/// Pachislot cabinet
pub struct Machine<L: Ledger = Counters> {
    /// Static configuration
    config: MachineConfig,
    /// Flag lottery
    lottery: Lottery,
    /// Left, center, right
    reels: [Reel; REEL_COUNT],
    /// Credit and counters (written only here)
    ledger: L,
    /// Current round state
    state: MachineState,
    /// Current round bookkeeping
    round: RoundState,
    /// Pending pacing work
    scheduler: Scheduler<Deferred>,
    /// Logic frames elapsed
    frame: u64,
    /// Unconsumed host time (ms)
    accumulator_ms: f64,
    /// Session statistics
    stats: SessionStats,
    /// Undrained events
    events: Vec<MachineEvent>,
    /// Whether events are recorded
    record_events: bool,
}

impl Machine<Counters> {
    /// Standard cabinet with default counters
    pub fn standard() -> MachineResult<Self> {
        Self::with_config(MachineConfig::standard())
    }

    /// Cabinet with default counters
    pub fn with_config(config: MachineConfig) -> MachineResult<Self> {
        let ledger = Counters::default().with_credit_limit(config.credit_limit);
        Self::with_ledger(config, ledger)
    }
}

impl<L: Ledger> Machine<L> {
    /// Cabinet reporting to an injected ledger
    pub fn with_ledger(config: MachineConfig, ledger: L) -> MachineResult<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let lottery = Lottery::with_rng(
            config.settings.clone(),
            config.default_setting,
            StdRng::from_rng(&mut rng),
        )?;
        Ok(Self::assemble(config, ledger, lottery, &mut rng))
    }

    fn assemble(config: MachineConfig, ledger: L, lottery: Lottery, rng: &mut StdRng) -> Self {
        let reels = std::array::from_fn(|i| {
            let reel = Reel::new(i, config.strips[i].clone(), config.physics);
            let start = rng.random::<f64>() * reel.total_height();
            reel.with_position(start)
        });

        Self {
            config,
            lottery,
            reels,
            ledger,
            state: MachineState::Idle,
            round: RoundState::default(),
            scheduler: Scheduler::new(),
            frame: 0,
            accumulator_ms: 0.0,
            stats: SessionStats::default(),
            events: Vec::new(),
            record_events: true,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAYER INPUT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Bet button. Accepted only in IDLE.
    pub fn on_bet(&mut self) {
        if self.state != MachineState::Idle {
            log::trace!("Bet ignored in {}", self.state);
            return;
        }

        let cost = self.config.bet_cost;
        if self.ledger.credit() < cost {
            if let Some(amount) = self.config.auto_top_up {
                self.ledger.add_credit(amount);
                self.stats.top_ups += 1;
                log::debug!("Credit short of bet, inserted {} coins", amount);
                self.emit(EventKind::CreditToppedUp {
                    amount,
                    credit: self.ledger.credit(),
                });
            }
        }

        if !self.ledger.consume_credit(cost) {
            log::debug!(
                "Bet refused: credit {} below cost {}",
                self.ledger.credit(),
                cost
            );
            return;
        }

        self.stats.record_bet(cost);
        self.round = RoundState::default();
        self.emit(EventKind::BetPlaced {
            cost,
            credit: self.ledger.credit(),
        });
        self.transition(MachineState::Bet);
    }

    /// Lever. Accepted only in BET.
    pub fn on_lever(&mut self) {
        if self.state != MachineState::Bet {
            log::trace!("Lever ignored in {}", self.state);
            return;
        }

        // Outcome is fixed before any reel moves
        let outcome = self.lottery.draw();
        log::debug!("Game {}: flag {}", self.ledger.game_count() + 1, outcome);
        self.round.outcome = Some(outcome);
        self.stats.record_draw(outcome);
        self.emit(EventKind::FlagDrawn { outcome });

        for reel in &mut self.reels {
            reel.start_spin();
        }
        self.ledger.increment_game();

        self.transition(MachineState::LeverOn);
        let deadline = self.now_ms() + self.config.timing.settle_ms;
        self.scheduler.schedule(deadline, Deferred::AcceptStops);
    }

    /// Stop button for one reel. Accepted only in SPINNING, for a reel that
    /// is spinning and not already stopping.
    pub fn on_stop(&mut self, reel_index: usize) {
        if self.state != MachineState::Spinning {
            log::trace!("Stop {} ignored in {}", reel_index, self.state);
            return;
        }
        let Some(reel) = self.reels.get_mut(reel_index) else {
            log::trace!("Stop ignored: no reel {}", reel_index);
            return;
        };
        if reel.phase() != ReelPhase::Spinning {
            log::trace!("Stop ignored: reel {} already stopping", reel_index);
            return;
        }

        // Nearest symbol, no pull-in toward the drawn flag
        let target_index = reel.natural_stop_index();
        reel.stop(target_index);

        self.round.stopped += 1;
        self.round.stop_order.push(reel_index as u8);
        self.emit(EventKind::ReelStopRequested {
            reel_index: reel_index as u8,
            target_index,
        });
        self.emit_controls();
    }

    /// Switch the odds table. Only between rounds; unknown ids are ignored.
    pub fn set_setting(&mut self, setting: u8) {
        if self.state != MachineState::Idle {
            log::trace!("Setting change ignored in {}", self.state);
            return;
        }
        let before = self.lottery.setting();
        self.lottery.set_setting(setting);
        if self.lottery.setting() != before {
            self.emit(EventKind::SettingChanged { setting });
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LOGIC TICK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Feed elapsed host time; runs one [`step`](Self::step) per whole frame,
    /// at most [`MAX_CATCH_UP_FRAMES`] per call. Time beyond that is dropped,
    /// as is any non-finite input. Returns the number of frames run.
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        if !elapsed_ms.is_finite() {
            log::warn!("Ignoring non-finite elapsed time {}", elapsed_ms);
            return 0;
        }
        self.accumulator_ms += elapsed_ms.max(0.0);
        let frame_ms = self.config.timing.frame_ms;
        let mut frames = 0;
        while self.accumulator_ms >= frame_ms {
            if frames == MAX_CATCH_UP_FRAMES {
                log::debug!(
                    "Catch-up capped at {} frames, dropping {:.1} ms",
                    frames,
                    self.accumulator_ms
                );
                self.accumulator_ms = 0.0;
                break;
            }
            self.accumulator_ms -= frame_ms;
            self.step();
            frames += 1;
        }
        frames
    }

    /// Run `count` frames
    pub fn advance_frames(&mut self, count: u32) {
        for _ in 0..count {
            self.step();
        }
    }

    /// One logic frame: clock, due tasks, reel physics, completion check
    pub fn step(&mut self) {
        self.frame += 1;
        let now = self.now_ms();

        while let Some(task) = self.scheduler.pop_due(now) {
            self.run_deferred(task);
        }

        for reel in &mut self.reels {
            if reel.update() {
                let event = EventKind::ReelStopped {
                    reel_index: reel.index() as u8,
                    symbols: reel.window(),
                };
                if self.record_events {
                    self.events.push(MachineEvent::new(event, now));
                }
            }
        }

        if self.state == MachineState::Spinning
            && self.round.stopped == REEL_COUNT
            && self.reels.iter().all(Reel::is_at_rest)
        {
            self.transition(MachineState::Payout);
            let deadline = now + self.config.timing.payout_delay_ms;
            self.scheduler.schedule(deadline, Deferred::EvaluatePayout);
        }
    }

    fn run_deferred(&mut self, task: Deferred) {
        match task {
            Deferred::AcceptStops => {
                self.round.stopped = 0;
                self.round.stop_order.clear();
                self.transition(MachineState::Spinning);
            }
            Deferred::EvaluatePayout => {
                self.evaluate_payout();
                let deadline = self.now_ms() + self.config.timing.reset_delay_ms;
                self.scheduler.schedule(deadline, Deferred::ResetRound);
            }
            Deferred::ResetRound => {
                self.ledger.set_payout(0);
                self.round = RoundState::default();
                self.emit(EventKind::RoundReset);
                self.transition(MachineState::Idle);
            }
        }
    }

    fn evaluate_payout(&mut self) {
        let line = self.config.paytable.evaluate(self.center_line());

        if line.payout > 0 {
            log::info!(
                "WIN {} credits on {} {} {}",
                line.payout,
                line.symbols[0],
                line.symbols[1],
                line.symbols[2]
            );
            self.ledger.set_payout(line.payout);
            self.ledger.add_credit(line.payout);
        }
        if line.bonus == Some(BonusKind::Big) {
            log::info!("BIG bonus");
            self.ledger.add_big();
        }

        self.stats.record_line(&line);
        self.emit(EventKind::PayoutEvaluated { line: line.clone() });
        self.round.line = Some(line);
    }

    fn transition(&mut self, to: MachineState) {
        let from = self.state;
        self.state = to;
        log::debug!("{} -> {}", from, to);
        self.emit(EventKind::StateChanged { from, to });
        self.emit_controls();
    }

    fn emit_controls(&mut self) {
        let controls = self.controls();
        self.emit(EventKind::ControlsChanged { controls });
    }

    fn emit(&mut self, kind: EventKind) {
        if self.record_events {
            self.events.push(MachineEvent::new(kind, self.now_ms()));
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Which affordances the input surface should enable
    pub fn controls(&self) -> ControlState {
        let mut stop_enabled = [false; REEL_COUNT];
        if self.state == MachineState::Spinning {
            for (enabled, reel) in stop_enabled.iter_mut().zip(&self.reels) {
                *enabled = reel.phase() == ReelPhase::Spinning;
            }
        }
        ControlState {
            bet_enabled: self.state == MachineState::Idle,
            lever_enabled: self.state == MachineState::Bet,
            stop_enabled,
        }
    }

    /// Reels, for rendering
    pub fn reels(&self) -> &[Reel; REEL_COUNT] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&Reel> {
        self.reels.get(index)
    }

    /// Pay-line symbols currently shown, left to right
    pub fn center_line(&self) -> [SymbolId; REEL_COUNT] {
        std::array::from_fn(|i| self.reels[i].center_symbol())
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Flag drawn this round
    pub fn outcome(&self) -> Option<Outcome> {
        self.round.outcome
    }

    pub fn stop_order(&self) -> &[u8] {
        &self.round.stop_order
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Give the ledger back, ending the session
    pub fn into_ledger(self) -> L {
        self.ledger
    }

    pub fn lottery(&self) -> &Lottery {
        &self.lottery
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Logic frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Virtual clock (ms)
    pub fn now_ms(&self) -> f64 {
        self.frame as f64 * self.config.timing.frame_ms
    }

    /// Deferred tasks not yet fired
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Take all recorded events
    pub fn drain_events(&mut self) -> Vec<MachineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events not yet drained
    pub fn events(&self) -> &[MachineEvent] {
        &self.events
    }

    /// Turn event recording on or off (off drops pending events)
    pub fn set_event_recording(&mut self, enabled: bool) {
        self.record_events = enabled;
        if !enabled {
            self.events.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TimingConfig;

    fn machine() -> Machine {
        Machine::with_config(MachineConfig::seeded(1)).unwrap()
    }

    fn machine_with_credit(credit: u32, config: MachineConfig) -> Machine {
        Machine::with_ledger(config, Counters::with_credit(credit)).unwrap()
    }

    fn run_until(machine: &mut Machine, state: MachineState) {
        for _ in 0..10_000 {
            if machine.state() == state {
                return;
            }
            machine.step();
        }
        panic!("machine never reached {state}");
    }

    #[test]
    fn test_starts_idle() {
        let machine = machine();
        assert_eq!(machine.state(), MachineState::Idle);
        assert_eq!(machine.ledger().credit(), 50);
        let controls = machine.controls();
        assert!(controls.bet_enabled);
        assert!(!controls.lever_enabled);
        assert!(!controls.any_stop_enabled());
        for reel in machine.reels() {
            assert!(reel.is_at_rest());
            assert!(reel.offset() < reel.total_height());
        }
    }

    #[test]
    fn test_bet_consumes_cost() {
        let mut machine = machine();
        machine.on_bet();
        assert_eq!(machine.state(), MachineState::Bet);
        assert_eq!(machine.ledger().credit(), 47);
        assert!(machine.controls().lever_enabled);
    }

    #[test]
    fn test_bet_tops_up_empty_credit() {
        let mut machine = machine_with_credit(0, MachineConfig::seeded(2));
        machine.on_bet();
        assert_eq!(machine.state(), MachineState::Bet);
        assert_eq!(machine.ledger().credit(), 47);
        assert_eq!(machine.stats().top_ups, 1);
    }

    #[test]
    fn test_bet_refused_without_top_up() {
        let config = MachineConfig {
            auto_top_up: None,
            ..MachineConfig::seeded(3)
        };
        let mut machine = machine_with_credit(2, config);
        machine.on_bet();
        assert_eq!(machine.state(), MachineState::Idle);
        assert_eq!(machine.ledger().credit(), 2);
        assert_eq!(machine.stats().total_bet, 0);
    }

    #[test]
    fn test_double_bet_ignored() {
        let mut machine = machine();
        machine.on_bet();
        machine.on_bet();
        assert_eq!(machine.ledger().credit(), 47);
    }

    #[test]
    fn test_lever_ignored_when_idle() {
        let mut machine = machine();
        machine.on_lever();
        assert_eq!(machine.state(), MachineState::Idle);
        assert_eq!(machine.ledger().game_count(), 0);
        assert!(machine.outcome().is_none());
        assert!(machine.reels().iter().all(Reel::is_at_rest));
    }

    #[test]
    fn test_lever_draws_before_reels_move() {
        let mut machine = machine();
        machine.on_bet();
        machine.on_lever();

        assert_eq!(machine.state(), MachineState::LeverOn);
        assert!(machine.outcome().is_some());
        assert_eq!(machine.ledger().game_count(), 1);
        assert!(machine.reels().iter().all(|r| r.phase() == ReelPhase::Spinning));

        let kinds: Vec<&'static str> = machine.events().iter().map(|e| e.type_name()).collect();
        let drawn = kinds.iter().position(|&k| k == "flag_drawn").unwrap();
        let lever_on = kinds
            .iter()
            .rposition(|&k| k == "state_changed")
            .unwrap();
        assert!(drawn < lever_on);
    }

    #[test]
    fn test_stops_accepted_only_after_settle() {
        let mut machine = machine();
        machine.on_bet();
        machine.on_lever();
        machine.on_stop(0);
        assert_eq!(machine.round().stopped, 0);

        // 100 ms settle at 60 Hz
        machine.advance_frames(5);
        assert_eq!(machine.state(), MachineState::LeverOn);
        machine.step();
        assert_eq!(machine.state(), MachineState::Spinning);
        assert_eq!(machine.controls().stop_enabled, [true; 3]);
    }

    #[test]
    fn test_stop_ignored_in_bet() {
        let mut machine = machine();
        machine.on_bet();
        let reels_before = machine.reels().clone();
        machine.on_stop(1);
        assert_eq!(machine.round().stopped, 0);
        assert!(machine.stop_order().is_empty());
        assert_eq!(machine.reels(), &reels_before);
    }

    #[test]
    fn test_repeated_and_out_of_range_stops_ignored() {
        let mut machine = machine();
        machine.on_bet();
        machine.on_lever();
        run_until(&mut machine, MachineState::Spinning);

        machine.on_stop(2);
        machine.on_stop(2);
        machine.on_stop(7);
        assert_eq!(machine.round().stopped, 1);
        assert_eq!(machine.stop_order(), &[2]);
        assert_eq!(machine.controls().stop_enabled, [true, true, false]);
    }

    #[test]
    fn test_payout_waits_for_reels_at_rest() {
        let mut machine = machine();
        machine.on_bet();
        machine.on_lever();
        run_until(&mut machine, MachineState::Spinning);

        for i in [1, 0, 2] {
            machine.on_stop(i);
        }
        assert_eq!(machine.stop_order(), &[1, 0, 2]);
        assert_eq!(machine.state(), MachineState::Spinning);
        assert!(machine.reels().iter().any(Reel::is_stopping));

        run_until(&mut machine, MachineState::Payout);
        assert!(machine.reels().iter().all(Reel::is_at_rest));
        assert!(!machine.controls().bet_enabled);
    }

    #[test]
    fn test_full_round_returns_to_idle() {
        let mut machine = Machine::with_config(
            MachineConfig::seeded(9).with_timing(TimingConfig::instant()),
        )
        .unwrap();
        machine.on_bet();
        machine.on_lever();
        run_until(&mut machine, MachineState::Spinning);
        for i in 0..3 {
            machine.on_stop(i);
        }
        run_until(&mut machine, MachineState::Idle);

        assert_eq!(machine.ledger().last_payout(), 0);
        assert!(machine.outcome().is_none());
        assert!(machine.stop_order().is_empty());
        assert_eq!(machine.pending_tasks(), 0);
        assert_eq!(machine.stats().games, 1);

        let kinds: Vec<&'static str> = machine
            .drain_events()
            .iter()
            .map(|e| e.type_name())
            .collect();
        assert!(kinds.contains(&"payout_evaluated"));
        assert_eq!(kinds.iter().filter(|&&k| k == "reel_stopped").count(), 3);
        assert_eq!(kinds.last(), Some(&"controls_changed"));
        assert!(machine.events().is_empty());
    }

    #[test]
    fn test_setting_change_only_between_rounds() {
        let mut machine = machine();
        machine.set_setting(6);
        assert_eq!(machine.lottery().setting(), 6);

        machine.on_bet();
        machine.set_setting(1);
        assert_eq!(machine.lottery().setting(), 6);

        let mut idle = self::machine();
        idle.set_setting(99);
        assert_eq!(idle.lottery().setting(), 1);
    }

    #[test]
    fn test_advance_accumulates_partial_frames() {
        let mut machine = machine();
        assert_eq!(machine.advance(10.0), 0);
        assert_eq!(machine.advance(10.0), 1);
        assert_eq!(machine.frame(), 1);
        assert_eq!(machine.advance(1000.0), 60);
    }

    #[test]
    fn test_advance_caps_catch_up() {
        let mut machine = machine();
        assert_eq!(machine.advance(1.0e9), MAX_CATCH_UP_FRAMES);
        assert_eq!(machine.frame(), MAX_CATCH_UP_FRAMES as u64);
        // Backlog beyond the cap is dropped
        assert_eq!(machine.advance(0.0), 0);
    }

    #[test]
    fn test_advance_ignores_non_finite_time() {
        let mut machine = machine();
        assert_eq!(machine.advance(f64::INFINITY), 0);
        assert_eq!(machine.advance(f64::NAN), 0);
        assert_eq!(machine.frame(), 0);
        assert_eq!(machine.advance(20.0), 1);
    }

    #[test]
    fn test_standard_cabinet_is_validated() {
        let machine = Machine::standard().unwrap();
        assert_eq!(machine.state(), MachineState::Idle);
        assert_eq!(machine.lottery().setting(), 1);
        assert_eq!(machine.config(), &MachineConfig::standard());
    }

    #[test]
    fn test_top_up_below_bet_cost_rejected() {
        let config = MachineConfig {
            auto_top_up: Some(1),
            ..MachineConfig::seeded(2)
        };
        assert!(Machine::with_config(config).is_err());
    }

    #[test]
    fn test_event_recording_can_be_disabled() {
        let mut machine = machine();
        machine.set_event_recording(false);
        machine.on_bet();
        machine.on_lever();
        machine.advance_frames(20);
        assert!(machine.events().is_empty());
    }
}
