//! End-to-end rounds through the public machine API

use ps_machine::*;

fn machine_with_credit(config: MachineConfig, credit: u32) -> Machine {
    let ledger = Counters::with_credit(credit).with_credit_limit(config.credit_limit);
    Machine::with_ledger(config, ledger).unwrap()
}

fn step_until(machine: &mut Machine, mut done: impl FnMut(&Machine) -> bool) {
    for _ in 0..10_000 {
        if done(machine) {
            return;
        }
        machine.step();
    }
    panic!("condition never reached");
}

fn bet_and_pull(machine: &mut Machine) {
    machine.on_bet();
    machine.on_lever();
    step_until(machine, |m| m.state() == MachineState::Spinning);
}

/// Press stop on `reel` at the first frame where it would settle with
/// `symbol` on the pay line
fn stop_showing(machine: &mut Machine, reel: usize, symbol: SymbolId) {
    step_until(machine, |m| {
        let r = &m.reels()[reel];
        let top = r.natural_stop_index();
        r.strip().symbol_at(top + r.physics().center_row()) == symbol
    });
    machine.on_stop(reel);
}

fn play_line(machine: &mut Machine, line: [SymbolId; 3]) -> LineResult {
    bet_and_pull(machine);
    for (reel, symbol) in line.into_iter().enumerate() {
        stop_showing(machine, reel, symbol);
    }
    step_until(machine, |m| m.round().line.is_some());
    machine.round().line.clone().unwrap()
}

#[test]
fn bet_tops_up_empty_credit() {
    let mut machine = machine_with_credit(MachineConfig::seeded(11), 0);
    machine.on_bet();
    assert_eq!(machine.state(), MachineState::Bet);
    assert_eq!(machine.ledger().credit(), 47);
}

#[test]
fn short_credit_without_top_up_stays_idle() {
    let config = MachineConfig {
        auto_top_up: None,
        ..MachineConfig::seeded(12)
    };
    let mut machine = machine_with_credit(config, 2);
    machine.on_bet();
    assert_eq!(machine.state(), MachineState::Idle);
    assert_eq!(machine.ledger().credit(), 2);
    assert!(machine.events().is_empty());
}

#[test]
fn bell_line_pays_and_clears_after_reset_delay() {
    let mut machine = Machine::with_config(MachineConfig::seeded(13)).unwrap();
    let line = play_line(&mut machine, [SymbolId::Bell; 3]);

    assert_eq!(machine.center_line(), [SymbolId::Bell; 3]);
    assert_eq!(line.payout, 8);
    assert_eq!(machine.state(), MachineState::Payout);
    assert_eq!(machine.ledger().credit(), 50 - 3 + 8);
    assert_eq!(machine.ledger().last_payout(), 8);

    let paid_at = machine.now_ms();
    machine.advance_frames(50);
    assert_eq!(machine.state(), MachineState::Payout);
    assert_eq!(machine.ledger().last_payout(), 8);

    step_until(&mut machine, |m| m.state() == MachineState::Idle);
    assert!(machine.now_ms() - paid_at >= 1000.0 - 1e-6);
    assert_eq!(machine.ledger().last_payout(), 0);
    assert_eq!(machine.ledger().credit(), 55);
}

#[test]
fn seven_line_awards_big_without_credit() {
    let mut machine = Machine::with_config(MachineConfig::seeded(14)).unwrap();
    let line = play_line(&mut machine, [SymbolId::Seven; 3]);

    assert_eq!(line.bonus, Some(BonusKind::Big));
    assert_eq!(line.payout, 0);
    assert_eq!(machine.ledger().big_count(), 1);
    assert_eq!(machine.ledger().credit(), 47);
    assert_eq!(machine.ledger().games_since_bonus, 0);
}

#[test]
fn bar_line_awards_nothing() {
    let mut machine = Machine::with_config(MachineConfig::seeded(18)).unwrap();
    let line = play_line(&mut machine, [SymbolId::Bar; 3]);

    assert_eq!(machine.center_line(), [SymbolId::Bar; 3]);
    assert!(!line.is_win());
    assert_eq!(line.bonus, None);
    assert_eq!(machine.ledger().reg_count(), 0);
    assert_eq!(machine.ledger().big_count(), 0);
    assert_eq!(machine.ledger().credit(), 47);
    assert_eq!(machine.stats().big_bonuses, 0);
}

#[test]
fn payout_is_evaluated_after_payout_delay() {
    let mut machine = Machine::with_config(MachineConfig::seeded(19)).unwrap();
    let delay = machine.config().timing.payout_delay_ms;
    assert_eq!(delay, 300.0);

    bet_and_pull(&mut machine);
    for reel in 0..3 {
        stop_showing(&mut machine, reel, SymbolId::Bell);
    }
    step_until(&mut machine, |m| m.state() == MachineState::Payout);
    let entered_at = machine.now_ms();
    assert!(machine.round().line.is_none());

    while machine.round().line.is_none() {
        assert!(machine.now_ms() - entered_at < delay + 1e-6);
        assert_eq!(machine.ledger().last_payout(), 0);
        assert_eq!(machine.ledger().credit(), 47);
        machine.step();
    }

    assert!(machine.now_ms() - entered_at >= delay - 1e-6);
    assert_eq!(machine.ledger().last_payout(), 8);
    assert_eq!(machine.ledger().credit(), 55);
}

#[test]
fn left_cherry_pays_two() {
    let mut machine = Machine::with_config(MachineConfig::seeded(15)).unwrap();
    let line = play_line(
        &mut machine,
        [SymbolId::Cherry, SymbolId::Replay, SymbolId::Bell],
    );
    assert!(line.cherry);
    assert_eq!(line.payout, 2);
    assert_eq!(machine.ledger().credit(), 49);
}

#[test]
fn stop_during_bet_is_ignored() {
    let mut machine = Machine::with_config(MachineConfig::seeded(16)).unwrap();
    machine.on_bet();
    let before = machine.reels().clone();

    machine.on_stop(0);
    assert_eq!(machine.state(), MachineState::Bet);
    assert_eq!(machine.reels(), &before);
    assert!(machine.stop_order().is_empty());
}

#[test]
fn game_count_increments_once_per_lever() {
    let mut machine = Machine::with_config(MachineConfig::seeded(17)).unwrap();
    machine.on_bet();
    machine.on_lever();
    machine.on_lever();
    assert_eq!(machine.ledger().game_count(), 1);

    step_until(&mut machine, |m| m.state() == MachineState::Spinning);
    machine.on_lever();
    assert_eq!(machine.ledger().game_count(), 1);
}

#[test]
fn reels_stop_in_any_order() {
    let mut machine = Machine::with_config(
        MachineConfig::seeded(18).with_timing(TimingConfig::instant()),
    )
    .unwrap();
    bet_and_pull(&mut machine);
    machine.on_stop(2);
    machine.step();
    machine.on_stop(0);
    machine.on_stop(1);
    assert_eq!(machine.stop_order(), &[2, 0, 1]);
    step_until(&mut machine, |m| m.state() == MachineState::Idle);
}

#[test]
fn stopped_reels_sit_on_symbol_boundaries() {
    let mut machine = Machine::with_config(MachineConfig::seeded(19)).unwrap();
    bet_and_pull(&mut machine);
    for reel in 0..3 {
        machine.advance_frames(7);
        machine.on_stop(reel);
    }
    step_until(&mut machine, |m| m.state() == MachineState::Payout);

    for reel in machine.reels() {
        let height = reel.physics().symbol_height;
        assert!(reel.is_at_rest());
        assert_eq!(reel.scroll_offset(), 0.0);
        assert!(reel.offset() < reel.total_height());
        assert_eq!(reel.offset() / height, reel.top_index() as f64);
    }
}

#[test]
fn seeded_sessions_replay_identically() {
    let play = |seed: u64| {
        let config = MachineConfig::seeded(seed).with_timing(TimingConfig::instant());
        let mut machine = Machine::with_config(config).unwrap();
        let mut outcomes = Vec::new();
        for _ in 0..20 {
            bet_and_pull(&mut machine);
            outcomes.push(machine.outcome());
            for reel in 0..3 {
                machine.on_stop(reel);
            }
            step_until(&mut machine, |m| m.state() == MachineState::Idle);
        }
        (outcomes, machine.ledger().clone())
    };

    assert_eq!(play(42), play(42));
}

#[test]
fn events_serialize_to_json() {
    let mut machine = Machine::with_config(
        MachineConfig::seeded(20).with_timing(TimingConfig::instant()),
    )
    .unwrap();
    bet_and_pull(&mut machine);
    for reel in 0..3 {
        machine.on_stop(reel);
    }
    step_until(&mut machine, |m| m.state() == MachineState::Idle);

    let events = machine.drain_events();
    let json = serde_json::to_string(&events).unwrap();
    let back: Vec<MachineEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, events);
    assert!(events.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
}

/// Ledger that records the order of writes
#[derive(Default)]
struct AuditLedger {
    credit: u32,
    games: u64,
    payout: u32,
    writes: Vec<&'static str>,
}

impl Ledger for AuditLedger {
    fn credit(&self) -> u32 {
        self.credit
    }
    fn game_count(&self) -> u64 {
        self.games
    }
    fn big_count(&self) -> u32 {
        0
    }
    fn reg_count(&self) -> u32 {
        0
    }
    fn last_payout(&self) -> u32 {
        self.payout
    }
    fn add_credit(&mut self, amount: u32) {
        self.credit += amount;
        self.writes.push("add_credit");
    }
    fn consume_credit(&mut self, amount: u32) -> bool {
        if self.credit < amount {
            return false;
        }
        self.credit -= amount;
        self.writes.push("consume_credit");
        true
    }
    fn increment_game(&mut self) {
        self.games += 1;
        self.writes.push("increment_game");
    }
    fn add_big(&mut self) {
        self.writes.push("add_big");
    }
    fn add_reg(&mut self) {
        self.writes.push("add_reg");
    }
    fn set_payout(&mut self, amount: u32) {
        self.payout = amount;
        self.writes.push("set_payout");
    }
}

#[test]
fn injected_ledger_sees_every_write() {
    let config = MachineConfig::seeded(21).with_timing(TimingConfig::instant());
    let mut machine = Machine::with_ledger(config, AuditLedger::default()).unwrap();

    machine.on_bet();
    machine.on_lever();
    for _ in 0..10 {
        machine.step();
    }
    for reel in 0..3 {
        machine.on_stop(reel);
    }
    for _ in 0..200 {
        machine.step();
    }
    assert_eq!(machine.state(), MachineState::Idle);

    let ledger = machine.into_ledger();
    assert_eq!(
        &ledger.writes[..3],
        &["add_credit", "consume_credit", "increment_game"]
    );
    assert_eq!(ledger.writes.last(), Some(&"set_payout"));
    assert_eq!(ledger.games, 1);
    assert_eq!(ledger.payout, 0);
}
