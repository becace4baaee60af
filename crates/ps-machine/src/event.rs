//! MachineEvent — timestamped record of what the machine did
//!
//! Hosts drain events after each tick or input to drive displays, sounds and
//! button lamps without polling every field.

use serde::{Deserialize, Serialize};

use crate::lottery::Outcome;
use crate::machine::MachineState;
use crate::paytable::LineResult;
use crate::symbols::SymbolId;

/// Which input affordances are live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlState {
    pub bet_enabled: bool,
    pub lever_enabled: bool,
    pub stop_enabled: [bool; 3],
}

impl ControlState {
    /// Everything disabled
    pub fn locked() -> Self {
        Self::default()
    }

    /// Any stop button live
    pub fn any_stop_enabled(&self) -> bool {
        self.stop_enabled.iter().any(|&enabled| enabled)
    }
}

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Round state machine moved
    StateChanged {
        from: MachineState,
        to: MachineState,
    },

    /// Credit was short of the bet; coins were inserted
    CreditToppedUp { amount: u32, credit: u32 },

    /// Bet consumed
    BetPlaced { cost: u32, credit: u32 },

    /// Round outcome drawn at lever pull
    FlagDrawn { outcome: Outcome },

    /// Stop armed on a reel
    ReelStopRequested {
        reel_index: u8,
        /// Strip index that will sit at the top of the window
        target_index: usize,
    },

    /// Reel came to rest
    ReelStopped {
        reel_index: u8,
        /// Window symbols, top to bottom
        symbols: Vec<SymbolId>,
    },

    /// Pay line evaluated and credited
    PayoutEvaluated { line: LineResult },

    /// Round cleared, machine idle
    RoundReset,

    /// Affordances changed
    ControlsChanged { controls: ControlState },

    /// Lottery setting switched
    SettingChanged { setting: u8 },
}

/// An event with its virtual-clock timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineEvent {
    pub kind: EventKind,

    /// Virtual clock (ms since machine start)
    pub timestamp_ms: f64,
}

impl MachineEvent {
    pub fn new(kind: EventKind, timestamp_ms: f64) -> Self {
        Self { kind, timestamp_ms }
    }

    /// Snake-case type name, matching the serialized tag
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EventKind::StateChanged { .. } => "state_changed",
            EventKind::CreditToppedUp { .. } => "credit_topped_up",
            EventKind::BetPlaced { .. } => "bet_placed",
            EventKind::FlagDrawn { .. } => "flag_drawn",
            EventKind::ReelStopRequested { .. } => "reel_stop_requested",
            EventKind::ReelStopped { .. } => "reel_stopped",
            EventKind::PayoutEvaluated { .. } => "payout_evaluated",
            EventKind::RoundReset => "round_reset",
            EventKind::ControlsChanged { .. } => "controls_changed",
            EventKind::SettingChanged { .. } => "setting_changed",
        }
    }
}
