//! # ps-machine — Pachislot Simulator Core
//!
//! Headless model of a three-reel pachislot cabinet. Hosts feed it player
//! input and elapsed time; it owns every rule about when input counts, what
//! the round outcome is and how credit moves.
//!
//! ## Features
//!
//! - **Flag Lottery**: Per-setting odds tables over a 65 536-value sample space
//! - **Reel Physics**: Constant-speed strips that snap exactly onto a symbol
//! - **Round State Machine**: IDLE → BET → LEVER_ON → SPINNING → PAYOUT → IDLE
//! - **Ledger**: Credit and counters behind a trait, with default counters
//! - **Timing Profiles**: Normal, Turbo, Instant pacing on a virtual clock
//!
//! ## Architecture
//!
//! ```text
//! Machine
//!     │
//!     ├── Lottery (odds tables per setting)
//!     ├── [Reel; 3] (strip + physics)
//!     ├── PayTable (center line evaluation)
//!     ├── Scheduler (deferred pacing work)
//!     └── Ledger (credit, counters)
//!           │
//!           v
//!     Vec<MachineEvent> + SessionStats
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod lottery;
pub mod machine;
pub mod paytable;
pub mod reel;
pub mod scheduler;
pub mod stats;
pub mod symbols;
pub mod timing;

pub use config::*;
pub use error::*;
pub use event::*;
pub use ledger::*;
pub use lottery::*;
pub use machine::*;
pub use paytable::*;
pub use reel::*;
pub use scheduler::*;
pub use stats::*;
pub use symbols::*;
pub use timing::*;
