//! Credit and statistics ledger
//!
//! The counter surface the machine reports to. The machine is the only writer;
//! displays read it.

use serde::{Deserialize, Serialize};

/// Credit balance the standard cabinet starts with
pub const DEFAULT_CREDIT: u32 = 50;

/// Counter surface written by the machine
pub trait Ledger {
    fn credit(&self) -> u32;
    fn game_count(&self) -> u64;
    fn big_count(&self) -> u32;
    fn reg_count(&self) -> u32;
    fn last_payout(&self) -> u32;

    fn add_credit(&mut self, amount: u32);
    /// Deduct `amount`; returns false and changes nothing if the balance is short
    fn consume_credit(&mut self, amount: u32) -> bool;
    fn increment_game(&mut self);
    fn add_big(&mut self);
    fn add_reg(&mut self);
    fn set_payout(&mut self, amount: u32);
}

/// In-memory data counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub credit: u32,
    pub game_count: u64,
    pub big_count: u32,
    pub reg_count: u32,
    pub last_payout: u32,
    /// Games since the last BIG or REG
    pub games_since_bonus: u64,
    /// Credits spilled past `credit_limit` (the coin tray)
    pub paid_out: u64,
    /// Maximum stored credit, None = unbounded
    #[serde(default)]
    pub credit_limit: Option<u32>,
}

impl Counters {
    /// Counters holding `credit`
    pub fn with_credit(credit: u32) -> Self {
        Self {
            credit,
            ..Self::default()
        }
    }

    /// Cap stored credit; the excess of later additions goes to `paid_out`
    pub fn with_credit_limit(mut self, limit: Option<u32>) -> Self {
        self.credit_limit = limit;
        self
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            credit: DEFAULT_CREDIT,
            game_count: 0,
            big_count: 0,
            reg_count: 0,
            last_payout: 0,
            games_since_bonus: 0,
            paid_out: 0,
            credit_limit: None,
        }
    }
}

impl Ledger for Counters {
    fn credit(&self) -> u32 {
        self.credit
    }

    fn game_count(&self) -> u64 {
        self.game_count
    }

    fn big_count(&self) -> u32 {
        self.big_count
    }

    fn reg_count(&self) -> u32 {
        self.reg_count
    }

    fn last_payout(&self) -> u32 {
        self.last_payout
    }

    fn add_credit(&mut self, amount: u32) {
        let total = self.credit.saturating_add(amount);
        match self.credit_limit {
            Some(limit) if total > limit => {
                self.paid_out += (total - limit) as u64;
                self.credit = limit;
            }
            _ => self.credit = total,
        }
    }

    fn consume_credit(&mut self, amount: u32) -> bool {
        if self.credit >= amount {
            self.credit -= amount;
            true
        } else {
            false
        }
    }

    fn increment_game(&mut self) {
        self.game_count += 1;
        self.games_since_bonus += 1;
    }

    fn add_big(&mut self) {
        self.big_count += 1;
        self.games_since_bonus = 0;
    }

    fn add_reg(&mut self) {
        self.reg_count += 1;
        self.games_since_bonus = 0;
    }

    fn set_payout(&mut self, amount: u32) {
        self.last_payout = amount;
    }
}
