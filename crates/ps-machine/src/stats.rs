//! Session statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lottery::{Flag, Outcome};
use crate::paytable::{BonusKind, LineResult};

/// Running totals for one machine session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Lever pulls
    pub games: u64,
    /// Credits wagered
    pub total_bet: u64,
    /// Credits paid by the pay line
    pub total_paid: u64,
    /// Rounds with a non-zero payout
    pub paying_games: u64,
    /// Draws per flag
    pub flag_counts: BTreeMap<Flag, u64>,
    /// Draws with no flag
    pub misses: u64,
    pub big_bonuses: u64,
    /// Coin insertions triggered by auto top-up
    pub top_ups: u64,
}

impl SessionStats {
    /// Record a bet
    pub fn record_bet(&mut self, cost: u32) {
        self.total_bet += cost as u64;
    }

    /// Record the flag drawn for a game
    pub fn record_draw(&mut self, outcome: Outcome) {
        self.games += 1;
        match outcome {
            Outcome::Hit(flag) => *self.flag_counts.entry(flag).or_default() += 1,
            Outcome::Miss => self.misses += 1,
        }
    }

    /// Record an evaluated pay line
    pub fn record_line(&mut self, line: &LineResult) {
        self.total_paid += line.payout as u64;
        if line.payout > 0 {
            self.paying_games += 1;
        }
        if line.bonus == Some(BonusKind::Big) {
            self.big_bonuses += 1;
        }
    }

    /// Draws of a flag
    pub fn flag_count(&self, flag: Flag) -> u64 {
        self.flag_counts.get(&flag).copied().unwrap_or(0)
    }

    /// Paid / bet in percent
    pub fn payout_rate(&self) -> f64 {
        if self.total_bet > 0 {
            (self.total_paid as f64 / self.total_bet as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Percent of games that paid something
    pub fn hit_rate(&self) -> f64 {
        if self.games > 0 {
            (self.paying_games as f64 / self.games as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Observed frequency of a flag per game
    pub fn flag_frequency(&self, flag: Flag) -> f64 {
        if self.games > 0 {
            self.flag_count(flag) as f64 / self.games as f64
        } else {
            0.0
        }
    }

    /// Fold another session into this one
    pub fn merge(&mut self, other: &SessionStats) {
        self.games += other.games;
        self.total_bet += other.total_bet;
        self.total_paid += other.total_paid;
        self.paying_games += other.paying_games;
        for (flag, count) in &other.flag_counts {
            *self.flag_counts.entry(*flag).or_default() += count;
        }
        self.misses += other.misses;
        self.big_bonuses += other.big_bonuses;
        self.top_ups += other.top_ups;
    }
}
