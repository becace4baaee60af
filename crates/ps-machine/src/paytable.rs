//! Pay line evaluation
//!
//! The machine has a single pay line: the center row of the three reels.
//! Three-of-a-kind and the left-reel cherry are checked independently.

use serde::{Deserialize, Serialize};

use crate::symbols::SymbolId;

/// Bonus awarded by a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    /// Triple SEVEN
    Big,
}

/// Credits paid per winning combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayTable {
    /// BELL BELL BELL
    pub bell_triple: u32,
    /// REPLAY REPLAY REPLAY (the next game is free in a cabinet; credits here)
    pub replay_triple: u32,
    /// SEVEN SEVEN SEVEN, on top of the big bonus
    pub seven_triple: u32,
    /// CHERRY on the left reel, regardless of the other two
    pub left_cherry: u32,
}

impl Default for PayTable {
    fn default() -> Self {
        Self {
            bell_triple: 8,
            replay_triple: 0,
            seven_triple: 0,
            left_cherry: 2,
        }
    }
}

/// Result of evaluating the pay line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineResult {
    /// Center-row symbols, left to right
    pub symbols: [SymbolId; 3],
    /// Credits won
    pub payout: u32,
    /// Three-of-a-kind symbol, if any
    pub triple: Option<SymbolId>,
    /// Bonus started by this line
    pub bonus: Option<BonusKind>,
    /// Left-reel cherry paid
    pub cherry: bool,
}

impl LineResult {
    pub fn is_win(&self) -> bool {
        self.payout > 0 || self.bonus.is_some() || self.triple.is_some()
    }
}

impl PayTable {
    /// Evaluate a center row
    pub fn evaluate(&self, symbols: [SymbolId; 3]) -> LineResult {
        let [s1, s2, s3] = symbols;
        let mut payout = 0;
        let mut bonus = None;

        let triple = (s1 == s2 && s2 == s3).then_some(s1);
        match triple {
            Some(SymbolId::Bell) => payout += self.bell_triple,
            Some(SymbolId::Replay) => payout += self.replay_triple,
            Some(SymbolId::Seven) => {
                payout += self.seven_triple;
                bonus = Some(BonusKind::Big);
            }
            _ => {}
        }

        let cherry = s1 == SymbolId::Cherry;
        if cherry {
            payout += self.left_cherry;
        }

        LineResult {
            symbols,
            payout,
            triple: triple
                .filter(|s| matches!(s, SymbolId::Bell | SymbolId::Replay | SymbolId::Seven)),
            bonus,
            cherry,
        }
    }
}
