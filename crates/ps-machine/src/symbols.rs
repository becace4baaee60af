//! Symbol definitions and reel strips

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MachineError, MachineResult};

/// Number of symbols on a standard strip
pub const STANDARD_STRIP_LENGTH: usize = 20;

/// Symbol printed on a reel strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum SymbolId {
    Replay = 0,
    Bell = 1,
    Watermelon = 2,
    Cherry = 3,
    Bar = 4,
    /// Big bonus symbol
    Seven = 5,
    Blank = 6,
}

impl SymbolId {
    /// All symbols in id order
    pub const ALL: [SymbolId; 7] = [
        SymbolId::Replay,
        SymbolId::Bell,
        SymbolId::Watermelon,
        SymbolId::Cherry,
        SymbolId::Bar,
        SymbolId::Seven,
        SymbolId::Blank,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            SymbolId::Replay => "REPLAY",
            SymbolId::Bell => "BELL",
            SymbolId::Watermelon => "WATERMELON",
            SymbolId::Cherry => "CHERRY",
            SymbolId::Bar => "BAR",
            SymbolId::Seven => "SEVEN",
            SymbolId::Blank => "BLANK",
        }
    }

    /// Numeric id, stable across versions
    pub fn to_index(self) -> u8 {
        self as u8
    }

    /// Symbol for a numeric id
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A circular reel strip
///
/// Has no beginning or end during play: every lookup wraps modulo the strip
/// length. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SymbolId>", into = "Vec<SymbolId>")]
pub struct ReelStrip {
    symbols: Vec<SymbolId>,
}

impl ReelStrip {
    /// Create a strip from its symbols, top to bottom
    pub fn new(symbols: Vec<SymbolId>) -> MachineResult<Self> {
        if symbols.is_empty() {
            return Err(MachineError::InvalidConfig(
                "reel strip must contain at least one symbol".into(),
            ));
        }
        Ok(Self { symbols })
    }

    /// Symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> SymbolId {
        self.symbols[position % self.symbols.len()]
    }

    /// Strip length
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in strip order
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    /// Count occurrences of a symbol
    pub fn count(&self, symbol: SymbolId) -> usize {
        self.symbols.iter().filter(|&&s| s == symbol).count()
    }

    /// Left reel of the standard machine
    pub fn standard_left() -> Self {
        use SymbolId::*;
        Self {
            symbols: vec![
                Seven, Bell, Replay, Cherry, Bell, Replay, Watermelon, Bell, Replay, Bar, Bell,
                Replay, Cherry, Bell, Replay, Watermelon, Bell, Replay, Seven, Bell,
            ],
        }
    }

    /// Center reel of the standard machine
    pub fn standard_center() -> Self {
        use SymbolId::*;
        Self {
            symbols: vec![
                Seven, Replay, Bell, Watermelon, Replay, Bell, Cherry, Replay, Bell, Bar, Replay,
                Bell, Watermelon, Replay, Bell, Cherry, Replay, Bell, Seven, Replay,
            ],
        }
    }

    /// Right reel of the standard machine
    pub fn standard_right() -> Self {
        use SymbolId::*;
        Self {
            symbols: vec![
                Seven, Bell, Replay, Watermelon, Bell, Replay, Cherry, Bell, Replay, Bar, Bell,
                Replay, Watermelon, Bell, Replay, Cherry, Bell, Replay, Seven, Bell,
            ],
        }
    }

    /// All three standard strips, left to right
    pub fn standard_set() -> [ReelStrip; 3] {
        [
            Self::standard_left(),
            Self::standard_center(),
            Self::standard_right(),
        ]
    }
}

impl TryFrom<Vec<SymbolId>> for ReelStrip {
    type Error = MachineError;

    fn try_from(symbols: Vec<SymbolId>) -> Result<Self, Self::Error> {
        Self::new(symbols)
    }
}

impl From<ReelStrip> for Vec<SymbolId> {
    fn from(strip: ReelStrip) -> Self {
        strip.symbols
    }
}
