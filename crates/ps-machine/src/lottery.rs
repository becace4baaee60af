//! Flag lottery — weighted per-round outcome draw
//!
//! Every round draws one 16-bit value and maps it onto the active odds table.
//! Flags own contiguous, non-overlapping ranges assigned in a fixed priority
//! order starting at 0; whatever is left at the top of the sample space is a
//! miss.
//!
//! ```text
//! 0                                                             65536
//! |-- REPLAY --|-- BELL --|-CHERRY-|-WM-|-CZ-|-------- MISS --------|
//! ```

use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{MachineError, MachineResult};

/// Size of the lottery sample space (16-bit resolution)
pub const SAMPLE_SPACE: u32 = 65_536;

/// Outcome flag drawn at lever pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flag {
    Replay,
    Bell,
    Cherry,
    Watermelon,
    /// Bonus-chance zone trigger
    CzTrigger,
}

impl Flag {
    /// Check order used when mapping a draw onto the sample space
    pub const PRIORITY: [Flag; 5] = [
        Flag::Replay,
        Flag::Bell,
        Flag::Cherry,
        Flag::Watermelon,
        Flag::CzTrigger,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Flag::Replay => "REPLAY",
            Flag::Bell => "BELL",
            Flag::Cherry => "CHERRY",
            Flag::Watermelon => "WATERMELON",
            Flag::CzTrigger => "CZ_TRIGGER",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one lottery draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A flag was hit
    Hit(Flag),
    /// No flag
    Miss,
}

impl Outcome {
    /// Flag, if one was hit
    pub fn flag(&self) -> Option<Flag> {
        match self {
            Outcome::Hit(flag) => Some(*flag),
            Outcome::Miss => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Hit(flag) => write!(f, "{flag}"),
            Outcome::Miss => f.write_str("MISS"),
        }
    }
}

/// Per-flag weights out of [`SAMPLE_SPACE`]
///
/// Weights must sum to at most 65536. A table that sums to exactly 65536 never
/// yields a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsTable {
    pub replay: u32,
    pub bell: u32,
    pub cherry: u32,
    pub watermelon: u32,
    pub cz_trigger: u32,
}

impl OddsTable {
    /// Setting 1 (lowest payout tier)
    pub fn setting_1() -> Self {
        Self {
            replay: 8978,    // ~1/7.3
            bell: 6553,      // ~1/10
            cherry: 1024,    // ~1/64
            watermelon: 512, // ~1/128
            cz_trigger: 100,
        }
    }

    /// Setting 6 (highest payout tier)
    pub fn setting_6() -> Self {
        Self {
            replay: 8978,
            bell: 7000,
            cherry: 1200,
            watermelon: 600,
            cz_trigger: 250,
        }
    }

    /// Weight assigned to a flag
    pub fn weight(&self, flag: Flag) -> u32 {
        match flag {
            Flag::Replay => self.replay,
            Flag::Bell => self.bell,
            Flag::Cherry => self.cherry,
            Flag::Watermelon => self.watermelon,
            Flag::CzTrigger => self.cz_trigger,
        }
    }

    /// Sum of all flag weights
    pub fn total(&self) -> u64 {
        Flag::PRIORITY
            .iter()
            .map(|&flag| self.weight(flag) as u64)
            .sum()
    }

    /// Width of the residual miss range
    pub fn miss_weight(&self) -> u64 {
        (SAMPLE_SPACE as u64).saturating_sub(self.total())
    }

    /// Probability of a flag per draw
    pub fn probability(&self, flag: Flag) -> f64 {
        self.weight(flag) as f64 / SAMPLE_SPACE as f64
    }

    /// Probability of a miss per draw
    pub fn miss_probability(&self) -> f64 {
        self.miss_weight() as f64 / SAMPLE_SPACE as f64
    }

    /// Map a sample value in `[0, 65536)` onto this table
    pub fn resolve(&self, value: u32) -> Outcome {
        let mut cumulative = 0u64;
        for flag in Flag::PRIORITY {
            cumulative += self.weight(flag) as u64;
            if (value as u64) < cumulative {
                return Outcome::Hit(flag);
            }
        }
        Outcome::Miss
    }

    /// Check the sample-space bound
    pub fn validate(&self) -> MachineResult<()> {
        let total = self.total();
        if total > SAMPLE_SPACE as u64 {
            return Err(MachineError::InvalidConfig(format!(
                "odds table weights sum to {total}, exceeding {SAMPLE_SPACE}"
            )));
        }
        Ok(())
    }
}

/// Odds tables keyed by setting id
pub type SettingTable = BTreeMap<u8, OddsTable>;

/// Standard settings 1 and 6
pub fn standard_settings() -> SettingTable {
    BTreeMap::from([(1, OddsTable::setting_1()), (6, OddsTable::setting_6())])
}

/// Flag lottery
///
/// Holds every configured setting and an internal uniform source. Each draw is
/// independent of the ones before it.
pub struct Lottery {
    /// All configured tables
    settings: SettingTable,
    /// Active setting id
    setting: u8,
    /// Uniform source over the sample space
    rng: StdRng,
}

impl Lottery {
    /// Create a lottery with the given settings, seeded from the OS
    pub fn new(settings: SettingTable, setting: u8) -> MachineResult<Self> {
        Self::with_rng(settings, setting, StdRng::from_os_rng())
    }

    /// Create a lottery with a reproducible seed
    pub fn seeded(settings: SettingTable, setting: u8, seed: u64) -> MachineResult<Self> {
        Self::with_rng(settings, setting, StdRng::seed_from_u64(seed))
    }

    /// Create a lottery with an explicit generator
    pub fn with_rng(settings: SettingTable, setting: u8, rng: StdRng) -> MachineResult<Self> {
        for (id, table) in &settings {
            table
                .validate()
                .map_err(|e| MachineError::InvalidConfig(format!("setting {id}: {e}")))?;
        }
        if !settings.contains_key(&setting) {
            return Err(MachineError::InvalidConfig(format!(
                "initial setting {setting} is not configured"
            )));
        }
        Ok(Self {
            settings,
            setting,
            rng,
        })
    }

    /// Standard machine lottery at setting 1
    pub fn standard() -> MachineResult<Self> {
        Self::new(standard_settings(), 1)
    }

    /// Draw the flag for one round
    pub fn draw(&mut self) -> Outcome {
        let value = self.rng.random_range(0..SAMPLE_SPACE);
        self.resolve(value)
    }

    /// Map a sample value onto the active table
    pub fn resolve(&self, value: u32) -> Outcome {
        self.table().resolve(value)
    }

    /// Switch the active odds table.
    ///
    /// An unknown id is ignored and the last valid table stays active, so a
    /// bad request between rounds can never leave the machine without odds.
    pub fn set_setting(&mut self, setting: u8) {
        if self.settings.contains_key(&setting) {
            if setting != self.setting {
                log::info!("Lottery setting {} -> {}", self.setting, setting);
            }
            self.setting = setting;
        } else {
            log::warn!(
                "Ignoring unknown setting {} (keeping {})",
                setting,
                self.setting
            );
        }
    }

    /// Active setting id
    pub fn setting(&self) -> u8 {
        self.setting
    }

    /// Active odds table
    pub fn table(&self) -> &OddsTable {
        // Constructors and set_setting only ever select a configured id
        &self.settings[&self.setting]
    }

    /// Configured setting ids, ascending
    pub fn available_settings(&self) -> impl Iterator<Item = u8> + '_ {
        self.settings.keys().copied()
    }
}
