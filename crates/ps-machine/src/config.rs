//! Machine configuration
//!
//! Everything static about a cabinet: reel strips, odds tables, pay table,
//! reel geometry, pacing and coin handling. Loadable from JSON or YAML; any
//! field left out falls back to the standard machine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MachineError, MachineResult};
use crate::lottery::{SettingTable, standard_settings};
use crate::paytable::PayTable;
use crate::symbols::ReelStrip;
use crate::timing::TimingConfig;

/// Reel speed and window geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelPhysics {
    /// Travel per logic frame (strip units)
    pub speed: f64,
    /// Height of one symbol cell (strip units)
    pub symbol_height: f64,
    /// Rows visible in the window
    pub visible_rows: usize,
}

impl ReelPhysics {
    /// Window row carrying the pay line
    pub fn center_row(&self) -> usize {
        self.visible_rows / 2
    }
}

impl Default for ReelPhysics {
    fn default() -> Self {
        Self {
            speed: 24.0,
            symbol_height: 60.0,
            visible_rows: 3,
        }
    }
}

/// Complete cabinet configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Credits consumed per game
    pub bet_cost: u32,

    /// Coins inserted automatically when credit is short of a bet.
    /// None disables the top-up; a short bet is then refused.
    pub auto_top_up: Option<u32>,

    /// Maximum stored credit for the default counters (None = unbounded)
    pub credit_limit: Option<u32>,

    /// Reel speed and geometry
    pub physics: ReelPhysics,

    /// Left, center, right strips
    pub strips: [ReelStrip; 3],

    /// Odds table per setting id
    pub settings: SettingTable,

    /// Setting active at power-on
    pub default_setting: u8,

    /// Credits per combination
    pub paytable: PayTable,

    /// Round pacing
    pub timing: TimingConfig,

    /// RNG seed for reproducible sessions (None = OS entropy)
    pub seed: Option<u64>,
}

impl MachineConfig {
    /// The standard cabinet
    pub fn standard() -> Self {
        Self {
            bet_cost: 3,
            auto_top_up: Some(50),
            credit_limit: None,
            physics: ReelPhysics::default(),
            strips: ReelStrip::standard_set(),
            settings: standard_settings(),
            default_setting: 1,
            paytable: PayTable::default(),
            timing: TimingConfig::normal(),
            seed: None,
        }
    }

    /// Standard cabinet with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::standard()
        }
    }

    /// Set timing
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Check every static invariant the machine relies on
    pub fn validate(&self) -> MachineResult<()> {
        let invalid = |msg: String| Err(MachineError::InvalidConfig(msg));

        if self.bet_cost == 0 {
            return invalid("bet_cost must be positive".into());
        }
        if let Some(amount) = self.auto_top_up {
            if amount < self.bet_cost {
                return invalid(format!(
                    "auto_top_up {amount} cannot cover bet_cost {}",
                    self.bet_cost
                ));
            }
        }
        if let Some(limit) = self.credit_limit {
            if limit < self.bet_cost {
                return invalid(format!(
                    "credit_limit {limit} is below bet_cost {}",
                    self.bet_cost
                ));
            }
        }
        let physics = &self.physics;
        if !(physics.speed > 0.0) || !physics.speed.is_finite() {
            return invalid(format!("reel speed must be positive, got {}", physics.speed));
        }
        if !(physics.symbol_height > 0.0) || !physics.symbol_height.is_finite() {
            return invalid(format!(
                "symbol height must be positive, got {}",
                physics.symbol_height
            ));
        }
        if physics.visible_rows == 0 {
            return invalid("visible_rows must be at least 1".into());
        }
        for (i, strip) in self.strips.iter().enumerate() {
            let height = strip.len() as f64 * physics.symbol_height;
            if physics.speed > height {
                return invalid(format!(
                    "reel {i}: speed {} exceeds strip height {height}",
                    physics.speed
                ));
            }
        }

        if self.settings.is_empty() {
            return invalid("at least one setting is required".into());
        }
        for (id, table) in &self.settings {
            if let Err(e) = table.validate() {
                return invalid(format!("setting {id}: {e}"));
            }
        }
        if !self.settings.contains_key(&self.default_setting) {
            return invalid(format!(
                "default setting {} is not configured",
                self.default_setting
            ));
        }

        let timing = &self.timing;
        if !(timing.frame_ms > 0.0) {
            return invalid(format!("frame_ms must be positive, got {}", timing.frame_ms));
        }
        for (name, value) in [
            ("settle_ms", timing.settle_ms),
            ("payout_delay_ms", timing.payout_delay_ms),
            ("reset_delay_ms", timing.reset_delay_ms),
        ] {
            if !(value >= 0.0) {
                return invalid(format!("{name} must not be negative, got {value}"));
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Parse and validate JSON
    pub fn from_json_str(json: &str) -> MachineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> MachineResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> MachineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> MachineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::standard()
    }
}
