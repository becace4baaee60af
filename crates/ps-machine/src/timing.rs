//! Timing profiles for round pacing

use serde::{Deserialize, Serialize};

/// Logic frame length at 60 Hz (ms)
pub const FRAME_MS_60HZ: f64 = 1000.0 / 60.0;

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Cabinet pacing
    #[default]
    Normal,
    /// Half-length delays
    Turbo,
    /// No delays (deferred work fires on the next frame)
    Instant,
    /// Hand-tuned or scaled values
    Custom,
}

impl TimingProfile {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Turbo => "Turbo",
            Self::Instant => "Instant",
            Self::Custom => "Custom",
        }
    }
}

/// Detailed timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Length of one logic frame (ms)
    pub frame_ms: f64,

    /// Lever pull until stop buttons accept input (ms)
    pub settle_ms: f64,

    /// Last reel at rest until the pay line is evaluated (ms)
    pub payout_delay_ms: f64,

    /// Payout until the machine accepts the next bet (ms)
    pub reset_delay_ms: f64,
}

impl TimingConfig {
    /// Normal cabinet timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            frame_ms: FRAME_MS_60HZ,
            settle_ms: 100.0,
            payout_delay_ms: 300.0,
            reset_delay_ms: 1000.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            frame_ms: FRAME_MS_60HZ,
            settle_ms: 50.0,
            payout_delay_ms: 150.0,
            reset_delay_ms: 500.0,
        }
    }

    /// Instant mode for batch simulation and tests
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            frame_ms: FRAME_MS_60HZ,
            settle_ms: 0.0,
            payout_delay_ms: 0.0,
            reset_delay_ms: 0.0,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale delays by factor (< 1.0 = faster). Frame length is unchanged.
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            frame_ms: self.frame_ms,
            settle_ms: self.settle_ms * factor,
            payout_delay_ms: self.payout_delay_ms * factor,
            reset_delay_ms: self.reset_delay_ms * factor,
        }
    }

    /// Minimum time from the last reel at rest until the next bet is accepted
    pub fn round_tail_ms(&self) -> f64 {
        self.payout_delay_ms + self.reset_delay_ms
    }

    /// Whole frames covering a duration
    pub fn frames_for(&self, duration_ms: f64) -> u32 {
        if self.frame_ms <= 0.0 {
            return 0;
        }
        (duration_ms / self.frame_ms).ceil() as u32
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}
