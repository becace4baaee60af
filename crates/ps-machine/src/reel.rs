//! Reel physics — continuous scrolling strip with a two-phase stop
//!
//! A reel scrolls forward by `speed` units per logic frame. A stop request
//! arms an absolute target position ahead of the reel; the reel keeps moving
//! at full speed until it reaches or passes the target, then snaps onto it.
//! Reels never travel backwards and never halt on the frame the stop was
//! requested.

use serde::{Deserialize, Serialize};

use crate::config::ReelPhysics;
use crate::symbols::{ReelStrip, SymbolId};

/// Motion phase of a reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ReelPhase {
    /// At rest
    Idle,
    /// Free spinning, stop not yet requested
    Spinning,
    /// Stop armed; still moving toward `target`
    Stopping {
        /// Absolute position the reel snaps to
        target: f64,
    },
}

/// One physical reel
#[derive(Debug, Clone, PartialEq)]
pub struct Reel {
    /// Reel index (0 = left)
    index: usize,
    /// Printed symbols
    strip: ReelStrip,
    /// Speed and geometry
    physics: ReelPhysics,
    /// Scroll position in strip units
    position: f64,
    /// Units advanced per frame (0 at rest)
    speed: f64,
    /// Current phase
    phase: ReelPhase,
}

impl Reel {
    /// Create a reel at rest with symbol 0 at the top of the window
    pub fn new(index: usize, strip: ReelStrip, physics: ReelPhysics) -> Self {
        Self {
            index,
            strip,
            physics,
            position: 0.0,
            speed: 0.0,
            phase: ReelPhase::Idle,
        }
    }

    /// Start from an arbitrary scroll position (normalized into the strip)
    pub fn with_position(mut self, position: f64) -> Self {
        self.position = position.rem_euclid(self.total_height());
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MOTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Begin free spinning. Only valid at rest; returns whether it started.
    pub fn start_spin(&mut self) -> bool {
        if self.phase != ReelPhase::Idle {
            return false;
        }
        self.phase = ReelPhase::Spinning;
        self.speed = self.physics.speed;
        true
    }

    /// Arm a stop with `target_index` at the top of the window.
    ///
    /// No-op unless the reel is free spinning, so repeated stop requests are
    /// harmless. Returns whether a stop was armed.
    pub fn stop(&mut self, target_index: usize) -> bool {
        if self.phase != ReelPhase::Spinning {
            return false;
        }

        let total = self.total_height();
        let target_offset = (target_index % self.strip.len()) as f64 * self.physics.symbol_height;
        let current_offset = self.offset();

        let mut distance = target_offset - current_offset;
        let mut revolutions = 0.0;
        if distance <= 0.0 {
            distance += total;
            revolutions += 1.0;
        }
        // At least one full frame of travel before the snap
        while distance < self.speed && total > 0.0 {
            distance += total;
            revolutions += 1.0;
        }

        // Same point as position + distance, anchored on the revolution start
        // so the target lands exactly on a symbol boundary
        let target = (self.position - current_offset) + target_offset + revolutions * total;
        self.phase = ReelPhase::Stopping { target };
        log::debug!(
            "Reel {} stopping at index {} (travel {:.1})",
            self.index,
            target_index % self.strip.len(),
            distance
        );
        true
    }

    /// Advance one frame. Returns `true` on the frame the reel comes to rest.
    pub fn update(&mut self) -> bool {
        match self.phase {
            ReelPhase::Idle => false,
            ReelPhase::Spinning => {
                self.position += self.speed;
                let total = self.total_height();
                if self.position >= total {
                    self.position = self.position.rem_euclid(total);
                }
                false
            }
            ReelPhase::Stopping { target } => {
                self.position += self.speed;
                if self.position >= target {
                    self.position = target.rem_euclid(self.total_height());
                    self.phase = ReelPhase::Idle;
                    self.speed = 0.0;
                    return true;
                }
                false
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn strip(&self) -> &ReelStrip {
        &self.strip
    }

    pub fn physics(&self) -> &ReelPhysics {
        &self.physics
    }

    pub fn phase(&self) -> ReelPhase {
        self.phase
    }

    /// Spinning or stopping
    pub fn is_spinning(&self) -> bool {
        self.phase != ReelPhase::Idle
    }

    pub fn is_stopping(&self) -> bool {
        matches!(self.phase, ReelPhase::Stopping { .. })
    }

    /// At rest with no stop pending
    pub fn is_at_rest(&self) -> bool {
        self.phase == ReelPhase::Idle
    }

    /// Armed stop target, if any
    pub fn stop_target(&self) -> Option<f64> {
        match self.phase {
            ReelPhase::Stopping { target } => Some(target),
            _ => None,
        }
    }

    /// Raw scroll position
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Height of one full revolution
    pub fn total_height(&self) -> f64 {
        self.strip.len() as f64 * self.physics.symbol_height
    }

    /// Position reduced into `[0, total_height)`
    pub fn offset(&self) -> f64 {
        self.position.rem_euclid(self.total_height())
    }

    /// Strip index of the symbol at the top of the window
    pub fn top_index(&self) -> usize {
        (self.offset() / self.physics.symbol_height).floor() as usize % self.strip.len()
    }

    /// Symbol shown at a window row (0 = top)
    pub fn symbol_at_row(&self, row: usize) -> SymbolId {
        self.strip.symbol_at(self.top_index() + row)
    }

    /// Symbols in the first `rows` window rows, top to bottom
    pub fn visible_symbols(&self, rows: usize) -> Vec<SymbolId> {
        (0..rows).map(|row| self.symbol_at_row(row)).collect()
    }

    /// Symbols in the configured window
    pub fn window(&self) -> Vec<SymbolId> {
        self.visible_symbols(self.physics.visible_rows)
    }

    /// Symbol on the pay line (middle row of the window)
    pub fn center_symbol(&self) -> SymbolId {
        self.symbol_at_row(self.physics.center_row())
    }

    /// Sub-symbol scroll offset, for smooth rendering only
    pub fn scroll_offset(&self) -> f64 {
        self.offset() % self.physics.symbol_height
    }

    /// Strip index the reel would naturally settle on (nearest symbol)
    pub fn natural_stop_index(&self) -> usize {
        (self.offset() / self.physics.symbol_height).round() as usize % self.strip.len()
    }
}
