//! Celebration particles as plain data.
//!
//! The renderer (CSS animations on the page) consumes these; generation is
//! seeded so the same seed always yields the same burst.

use crate::constants::{CANDLE_COUNT, CONFETTI_PIECES, SMOKE_PUFFS_PER_CANDLE};
use rand::prelude::*;
use smallvec::SmallVec;

/// One smoke puff rising from an extinguished wick. Offsets are in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SmokePuff {
    pub candle: usize,
    pub dx: f32,
    pub dy: f32,
    pub opacity: f32,
    pub scale: f32,
    pub rotate_deg: f32,
    pub duration_sec: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfettiPiece {
    /// Horizontal launch position in [0, 1] of the viewport width.
    pub x: f32,
    pub size_px: f32,
    pub color: &'static str,
    pub rotate_deg: f32,
    pub delay_sec: f32,
    pub fall_sec: f32,
}

pub const CONFETTI_COLORS: [&str; 4] = ["#f472b6", "#22d3ee", "#fcd34d", "#a78bfa"];

pub type CandleSmoke = SmallVec<[SmokePuff; SMOKE_PUFFS_PER_CANDLE]>;

pub struct Effects {
    rng: StdRng,
}

impl Effects {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Puffs for one candle: x ±15, rise 50..100, opacity 0.7..1, scale 0.8..2.
    pub fn smoke_for_candle(&mut self, candle: usize) -> CandleSmoke {
        (0..SMOKE_PUFFS_PER_CANDLE)
            .map(|_| SmokePuff {
                candle,
                dx: (self.rng.gen::<f32>() - 0.5) * 30.0,
                dy: -(50.0 + self.rng.gen::<f32>() * 50.0),
                opacity: 0.7 + self.rng.gen::<f32>() * 0.3,
                scale: 0.8 + self.rng.gen::<f32>() * 1.2,
                rotate_deg: self.rng.gen::<f32>() * 360.0,
                duration_sec: 1.5 + self.rng.gen::<f32>() * 1.5,
            })
            .collect()
    }

    pub fn smoke(&mut self) -> Vec<SmokePuff> {
        (0..CANDLE_COUNT)
            .flat_map(|c| self.smoke_for_candle(c))
            .collect()
    }

    pub fn confetti(&mut self) -> Vec<ConfettiPiece> {
        (0..CONFETTI_PIECES)
            .map(|_| ConfettiPiece {
                x: self.rng.gen::<f32>(),
                size_px: 4.0 + self.rng.gen::<f32>() * 6.0,
                color: CONFETTI_COLORS.choose(&mut self.rng).copied().unwrap_or("#f472b6"),
                rotate_deg: self.rng.gen::<f32>() * 360.0,
                delay_sec: self.rng.gen::<f32>() * 0.5,
                fall_sec: 2.0 + self.rng.gen::<f32>() * 2.0,
            })
            .collect()
    }
}
