use crate::constants::*;
use std::time::Duration;

/// Weighted loudness of one analysis frame, on the 0..255 byte scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct AudioSample(pub f32);

impl AudioSample {
    #[inline]
    pub fn level(self) -> f32 {
        self.0
    }

    /// Width of the UI level meter in percent.
    #[inline]
    pub fn meter_percent(self) -> f32 {
        (self.0 * METER_PERCENT_PER_LEVEL).clamp(0.0, 100.0)
    }
}

/// Blend the low and mid frequency bands of a byte magnitude vector.
///
/// Bins `[0, 30%)` are the low band and `[30%, 70%)` the mid band; the top
/// band is ignored. An empty band contributes zero.
pub fn weighted_loudness(bins: &[u8]) -> AudioSample {
    let n = bins.len();
    let low_end = (n as f32 * LOW_BAND_END).floor() as usize;
    let mid_end = ((n as f32 * MID_BAND_END).floor() as usize).max(low_end);
    let low = band_mean(&bins[..low_end]);
    let mid = band_mean(&bins[low_end..mid_end]);
    AudioSample(LOW_BAND_WEIGHT * low + MID_BAND_WEIGHT * mid)
}

#[inline]
fn band_mean(band: &[u8]) -> f32 {
    if band.is_empty() {
        return 0.0;
    }
    let sum: u32 = band.iter().map(|&b| b as u32).sum();
    sum as f32 / band.len() as f32
}

/// Debounce + cooldown gate turning a stream of samples into discrete triggers.
///
/// A trigger needs `required` consecutive samples strictly above `threshold`,
/// and is dropped while `now` is inside the cooldown of the previous one.
#[derive(Clone, Debug)]
pub struct TriggerGate {
    threshold: f32,
    required: u32,
    cooldown: Duration,
    consecutive: u32,
    cooldown_until: Option<Duration>,
}

impl TriggerGate {
    pub fn new(threshold: f32, required: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            required: required.max(1),
            cooldown,
            consecutive: 0,
            cooldown_until: None,
        }
    }

    /// Feed one sample taken at `now`; returns true when a trigger fires.
    pub fn feed(&mut self, sample: AudioSample, now: Duration) -> bool {
        if sample.level() > self.threshold {
            self.consecutive = self.consecutive.saturating_add(1);
        } else {
            self.consecutive = 0;
        }
        if self.consecutive < self.required || self.in_cooldown(now) {
            return false;
        }
        self.consecutive = 0;
        self.cooldown_until = Some(now + self.cooldown);
        true
    }

    #[inline]
    pub fn in_cooldown(&self, now: Duration) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Forget the consecutive-frame streak. The cooldown deadline survives so
    /// a quick relight cannot produce a second trigger inside the window.
    pub fn reset_streak(&mut self) {
        self.consecutive = 0;
    }
}
