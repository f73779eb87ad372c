use crate::constants::*;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::time::Duration;

/// Tuning for [`SoundLevelDetector`](super::SoundLevelDetector).
///
/// `threshold` is compared against the weighted loudness on the 0..255 scale.
/// `cooldown` is the window after an accepted trigger during which further
/// triggers are suppressed.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    pub threshold: f32,
    pub cooldown: Duration,
    pub consecutive_frames: u32,
    pub fft_size: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            consecutive_frames: CONSECUTIVE_FRAMES,
            fft_size: ANALYSER_FFT_SIZE,
        }
    }
}

impl DetectorConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, MAX_THRESHOLD);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown.min(Duration::from_millis(MAX_COOLDOWN_MS));
        self
    }

    /// Apply `threshold` and `cooldown` (milliseconds) overrides from a page
    /// query string such as `?gender=female&threshold=20`.
    ///
    /// Unknown keys are skipped; unparsable values are logged and ignored.
    pub fn from_query(query: &str) -> Self {
        let mut cfg = Self::default();
        for (key, value) in query_pairs(query) {
            match key.as_ref() {
                "threshold" => match value.parse::<f32>() {
                    Ok(t) if t.is_finite() => cfg = cfg.with_threshold(t),
                    _ => log::warn!("[config] ignoring threshold={:?}", value),
                },
                "cooldown" => match value.parse::<u64>() {
                    Ok(ms) => cfg = cfg.with_cooldown(Duration::from_millis(ms)),
                    Err(_) => log::warn!("[config] ignoring cooldown={:?}", value),
                },
                _ => {}
            }
        }
        cfg
    }
}

/// Split `a=1&b=2` (optionally prefixed with `?`) into percent-decoded
/// key/value pairs.
pub fn query_pairs(query: &str) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (k, v) = part.split_once('=').unwrap_or((part, ""));
            (decode(k), decode(v))
        })
}

#[inline]
fn decode(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}
