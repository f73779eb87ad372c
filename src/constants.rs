//! Blow detection and page tuning constants.
//!
//! These constants express intended behavior (thresholds, band edges, limits)
//! and keep magic numbers out of the detector and session code.

// Loudness threshold on the 0..255 byte-magnitude scale
pub const DEFAULT_THRESHOLD: f32 = 15.0;
pub const MAX_THRESHOLD: f32 = 255.0;

// Suppression window after an accepted trigger (milliseconds)
pub const DEFAULT_COOLDOWN_MS: u64 = 1000;
pub const MAX_COOLDOWN_MS: u64 = 10_000;

// Frames strictly above threshold needed before a trigger counts
pub const CONSECUTIVE_FRAMES: u32 = 2;

// Analyser setup (fftSize 256 -> 128 frequency bins)
pub const ANALYSER_FFT_SIZE: u32 = 256;

// Band split as fractions of the bin count
pub const LOW_BAND_END: f32 = 0.3;
pub const MID_BAND_END: f32 = 0.7;

// Blowing energy sits mostly in the mid band
pub const LOW_BAND_WEIGHT: f32 = 0.3;
pub const MID_BAND_WEIGHT: f32 = 0.7;

// Level meter: percent width per loudness unit, capped at 100
pub const METER_PERCENT_PER_LEVEL: f32 = 2.0;

// Recipient and wish limits (characters, not bytes)
pub const MAX_NAME_CHARS: usize = 50;
pub const CAKE_NAME_CHARS: usize = 10;
pub const MAX_WISH_CHARS: usize = 200;
pub const WISH_PREVIEW_CHARS: usize = 30;

// Fallback display name when the page carries none
pub const DEFAULT_RECIPIENT: &str = "فنان";

// UI timing (milliseconds)
pub const NOTE_VISIBLE_MS: u32 = 7000;
pub const TOAST_SHORT_MS: u32 = 3000;
pub const TOAST_LONG_MS: u32 = 5000;

// Vibration pattern played when the candles go out
pub const EXTINGUISH_VIBRATION_MS: [u32; 3] = [100, 50, 100];

// Celebration effects
pub const CANDLE_COUNT: usize = 3;
pub const SMOKE_PUFFS_PER_CANDLE: usize = 5;
pub const CONFETTI_PIECES: usize = 60;

// Sound cues served next to the page
pub const BLOW_SOUND_URL: &str = "/sounds/blow-candle.mp3";
pub const WISH_SOUND_URL: &str = "/sounds/magic-wand.mp3";

// Path segment of the link-creation form
pub const CREATE_PATH: &str = "create";

// How long the copy button shows its "copied" label (milliseconds)
pub const COPIED_LABEL_MS: u32 = 2000;
