/// Maximum number of samples held in the sliding buffer.
pub const FIXED_CAPACITY: usize = 1024;

/// Buffer length at which every accepted sample triggers a processing pass.
pub const PROCESS_THRESHOLD: usize = 64;

/// Feedback history length that triggers rotation.
pub const HISTORY_SOFT_CAP: usize = 1000;

/// Entries kept after the history rotates.
pub const HISTORY_RETAIN: usize = 500;

/// Default window for recent feedback queries.
pub const DEFAULT_RECENT_COUNT: i64 = 10;

/// Score returned when a ratio has a zero denominator or a step faults.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Session type used when the caller does not name one.
pub const DEFAULT_SESSION_TYPE: &str = "training";

// Score normalization: score = (ratio - FLOOR) / SPAN * 100, clamped to [0, 100].

/// beta / (alpha + theta) at which attention reads 0.
pub const ATTENTION_RATIO_FLOOR: f64 = 0.1;
pub const ATTENTION_RATIO_SPAN: f64 = 1.9;

/// alpha / theta at which meditation reads 0.
pub const MEDITATION_RATIO_FLOOR: f64 = 0.5;
pub const MEDITATION_RATIO_SPAN: f64 = 2.5;

// Feedback tiers

pub const ATTENTION_THRESHOLD: f64 = 70.0;
pub const MEDITATION_THRESHOLD: f64 = 70.0;
pub const ENCOURAGING_FLOOR: f64 = 50.0;
pub const LOW_MEDITATION: f64 = 30.0;

// Artifact heuristics

/// Mean gamma power above which the window is flagged as movement.
pub const MOVEMENT_GAMMA_MEAN: f64 = 50.0;

/// Alpha standard deviation above which the window is flagged as a blink.
pub const BLINK_ALPHA_STD: f64 = 20.0;

/// Summed band means below which the electrode is considered detached.
pub const ELECTRODE_TOTAL_POWER: f64 = 5.0;

/// Standard deviation across all bands above which the window is noisy.
pub const NOISE_STD: f64 = 30.0;
