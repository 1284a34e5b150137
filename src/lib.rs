//! AimForge - session and mode runtime for a first-person aim trainer
//!
//! Core modules:
//! - `sim`: Session state machine, mode engines, hit testing and metrics
//! - `settings`: Per-session configuration snapshot
//! - `persistence`: Versioned settings / last-run records
//! - `platform`: Pointer capture and browser bindings

pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use persistence::{LastRun, MemoryStorage, Storage};
pub use settings::{Settings, SettingsPatch, TargetShape, TrackInputMode};
pub use sim::{Game, GameEvent, ModeId, SessionError, SessionPhase};

/// World and timing constants
pub mod consts {
    /// Target wall (plane facing +Z)
    pub const WALL_Z: f32 = -12.0;
    pub const WALL_WIDTH: f32 = 14.0;
    pub const WALL_HEIGHT: f32 = 8.0;
    pub const WALL_CENTER_Y: f32 = 3.0;
    /// Floor plane height
    pub const FLOOR_Y: f32 = 0.0;
    /// Extra clearance kept between 3D targets and the floor
    pub const FLOOR_CLEARANCE: f32 = 0.3;

    /// Player eye position
    pub const EYE_HEIGHT: f32 = 1.6;

    /// Target radius before size scaling, and its clamp range
    pub const BASE_TARGET_RADIUS: f32 = 0.45;
    pub const MIN_TARGET_RADIUS: f32 = 0.12;
    pub const MAX_TARGET_RADIUS: f32 = 0.9;

    /// Mouse degrees per raw unit at sensitivity 1.0
    pub const DEG_PER_MOUSE_UNIT: f32 = 0.115;
    /// Pitch stays this far from straight up/down
    pub const PITCH_EPSILON: f32 = 0.02;

    /// Pointer capture gives up after this long (ms)
    pub const CAPTURE_TIMEOUT_MS: f64 = 1200.0;
    /// Minimum interval between HUD snapshots (seconds)
    pub const HUD_INTERVAL: f64 = 0.016;
    /// FPS sampling window (seconds)
    pub const FPS_WINDOW: f64 = 0.25;
    pub const MAX_FPS: f64 = 999.0;
}

/// Arithmetic mean, `None` when there are no samples
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Ratio of `part / whole` clamped to [0, 1], 0 when `whole` is not positive
#[inline]
pub fn ratio01(part: f64, whole: f64) -> f64 {
    if whole > 0.0 && part.is_finite() {
        (part / whole).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Milliseconds as "123 ms", or "-" when unavailable
pub fn format_ms(ms: Option<f64>) -> String {
    match ms {
        Some(ms) if ms.is_finite() => format!("{} ms", ms.round() as i64),
        _ => "-".to_string(),
    }
}

/// Fraction as a whole percentage
pub fn format_pct(v01: f64) -> String {
    if !v01.is_finite() {
        return "0%".to_string();
    }
    format!("{}%", (v01 * 100.0).round() as i64)
}

/// Seconds with one decimal, never negative
pub fn format_seconds(s: f64) -> String {
    if !s.is_finite() {
        return "-".to_string();
    }
    format!("{:.1}", s.max(0.0))
}
