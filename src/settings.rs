//! Training settings
//!
//! A session copies the settings by value when it is prepared, so later edits
//! from the menu never reach a session that is already running.

use serde::{Deserialize, Deserializer, Serialize};

use crate::persistence::{self, Storage};

/// Target geometry family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetShape {
    /// Flat disk on the wall
    #[default]
    Circle,
    /// Sphere
    Ball,
    /// Vertical capsule
    Capsule,
}

impl TargetShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetShape::Circle => "circle",
            TargetShape::Ball => "ball",
            TargetShape::Capsule => "capsule",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "circle" | "disk" => Some(TargetShape::Circle),
            "ball" | "sphere" => Some(TargetShape::Ball),
            "capsule" => Some(TargetShape::Capsule),
            _ => None,
        }
    }

    /// Whether the shape has depth and must stay clear of the floor
    pub fn is_volumetric(&self) -> bool {
        matches!(self, TargetShape::Ball | TargetShape::Capsule)
    }
}

impl<'de> Deserialize<'de> for TargetShape {
    /// Unknown tags fall back to the default shape instead of rejecting the record
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(TargetShape::from_str(&tag).unwrap_or_else(|| {
            log::warn!("Unknown target shape {:?}, using circle", tag);
            TargetShape::default()
        }))
    }
}

/// How tracking mode scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrackInputMode {
    /// Scores whenever the crosshair is on the target
    #[default]
    Passive,
    /// Scores only while the fire button is held
    Hold,
}

impl TrackInputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackInputMode::Passive => "passive",
            TrackInputMode::Hold => "hold",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "passive" => Some(TrackInputMode::Passive),
            "hold" => Some(TrackInputMode::Hold),
            _ => None,
        }
    }
}

/// Valid ranges for numeric settings
pub mod limits {
    pub const TIMER_SECONDS: (f64, f64) = (0.0, 3600.0);
    pub const FOV_DEG: (f32, f32) = (50.0, 140.0);
    pub const SENSITIVITY: (f32, f32) = (0.05, 10.0);
    pub const TARGET_SIZE: (f32, f32) = (0.25, 2.0);
    pub const MOTION_SPEED: (f32, f32) = (0.4, 4.0);
}

/// Settings snapshot for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Session length in seconds (0 = untimed)
    #[serde(rename = "timer")]
    pub timer_seconds: f64,
    /// Vertical field of view in degrees
    #[serde(rename = "fov")]
    pub fov_deg: f32,
    /// Mouse sensitivity multiplier
    pub sensitivity: f32,
    /// Target size multiplier
    pub target_size: f32,
    pub target_shape: TargetShape,
    /// Tracking target speed multiplier
    pub motion_speed: f32,
    pub track_input_mode: TrackInputMode,
    /// Light up the crosshair while it is over a target
    pub crosshair_glow: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timer_seconds: 60.0,
            fov_deg: 103.0,
            sensitivity: 1.0,
            target_size: 1.0,
            target_shape: TargetShape::Circle,
            motion_speed: 1.5,
            track_input_mode: TrackInputMode::Passive,
            crosshair_glow: false,
        }
    }
}

fn clamp_f32(name: &str, value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if !value.is_finite() {
        log::warn!("Setting {} is not a number, using {}", name, fallback);
        return fallback;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::debug!("Setting {} clamped from {} to {}", name, value, clamped);
    }
    clamped
}

impl Settings {
    /// Copy with every numeric field clamped into its valid range
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let (tmin, tmax) = limits::TIMER_SECONDS;
        let timer_seconds = if self.timer_seconds.is_finite() {
            self.timer_seconds.clamp(tmin, tmax)
        } else {
            defaults.timer_seconds
        };

        Self {
            timer_seconds,
            fov_deg: clamp_f32("fov", self.fov_deg, limits::FOV_DEG, defaults.fov_deg),
            sensitivity: clamp_f32(
                "sensitivity",
                self.sensitivity,
                limits::SENSITIVITY,
                defaults.sensitivity,
            ),
            target_size: clamp_f32(
                "targetSize",
                self.target_size,
                limits::TARGET_SIZE,
                defaults.target_size,
            ),
            target_shape: self.target_shape,
            motion_speed: clamp_f32(
                "motionSpeed",
                self.motion_speed,
                limits::MOTION_SPEED,
                defaults.motion_speed,
            ),
            track_input_mode: self.track_input_mode,
            crosshair_glow: self.crosshair_glow,
        }
    }

    /// Apply a partial update, then clamp
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.timer_seconds {
            self.timer_seconds = v;
        }
        if let Some(v) = patch.fov_deg {
            self.fov_deg = v;
        }
        if let Some(v) = patch.sensitivity {
            self.sensitivity = v;
        }
        if let Some(v) = patch.target_size {
            self.target_size = v;
        }
        if let Some(v) = patch.target_shape {
            self.target_shape = v;
        }
        if let Some(v) = patch.motion_speed {
            self.motion_speed = v;
        }
        if let Some(v) = patch.track_input_mode {
            self.track_input_mode = v;
        }
        if let Some(v) = patch.crosshair_glow {
            self.crosshair_glow = v;
        }
        *self = self.sanitized();
    }

    /// Whether the session has a time limit
    pub fn is_timed(&self) -> bool {
        self.timer_seconds > 0.0
    }

    /// Storage key (version suffix bumps on incompatible changes)
    pub const STORAGE_KEY: &'static str = "aimforge.settings.v5";

    /// Load settings, falling back to defaults for missing or unreadable data
    pub fn load(storage: &dyn Storage) -> Self {
        match persistence::load_json::<Settings>(storage, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings.sanitized()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        if persistence::save_json(storage, Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

/// Partial settings update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(rename = "timer")]
    pub timer_seconds: Option<f64>,
    #[serde(rename = "fov")]
    pub fov_deg: Option<f32>,
    pub sensitivity: Option<f32>,
    pub target_size: Option<f32>,
    pub target_shape: Option<TargetShape>,
    pub motion_speed: Option<f32>,
    pub track_input_mode: Option<TrackInputMode>,
    pub crosshair_glow: Option<bool>,
}

impl From<&Settings> for SettingsPatch {
    /// A patch that overwrites every field
    fn from(s: &Settings) -> Self {
        Self {
            timer_seconds: Some(s.timer_seconds),
            fov_deg: Some(s.fov_deg),
            sensitivity: Some(s.sensitivity),
            target_size: Some(s.target_size),
            target_shape: Some(s.target_shape),
            motion_speed: Some(s.motion_speed),
            track_input_mode: Some(s.track_input_mode),
            crosshair_glow: Some(s.crosshair_glow),
        }
    }
}
