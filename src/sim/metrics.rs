//! Session statistics, HUD snapshots and end-of-session summaries

use serde::{Deserialize, Serialize};

use super::modes::ModeId;
use super::session::SessionPhase;
use crate::settings::Settings;
use crate::{mean, ratio01};

/// One shot on the streak chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Seconds since session start
    pub t: f64,
    pub streak: u32,
    pub hit: bool,
}

/// A closed on-target interval (seconds since session start)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Click-to-hit statistics shared by the respawn modes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotStats {
    pub shots: u32,
    pub hits: u32,
    pub streak: u32,
    pub best_streak: u32,
    /// Spawn-to-hit latencies (ms), in shot order
    pub reaction_times: Vec<f64>,
    pub streak_timeline: Vec<TimelinePoint>,
}

impl ShotStats {
    /// Count a hit; `reaction_ms` is dropped unless finite and non-negative
    pub fn record_hit(&mut self, reaction_ms: f64, t: f64) {
        self.shots += 1;
        self.hits += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        if reaction_ms.is_finite() && reaction_ms >= 0.0 {
            self.reaction_times.push(reaction_ms);
        }
        self.push_timeline(t, true);
    }

    pub fn record_miss(&mut self, t: f64) {
        self.shots += 1;
        self.streak = 0;
        self.push_timeline(t, false);
    }

    fn push_timeline(&mut self, t: f64, hit: bool) {
        if t.is_finite() && t >= 0.0 {
            self.streak_timeline.push(TimelinePoint {
                t,
                streak: self.streak,
                hit,
            });
        }
    }

    pub fn accuracy01(&self) -> f64 {
        ratio01(self.hits as f64, self.shots as f64)
    }

    pub fn avg_reaction_ms(&self) -> Option<f64> {
        mean(&self.reaction_times)
    }

    /// HUD metrics for the respawn modes
    pub fn metrics(&self) -> Metrics {
        Metrics {
            accuracy01: self.accuracy01(),
            avg_response_ms: self.avg_reaction_ms(),
            extra_label: "Hits".to_string(),
            extra_value: self.hits.to_string(),
        }
    }

    /// Summary for the respawn modes
    pub fn summary(&self, mode: ModeId, elapsed: f64, settings: &Settings, target_count: u32) -> Summary {
        Summary {
            mode_id: mode,
            mode_name: mode.name().to_string(),
            elapsed,
            settings: settings.clone(),
            shots: self.shots,
            hits: self.hits,
            accuracy01: self.accuracy01(),
            avg_response_ms: self.avg_reaction_ms(),
            stats: ModeStats::Streak {
                best_streak: self.best_streak,
                target_count,
            },
            details: Some(SummaryDetails::Streak {
                reaction_times: self.reaction_times.clone(),
                streak_timeline: self.streak_timeline.clone(),
            }),
        }
    }
}

/// Live per-mode numbers shown on the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub accuracy01: f64,
    /// `None` until there is at least one latency sample
    pub avg_response_ms: Option<f64>,
    pub extra_label: String,
    pub extra_value: String,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            accuracy01: 0.0,
            avg_response_ms: None,
            extra_label: String::new(),
            extra_value: String::new(),
        }
    }
}

/// Everything the HUD needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HudSnapshot {
    #[serde(rename = "state")]
    pub phase: SessionPhase,
    pub mode_id: Option<ModeId>,
    pub elapsed: f64,
    /// `None` for untimed sessions
    pub remaining: Option<f64>,
    pub duration: f64,
    pub fps: f64,
    #[serde(flatten)]
    pub metrics: Metrics,
}

impl HudSnapshot {
    /// Fraction of the time limit used, `None` when untimed
    pub fn progress01(&self) -> Option<f64> {
        self.remaining.map(|_| ratio01(self.elapsed, self.duration))
    }
}

/// Mode-specific headline numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ModeStats {
    Streak {
        best_streak: u32,
        target_count: u32,
    },
    Tracking {
        on_target01: f64,
        reacquire_count: u32,
    },
}

/// Raw series for result charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum SummaryDetails {
    Streak {
        reaction_times: Vec<f64>,
        streak_timeline: Vec<TimelinePoint>,
    },
    Tracking {
        segments: Vec<Segment>,
        reacquire_times: Vec<f64>,
    },
}

/// End-of-session result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub mode_id: ModeId,
    pub mode_name: String,
    pub elapsed: f64,
    pub settings: Settings,
    pub shots: u32,
    pub hits: u32,
    pub accuracy01: f64,
    pub avg_response_ms: Option<f64>,
    #[serde(flatten)]
    pub stats: ModeStats,
    /// Chart data; never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<SummaryDetails>,
}

impl Summary {
    /// Copy without the chart payload
    pub fn without_details(&self) -> Self {
        Self {
            details: None,
            ..self.clone()
        }
    }
}
