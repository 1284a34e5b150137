//! Most recent session result, shown on the menu
//!
//! Only one record is kept. Chart details are stripped before saving.

use serde::{Deserialize, Serialize};

use super::Storage;
use crate::sim::{ModeStats, Summary};
use crate::{format_ms, format_pct, format_seconds};

/// A stored session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastRun {
    /// Unix timestamp (ms) the session ended
    pub at: f64,
    #[serde(flatten)]
    pub summary: Summary,
}

impl LastRun {
    /// Storage key (version suffix bumps on incompatible changes)
    pub const STORAGE_KEY: &'static str = "aimforge.lastrun.v5";

    pub fn new(summary: &Summary, at: f64) -> Self {
        Self {
            at,
            summary: summary.without_details(),
        }
    }

    pub fn load(storage: &dyn Storage) -> Option<Self> {
        let run = super::load_json::<LastRun>(storage, Self::STORAGE_KEY)?;
        log::info!("Loaded last run ({})", run.summary.mode_name);
        Some(run)
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        if super::save_json(storage, Self::STORAGE_KEY, self) {
            log::info!("Saved last run");
        }
    }

    /// Menu lines: headline numbers, then mode-specific counts
    pub fn describe(&self) -> [String; 2] {
        let s = &self.summary;
        let elapsed = format_seconds(s.elapsed);
        match s.stats {
            ModeStats::Tracking {
                on_target01,
                reacquire_count,
            } => [
                format!(
                    "{} · {}s · On-target {} · Reacquire {}",
                    s.mode_name,
                    elapsed,
                    format_pct(on_target01),
                    format_ms(s.avg_response_ms)
                ),
                format!("Reacquires: {}", reacquire_count),
            ],
            ModeStats::Streak { best_streak, .. } => [
                format!(
                    "{} · {}s · {} · {}",
                    s.mode_name,
                    elapsed,
                    format_pct(s.accuracy01),
                    format_ms(s.avg_response_ms)
                ),
                format!(
                    "Hits/Shots: {}/{} · Best streak: {}",
                    s.hits, s.shots, best_streak
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::settings::Settings;
    use crate::sim::{ModeId, SummaryDetails};

    fn snap_summary() -> Summary {
        Summary {
            mode_id: ModeId::Snap,
            mode_name: ModeId::Snap.name().to_string(),
            elapsed: 60.0,
            settings: Settings::default(),
            shots: 40,
            hits: 30,
            accuracy01: 0.75,
            avg_response_ms: Some(412.4),
            stats: ModeStats::Streak {
                best_streak: 9,
                target_count: 1,
            },
            details: Some(SummaryDetails::Streak {
                reaction_times: vec![412.4],
                streak_timeline: Vec::new(),
            }),
        }
    }

    #[test]
    fn test_save_strips_details() {
        let mut storage = MemoryStorage::default();
        LastRun::new(&snap_summary(), 1.7e12).save(&mut storage);

        let raw = storage.get(LastRun::STORAGE_KEY).unwrap();
        assert!(!raw.contains("details"));
        assert!(raw.contains("\"bestStreak\":9"));

        let run = LastRun::load(&storage).unwrap();
        assert_eq!(run.at, 1.7e12);
        assert_eq!(run.summary.details, None);
        assert_eq!(run.summary.hits, 30);
    }

    #[test]
    fn test_missing_record() {
        assert_eq!(LastRun::load(&MemoryStorage::default()), None);
    }

    #[test]
    fn test_describe_streak_and_tracking() {
        let run = LastRun::new(&snap_summary(), 0.0);
        assert_eq!(
            run.describe(),
            [
                "Snap Tiles · 60.0s · 75% · 412 ms".to_string(),
                "Hits/Shots: 30/40 · Best streak: 9".to_string(),
            ]
        );

        let mut track = snap_summary();
        track.mode_id = ModeId::Track;
        track.mode_name = ModeId::Track.name().to_string();
        track.avg_response_ms = None;
        track.stats = ModeStats::Tracking {
            on_target01: 0.5,
            reacquire_count: 3,
        };
        let run = LastRun::new(&track, 0.0);
        assert_eq!(run.describe()[0], "Strafe Trail · 60.0s · On-target 50% · Reacquire -");
        assert_eq!(run.describe()[1], "Reacquires: 3");
    }
}
