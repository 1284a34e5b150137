//! Training modes
//!
//! Each mode owns its targets, reacts to fire input and per-frame ticks, and
//! turns what happened into metrics. The session only ever talks to a mode
//! through `ModeEngine`.

pub mod cluster;
pub mod snap;
pub mod track;

pub use cluster::ClusterMode;
pub use snap::SnapMode;
pub use track::TrackMode;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::hit::{Ray, Raycaster};
use super::metrics::{Metrics, Summary};
use super::session::{GameEvent, SessionError};
use super::target::{Target, TargetId};
use crate::settings::Settings;

/// Registered training modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeId {
    /// One target, respawns on hit
    Snap,
    /// Six targets, only the hit one respawns
    Cluster,
    /// One moving target to keep the crosshair on
    Track,
}

impl ModeId {
    pub const ALL: [ModeId; 3] = [ModeId::Snap, ModeId::Cluster, ModeId::Track];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeId::Snap => "snap",
            ModeId::Cluster => "cluster",
            ModeId::Track => "track",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            ModeId::Snap => "Snap Tiles",
            ModeId::Cluster => "Wall Cluster",
            ModeId::Track => "Strafe Trail",
        }
    }

    /// Instantiate the engine for this mode
    pub fn create(&self, seed: u64) -> Box<dyn ModeEngine> {
        match self {
            ModeId::Snap => Box::new(SnapMode::new(seed)),
            ModeId::Cluster => Box::new(ClusterMode::new(seed)),
            ModeId::Track => Box::new(TrackMode::new(seed)),
        }
    }
}

impl FromStr for ModeId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModeId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| SessionError::UnknownMode(s.to_string()))
    }
}

/// What a mode can see and emit while handling input or a frame
pub struct ModeContext<'a> {
    /// Current clock time (ms)
    pub now_ms: f64,
    /// Clock time the session started (ms), `None` before it begins
    pub start_ms: Option<f64>,
    /// Session seconds as last computed by the session
    pub elapsed: f64,
    /// The aim ray for this instant
    pub ray: Ray,
    pub raycaster: &'a dyn Raycaster,
    pub events: &'a mut Vec<GameEvent>,
}

impl ModeContext<'_> {
    /// Which of `targets` the aim ray hits first
    pub fn pick(&self, targets: &[Target]) -> Option<TargetId> {
        if targets.is_empty() {
            return None;
        }
        self.raycaster.cast(&self.ray, targets).map(|hit| hit.target)
    }

    /// Seconds since session start at `now_ms`
    pub fn session_time(&self) -> f64 {
        match self.start_ms {
            Some(start) => (self.now_ms - start) / 1000.0,
            None => self.elapsed,
        }
    }

    /// Report a scored hit (drives hit sounds)
    pub fn target_hit(&mut self, target: Option<TargetId>) {
        self.events.push(GameEvent::TargetHit { target });
    }
}

/// The lifecycle every training mode implements
pub trait ModeEngine {
    fn id(&self) -> ModeId;

    /// Reset statistics and spawn the initial targets
    fn start(&mut self, settings: &Settings, now_ms: f64);

    /// Per-frame work while the session runs
    fn update(&mut self, _ctx: &mut ModeContext<'_>, _dt: f64) {}

    /// Fire button pressed
    fn on_pointer_down(&mut self, ctx: &mut ModeContext<'_>);

    /// Fire button released
    fn on_pointer_up(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn metrics(&self, elapsed: f64) -> Metrics;

    /// Final result; may close open bookkeeping such as a running segment
    fn summary(&mut self, elapsed: f64, settings: &Settings) -> Summary;

    /// Live targets, for hit testing and rendering
    fn targets(&self) -> &[Target];

    /// Drop all targets; the engine is not used afterwards
    fn dispose(&mut self);
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::Cell;

    use glam::Vec3;

    use super::*;
    use crate::sim::hit::RayHit;

    /// Raycaster whose answer is set by the test
    #[derive(Default)]
    pub struct ScriptedRaycaster {
        pub on_target: Cell<bool>,
        /// Index of the target to report when on target
        pub index: Cell<usize>,
    }

    impl Raycaster for ScriptedRaycaster {
        fn cast(&self, _ray: &Ray, targets: &[Target]) -> Option<RayHit> {
            if !self.on_target.get() {
                return None;
            }
            targets.get(self.index.get()).map(|t| RayHit {
                target: t.id,
                distance: 1.0,
            })
        }
    }

    pub fn context<'a>(
        now_ms: f64,
        raycaster: &'a dyn Raycaster,
        events: &'a mut Vec<GameEvent>,
    ) -> ModeContext<'a> {
        ModeContext {
            now_ms,
            start_ms: Some(0.0),
            elapsed: now_ms / 1000.0,
            ray: Ray::new(Vec3::new(0.0, 1.6, 0.0), -Vec3::Z),
            raycaster,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_lookup() {
        assert_eq!("cluster".parse::<ModeId>().unwrap(), ModeId::Cluster);
        assert!(matches!(
            "flick".parse::<ModeId>(),
            Err(SessionError::UnknownMode(ref id)) if id == "flick"
        ));
    }

    #[test]
    fn test_create_matches_id() {
        for mode in ModeId::ALL {
            assert_eq!(mode.create(1).id(), mode);
        }
    }
}
