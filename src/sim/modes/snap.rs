//! Snap Tiles: one target at a time, replaced the instant it is hit

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{ModeContext, ModeEngine, ModeId};
use crate::settings::{Settings, TargetShape};
use crate::sim::metrics::{Metrics, ShotStats, Summary};
use crate::sim::shape;
use crate::sim::target::{Target, TargetId, TargetRegistry, Wall, random_position_on_wall};

/// Gap between a target's edge and the wall border
const SPAWN_PADDING: f32 = 0.5;
/// Targets float this far in front of the wall
const WALL_OFFSET: f32 = 0.6;

pub struct SnapMode {
    rng: Pcg32,
    wall: Wall,
    shape: TargetShape,
    size: f32,
    registry: TargetRegistry,
    stats: ShotStats,
}

impl SnapMode {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            wall: Wall::default(),
            shape: TargetShape::default(),
            size: 1.0,
            registry: TargetRegistry::new(),
            stats: ShotStats::default(),
        }
    }

    pub fn stats(&self) -> &ShotStats {
        &self.stats
    }

    /// Replace the current target with a fresh one
    fn spawn_target(&mut self, now_ms: f64) -> TargetId {
        self.registry.clear();
        let bounds = shape::bounds_for(self.shape, self.size);
        let area = self.wall.spawn_area(self.shape, &bounds, SPAWN_PADDING);
        let pos = random_position_on_wall(&mut self.rng, &area, self.wall.z + WALL_OFFSET, 0.0, &[]);
        let id = self.registry.spawn(self.shape, self.size, pos, now_ms);
        log::debug!("Snap target {:?} at ({:.2}, {:.2})", id, pos.x, pos.y);
        id
    }
}

impl ModeEngine for SnapMode {
    fn id(&self) -> ModeId {
        ModeId::Snap
    }

    fn start(&mut self, settings: &Settings, now_ms: f64) {
        self.shape = settings.target_shape;
        self.size = settings.target_size;
        self.stats = ShotStats::default();
        self.spawn_target(now_ms);
    }

    fn on_pointer_down(&mut self, ctx: &mut ModeContext<'_>) {
        let t = ctx.session_time();
        let hit = ctx.pick(self.registry.as_slice());
        let spawned_at = hit.and_then(|id| self.registry.get(id)).map(|target| target.spawn_ms);

        match spawned_at {
            Some(spawn_ms) => {
                self.stats.record_hit(ctx.now_ms - spawn_ms, t);
                ctx.target_hit(hit);
                self.spawn_target(ctx.now_ms);
            }
            None => self.stats.record_miss(t),
        }
    }

    fn metrics(&self, _elapsed: f64) -> Metrics {
        self.stats.metrics()
    }

    fn summary(&mut self, elapsed: f64, settings: &Settings) -> Summary {
        self.stats.summary(ModeId::Snap, elapsed, settings, 1)
    }

    fn targets(&self) -> &[Target] {
        self.registry.as_slice()
    }

    fn dispose(&mut self) {
        self.registry.clear();
    }
}
