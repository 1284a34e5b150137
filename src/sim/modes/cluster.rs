//! Wall Cluster: a fixed pool of targets spread over the wall
//!
//! Only the target that was hit moves; the rest stay put. New positions keep
//! their distance from every other live target.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{ModeContext, ModeEngine, ModeId};
use crate::settings::{Settings, TargetShape};
use crate::sim::metrics::{Metrics, ShotStats, Summary};
use crate::sim::shape::{self, TargetBounds};
use crate::sim::target::{
    SEPARATION_FACTOR, Target, TargetId, TargetRegistry, Wall, random_position_on_wall,
};

/// Live targets at all times
pub const TARGET_COUNT: usize = 6;
const SPAWN_PADDING: f32 = 0.6;
const WALL_OFFSET: f32 = 0.6;

pub struct ClusterMode {
    rng: Pcg32,
    wall: Wall,
    shape: TargetShape,
    size: f32,
    registry: TargetRegistry,
    stats: ShotStats,
}

impl ClusterMode {
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

    fn bounds(&self) -> TargetBounds {
        shape::bounds_for(self.shape, self.size)
    }

    /// Minimum distance between two target centers
    pub fn min_separation(&self) -> f32 {
        self.bounds().half_width * SEPARATION_FACTOR
    }

    /// A wall position clear of every target except `skip`
    fn separated_position(&mut self, skip: Option<TargetId>) -> glam::Vec3 {
        let bounds = self.bounds();
        let area = self.wall.spawn_area(self.shape, &bounds, SPAWN_PADDING);
        let existing = self.registry.positions_except(skip);
        let min_distance = self.min_separation();
        random_position_on_wall(
            &mut self.rng,
            &area,
            self.wall.z + WALL_OFFSET,
            min_distance,
            &existing,
        )
    }

    fn spawn_all(&mut self, now_ms: f64) {
        self.registry.clear();
        for _ in 0..TARGET_COUNT {
            let pos = self.separated_position(None);
            self.registry.spawn(self.shape, self.size, pos, now_ms);
        }
        log::debug!("Cluster spawned {} targets", self.registry.len());
    }

    fn respawn(&mut self, id: TargetId, now_ms: f64) {
        let pos = self.separated_position(Some(id));
        self.registry.respawn(id, pos, now_ms);
    }
}

impl ModeEngine for ClusterMode {
    fn id(&self) -> ModeId {
        ModeId::Cluster
    }

    fn start(&mut self, settings: &Settings, now_ms: f64) {
        self.shape = settings.target_shape;
        self.size = settings.target_size;
        self.stats = ShotStats::default();
        self.spawn_all(now_ms);
    }

    fn on_pointer_down(&mut self, ctx: &mut ModeContext<'_>) {
        let t = ctx.session_time();
        let hit = ctx
            .pick(self.registry.as_slice())
            .and_then(|id| self.registry.get(id))
            .map(|target| (target.id, target.spawn_ms));

        match hit {
            Some((id, spawn_ms)) => {
                self.stats.record_hit(ctx.now_ms - spawn_ms, t);
                ctx.target_hit(Some(id));
                self.respawn(id, ctx.now_ms);
            }
            None => self.stats.record_miss(t),
        }
    }

    fn metrics(&self, _elapsed: f64) -> Metrics {
        self.stats.metrics()
    }

    fn summary(&mut self, elapsed: f64, settings: &Settings) -> Summary {
        self.stats
            .summary(ModeId::Cluster, elapsed, settings, TARGET_COUNT as u32)
    }

    fn targets(&self) -> &[Target] {
        self.registry.as_slice()
    }

    fn dispose(&mut self) {
        self.registry.clear();
    }
}
