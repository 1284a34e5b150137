//! Targets and spawn placement
//!
//! Each mode engine owns a `TargetRegistry` holding its live targets. Spawn
//! positions are sampled on the wall so a target never pokes past the wall
//! edges, and 3D shapes never sink into the floor.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hit::Collider;
use super::shape::{self, TargetBounds};
use crate::consts::*;
use crate::settings::TargetShape;

/// Rejection-sampling budget for a separated spawn position
pub const SPAWN_ATTEMPTS: usize = 80;
/// Minimum center distance between targets, in target half widths
pub const SEPARATION_FACTOR: f32 = 2.8;

/// Target identifier, unique within one engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// A live target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub shape: TargetShape,
    pub bounds: TargetBounds,
    /// Center in world space
    pub pos: Vec3,
    /// Clock time the target appeared (ms)
    pub spawn_ms: f64,
}

impl Target {
    pub fn new(id: TargetId, shape: TargetShape, size_scale: f32, pos: Vec3, spawn_ms: f64) -> Self {
        Self {
            id,
            shape,
            bounds: shape::bounds_for(shape, size_scale),
            pos,
            spawn_ms,
        }
    }

    /// Ray-test primitives, each tagged with this target's id
    pub fn colliders(&self) -> Vec<Collider> {
        shape::colliders_for(self.id, self.shape, self.pos, &self.bounds)
    }

    /// Whether a world-space point lies inside the target
    pub fn contains_point(&self, point: Vec3) -> bool {
        shape::contains_local_point(self.shape, point - self.pos, &self.bounds)
    }
}

/// The target wall: a rectangle in the plane `z`, centered on x = 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub z: f32,
    pub width: f32,
    pub height: f32,
    pub center_y: f32,
    pub floor_y: f32,
}

impl Default for Wall {
    fn default() -> Self {
        Self {
            z: WALL_Z,
            width: WALL_WIDTH,
            height: WALL_HEIGHT,
            center_y: WALL_CENTER_Y,
            floor_y: FLOOR_Y,
        }
    }
}

/// Axis-aligned range a target center may occupy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnArea {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl SpawnArea {
    pub fn contains(&self, pos: Vec3) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y >= self.min_y && pos.y <= self.max_y
    }

    fn sample<R: Rng>(&self, rng: &mut R, z: f32) -> Vec3 {
        Vec3::new(
            lerp(self.min_x, self.max_x, rng.random::<f32>()),
            lerp(self.min_y, self.max_y, rng.random::<f32>()),
            z,
        )
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Wall {
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }

    /// Where a target center may go, keeping `padding` between its edges and
    /// the wall border
    pub fn spawn_area(&self, shape: TargetShape, bounds: &TargetBounds, padding: f32) -> SpawnArea {
        let max_dx = (self.half_width() - bounds.half_width - padding).max(0.0);
        let max_dy = (self.half_height() - bounds.half_height - padding).max(0.0);
        let max_y = self.center_y + max_dy;
        let mut min_y = self.center_y - max_dy;
        if shape.is_volumetric() {
            min_y = min_y.max(self.floor_y + bounds.half_height + FLOOR_CLEARANCE);
        }
        SpawnArea {
            min_x: -max_dx,
            max_x: max_dx,
            min_y: min_y.min(max_y),
            max_y,
        }
    }
}

/// Pick a spawn position on the wall, away from `existing` target centers
///
/// Tries `SPAWN_ATTEMPTS` samples; if none is far enough from every other
/// target, the next sample is used unchecked.
pub fn random_position_on_wall<R: Rng>(
    rng: &mut R,
    area: &SpawnArea,
    z: f32,
    min_distance: f32,
    existing: &[Vec3],
) -> Vec3 {
    let min_dist_sq = min_distance * min_distance;
    for _ in 0..SPAWN_ATTEMPTS {
        let candidate = area.sample(rng, z);
        if existing
            .iter()
            .all(|p| p.distance_squared(candidate) >= min_dist_sq)
        {
            return candidate;
        }
    }
    log::debug!("No separated spawn after {} attempts", SPAWN_ATTEMPTS);
    area.sample(rng, z)
}

/// Live targets of one engine
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    next_id: u32,
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new target ID
    fn next_target_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn(&mut self, shape: TargetShape, size_scale: f32, pos: Vec3, now_ms: f64) -> TargetId {
        let id = self.next_target_id();
        self.targets.push(Target::new(id, shape, size_scale, pos, now_ms));
        id
    }

    /// Move a live target to a new spot and restart its reaction clock
    pub fn respawn(&mut self, id: TargetId, pos: Vec3, now_ms: f64) -> bool {
        match self.get_mut(id) {
            Some(target) => {
                target.pos = pos;
                target.spawn_ms = now_ms;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn first_mut(&mut self) -> Option<&mut Target> {
        self.targets.first_mut()
    }

    /// Centers of every target except `skip`
    pub fn positions_except(&self, skip: Option<TargetId>) -> Vec<Vec3> {
        self.targets
            .iter()
            .filter(|t| Some(t.id) != skip)
            .map(|t| t.pos)
            .collect()
    }

    pub fn as_slice(&self) -> &[Target] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_area_respects_padding() {
        let wall = Wall::default();
        let bounds = shape::bounds_for(TargetShape::Circle, 1.0);
        let area = wall.spawn_area(TargetShape::Circle, &bounds, 0.5);
        assert!((area.max_x - (7.0 - 0.45 - 0.5)).abs() < 1e-5);
        assert!((area.min_x + area.max_x).abs() < 1e-6);
        assert!((area.max_y - (3.0 + 4.0 - 0.45 - 0.5)).abs() < 1e-5);
        assert!((area.min_y - (3.0 - 4.0 + 0.45 + 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_floor_rule_for_volumetric_shapes() {
        let wall = Wall::default();
        let bounds = shape::bounds_for(TargetShape::Capsule, 1.0);
        let area = wall.spawn_area(TargetShape::Capsule, &bounds, 0.5);
        let floor_min = FLOOR_Y + bounds.half_height + FLOOR_CLEARANCE;
        assert!((area.min_y - floor_min).abs() < 1e-5);

        // A flat disk may sit lower than that
        let bounds = shape::bounds_for(TargetShape::Circle, 1.0);
        let flat = wall.spawn_area(TargetShape::Circle, &bounds, 0.5);
        assert!(flat.min_y < floor_min);
    }

    #[test]
    fn test_fallback_when_crowded() {
        let mut rng = Pcg32::seed_from_u64(3);
        let area = SpawnArea {
            min_x: -1.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 1.0,
        };
        // Nothing in the area is 100 units away from the origin, so the
        // unchecked fallback must still return a valid in-area position
        let pos = random_position_on_wall(&mut rng, &area, -11.4, 100.0, &[Vec3::new(0.0, 0.5, -11.4)]);
        assert!(area.contains(pos));
        assert_eq!(pos.z, -11.4);
    }

    #[test]
    fn test_registry_ids_and_respawn() {
        let mut registry = TargetRegistry::new();
        let a = registry.spawn(TargetShape::Circle, 1.0, Vec3::ZERO, 10.0);
        let b = registry.spawn(TargetShape::Circle, 1.0, Vec3::X, 10.0);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.respawn(a, Vec3::Y, 250.0));
        let t = registry.get(a).unwrap();
        assert_eq!(t.pos, Vec3::Y);
        assert_eq!(t.spawn_ms, 250.0);
        assert!(!registry.respawn(TargetId(99), Vec3::Y, 0.0));

        assert_eq!(registry.positions_except(Some(a)), vec![Vec3::X]);
    }

    proptest! {
        #[test]
        fn spawns_stay_inside_wall(seed in any::<u64>(), size in 0.25f32..2.0, idx in 0usize..3) {
            let shape = [TargetShape::Circle, TargetShape::Ball, TargetShape::Capsule][idx];
            let wall = Wall::default();
            let bounds = shape::bounds_for(shape, size);
            let area = wall.spawn_area(shape, &bounds, 0.5);
            let mut rng = Pcg32::seed_from_u64(seed);
            let pos = random_position_on_wall(&mut rng, &area, wall.z + 0.6, 0.0, &[]);

            prop_assert!(pos.x - bounds.half_width >= -wall.half_width());
            prop_assert!(pos.x + bounds.half_width <= wall.half_width());
            prop_assert!(pos.y + bounds.half_height <= wall.center_y + wall.half_height());
            prop_assert!(pos.y - bounds.half_height >= wall.center_y - wall.half_height());
            if shape.is_volumetric() {
                prop_assert!(pos.y - bounds.half_height >= wall.floor_y);
            }
        }
    }
}
