//! Target shape geometry
//!
//! Answers size, containment and collider questions for each target shape.
//! Everything here is pure: the same shape and scale always give the same
//! answer.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::hit::{Collider, ColliderShape};
use super::target::TargetId;
use crate::consts::*;
use crate::settings::TargetShape;

/// Ball visual radius relative to the base radius
const BALL_FACTOR: f32 = 0.85;
/// Capsule cap radius relative to the base radius
const CAPSULE_RADIUS_FACTOR: f32 = 0.5;
/// Capsule cylinder length relative to the base radius
const CAPSULE_LENGTH_FACTOR: f32 = 1.2;

/// Smallest half extent any shape can report
pub const MIN_EXTENT: f32 = MIN_TARGET_RADIUS * CAPSULE_RADIUS_FACTOR;
/// Largest half extent any shape can report
pub const MAX_EXTENT: f32 =
    MAX_TARGET_RADIUS * (CAPSULE_RADIUS_FACTOR + CAPSULE_LENGTH_FACTOR / 2.0);

/// Size of a target in the wall plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetBounds {
    /// Clamped base radius the extents are derived from
    pub radius: f32,
    pub half_width: f32,
    pub half_height: f32,
}

/// Clamped base radius for a size multiplier
pub fn target_radius(size_scale: f32) -> f32 {
    let scale = if size_scale.is_finite() { size_scale } else { 1.0 };
    (BASE_TARGET_RADIUS * scale).clamp(MIN_TARGET_RADIUS, MAX_TARGET_RADIUS)
}

/// Half extents of a target shape at the given size multiplier
pub fn bounds_for(shape: TargetShape, size_scale: f32) -> TargetBounds {
    let radius = target_radius(size_scale);
    let (half_width, half_height) = match shape {
        TargetShape::Circle => (radius, radius),
        TargetShape::Ball => (radius * BALL_FACTOR, radius * BALL_FACTOR),
        TargetShape::Capsule => {
            let cap = radius * CAPSULE_RADIUS_FACTOR;
            (cap, cap + radius * CAPSULE_LENGTH_FACTOR / 2.0)
        }
    };
    TargetBounds {
        radius,
        half_width,
        half_height,
    }
}

/// Whether a point in the target's local frame lies inside it
///
/// Circle uses a disk test in the XY plane, ball a sphere test and capsule an
/// axis-aligned box over its extents.
pub fn contains_local_point(shape: TargetShape, local: Vec3, bounds: &TargetBounds) -> bool {
    match shape {
        TargetShape::Circle => {
            let r = bounds.half_width;
            local.x * local.x + local.y * local.y <= r * r
        }
        TargetShape::Ball => {
            let r = bounds.half_width;
            local.length_squared() <= r * r
        }
        TargetShape::Capsule => {
            local.x.abs() <= bounds.half_width && local.y.abs() <= bounds.half_height
        }
    }
}

/// Collision primitives for a target centered at `center`
///
/// Each collider carries the owning target id so a ray hit resolves straight
/// to its target.
pub fn colliders_for(
    owner: TargetId,
    shape: TargetShape,
    center: Vec3,
    bounds: &TargetBounds,
) -> Vec<Collider> {
    match shape {
        TargetShape::Circle => vec![Collider {
            owner,
            shape: ColliderShape::Disk {
                center,
                normal: Vec3::Z,
                radius: bounds.half_width,
            },
        }],
        TargetShape::Ball => vec![Collider {
            owner,
            shape: ColliderShape::Sphere {
                center,
                radius: bounds.half_width,
            },
        }],
        TargetShape::Capsule => {
            let cap = bounds.half_width;
            let half_len = bounds.half_height - cap;
            vec![Collider {
                owner,
                shape: ColliderShape::Capsule {
                    a: center - Vec3::Y * half_len,
                    b: center + Vec3::Y * half_len,
                    radius: cap,
                },
            }]
        }
    }
}
