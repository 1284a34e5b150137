//! Hit testing
//!
//! A shot is a ray from the eye along the view direction. Every live target
//! contributes one or more colliders; the nearest collider the ray crosses
//! decides the hit, and its `owner` names the target directly.

use glam::Vec3;

use super::target::{Target, TargetId};

/// Intersections closer than this are ignored (ray starting on a surface)
const RAY_EPSILON: f32 = 1e-6;

/// A half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    /// Ray from `origin` through `point`
    pub fn toward(origin: Vec3, point: Vec3) -> Self {
        Self::new(origin, point - origin)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Geometric primitive used for ray tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Flat, two-sided disk
    Disk { center: Vec3, normal: Vec3, radius: f32 },
    Sphere { center: Vec3, radius: f32 },
    /// Sphere swept along the segment `a`-`b`
    Capsule { a: Vec3, b: Vec3, radius: f32 },
}

/// A primitive tagged with the target that owns it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub owner: TargetId,
    pub shape: ColliderShape,
}

impl Collider {
    /// Distance along the ray to the first intersection in front of the origin
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match self.shape {
            ColliderShape::Disk {
                center,
                normal,
                radius,
            } => ray_disk(ray, center, normal, radius),
            ColliderShape::Sphere { center, radius } => ray_sphere(ray, center, radius),
            ColliderShape::Capsule { a, b, radius } => ray_capsule(ray, a, b, radius),
        }
    }
}

/// Ray against a two-sided disk
pub fn ray_disk(ray: &Ray, center: Vec3, normal: Vec3, radius: f32) -> Option<f32> {
    let denom = ray.dir.dot(normal);
    if denom.abs() < RAY_EPSILON {
        return None;
    }
    let t = (center - ray.origin).dot(normal) / denom;
    if t <= RAY_EPSILON {
        return None;
    }
    let offset = ray.at(t) - center;
    (offset.length_squared() <= radius * radius).then_some(t)
}

/// Ray against a sphere, nearest intersection in front of the origin
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let origin_to_center = center - ray.origin;
    let projection = origin_to_center.dot(ray.dir);
    let distance_sq = origin_to_center.length_squared() - projection * projection;
    let radius_sq = radius * radius;

    if distance_sq > radius_sq {
        return None;
    }

    let half_chord = (radius_sq - distance_sq).sqrt();
    let near = projection - half_chord;
    let far = projection + half_chord;

    if near > RAY_EPSILON {
        Some(near)
    } else if far > RAY_EPSILON {
        Some(far)
    } else {
        None
    }
}

/// Ray against a capsule: the cylinder body between `a` and `b` plus both caps
pub fn ray_capsule(ray: &Ray, a: Vec3, b: Vec3, radius: f32) -> Option<f32> {
    let axis = b - a;
    let axis_len_sq = axis.length_squared();
    let mut best: Option<f32> = None;
    let mut consider = |t: Option<f32>| {
        if let Some(t) = t {
            if best.is_none_or(|current| t < current) {
                best = Some(t);
            }
        }
    };

    if axis_len_sq > RAY_EPSILON {
        // Body: |(p - a) x axis|^2 = r^2 |axis|^2, restricted to the segment
        let oa = ray.origin - a;
        let axis_dir = axis.dot(ray.dir);
        let axis_oa = axis.dot(oa);
        let qa = axis_len_sq - axis_dir * axis_dir;
        let qb = axis_len_sq * oa.dot(ray.dir) - axis_oa * axis_dir;
        let qc = axis_len_sq * oa.length_squared() - axis_oa * axis_oa - radius * radius * axis_len_sq;

        if qa.abs() > RAY_EPSILON {
            let disc = qb * qb - qa * qc;
            if disc >= 0.0 {
                let t = (-qb - disc.sqrt()) / qa;
                let along = axis_oa + t * axis_dir;
                if t > RAY_EPSILON && along > 0.0 && along < axis_len_sq {
                    consider(Some(t));
                }
            }
        }
    }

    consider(ray_sphere(ray, a, radius));
    consider(ray_sphere(ray, b, radius));
    best
}

/// Nearest hit of a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub target: TargetId,
    pub distance: f32,
}

/// Resolves what the aim ray touches among a set of live targets
///
/// The default implementation tests real target geometry; tests and hosts can
/// substitute their own.
pub trait Raycaster {
    fn cast(&self, ray: &Ray, targets: &[Target]) -> Option<RayHit>;
}

/// Raycaster over target colliders
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryRaycaster;

impl Raycaster for GeometryRaycaster {
    fn cast(&self, ray: &Ray, targets: &[Target]) -> Option<RayHit> {
        targets
            .iter()
            .flat_map(|t| t.colliders())
            .filter_map(|c| {
                c.intersect(ray).map(|distance| RayHit {
                    target: c.owner,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
