//! First-person view orientation
//!
//! Yaw turns around +Y, pitch around the rotated X axis. With both at zero
//! the view looks down -Z toward the target wall.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::hit::Ray;
use crate::consts::*;

/// Camera orientation and projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Radians, positive turns left
    pub yaw: f32,
    /// Radians, positive looks up
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov_deg: f32,
    /// Viewport width / height
    pub aspect: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov_deg: 103.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl View {
    pub fn eye() -> Vec3 {
        Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }

    /// Largest pitch magnitude
    pub fn pitch_limit() -> f32 {
        std::f32::consts::FRAC_PI_2 - PITCH_EPSILON
    }

    /// Look straight at the wall again
    pub fn reset_orientation(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    /// Apply a raw pointer delta scaled by `sensitivity`
    pub fn rotate(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        let k = (DEG_PER_MOUSE_UNIT * sensitivity).to_radians();
        self.yaw -= dx * k;
        let limit = Self::pitch_limit();
        self.pitch = (self.pitch - dy * k).clamp(-limit, limit);
    }

    /// Update the aspect ratio for a new viewport size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// The aim ray from the eye along the view direction
    pub fn ray(&self) -> Ray {
        Ray::new(Self::eye(), self.forward())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_down_negative_z() {
        let f = View::default().forward();
        assert!((f - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_positive_yaw_turns_left() {
        let view = View {
            yaw: std::f32::consts::FRAC_PI_2,
            ..View::default()
        };
        assert!((view.forward() - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn test_rotate_signs_and_clamp() {
        let mut view = View::default();
        // Moving the mouse right turns right, moving it down looks down
        view.rotate(100.0, 100.0, 1.0);
        assert!(view.yaw < 0.0);
        assert!(view.pitch < 0.0);

        view.rotate(0.0, 1.0e6, 1.0);
        assert_eq!(view.pitch, -View::pitch_limit());
        view.rotate(0.0, -1.0e7, 1.0);
        assert_eq!(view.pitch, View::pitch_limit());
    }

    #[test]
    fn test_rotate_scale() {
        let mut view = View::default();
        view.rotate(10.0, 0.0, 2.0);
        assert!((view.yaw + (10.0 * 0.115 * 2.0f32).to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_resize_guards_zero() {
        let mut view = View::default();
        view.resize(1920, 0);
        assert_eq!(view.aspect, 1920.0);
        view.resize(800, 400);
        assert_eq!(view.aspect, 2.0);
    }
}
