//! Orbit camera and pick-ray construction.
//!
//! The camera circles a fixed target. Zoom moves along the eye→target
//! axis, rotation walks spherical angles around the target, and both are
//! clamped so the eye never dips under the ground plane or passes
//! through the model.

use serde::{Deserialize, Serialize};

use crate::math::{Ray, Vec3};

/// Orbit camera limits and initial pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial eye position.
    pub position: [f32; 3],
    /// Orbit target.
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Viewport width / height.
    pub aspect: f32,
    /// Closest allowed eye distance to the target.
    pub min_distance: f32,
    /// Farthest allowed eye distance to the target.
    pub max_distance: f32,
    /// Smallest polar angle from straight up (radians).
    pub min_polar: f32,
    /// Largest polar angle from straight up (radians).
    pub max_polar: f32,
    /// Radians per unit of rotate delta.
    pub rotate_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 10.0, 35.0],
            target: [0.0, 5.0, 0.0],
            fov_y_degrees: 50.0,
            aspect: 16.0 / 9.0,
            min_distance: 10.0,
            max_distance: 60.0,
            min_polar: 0.1,
            max_polar: std::f32::consts::PI / 2.2,
            rotate_speed: 0.01,
        }
    }
}

/// A perspective view snapshot used for ray casting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position.
    pub eye: Vec3,
    /// Look-at point.
    pub target: Vec3,
    /// Vertical field of view (radians).
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Camera {
    /// Creates a camera looking from `eye` at `target`.
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self { eye, target, fov_y: fov_y_degrees.to_radians(), aspect }
    }

    /// World-space ray through normalized device coordinates
    /// (`-1..1` on both axes, `+y` up).
    #[must_use]
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let forward = (self.target - self.eye).normalize_or_zero();
        let mut right = forward.cross(Vec3::Y).normalize_or_zero();
        if right == Vec3::ZERO {
            // Looking straight up or down
            right = Vec3::new(1.0, 0.0, 0.0);
        }
        let up = right.cross(forward);
        let half = (self.fov_y * 0.5).tan();

        let direction = forward + right * (ndc_x * half * self.aspect) + up * (ndc_y * half);
        Ray::new(self.eye, direction)
    }
}

/// Spherical-coordinate orbit controller.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vec3,
    target: Vec3,
    config: CameraConfig,
}

impl OrbitCamera {
    /// Creates a controller at the configured initial pose.
    #[must_use]
    pub fn new(config: CameraConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            config,
        }
    }

    /// Current eye position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Orbit target.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Eye-to-target distance.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Snapshot for ray casting.
    #[must_use]
    pub fn camera(&self) -> Camera {
        Camera::look_at(self.position, self.target, self.config.fov_y_degrees, self.config.aspect)
    }

    /// Updates the viewport aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.config.aspect = aspect;
        }
    }

    /// Moves the eye `delta` units toward the target (negative backs off),
    /// clamped to the configured distance range.
    pub fn zoom(&mut self, delta: f32) {
        let direction = (self.position - self.target).normalize_or_zero();
        let distance = (self.distance() - delta)
            .clamp(self.config.min_distance, self.config.max_distance);
        self.position = self.target + direction * distance;
    }

    /// Orbits around the target. `dx` turns the azimuth, `dy` tilts the
    /// polar angle; the polar angle stays inside the configured band.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta -= dx * self.config.rotate_speed;
        phi -= dy * self.config.rotate_speed;
        phi = phi.clamp(self.config.min_polar, self.config.max_polar);

        let sin_phi = phi.sin();
        self.position = self.target
            + Vec3::new(radius * sin_phi * theta.sin(), radius * phi.cos(), radius * sin_phi * theta.cos());
    }

    /// Restores the initial pose.
    pub fn reset(&mut self) {
        self.position = Vec3::from_array(self.config.position);
        self.target = Vec3::from_array(self.config.target);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 50.0, 1.0);
        let ray = camera.ray_from_ndc(0.0, 0.0);
        assert!((ray.direction.z + 1.0).abs() < 1e-6);
        assert!(ray.direction.x.abs() < 1e-6);
    }

    #[test]
    fn test_ndc_right_and_up() {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 90.0, 1.0);
        let ray = camera.ray_from_ndc(1.0, 1.0);
        // 90 degree fov: the corner ray leans 45 degrees on both axes
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.y > 0.0);
        assert!((ray.direction.x - ray.direction.y).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut orbit = OrbitCamera::default();
        orbit.zoom(1000.0);
        assert!((orbit.distance() - 10.0).abs() < 1e-4);
        orbit.zoom(-1000.0);
        assert!((orbit.distance() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotate_keeps_radius_and_clamps_polar() {
        let mut orbit = OrbitCamera::default();
        let radius = orbit.distance();

        orbit.rotate(120.0, 0.0);
        assert!((orbit.distance() - radius).abs() < 1e-3);

        // Tilting hard downward must never go below the polar limit
        orbit.rotate(0.0, -10_000.0);
        let offset = orbit.position() - orbit.target();
        let phi = (offset.y / offset.length()).acos();
        assert!(phi <= std::f32::consts::PI / 2.2 + 1e-4);
        assert!(orbit.position().y > orbit.target().y);
    }

    #[test]
    fn test_reset_restores_initial_pose() {
        let mut orbit = OrbitCamera::default();
        orbit.rotate(50.0, 20.0);
        orbit.zoom(5.0);
        orbit.reset();
        assert_eq!(orbit.position(), Vec3::new(0.0, 10.0, 35.0));
        assert_eq!(orbit.target(), Vec3::new(0.0, 5.0, 0.0));
    }
}
