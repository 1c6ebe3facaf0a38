//! Hand grab: move a group of cubes with an anchor, throw on release.

use tracing::debug;
use voxtoy_rendering::RenderAdapter;
use voxtoy_shared::{Camera, Vec3};

use crate::config::InteractionConfig;
use crate::engine::Engine;
use crate::physics::{self, EngineState};
use crate::runtime::CubeFlags;

/// A group of cubes held by the hands.
#[derive(Debug, Clone, PartialEq)]
pub struct GrabState {
    indices: Vec<usize>,
    /// Current anchor.
    anchor: Vec3,
    /// Anchor before the last update.
    previous: Vec3,
    /// Smoothed anchor velocity, units per update.
    velocity: Vec3,
}

impl GrabState {
    /// Held cubes.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Current anchor position.
    #[must_use]
    pub const fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Velocity the cubes will be thrown with, before amplification.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

/// World point for a hand at NDC `(x, y)` and depth `z`.
fn hand_anchor(camera: &Camera, cfg: &InteractionConfig, x: f32, y: f32, z: f32) -> Vec3 {
    camera
        .ray_from_ndc(x, y)
        .at(cfg.grab_depth_near + z * cfg.grab_depth_range)
}

fn centroid(points: impl ExactSizeIterator<Item = Vec3>) -> Vec3 {
    let n = points.len();
    if n == 0 {
        return Vec3::ZERO;
    }
    let sum = points.fold(Vec3::ZERO, |acc, p| acc + p);
    sum * (1.0 / n as f32)
}

impl<R: RenderAdapter> Engine<R> {
    /// Grabs the selection, or failing that every cube near the hand.
    ///
    /// With a selection: while dismantling, grabs exactly the selection
    /// anchored at its centroid and clears it; otherwise only clears it.
    /// Without: while dismantling, grabs every cube within the grab radius
    /// of the hand anchor. An overlapping drag is ended first.
    /// Returns whether anything was grabbed.
    pub fn start_grab(&mut self, camera: &Camera, x: f32, y: f32, z: f32) -> bool {
        self.drop_grab();

        let (indices, anchor) = if self.interaction.selected.is_empty() {
            if self.state != EngineState::Dismantling {
                return false;
            }
            let anchor = hand_anchor(camera, &self.config.interaction, x, y, z);
            let radius_sq = self.config.interaction.grab_radius.powi(2);
            let indices: Vec<usize> = (0..self.runtime.len())
                .filter(|&i| self.runtime.positions[i].distance_squared(anchor) < radius_sq)
                .collect();
            (indices, anchor)
        } else {
            if self.state != EngineState::Dismantling {
                self.clear_selection();
                return false;
            }
            let indices = self.interaction.selected.clone();
            let anchor = centroid(indices.iter().map(|&i| self.runtime.positions[i]));
            self.clear_selection();
            (indices, anchor)
        };

        if indices.is_empty() {
            return false;
        }

        if let Some(drag) = self.interaction.drag {
            if indices.contains(&drag.index) {
                self.end_drag();
            }
        }
        for &i in &indices {
            self.runtime.flags[i].insert(CubeFlags::GRABBED);
        }
        self.detach_held();

        debug!(count = indices.len(), ?anchor, "grab started");
        self.interaction.grab = Some(GrabState {
            indices,
            anchor,
            previous: anchor,
            velocity: Vec3::ZERO,
        });
        true
    }

    /// Moves held cubes by the anchor displacement and tracks throw speed.
    pub fn update_grab(&mut self, camera: &Camera, x: f32, y: f32, z: f32) {
        let cfg = &self.config.interaction;
        let next = hand_anchor(camera, cfg, x, y, z);
        let smoothing = cfg.grab_velocity_smoothing;

        let Some(grab) = self.interaction.grab.as_mut() else {
            return;
        };
        let movement = next - grab.anchor;
        grab.velocity = (next - grab.previous) * smoothing;
        grab.previous = grab.anchor;
        grab.anchor = next;

        for k in 0..grab.indices.len() {
            let i = grab.indices[k];
            self.runtime.positions[i] += movement;
            self.runtime.halt(i);
            self.renderer
                .set_transform(i, self.runtime.positions[i], self.runtime.quaternion(i));
        }
    }

    /// Throws the held cubes: amplified anchor velocity with a minimum
    /// upward component plus a random spin.
    pub fn release_grab(&mut self) {
        let Some(grab) = self.interaction.grab.take() else {
            return;
        };
        let cfg = &self.config.interaction;
        let v = grab.velocity * cfg.throw_multiplier;
        let throw = Vec3::new(v.x, v.y.max(cfg.throw_min_lift), v.z);

        for &i in &grab.indices {
            self.runtime.flags[i].remove(CubeFlags::GRABBED);
            self.runtime.velocities[i] = throw;
            self.runtime.angular[i] = physics::random_spin(&mut self.rng, cfg.throw_spin);
        }
        self.phase_frames = 0;
        debug!(count = grab.indices.len(), ?throw, "grab released");
    }

    /// Anchor position while a grab is held.
    #[must_use]
    pub fn grab_anchor(&self) -> Option<Vec3> {
        self.interaction.grab.as_ref().map(GrabState::anchor)
    }

    /// Lets go of a grab without throwing.
    pub(crate) fn drop_grab(&mut self) {
        if let Some(grab) = self.interaction.grab.take() {
            for &i in &grab.indices {
                self.runtime.flags[i].remove(CubeFlags::GRABBED);
            }
            debug!(count = grab.indices.len(), "grab dropped");
        }
    }
}
