//! # Dismantle / Rebuild State Machine
//!
//! ```text
//!            dismantle()                 all settled
//!   Stable ─────────────> Dismantling ─────────────> Stable
//!     ^  \                                              |
//!     |   \ rebuild()          all arrived + snap       |
//!     |    └──────────> Rebuilding ─────────────────────┘
//! ```
//!
//! Integration is explicit Euler, one step per frame. Cubes do not
//! collide with each other, only with the ground plane.

use rand::Rng;
use voxtoy_shared::Vec3;

use crate::config::PhysicsConfig;
use crate::runtime::RuntimeState;

/// Global engine phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// At rest; nothing moves.
    #[default]
    Stable,
    /// Cubes fall and settle on the ground.
    Dismantling,
    /// Cubes ease toward their rest positions.
    Rebuilding,
}

// ============================================================================
// DISMANTLE
// ============================================================================

/// Gives every cube a random upward kick, lateral drift and spin.
pub fn scatter<G: Rng + ?Sized>(runtime: &mut RuntimeState, rng: &mut G, cfg: &PhysicsConfig) {
    let lift_span = cfg.scatter_lift_max - cfg.scatter_lift_min;
    for (v, w) in runtime.velocities.iter_mut().zip(runtime.angular.iter_mut()) {
        *v = Vec3::new(
            symmetric(rng, cfg.scatter_lateral),
            cfg.scatter_lift_min + rng.gen::<f32>() * lift_span,
            symmetric(rng, cfg.scatter_lateral),
        );
        *w = random_spin(rng, cfg.scatter_spin);
    }
}

/// Uniform sample in `[-half, half)`.
#[inline]
pub fn symmetric<G: Rng + ?Sized>(rng: &mut G, half: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0 * half
}

/// Random angular velocity, each axis in `[-half, half)`.
pub fn random_spin<G: Rng + ?Sized>(rng: &mut G, half: f32) -> Vec3 {
    Vec3::new(symmetric(rng, half), symmetric(rng, half), symmetric(rng, half))
}

/// One dismantle frame. Returns how many cubes are still moving.
///
/// Held cubes are skipped and count as moving.
pub fn step_dismantle(runtime: &mut RuntimeState, cfg: &PhysicsConfig) -> usize {
    let mut moving = 0;

    for i in 0..runtime.len() {
        if runtime.flags[i].is_held() {
            moving += 1;
            continue;
        }

        let pos = &mut runtime.positions[i];
        let vel = &mut runtime.velocities[i];
        let spin = &mut runtime.angular[i];

        *pos += *vel;
        vel.y -= cfg.gravity;

        if pos.y <= cfg.ground_y {
            pos.y = cfg.ground_y;
            vel.y = -vel.y * cfg.bounce;
            vel.x *= cfg.friction;
            vel.z *= cfg.friction;
            // Grounded cubes stop tumbling at once
            *spin = Vec3::ZERO;

            if vel.y.abs() < cfg.settle_epsilon {
                *vel = Vec3::ZERO;
            } else {
                moving += 1;
            }
        } else {
            moving += 1;
        }

        runtime.rotations[i] += *spin;
    }

    moving
}

/// Drops every free cube onto the ground and stops it.
pub fn force_settle(runtime: &mut RuntimeState, cfg: &PhysicsConfig) {
    for i in 0..runtime.len() {
        if runtime.flags[i].is_held() {
            continue;
        }
        runtime.positions[i].y = cfg.ground_y;
        runtime.halt(i);
    }
}

// ============================================================================
// REBUILD
// ============================================================================

/// One rebuild frame: exponential ease toward `targets`, rotation decays
/// toward zero at the same rate. Returns how many cubes are still farther
/// than the rebuild epsilon from their target.
pub fn step_rebuild(runtime: &mut RuntimeState, targets: &[Vec3], cfg: &PhysicsConfig) -> usize {
    let keep = 1.0 - cfg.rebuild_rate;
    let eps_sq = cfg.rebuild_epsilon * cfg.rebuild_epsilon;
    let mut away = 0;

    for ((pos, rot), target) in runtime
        .positions
        .iter_mut()
        .zip(runtime.rotations.iter_mut())
        .zip(targets)
    {
        *pos = pos.lerp(*target, cfg.rebuild_rate);
        *rot = *rot * keep;
        if pos.distance_squared(*target) > eps_sq {
            away += 1;
        }
    }

    away
}

/// Places every cube exactly on its target with zero rotation and motion.
pub fn snap_to_targets(runtime: &mut RuntimeState, targets: &[Vec3]) {
    for (i, target) in targets.iter().enumerate().take(runtime.len()) {
        runtime.positions[i] = *target;
        runtime.rotations[i] = Vec3::ZERO;
        runtime.halt(i);
    }
}
