//! Engine configuration.
//!
//! Every constant the simulation uses lives here. All rates are per
//! frame, not per second: the engine is stepped once per rendered frame.
//!
//! ```toml
//! seed = 7
//!
//! [physics]
//! gravity = 0.02
//! bounce = 0.2
//!
//! [interaction]
//! highlight_color = "#ffff00"
//!
//! [camera]
//! max_distance = 80.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use voxtoy_shared::{CameraConfig, Color};

use crate::error::{ConfigError, ConfigResult};

/// Dismantle and rebuild tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Height of a resting cube center.
    pub ground_y: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Fraction of vertical speed kept on ground contact.
    pub bounce: f32,
    /// Lateral velocity multiplier on ground contact.
    pub friction: f32,
    /// Bounce speed below which a grounded cube stops.
    pub settle_epsilon: f32,
    /// Half-width of the random lateral scatter velocity.
    pub scatter_lateral: f32,
    /// Smallest upward kick on dismantle.
    pub scatter_lift_min: f32,
    /// Largest upward kick on dismantle.
    pub scatter_lift_max: f32,
    /// Half-width of the random spin per axis.
    pub scatter_spin: f32,
    /// Fraction of the remaining distance covered per rebuild frame.
    pub rebuild_rate: f32,
    /// Distance under which a cube counts as arrived.
    pub rebuild_epsilon: f32,
    /// Dismantle frames before cubes are force-settled.
    pub max_dismantle_frames: u32,
    /// Rebuild frames before cubes are snapped to target.
    pub max_rebuild_frames: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            ground_y: 0.5,
            gravity: 0.02,
            bounce: 0.2,
            friction: 0.6,
            settle_epsilon: 0.01,
            scatter_lateral: 0.15,
            scatter_lift_min: 0.1,
            scatter_lift_max: 0.3,
            scatter_spin: 0.1,
            rebuild_rate: 0.05,
            rebuild_epsilon: 0.01,
            max_dismantle_frames: 2000,
            max_rebuild_frames: 2000,
        }
    }
}

/// Drag, pointer and grab tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer highlight radius around the hit cube.
    pub selection_radius: f32,
    /// Proximity grab radius around the hand anchor.
    pub grab_radius: f32,
    /// Anchor distance from the eye at hand depth 0.
    pub grab_depth_near: f32,
    /// Extra anchor distance at hand depth 1.
    pub grab_depth_range: f32,
    /// Weight of the anchor displacement in the throw velocity.
    pub grab_velocity_smoothing: f32,
    /// Throw velocity multiplier on release.
    pub throw_multiplier: f32,
    /// Minimum upward throw speed.
    pub throw_min_lift: f32,
    /// Half-width of the random spin given on release.
    pub throw_spin: f32,
    /// Downward speed given to a cube when a drag ends.
    pub drag_release_drop: f32,
    /// Color of highlighted and selected cubes.
    pub highlight_color: Color,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            selection_radius: 3.0,
            grab_radius: 5.0,
            grab_depth_near: 15.0,
            grab_depth_range: 30.0,
            grab_velocity_smoothing: 0.5,
            throw_multiplier: 2.0,
            throw_min_lift: 0.3,
            throw_spin: 0.05,
            drag_release_drop: 0.1,
            highlight_color: Color::YELLOW,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed of the per-engine RNG.
    pub seed: u64,
    /// Physics constants.
    pub physics: PhysicsConfig,
    /// Interaction constants.
    pub interaction: InteractionConfig,
    /// Orbit camera pose and limits.
    pub camera: CameraConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            physics: PhysicsConfig::default(),
            interaction: InteractionConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates TOML text. Missing keys take defaults.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on bad TOML, [`ConfigError::Invalid`] on
    /// out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), seed = config.seed, "loaded engine config");
        Ok(config)
    }

    /// Checks every value is finite and within range.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> ConfigResult<()> {
        let p = &self.physics;
        let i = &self.interaction;
        let c = &self.camera;

        let finite = [
            ("physics.ground_y", p.ground_y),
            ("physics.gravity", p.gravity),
            ("physics.bounce", p.bounce),
            ("physics.friction", p.friction),
            ("physics.settle_epsilon", p.settle_epsilon),
            ("physics.scatter_lateral", p.scatter_lateral),
            ("physics.scatter_lift_min", p.scatter_lift_min),
            ("physics.scatter_lift_max", p.scatter_lift_max),
            ("physics.scatter_spin", p.scatter_spin),
            ("physics.rebuild_rate", p.rebuild_rate),
            ("physics.rebuild_epsilon", p.rebuild_epsilon),
            ("interaction.selection_radius", i.selection_radius),
            ("interaction.grab_radius", i.grab_radius),
            ("interaction.grab_depth_near", i.grab_depth_near),
            ("interaction.grab_depth_range", i.grab_depth_range),
            ("interaction.grab_velocity_smoothing", i.grab_velocity_smoothing),
            ("interaction.throw_multiplier", i.throw_multiplier),
            ("interaction.throw_min_lift", i.throw_min_lift),
            ("interaction.throw_spin", i.throw_spin),
            ("interaction.drag_release_drop", i.drag_release_drop),
            ("camera.fov_y_degrees", c.fov_y_degrees),
            ("camera.aspect", c.aspect),
            ("camera.min_distance", c.min_distance),
            ("camera.max_distance", c.max_distance),
            ("camera.min_polar", c.min_polar),
            ("camera.max_polar", c.max_polar),
            ("camera.rotate_speed", c.rotate_speed),
        ];
        if let Some((key, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{key} must be finite, got {value}")));
        }

        check(p.gravity > 0.0, "physics.gravity must be positive")?;
        check((0.0..1.0).contains(&p.bounce), "physics.bounce must be in [0, 1)")?;
        check((0.0..=1.0).contains(&p.friction), "physics.friction must be in [0, 1]")?;
        check(p.settle_epsilon > 0.0, "physics.settle_epsilon must be positive")?;
        check(
            p.scatter_lift_min <= p.scatter_lift_max,
            "physics.scatter_lift_min must not exceed scatter_lift_max",
        )?;
        check(
            p.rebuild_rate > 0.0 && p.rebuild_rate <= 1.0,
            "physics.rebuild_rate must be in (0, 1]",
        )?;
        check(p.rebuild_epsilon > 0.0, "physics.rebuild_epsilon must be positive")?;
        check(
            p.max_dismantle_frames > 0 && p.max_rebuild_frames > 0,
            "physics frame caps must be positive",
        )?;

        check(i.selection_radius >= 0.0, "interaction.selection_radius must not be negative")?;
        check(i.grab_radius > 0.0, "interaction.grab_radius must be positive")?;

        check(
            c.fov_y_degrees > 0.0 && c.fov_y_degrees < 180.0,
            "camera.fov_y_degrees must be in (0, 180)",
        )?;
        check(c.aspect > 0.0, "camera.aspect must be positive")?;
        check(
            c.min_distance > 0.0 && c.min_distance <= c.max_distance,
            "camera distance range is empty",
        )?;
        check(
            c.min_polar >= 0.0 && c.min_polar < c.max_polar && c.max_polar <= std::f32::consts::PI,
            "camera polar range is empty",
        )?;

        Ok(())
    }
}

fn check(ok: bool, message: &str) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r##"
            seed = 42

            [physics]
            gravity = 0.05

            [interaction]
            highlight_color = "#00ffff"
            "##,
        )
        .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.physics.gravity, 0.05);
        assert_eq!(config.physics.bounce, 0.2);
        assert_eq!(config.interaction.highlight_color, Color::rgb(0, 255, 255));
        assert_eq!(config.camera.max_distance, 60.0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = EngineConfig::from_toml_str("[physics]\nbounce = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("bounce")));

        let err = EngineConfig::from_toml_str("[camera]\nmin_distance = 90.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(matches!(
            EngineConfig::from_toml_str("seed = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load("/nonexistent/voxtoy.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
