//! # VOXTOY Core
//!
//! The voxel toy simulation: an [`Engine`] that owns a model's cubes,
//! drives them through dismantle and rebuild animations, and layers drag,
//! pointer-select and grab interaction on top.
//!
//! ## Frame contract
//!
//! - input events are applied only at the start of [`Engine::on_frame`]
//! - one physics step per frame, constants are per frame
//! - one renderer flush per frame
//!
//! ## Usage
//!
//! ```no_run
//! use voxtoy_core::{Engine, EngineConfig};
//! use voxtoy_rendering::InstancedRenderer;
//! use voxtoy_shared::{Color, Cube};
//!
//! let mut engine = Engine::new(EngineConfig::default(), InstancedRenderer::new());
//! engine.load_model(vec![Cube::new(0, 0, 0, Color::RED)]);
//! engine.dismantle();
//! while engine.on_frame().moving > 0 {}
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod interaction;
pub mod physics;
pub mod runtime;
pub mod store;

pub use config::{EngineConfig, InteractionConfig, PhysicsConfig};
pub use engine::{Engine, FrameReport};
pub use error::{ConfigError, ConfigResult, CoreError, CoreResult};
pub use input::{InputEvent, InputQueue, InputSender};
pub use interaction::{DragState, GrabState, InteractionState};
pub use physics::EngineState;
pub use runtime::{CubeFlags, RuntimeState};
pub use store::EntityStore;
