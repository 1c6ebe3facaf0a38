//! # VOXTOY Shared
//!
//! Common value types used by the renderer, the engine and the
//! application crate.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on `wgpu` or any window-related crate.
//! If you need graphics types, put them in `voxtoy_rendering`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod camera;
pub mod cube;
pub mod import;
pub mod math;

pub use camera::{Camera, CameraConfig, OrbitCamera};
pub use cube::{Color, ColorParseError, Cube, Model};
pub use import::{extract_model, from_json, normalize_records, to_json, ImportError, ImportResult};
pub use math::{Aabb, Quaternion, Ray, Vec3};
