//! Instanced rendering of the cube model.
//!
//! ## Key Concepts
//!
//! - **Instance Buffer**: one slot per cube, sized at load, never grown per frame
//! - **Generation**: bumped on flush when a buffer changed, so uploaders
//!   can skip unchanged buffers
//! - **One Draw Call**: every cube shares the unit-cube mesh

mod buffer;
mod instance_data;
mod renderer;

pub use buffer::InstanceBuffer;
pub use instance_data::{InstanceColor, InstanceTransform};
pub use renderer::{InstancedRenderer, RenderStats};
