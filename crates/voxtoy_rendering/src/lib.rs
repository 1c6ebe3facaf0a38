//! # VOXTOY Rendering
//!
//! CPU side of the instanced cube renderer.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    ENGINE TICK                         │
//! ├────────────────────────────────────────────────────────┤
//! │  set_transform / set_color  →  InstanceBuffer (dirty)  │
//! │            ↓                                           │
//! │  flush()  →  generation += 1 per dirty buffer          │
//! │            ↓                                           │
//! │  GpuInstanceBuffers::sync  →  queue.write_buffer       │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine talks to the renderer only through [`RenderAdapter`], so a
//! test double or a headless renderer can stand in for the GPU.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod adapter;
pub mod instancing;

#[cfg(feature = "gpu")]
pub mod gpu;

pub use adapter::{FlushStats, RenderAdapter};
pub use instancing::{InstanceBuffer, InstanceColor, InstanceTransform, InstancedRenderer, RenderStats};

#[cfg(feature = "gpu")]
pub use gpu::GpuInstanceBuffers;
