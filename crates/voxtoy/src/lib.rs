//! # VOXTOY
//!
//! The application crate, integrating the engine with its input sources.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            VOXTOY                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌───────────────┐   InputEvent   ┌───────────────────────────┐ │
//! │  │ gesture       │───────────────>│ voxtoy_core::Engine       │ │
//! │  │ (landmarks)   │    channel     │  • Entity Store           │ │
//! │  └───────────────┘                │  • dismantle / rebuild    │ │
//! │  ┌───────────────┐                │  • drag / pointer / grab  │ │
//! │  │ mouse / UI    │───────────────>│                           │ │
//! │  └───────────────┘                └─────────────┬─────────────┘ │
//! │  ┌───────────────┐   Model                      │ RenderAdapter │
//! │  │ history       │─────────────> Rebuild        v               │
//! │  │ (undo / redo) │                ┌───────────────────────────┐ │
//! │  └───────────────┘                │ voxtoy_rendering          │ │
//! │                                   │  instanced cube buffers   │ │
//! │                                   └───────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `gesture`: hand landmarks to input events
//! - `history`: undo/redo of whole models

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod gesture;
pub mod history;

// Re-export the layers
pub use voxtoy_core as core;
pub use voxtoy_rendering as rendering;
pub use voxtoy_shared as shared;

pub use gesture::{classify, is_two_hand_grab, Gesture, GestureFrame, GestureTracker, Hand, Landmark};
pub use history::ModelHistory;
