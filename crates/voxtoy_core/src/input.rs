//! # Input Event Queue
//!
//! ```text
//! ┌──────────────┐               ┌──────────────┐
//! │ mouse / UI   │──┐            │              │
//! └──────────────┘  │  channel   │    Engine    │
//!                   ├──────────> │  on_frame()  │
//! ┌──────────────┐  │            │  drains all  │
//! │ gesture      │──┘            │              │
//! └──────────────┘               └──────────────┘
//! ```
//!
//! Producers may push at any time from any thread; the engine applies
//! everything queued at the start of its next frame, never mid-step.

use crossbeam_channel::{unbounded, Receiver, Sender};
use voxtoy_shared::{Color, Model};

/// Everything an input source can ask the engine to do.
///
/// Coordinates are normalized device coordinates (`-1..1`, `+y` up);
/// `z` is hand depth in `0..1`, 0 near.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // =========================================================================
    // Model
    // =========================================================================
    /// Replace the model.
    Load(Model),
    /// Scatter the model.
    Dismantle,
    /// Animate into a new formation.
    Rebuild(Model),
    /// Animate back into the loaded formation.
    Reassemble,
    /// Recolor one cube.
    Paint {
        /// Cube index.
        index: usize,
        /// New color.
        color: Color,
    },

    // =========================================================================
    // Drag
    // =========================================================================
    /// Pointer pressed.
    DragStart {
        /// NDC x.
        x: f32,
        /// NDC y.
        y: f32,
    },
    /// Pointer moved while pressed.
    DragMove {
        /// NDC x.
        x: f32,
        /// NDC y.
        y: f32,
    },
    /// Pointer released.
    DragEnd,

    // =========================================================================
    // Pointer select
    // =========================================================================
    /// Pointing ray moved.
    PointerMove {
        /// NDC x.
        x: f32,
        /// NDC y.
        y: f32,
    },
    /// Promote the highlight to the selection.
    PointerSelect,
    /// Drop the highlight and hide the cursor.
    PointerHide,

    // =========================================================================
    // Grab
    // =========================================================================
    /// Hands closed.
    GrabStart {
        /// NDC x.
        x: f32,
        /// NDC y.
        y: f32,
        /// Depth 0..1.
        z: f32,
    },
    /// Hands moved while closed.
    GrabMove {
        /// NDC x.
        x: f32,
        /// NDC y.
        y: f32,
        /// Depth 0..1.
        z: f32,
    },
    /// Hands opened: throw.
    GrabRelease,

    // =========================================================================
    // Camera
    // =========================================================================
    /// Move toward (positive) or away from the target.
    CameraZoom(f32),
    /// Orbit by a screen-space delta.
    CameraRotate {
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
    /// Back to the initial pose.
    CameraReset,
    /// Viewport resized.
    CameraAspect(f32),
}

/// Cloneable producer handle.
#[derive(Clone, Debug)]
pub struct InputSender {
    sender: Sender<InputEvent>,
}

impl InputSender {
    /// Queues an event. Returns false if the engine is gone.
    #[inline]
    pub fn send(&self, event: InputEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Engine-side end of the queue.
#[derive(Debug)]
pub struct InputQueue {
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
}

impl InputQueue {
    /// Creates an unbounded queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// New producer handle.
    #[must_use]
    pub fn sender(&self) -> InputSender {
        InputSender { sender: self.sender.clone() }
    }

    /// Moves every queued event into `out`. Returns how many.
    pub fn drain_into(&self, out: &mut Vec<InputEvent>) -> usize {
        let before = out.len();
        out.extend(self.receiver.try_iter());
        out.len() - before
    }

    /// Events waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
