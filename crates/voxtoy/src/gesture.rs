//! # Hand Gestures
//!
//! Turns per-frame hand landmarks into [`InputEvent`]s.
//!
//! Landmarks use the 21-point hand model in normalized image space:
//! `x` grows right, `y` grows DOWN, both in `0..1`; `z` is relative depth
//! (negative toward the camera).
//!
//! ## Gesture table
//!
//! | Gesture | Fingers up | Event |
//! |---------|------------|-------|
//! | fist | none | `Dismantle` (debounced) |
//! | open | all four | `Reassemble` (debounced) |
//! | peace | index + middle | `CameraZoom` from index-tip travel |
//! | point | index | `PointerMove`; closing to a fist selects |
//! | none | anything else | `CameraRotate` from palm motion |
//!
//! Two palms close together override everything with a grab.

use serde::{Deserialize, Serialize};
use tracing::debug;
use voxtoy_core::InputEvent;

/// Landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

const INDEX_PIP: usize = 6;
const INDEX_TIP: usize = 8;
const PALM: usize = 9;
const MIDDLE_PIP: usize = 10;
const MIDDLE_TIP: usize = 12;
const RING_PIP: usize = 14;
const RING_TIP: usize = 16;
const PINKY_PIP: usize = 18;
const PINKY_TIP: usize = 20;

/// Palms closer than this (image units) count as a two-hand grab.
pub const TWO_HAND_GRAB_DISTANCE: f32 = 0.15;
/// Minimum time between two triggered fist/open events.
pub const GESTURE_DEBOUNCE_MS: u64 = 1000;
/// Palm travel to rotate delta.
pub const ROTATE_GAIN: f32 = 500.0;
/// Rotate deltas at or below this on both axes are ignored.
pub const ROTATE_DEAD_ZONE: f32 = 2.0;
/// Index-tip travel to zoom delta.
pub const ZOOM_GAIN: f32 = 20.0;
/// Zoom deltas at or below this are accumulated, not sent.
pub const ZOOM_THRESHOLD: f32 = 0.5;

/// One tracked hand point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Image x, `0..1`, right.
    pub x: f32,
    /// Image y, `0..1`, down.
    pub y: f32,
    /// Relative depth.
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    /// Creates a landmark.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn distance(self, other: Self) -> f32 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Image position as NDC (`-1..1`, `+y` up).
    fn to_ndc(self) -> (f32, f32) {
        (self.x * 2.0 - 1.0, -(self.y * 2.0 - 1.0))
    }
}

/// A full hand.
pub type Hand = [Landmark; LANDMARK_COUNT];

/// Hands seen in one camera frame, as recorded for replay.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureFrame {
    /// Capture time in milliseconds.
    pub t_ms: u64,
    /// Detected hands, primary first.
    pub hands: Vec<Hand>,
}

/// Single-hand pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// No finger up.
    Fist,
    /// All four fingers up.
    Open,
    /// Index and middle up.
    Peace,
    /// Index only.
    Point,
    /// Anything else.
    #[default]
    None,
}

/// Classifies a hand by which fingers are extended.
///
/// A finger is up when its tip is above (smaller image `y`) its PIP joint.
/// The thumb is ignored.
#[must_use]
pub fn classify(hand: &Hand) -> Gesture {
    let up = |tip: usize, pip: usize| hand[tip].y < hand[pip].y;
    let fingers = [
        up(INDEX_TIP, INDEX_PIP),
        up(MIDDLE_TIP, MIDDLE_PIP),
        up(RING_TIP, RING_PIP),
        up(PINKY_TIP, PINKY_PIP),
    ];

    match fingers {
        [false, false, false, false] => Gesture::Fist,
        [true, true, true, true] => Gesture::Open,
        [true, true, false, false] => Gesture::Peace,
        [true, false, false, false] => Gesture::Point,
        _ => Gesture::None,
    }
}

/// Whether the first two hands hold their palms together.
#[must_use]
pub fn is_two_hand_grab(hands: &[Hand]) -> bool {
    match hands {
        [first, second, ..] => first[PALM].distance(second[PALM]) < TWO_HAND_GRAB_DISTANCE,
        _ => false,
    }
}

/// Frame-to-frame gesture state.
///
/// Feed it every camera frame; forward the returned events to the
/// engine's input queue.
#[derive(Debug, Default)]
pub struct GestureTracker {
    current: Gesture,
    /// Last gesture that passed the change + debounce check.
    last_gesture: Gesture,
    last_trigger_ms: Option<u64>,
    last_palm: Option<(f32, f32)>,
    zoom_start_y: Option<f32>,
    grabbing: bool,
    pointing: bool,
}

impl GestureTracker {
    /// Creates an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary hand gesture from the last update.
    #[must_use]
    pub const fn current(&self) -> Gesture {
        self.current
    }

    /// Whether a two-hand grab is in progress.
    #[must_use]
    pub const fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    /// Processes one camera frame.
    pub fn update(&mut self, hands: &[Hand], now_ms: u64) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let Some(primary) = hands.first() else {
            self.hands_lost(&mut events);
            return events;
        };

        let gesture = classify(primary);
        let two_hand = is_two_hand_grab(hands);
        self.current = gesture;

        let selected = self.update_pointer(primary, gesture, two_hand, &mut events);
        if selected {
            // The closing fist belongs to the selection, not a dismantle
            self.last_gesture = gesture;
        } else {
            self.update_trigger(gesture, now_ms, &mut events);
        }

        let palm = primary[PALM];
        if gesture == Gesture::None && !two_hand {
            if let Some((px, py)) = self.last_palm {
                let dx = (palm.x - px) * ROTATE_GAIN;
                let dy = (palm.y - py) * ROTATE_GAIN;
                if dx.abs() > ROTATE_DEAD_ZONE || dy.abs() > ROTATE_DEAD_ZONE {
                    events.push(InputEvent::CameraRotate { dx, dy });
                }
            }
        }
        self.last_palm = Some((palm.x, palm.y));

        if two_hand {
            self.update_grab(hands, &mut events);
        } else if self.grabbing {
            self.grabbing = false;
            events.push(InputEvent::GrabRelease);
        }

        if gesture == Gesture::Peace {
            let tip_y = primary[INDEX_TIP].y;
            match self.zoom_start_y {
                None => self.zoom_start_y = Some(tip_y),
                Some(start) => {
                    let delta = (start - tip_y) * ZOOM_GAIN;
                    if delta.abs() > ZOOM_THRESHOLD {
                        events.push(InputEvent::CameraZoom(delta));
                        self.zoom_start_y = Some(tip_y);
                    }
                }
            }
        } else {
            self.zoom_start_y = None;
        }

        events
    }

    /// Returns true when this frame turned a point into a selection.
    fn update_pointer(
        &mut self,
        primary: &Hand,
        gesture: Gesture,
        two_hand: bool,
        events: &mut Vec<InputEvent>,
    ) -> bool {
        if gesture == Gesture::Point && !two_hand {
            let (x, y) = primary[INDEX_TIP].to_ndc();
            events.push(InputEvent::PointerMove { x, y });
            self.pointing = true;
            return false;
        }
        if !self.pointing {
            return false;
        }
        self.pointing = false;
        if gesture == Gesture::Fist {
            debug!("point closed to fist, selecting");
            events.push(InputEvent::PointerSelect);
            true
        } else {
            events.push(InputEvent::PointerHide);
            false
        }
    }

    fn update_trigger(&mut self, gesture: Gesture, now_ms: u64, events: &mut Vec<InputEvent>) {
        let elapsed = self
            .last_trigger_ms
            .map_or(true, |t| now_ms.saturating_sub(t) > GESTURE_DEBOUNCE_MS);
        if gesture == self.last_gesture || !elapsed {
            return;
        }

        let event = match gesture {
            Gesture::Fist => Some(InputEvent::Dismantle),
            Gesture::Open => Some(InputEvent::Reassemble),
            _ => None,
        };
        if let Some(event) = event {
            debug!(?gesture, now_ms, "gesture triggered");
            events.push(event);
            self.last_trigger_ms = Some(now_ms);
        }
        self.last_gesture = gesture;
    }

    fn update_grab(&mut self, hands: &[Hand], events: &mut Vec<InputEvent>) {
        let (a, b) = (hands[0][PALM], hands[1][PALM]);
        let center = Landmark::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0);
        let (x, y) = center.to_ndc();
        let z = ((1.0 + center.z) / 2.0).clamp(0.0, 1.0);

        if self.grabbing {
            events.push(InputEvent::GrabMove { x, y, z });
        } else {
            debug!(x, y, z, "two-hand grab");
            self.grabbing = true;
            events.push(InputEvent::GrabStart { x, y, z });
        }
    }

    /// No hands in view: let go of anything continuous.
    fn hands_lost(&mut self, events: &mut Vec<InputEvent>) {
        if self.grabbing {
            self.grabbing = false;
            events.push(InputEvent::GrabRelease);
        }
        if self.pointing {
            self.pointing = false;
            events.push(InputEvent::PointerHide);
        }
        self.current = Gesture::None;
        self.last_palm = None;
        self.zoom_start_y = None;
    }
}
