//! Linear undo/redo over whole models.
//!
//! Every edit pushes a full copy; models are small enough that
//! structural sharing buys nothing.

use tracing::debug;
use voxtoy_shared::{Color, Model};

/// Undo/redo stack. There is always a current model, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHistory {
    states: Vec<Model>,
    cursor: usize,
}

impl ModelHistory {
    /// History starting at `initial`.
    #[must_use]
    pub fn new(initial: Model) -> Self {
        Self {
            states: vec![initial],
            cursor: 0,
        }
    }

    /// Model shown now.
    #[must_use]
    pub fn current(&self) -> &Model {
        &self.states[self.cursor]
    }

    /// Makes `model` current, discarding anything that could be redone.
    pub fn push(&mut self, model: Model) {
        self.states.truncate(self.cursor + 1);
        self.states.push(model);
        self.cursor += 1;
        debug!(depth = self.states.len(), "history push");
    }

    /// Steps back. Returns the model now current, or `None` at the start.
    pub fn undo(&mut self) -> Option<&Model> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Steps forward. Returns the model now current, or `None` at the end.
    pub fn redo(&mut self) -> Option<&Model> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Whether [`Self::undo`] would move.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`Self::redo`] would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.states.len()
    }

    /// States held, current included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false: there is always a current model.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Recolors every cube at grid `(x, y, z)` as a new state.
    ///
    /// Returns false, pushing nothing, when no cube there changes color.
    pub fn paint_at(&mut self, x: i32, y: i32, z: i32, color: Color) -> bool {
        let mut changed = false;
        let next: Model = self
            .current()
            .iter()
            .map(|cube| {
                if (cube.x, cube.y, cube.z) == (x, y, z) && cube.color != color {
                    changed = true;
                    cube.with_color(color)
                } else {
                    *cube
                }
            })
            .collect();

        if changed {
            self.push(next);
        }
        changed
    }
}

impl Default for ModelHistory {
    fn default() -> Self {
        Self::new(Model::new())
    }
}
