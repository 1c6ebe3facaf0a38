//! Interaction controllers: drag, pointer-select and grab.
//!
//! All controller state is owned by the engine. A cube is held by at most
//! one controller at a time:
//!
//! - drag never picks a grabbed cube
//! - grab ends an overlapping drag before acquiring
//! - held cubes leave the highlight and the selection
//!
//! Highlight colors are display-only. The stored color is the source of
//! truth and is written back whenever a highlight is dropped.

mod drag;
mod grab;
mod pointer;

pub use drag::DragState;
pub use grab::GrabState;

use voxtoy_rendering::RenderAdapter;
use voxtoy_shared::Vec3;

use crate::engine::Engine;
use crate::runtime::CubeFlags;

/// Controller state owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub(crate) drag: Option<DragState>,
    pub(crate) grab: Option<GrabState>,
    pub(crate) highlighted: Vec<usize>,
    pub(crate) selected: Vec<usize>,
    pub(crate) pointer_cursor: Option<Vec3>,
}

impl<R: RenderAdapter> Engine<R> {
    /// Cubes in the live pointer highlight.
    #[must_use]
    pub fn highlighted(&self) -> &[usize] {
        &self.interaction.highlighted
    }

    /// Cubes in the persistent selection.
    #[must_use]
    pub fn selected(&self) -> &[usize] {
        &self.interaction.selected
    }

    /// Cubes held by the grab controller.
    #[must_use]
    pub fn grabbed(&self) -> &[usize] {
        self.interaction.grab.as_ref().map(GrabState::indices).unwrap_or(&[])
    }

    /// Cube held by the drag controller.
    #[must_use]
    pub fn dragged(&self) -> Option<usize> {
        self.interaction.drag.map(|d| d.index)
    }

    /// Position of the pointer cursor while a highlight is live.
    #[must_use]
    pub const fn pointer_cursor(&self) -> Option<Vec3> {
        self.interaction.pointer_cursor
    }

    /// Shows the highlight color on cube `index`.
    pub(crate) fn tint(&mut self, index: usize) {
        self.renderer
            .set_color(index, self.config.interaction.highlight_color);
        self.runtime.flags[index].insert(CubeFlags::TINTED);
    }

    /// Puts the stored color back on cube `index` if it was tinted.
    pub(crate) fn untint(&mut self, index: usize) {
        if !self.runtime.flags(index).contains(CubeFlags::TINTED) {
            return;
        }
        if let Some(color) = self.store.color(index) {
            self.renderer.set_color(index, color);
        }
        self.runtime.flags[index].remove(CubeFlags::TINTED);
    }

    /// Drops the persistent selection and restores its colors.
    pub(crate) fn clear_selection(&mut self) {
        for k in 0..self.interaction.selected.len() {
            let i = self.interaction.selected[k];
            self.runtime.flags[i].remove(CubeFlags::SELECTED);
            if !self.runtime.flags[i].contains(CubeFlags::HIGHLIGHTED) {
                self.untint(i);
            }
        }
        self.interaction.selected.clear();
    }

    /// Removes every held cube from the highlight and the selection.
    pub(crate) fn detach_held(&mut self) {
        let flags = &self.runtime.flags;
        self.interaction.highlighted.retain(|&i| !flags[i].is_held());
        self.interaction.selected.retain(|&i| !flags[i].is_held());

        for i in 0..self.runtime.len() {
            if self.runtime.flags[i].is_held() {
                self.runtime.flags[i].remove(CubeFlags::HIGHLIGHTED);
                self.runtime.flags[i].remove(CubeFlags::SELECTED);
                self.untint(i);
            }
        }
    }

    /// Lets go of any drag and grab without imparting motion.
    pub(crate) fn release_holds(&mut self) {
        if let Some(drag) = self.interaction.drag.take() {
            self.runtime.flags[drag.index].remove(CubeFlags::DRAGGED);
        }
        self.drop_grab();
    }
}
