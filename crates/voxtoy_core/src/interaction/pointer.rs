//! Ray pointer with cluster highlight and selection.

use tracing::debug;
use voxtoy_rendering::RenderAdapter;
use voxtoy_shared::Camera;

use crate::engine::Engine;
use crate::physics::EngineState;
use crate::runtime::CubeFlags;

impl<R: RenderAdapter> Engine<R> {
    /// Highlights every free cube within the selection radius of the cube
    /// under the pointer.
    ///
    /// The previous highlight is restored first. The set is always
    /// computed; colors change only while dismantling.
    pub fn update_pointer(&mut self, camera: &Camera, x: f32, y: f32) {
        self.clear_highlight();

        let ray = camera.ray_from_ndc(x, y);
        let runtime = &self.runtime;
        let free = |i: usize| !runtime.flags(i).is_held();
        let Some(hit) = self.renderer.pick_closest(&ray, camera.eye, &free) else {
            self.interaction.pointer_cursor = None;
            return;
        };

        let center = self.runtime.positions[hit];
        let radius_sq = self.config.interaction.selection_radius.powi(2);
        let show = self.state == EngineState::Dismantling;

        for i in 0..self.runtime.len() {
            if self.runtime.flags[i].is_held()
                || self.runtime.positions[i].distance_squared(center) > radius_sq
            {
                continue;
            }
            self.runtime.flags[i].insert(CubeFlags::HIGHLIGHTED);
            self.interaction.highlighted.push(i);
            if show {
                self.tint(i);
            }
        }
        self.interaction.pointer_cursor = Some(center);
    }

    /// Drops the highlight and hides the cursor.
    pub fn hide_pointer(&mut self) {
        self.clear_highlight();
        self.interaction.pointer_cursor = None;
    }

    /// Makes the current highlight the selection and hides the cursor.
    ///
    /// Selected cubes keep the highlight color. Returns false, changing
    /// nothing, when no highlight is live.
    pub fn select_pointed(&mut self) -> bool {
        if self.interaction.highlighted.is_empty() {
            return false;
        }

        // Old selection members outside the new set go back to normal
        for k in 0..self.interaction.selected.len() {
            let i = self.interaction.selected[k];
            self.runtime.flags[i].remove(CubeFlags::SELECTED);
            if !self.runtime.flags[i].contains(CubeFlags::HIGHLIGHTED) {
                self.untint(i);
            }
        }

        let highlighted = std::mem::take(&mut self.interaction.highlighted);
        for &i in &highlighted {
            let flags = &mut self.runtime.flags[i];
            flags.remove(CubeFlags::HIGHLIGHTED);
            flags.insert(CubeFlags::SELECTED);
        }
        self.interaction.selected = highlighted;
        self.interaction.pointer_cursor = None;

        debug!(count = self.interaction.selected.len(), "pointer selection");
        true
    }

    /// Restores colors of highlighted cubes that are not selected.
    fn clear_highlight(&mut self) {
        for k in 0..self.interaction.highlighted.len() {
            let i = self.interaction.highlighted[k];
            self.runtime.flags[i].remove(CubeFlags::HIGHLIGHTED);
            if !self.runtime.flags[i].contains(CubeFlags::SELECTED) {
                self.untint(i);
            }
        }
        self.interaction.highlighted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use voxtoy_rendering::InstancedRenderer;
    use voxtoy_shared::{Color, Cube, Vec3};

    const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    /// A row of cubes along x at 0, 2, 4, 10 on the ground.
    fn setup(state: EngineState) -> (Engine<InstancedRenderer>, Camera) {
        let mut engine = Engine::new(EngineConfig::default(), InstancedRenderer::new());
        let cubes = [0, 2, 4, 10].map(|x| Cube::new(x, 0, 0, Color::RED)).to_vec();
        engine.load_model(cubes);
        engine.state = state;
        let camera = Camera::look_at(Vec3::new(0.0, 20.0, 0.001), Vec3::ZERO, 50.0, 1.0);
        (engine, camera)
    }

    #[test]
    fn test_highlight_radius_around_hit() {
        let (mut engine, camera) = setup(EngineState::Dismantling);
        engine.update_pointer(&camera, 0.0, 0.0);

        assert_eq!(engine.highlighted(), &[0, 1]);
        assert_eq!(engine.renderer().color(0), Some(YELLOW));
        assert_eq!(engine.renderer().color(2), Some(RED));
        assert_eq!(engine.pointer_cursor(), engine.position(0));
    }

    #[test]
    fn test_highlight_set_without_color_when_stable() {
        let (mut engine, camera) = setup(EngineState::Stable);
        engine.update_pointer(&camera, 0.0, 0.0);
        assert_eq!(engine.highlighted(), &[0, 1]);
        assert_eq!(engine.renderer().color(0), Some(RED));
    }

    #[test]
    fn test_moving_pointer_restores_previous_highlight() {
        let (mut engine, camera) = setup(EngineState::Dismantling);
        engine.update_pointer(&camera, 0.0, 0.0);
        // Point at nothing
        engine.update_pointer(&camera, -0.9, 0.9);

        assert!(engine.highlighted().is_empty());
        assert_eq!(engine.pointer_cursor(), None);
        for i in 0..4 {
            assert_eq!(engine.renderer().color(i), Some(RED));
        }
    }

    #[test]
    fn test_select_keeps_tint_and_hides_cursor() {
        let (mut engine, camera) = setup(EngineState::Dismantling);
        engine.update_pointer(&camera, 0.0, 0.0);
        assert!(engine.select_pointed());

        assert_eq!(engine.selected(), &[0, 1]);
        assert!(engine.highlighted().is_empty());
        assert_eq!(engine.pointer_cursor(), None);
        assert_eq!(engine.renderer().color(1), Some(YELLOW));

        // Nothing highlighted: select is a no-op
        assert!(!engine.select_pointed());
        assert_eq!(engine.selected(), &[0, 1]);
    }

    #[test]
    fn test_pointer_moves_do_not_untint_selection() {
        let (mut engine, camera) = setup(EngineState::Dismantling);
        engine.update_pointer(&camera, 0.0, 0.0);
        engine.select_pointed();
        engine.update_pointer(&camera, 0.0, 0.0);
        engine.hide_pointer();
        assert_eq!(engine.renderer().color(0), Some(YELLOW));
    }

    #[test]
    fn test_paint_under_highlight_shows_after_restore() {
        let (mut engine, camera) = setup(EngineState::Dismantling);
        engine.update_pointer(&camera, 0.0, 0.0);
        engine.paint(0, Color::WHITE);
        assert_eq!(engine.renderer().color(0), Some(YELLOW));

        engine.hide_pointer();
        assert_eq!(engine.renderer().color(0), Some([1.0, 1.0, 1.0, 1.0]));
    }
}
