//! Single-pointer drag on a horizontal plane.

use tracing::debug;
use voxtoy_rendering::RenderAdapter;
use voxtoy_shared::{Camera, Vec3};

use crate::engine::Engine;
use crate::physics::EngineState;
use crate::runtime::CubeFlags;

/// A cube being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    /// Held cube.
    pub index: usize,
    /// Height of the drag plane.
    pub plane_y: f32,
    /// Pointer hit minus cube center at pick time.
    pub offset: Vec3,
}

impl<R: RenderAdapter> Engine<R> {
    /// Picks the cube under the pointer and holds it. Dismantling only.
    ///
    /// Grabbed cubes cannot be picked. Returns whether a cube was taken.
    pub fn start_drag(&mut self, camera: &Camera, x: f32, y: f32) -> bool {
        if self.state != EngineState::Dismantling {
            return false;
        }
        if self.interaction.drag.is_some() {
            self.end_drag();
        }

        let ray = camera.ray_from_ndc(x, y);
        let runtime = &self.runtime;
        let free = |i: usize| !runtime.flags(i).contains(CubeFlags::GRABBED);
        let Some(index) = self.renderer.pick_closest(&ray, camera.eye, &free) else {
            return false;
        };

        let position = self.runtime.positions[index];
        let hit = ray.intersect_horizontal_plane(position.y).unwrap_or(position);

        self.runtime.flags[index].insert(CubeFlags::DRAGGED);
        self.detach_held();
        self.interaction.drag = Some(DragState {
            index,
            plane_y: position.y,
            offset: hit - position,
        });
        debug!(index, "drag started");
        true
    }

    /// Moves the dragged cube to follow the pointer on its plane.
    ///
    /// The cube never goes below the ground and stays motionless while held.
    pub fn update_drag(&mut self, camera: &Camera, x: f32, y: f32) {
        let Some(drag) = self.interaction.drag else {
            return;
        };
        let ray = camera.ray_from_ndc(x, y);
        let Some(hit) = ray.intersect_horizontal_plane(drag.plane_y) else {
            return;
        };

        let mut position = hit - drag.offset;
        position.y = position.y.max(self.config.physics.ground_y);

        self.runtime.positions[drag.index] = position;
        self.runtime.halt(drag.index);
        self.write_transform(drag.index);
    }

    /// Lets go of the dragged cube with a small downward push.
    pub fn end_drag(&mut self) {
        let Some(drag) = self.interaction.drag.take() else {
            return;
        };
        self.runtime.flags[drag.index].remove(CubeFlags::DRAGGED);
        self.runtime.velocities[drag.index].y = -self.config.interaction.drag_release_drop;
        self.phase_frames = 0;
        debug!(index = drag.index, "drag ended");
    }
}
