//! # The Engine
//!
//! Owns the Entity Store, the runtime arrays, the interaction state and
//! the injected renderer. One [`Engine::on_frame`] is one tick:
//!
//! 1. apply input events queued since the last frame
//! 2. advance the state machine one step
//! 3. write transforms of every moving cube
//! 4. flush the renderer
//!
//! Engines share nothing; any number can coexist.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use voxtoy_rendering::{FlushStats, RenderAdapter};
use voxtoy_shared::{extract_model, Camera, Color, Cube, OrbitCamera, Vec3};

use crate::config::EngineConfig;
use crate::error::CoreResult;
use crate::input::{InputEvent, InputQueue, InputSender};
use crate::interaction::InteractionState;
use crate::physics::{self, EngineState};
use crate::runtime::{CubeFlags, RuntimeState};
use crate::store::EntityStore;

/// What one [`Engine::on_frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// State after the step.
    pub state: EngineState,
    /// Input events applied at the start of the frame.
    pub events: usize,
    /// Cubes still moving after the step.
    pub moving: usize,
    /// A dismantle or rebuild pass finished this frame.
    pub completed: bool,
    /// Buffers published to the renderer.
    pub upload: FlushStats,
}

/// Voxel toy engine driving a [`RenderAdapter`].
pub struct Engine<R: RenderAdapter> {
    pub(crate) config: EngineConfig,
    pub(crate) store: EntityStore,
    pub(crate) runtime: RuntimeState,
    pub(crate) renderer: R,
    pub(crate) state: EngineState,
    pub(crate) interaction: InteractionState,
    pub(crate) camera: OrbitCamera,
    pub(crate) rng: ChaCha8Rng,
    /// Frames spent in the current pass with nothing held.
    pub(crate) phase_frames: u32,
    input: InputQueue,
    /// Reused event buffer.
    pending: Vec<InputEvent>,
    frame: u64,
}

impl<R: RenderAdapter> Engine<R> {
    /// Creates an engine with no model loaded.
    pub fn new(config: EngineConfig, renderer: R) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let camera = OrbitCamera::new(config.camera.clone());
        Self {
            config,
            store: EntityStore::new(),
            runtime: RuntimeState::new(),
            renderer,
            state: EngineState::Stable,
            interaction: InteractionState::default(),
            camera,
            rng,
            phase_frames: 0,
            input: InputQueue::new(),
            pending: Vec::with_capacity(64),
            frame: 0,
        }
    }

    // =========================================================================
    // Model lifecycle
    // =========================================================================

    /// Replaces the model. Resets runtime state, interaction and phase.
    /// An empty model is accepted and renders nothing.
    pub fn load_model(&mut self, cubes: Vec<Cube>) {
        self.interaction = InteractionState::default();
        self.store.load(cubes, self.config.physics.ground_y);
        self.runtime.reset(self.store.targets());
        self.state = EngineState::Stable;
        self.phase_frames = 0;

        self.renderer.allocate(self.store.count());
        self.write_all_transforms();
        self.write_all_colors();

        info!(
            cubes = self.store.count(),
            ground_offset = self.store.ground_offset(),
            "model loaded"
        );
    }

    /// Parses free-form model text and loads it. Returns the cube count.
    ///
    /// # Errors
    /// [`CoreError::Import`](crate::CoreError::Import) when no cubes can
    /// be recovered; the current model is kept.
    pub fn load_json(&mut self, text: &str) -> CoreResult<usize> {
        let model = extract_model(text)?;
        let count = model.len();
        self.load_model(model);
        Ok(count)
    }

    /// Starts scattering the model. No-op unless Stable with cubes loaded.
    pub fn dismantle(&mut self) {
        if self.state != EngineState::Stable || self.store.is_empty() {
            debug!(state = ?self.state, "dismantle ignored");
            return;
        }
        self.hide_pointer();
        physics::scatter(&mut self.runtime, &mut self.rng, &self.config.physics);
        self.state = EngineState::Dismantling;
        self.phase_frames = 0;
        info!(cubes = self.store.count(), "dismantling");
    }

    /// Animates into a new formation from any state.
    ///
    /// No-op when nothing is loaded or `cubes` is empty. A different cube
    /// count reallocates the instances; extra cubes rise from the ground
    /// beneath their target.
    pub fn rebuild(&mut self, cubes: Vec<Cube>) {
        if self.store.is_empty() || cubes.is_empty() {
            debug!(loaded = self.store.count(), requested = cubes.len(), "rebuild ignored");
            return;
        }

        self.hide_pointer();
        self.clear_selection();
        self.release_holds();

        let previous = self.store.count();
        self.store.load(cubes, self.config.physics.ground_y);
        let ground = self.config.physics.ground_y;
        let targets = self.store.targets();
        self.runtime
            .resize_with(targets.len(), |i| Vec3::new(targets[i].x, ground, targets[i].z));
        for i in 0..self.runtime.len() {
            self.runtime.halt(i);
        }

        if previous != self.store.count() {
            self.renderer.allocate(self.store.count());
            self.write_all_transforms();
        }
        self.write_all_colors();

        self.state = EngineState::Rebuilding;
        self.phase_frames = 0;
        info!(previous, cubes = self.store.count(), "rebuilding");
    }

    /// Rebuilds into the currently loaded formation.
    pub fn reassemble(&mut self) {
        let cubes = self.store.cubes().to_vec();
        self.rebuild(cubes);
    }

    /// Recolors cube `index` in the store and on screen.
    ///
    /// A cube showing the highlight keeps it; the new color appears when
    /// the highlight is restored.
    pub fn paint(&mut self, index: usize, color: Color) -> bool {
        if !self.store.set_color(index, color) {
            return false;
        }
        if !self.runtime.flags(index).contains(CubeFlags::TINTED) {
            self.renderer.set_color(index, color);
        }
        true
    }

    /// Index of the cube under NDC `(x, y)`, nearest to the eye.
    #[must_use]
    pub fn pick(&self, camera: &Camera, x: f32, y: f32) -> Option<usize> {
        let ray = camera.ray_from_ndc(x, y);
        self.renderer.pick_closest(&ray, camera.eye, &|_| true)
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Handle for queueing input from anywhere.
    #[must_use]
    pub fn input_sender(&self) -> InputSender {
        self.input.sender()
    }

    /// Runs one tick.
    pub fn on_frame(&mut self) -> FrameReport {
        self.frame += 1;

        let mut events = std::mem::take(&mut self.pending);
        let applied = self.input.drain_into(&mut events);
        for event in events.drain(..) {
            self.apply(event);
        }
        self.pending = events;

        let (moving, completed) = match self.state {
            EngineState::Stable => (0, false),
            EngineState::Dismantling => self.step_dismantle(),
            EngineState::Rebuilding => self.step_rebuild(),
        };

        let upload = self.renderer.flush();
        FrameReport {
            frame: self.frame,
            state: self.state,
            events: applied,
            moving,
            completed,
            upload,
        }
    }

    fn step_dismantle(&mut self) -> (usize, bool) {
        let cfg = &self.config.physics;
        let mut moving = physics::step_dismantle(&mut self.runtime, cfg);

        if self.runtime.any_held() {
            self.phase_frames = 0;
        } else {
            self.phase_frames += 1;
            if moving > 0 && self.phase_frames >= cfg.max_dismantle_frames {
                warn!(moving, frames = self.phase_frames, "dismantle did not settle, forcing");
                physics::force_settle(&mut self.runtime, cfg);
                moving = 0;
            }
        }
        self.write_free_transforms();

        if moving == 0 {
            self.state = EngineState::Stable;
            self.phase_frames = 0;
            info!(frame = self.frame, "all cubes settled");
            return (0, true);
        }
        (moving, false)
    }

    fn step_rebuild(&mut self) -> (usize, bool) {
        let cfg = &self.config.physics;
        let away = physics::step_rebuild(&mut self.runtime, self.store.targets(), cfg);
        self.phase_frames += 1;

        if away == 0 || self.phase_frames >= cfg.max_rebuild_frames {
            if away > 0 {
                warn!(away, frames = self.phase_frames, "rebuild did not converge, snapping");
            }
            physics::snap_to_targets(&mut self.runtime, self.store.targets());
            self.write_all_transforms();
            self.state = EngineState::Stable;
            self.phase_frames = 0;
            info!(frame = self.frame, "rebuild complete");
            return (0, true);
        }

        self.write_all_transforms();
        (away, false)
    }

    fn apply(&mut self, event: InputEvent) {
        let view = self.camera.camera();
        match event {
            InputEvent::Load(model) => self.load_model(model),
            InputEvent::Dismantle => self.dismantle(),
            InputEvent::Rebuild(model) => self.rebuild(model),
            InputEvent::Reassemble => self.reassemble(),
            InputEvent::Paint { index, color } => {
                self.paint(index, color);
            }
            InputEvent::DragStart { x, y } => {
                self.start_drag(&view, x, y);
            }
            InputEvent::DragMove { x, y } => self.update_drag(&view, x, y),
            InputEvent::DragEnd => self.end_drag(),
            InputEvent::PointerMove { x, y } => self.update_pointer(&view, x, y),
            InputEvent::PointerSelect => {
                self.select_pointed();
            }
            InputEvent::PointerHide => self.hide_pointer(),
            InputEvent::GrabStart { x, y, z } => {
                self.start_grab(&view, x, y, z);
            }
            InputEvent::GrabMove { x, y, z } => self.update_grab(&view, x, y, z),
            InputEvent::GrabRelease => self.release_grab(),
            InputEvent::CameraZoom(delta) => self.camera.zoom(delta),
            InputEvent::CameraRotate { dx, dy } => self.camera.rotate(dx, dy),
            InputEvent::CameraReset => self.camera.reset(),
            InputEvent::CameraAspect(aspect) => self.camera.set_aspect(aspect),
        }
    }

    // =========================================================================
    // Renderer writes
    // =========================================================================

    pub(crate) fn write_transform(&mut self, index: usize) {
        if let Some(position) = self.runtime.positions.get(index) {
            self.renderer
                .set_transform(index, *position, self.runtime.quaternion(index));
        }
    }

    fn write_all_transforms(&mut self) {
        for i in 0..self.runtime.len() {
            self.write_transform(i);
        }
    }

    /// Held cubes are written by their controller.
    fn write_free_transforms(&mut self) {
        for i in 0..self.runtime.len() {
            if !self.runtime.flags[i].is_held() {
                self.write_transform(i);
            }
        }
    }

    fn write_all_colors(&mut self) {
        for (i, cube) in self.store.cubes().iter().enumerate() {
            self.renderer.set_color(i, cube.color);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Number of loaded cubes.
    #[must_use]
    pub fn cube_count(&self) -> usize {
        self.store.count()
    }

    /// Cube `index` with its original coordinates and current color.
    #[must_use]
    pub fn cube(&self, index: usize) -> Option<Cube> {
        self.store.get(index)
    }

    /// Loaded cubes in index order.
    #[must_use]
    pub fn cubes(&self) -> &[Cube] {
        self.store.cubes()
    }

    /// Rest position of cube `index`.
    #[must_use]
    pub fn target(&self, index: usize) -> Option<Vec3> {
        self.store.targets().get(index).copied()
    }

    /// Vertical lift applied at the last load or rebuild.
    #[must_use]
    pub const fn ground_offset(&self) -> f32 {
        self.store.ground_offset()
    }

    /// Current position of cube `index`.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.runtime.positions.get(index).copied()
    }

    /// Current Euler rotation of cube `index`.
    #[must_use]
    pub fn rotation(&self, index: usize) -> Option<Vec3> {
        self.runtime.rotations.get(index).copied()
    }

    /// Current velocity of cube `index`.
    #[must_use]
    pub fn velocity(&self, index: usize) -> Option<Vec3> {
        self.runtime.velocities.get(index).copied()
    }

    /// Runtime flags of cube `index`.
    #[must_use]
    pub fn flags(&self, index: usize) -> CubeFlags {
        self.runtime.flags(index)
    }

    /// Read access to the runtime arrays.
    #[must_use]
    pub const fn runtime(&self) -> &RuntimeState {
        &self.runtime
    }

    /// The injected renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable renderer, for backends that need to draw.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Snapshot of the orbit camera for ray casting.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera.camera()
    }

    /// The orbit camera controller.
    #[must_use]
    pub const fn orbit(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Mutable orbit camera controller.
    pub fn orbit_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frames run so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxtoy_rendering::InstancedRenderer;

    fn engine() -> Engine<InstancedRenderer> {
        Engine::new(EngineConfig::default(), InstancedRenderer::new())
    }

    fn tower(height: i32) -> Vec<Cube> {
        (0..height).map(|y| Cube::new(0, y, 0, Color::RED)).collect()
    }

    fn run_until_stable(engine: &mut Engine<InstancedRenderer>, limit: usize) -> usize {
        for frame in 1..=limit {
            if engine.on_frame().state == EngineState::Stable {
                return frame;
            }
        }
        panic!("engine still {:?} after {limit} frames", engine.state());
    }

    #[test]
    fn test_load_places_cubes_on_ground() {
        let mut e = engine();
        e.load_model(tower(3));
        assert_eq!(e.renderer().instance_count(), 3);
        assert_eq!(e.position(0), Some(Vec3::new(0.0, 0.5, 0.0)));
        assert_eq!(e.position(2), Some(Vec3::new(0.0, 2.5, 0.0)));
        assert_eq!(e.state(), EngineState::Stable);
    }

    #[test]
    fn test_stable_frames_do_not_upload() {
        let mut e = engine();
        e.load_model(tower(3));
        assert!(!e.on_frame().upload.is_idle());
        assert!(e.on_frame().upload.is_idle());
    }

    #[test]
    fn test_dismantle_only_from_stable() {
        let mut e = engine();
        e.load_model(tower(4));
        e.dismantle();
        assert_eq!(e.state(), EngineState::Dismantling);
        let velocities: Vec<_> = e.runtime().velocities.clone();

        // Second call must not re-scatter
        e.dismantle();
        assert_eq!(e.runtime().velocities, velocities);
    }

    #[test]
    fn test_rebuild_with_more_cubes_reallocates() {
        let mut e = engine();
        e.load_model(tower(2));
        e.rebuild(tower(5));
        assert_eq!(e.renderer().instance_count(), 5);
        assert_eq!(e.runtime().len(), 5);
        // New cubes start on the ground under their target
        assert_eq!(e.position(4), Some(Vec3::new(0.0, 0.5, 0.0)));

        run_until_stable(&mut e, 2000);
        assert_eq!(e.position(4), Some(Vec3::new(0.0, 4.5, 0.0)));
    }

    fn with_caps(dismantle: u32, rebuild: u32) -> Engine<InstancedRenderer> {
        let mut config = EngineConfig::default();
        config.physics.max_dismantle_frames = dismantle;
        config.physics.max_rebuild_frames = rebuild;
        Engine::new(config, InstancedRenderer::new())
    }

    fn assert_grounded(e: &Engine<InstancedRenderer>) {
        for i in 0..e.cube_count() {
            let p = e.position(i).unwrap();
            assert_eq!(p.y, e.config().physics.ground_y, "cube {i} at {p:?}");
            assert_eq!(e.velocity(i), Some(Vec3::ZERO));
            assert_eq!(e.renderer().position(i), Some(p));
        }
    }

    #[test]
    fn test_rebuild_noops() {
        let mut e = engine();
        e.rebuild(tower(3));
        assert_eq!(e.cube_count(), 0);
        assert_eq!(e.state(), EngineState::Stable);

        e.load_model(tower(3));
        e.dismantle();
        for _ in 0..5 {
            e.on_frame();
        }
        let positions = e.runtime().positions.clone();
        let rotations = e.runtime().rotations.clone();
        let velocities = e.runtime().velocities.clone();
        let drawn: Vec<_> = (0..3).map(|i| (e.renderer().position(i), e.renderer().color(i))).collect();

        e.rebuild(Vec::new());
        assert_eq!(e.state(), EngineState::Dismantling);
        assert_eq!(e.cube_count(), 3);
        assert_eq!(e.runtime().positions, positions);
        assert_eq!(e.runtime().rotations, rotations);
        assert_eq!(e.runtime().velocities, velocities);
        let after: Vec<_> = (0..3).map(|i| (e.renderer().position(i), e.renderer().color(i))).collect();
        assert_eq!(after, drawn);
    }

    #[test]
    fn test_dismantle_cap_forces_settle() {
        let mut e = with_caps(3, 2000);
        e.load_model(tower(10));
        e.dismantle();

        assert_eq!(run_until_stable(&mut e, 10), 3);
        assert_grounded(&e);
    }

    #[test]
    fn test_dismantle_cap_waits_for_held_cubes() {
        let mut e = with_caps(3, 2000);
        e.load_model([0, 2, 4, 10].map(|x| Cube::new(x, 0, 0, Color::RED)).to_vec());
        let camera = Camera::look_at(Vec3::new(0.0, 20.0, 0.001), Vec3::ZERO, 50.0, 1.0);
        e.dismantle();
        assert!(e.start_grab(&camera, 0.0, 0.0, 0.15));

        for _ in 0..10 {
            e.on_frame();
        }
        assert_eq!(e.state(), EngineState::Dismantling);
        assert_eq!(e.phase_frames, 0);

        // Count restarts on release, then the cap applies again
        e.release_grab();
        assert!(run_until_stable(&mut e, 3) <= 3);
        assert_grounded(&e);
    }

    #[test]
    fn test_dismantle_cap_restarts_after_drag() {
        let mut e = with_caps(3, 2000);
        e.load_model(tower(4));
        e.dismantle();
        e.on_frame();
        assert_eq!(e.phase_frames, 1);

        // Straight down onto the top of the tower, wherever it went
        let top = e.position(3).unwrap();
        let camera = Camera::look_at(Vec3::new(top.x, 20.0, top.z + 0.001), top, 50.0, 1.0);
        assert!(e.start_drag(&camera, 0.0, 0.0));
        for _ in 0..10 {
            e.on_frame();
        }
        assert_eq!(e.state(), EngineState::Dismantling);
        assert_eq!(e.phase_frames, 0);

        e.end_drag();
        assert!(run_until_stable(&mut e, 3) <= 3);
        assert_grounded(&e);
    }

    #[test]
    fn test_rebuild_cap_snaps_exactly() {
        let mut e = with_caps(2000, 5);
        e.load_model(tower(4));
        e.dismantle();
        run_until_stable(&mut e, 2000);

        e.reassemble();
        // The top cube starts at least 3 units away; 5 eased frames cannot reach it
        assert_eq!(run_until_stable(&mut e, 10), 5);
        for i in 0..4 {
            assert_eq!(e.position(i), e.target(i));
            assert_eq!(e.rotation(i), Some(Vec3::ZERO));
            assert_eq!(e.velocity(i), Some(Vec3::ZERO));
            assert_eq!(e.renderer().position(i), e.target(i));
        }
    }

    #[test]
    fn test_queued_events_apply_next_frame() {
        let mut e = engine();
        let tx = e.input_sender();
        tx.send(InputEvent::Load(tower(2)));
        tx.send(InputEvent::Dismantle);
        assert_eq!(e.cube_count(), 0);

        let report = e.on_frame();
        assert_eq!(report.events, 2);
        assert_eq!(report.state, EngineState::Dismantling);
        assert_eq!(e.cube_count(), 2);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = engine();
        let mut b = engine();
        for e in [&mut a, &mut b] {
            e.load_model(tower(6));
            e.dismantle();
            for _ in 0..25 {
                e.on_frame();
            }
        }
        assert_eq!(a.runtime().positions, b.runtime().positions);
    }

    #[test]
    fn test_paint_updates_store_and_instance() {
        let mut e = engine();
        e.load_model(tower(2));
        assert!(e.paint(1, Color::WHITE));
        assert!(!e.paint(9, Color::WHITE));
        assert_eq!(e.cube(1).map(|c| c.color), Some(Color::WHITE));
        assert_eq!(e.renderer().color(1), Some([1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_pick_nearest_along_ray() {
        let mut e = engine();
        e.load_model(tower(3));
        // Straight down onto the tower: the top cube wins
        let camera = Camera::look_at(Vec3::new(0.0, 20.0, 0.001), Vec3::ZERO, 50.0, 1.0);
        assert_eq!(e.pick(&camera, 0.0, 0.0), Some(2));
        assert_eq!(e.pick(&camera, 0.9, 0.9), None);
    }

    #[test]
    fn test_load_json() {
        let mut e = engine();
        let count = e
            .load_json(r##"```json
[{"x":0,"y":0,"z":0,"c":"#00ff00"}]
```"##)
            .unwrap();
        assert_eq!(count, 1);
        assert!(e.load_json("nothing to see").is_err());
        assert_eq!(e.cube_count(), 1);
    }
}
