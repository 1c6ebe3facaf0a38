//! End-to-end scenarios: model in, frames out, renderer state checked.

use voxtoy::{GestureTracker, Hand, Landmark, ModelHistory};
use voxtoy_core::{CubeFlags, Engine, EngineConfig, EngineState, InputEvent};
use voxtoy_rendering::{InstancedRenderer, RenderAdapter};
use voxtoy_shared::{Camera, Color, Cube, Vec3};

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

fn engine() -> Engine<InstancedRenderer> {
    Engine::new(EngineConfig::default(), InstancedRenderer::new())
}

fn red_block(side: i32) -> Vec<Cube> {
    let mut cubes = Vec::new();
    for x in 0..side {
        for y in 0..side {
            for z in 0..side {
                cubes.push(Cube::new(x, y, z, Color::RED));
            }
        }
    }
    cubes
}

/// Cubes on the ground along x.
fn row(xs: &[i32]) -> Vec<Cube> {
    xs.iter().map(|&x| Cube::new(x, 0, 0, Color::RED)).collect()
}

fn top_down() -> Camera {
    Camera::look_at(Vec3::new(0.0, 20.0, 0.001), Vec3::ZERO, 50.0, 1.0)
}

fn run_until_stable(engine: &mut Engine<InstancedRenderer>, limit: u64) -> u64 {
    for frame in 1..=limit {
        if engine.on_frame().state == EngineState::Stable {
            return frame;
        }
    }
    panic!("engine still {:?} after {limit} frames", engine.state());
}

fn assert_on_ground(engine: &Engine<InstancedRenderer>) {
    for i in 0..engine.cube_count() {
        let p = engine.position(i).unwrap();
        assert_eq!(p.y, 0.5, "cube {i} at {p:?}");
        assert_eq!(engine.velocity(i), Some(Vec3::ZERO));
    }
}

#[test]
fn test_block_dismantles_then_rebuilds_exactly() {
    let mut engine = engine();
    engine.load_model(red_block(2));
    assert_eq!(engine.renderer().instance_count(), 8);
    let targets: Vec<Vec3> = (0..8).map(|i| engine.target(i).unwrap()).collect();

    engine.dismantle();
    let frames = run_until_stable(&mut engine, 500);
    assert!(frames < 500);
    assert_on_ground(&engine);

    engine.reassemble();
    assert_eq!(engine.state(), EngineState::Rebuilding);
    run_until_stable(&mut engine, 2000);

    for (i, target) in targets.iter().enumerate() {
        assert_eq!(engine.position(i), Some(*target));
        assert_eq!(engine.rotation(i), Some(Vec3::ZERO));
        assert_eq!(engine.renderer().position(i), Some(*target));
        assert_eq!(engine.renderer().color(i), Some(RED));
    }
}

#[test]
fn test_tall_model_settles_within_cap() {
    let mut engine = engine();
    let tower: Vec<Cube> = (0..40).map(|y| Cube::new(0, y, 0, Color::RED)).collect();
    engine.load_model(tower);
    engine.dismantle();

    let frames = run_until_stable(&mut engine, 2000);
    assert!(frames < 2000, "took {frames} frames");
    assert_on_ground(&engine);
}

#[test]
fn test_model_above_ground_is_lowered() {
    let mut engine = engine();
    engine.load_model(vec![Cube::new(0, 7, 0, Color::RED), Cube::new(0, 8, 0, Color::RED)]);
    assert_eq!(engine.position(0), Some(Vec3::new(0.0, 0.5, 0.0)));
    assert_eq!(engine.position(1), Some(Vec3::new(0.0, 1.5, 0.0)));
    // Original coordinates are kept
    assert_eq!(engine.cube(1).map(|c| c.y), Some(8));
}

#[test]
fn test_point_select_grab_and_throw() {
    let mut engine = engine();
    engine.load_model(row(&[0, 2, 4, 10]));
    let camera = top_down();
    engine.dismantle();

    engine.update_pointer(&camera, 0.0, 0.0);
    assert_eq!(engine.highlighted(), &[0, 1]);
    assert_eq!(engine.renderer().color(0), Some(YELLOW));
    assert!(engine.select_pointed());

    assert!(engine.start_grab(&camera, 0.7, -0.7, 1.0));
    assert_eq!(engine.grabbed(), &[0, 1]);
    assert_eq!(engine.grab_anchor(), Some(Vec3::new(1.0, 0.5, 0.0)));
    assert_eq!(engine.renderer().color(0), Some(RED));

    // Held cubes keep the phase alive and do not fall
    for _ in 0..300 {
        engine.on_frame();
    }
    assert_eq!(engine.state(), EngineState::Dismantling);
    assert_eq!(engine.position(0), Some(Vec3::new(0.0, 0.5, 0.0)));

    // Anchor moves to the center ray, one unit toward -x
    engine.update_grab(&camera, 0.0, 0.0, 0.15);
    let p = engine.position(0).unwrap();
    assert!((p - Vec3::new(-1.0, 0.5, 0.0)).length() < 1e-3);
    assert_eq!(engine.renderer().position(0), Some(p));

    engine.release_grab();
    assert!(engine.grabbed().is_empty());
    let v = engine.velocity(0).unwrap();
    assert!((v.x + 1.0).abs() < 1e-3);
    assert!((v.y - 0.3).abs() < 1e-6);

    run_until_stable(&mut engine, 2000);
    assert_on_ground(&engine);
}

#[test]
fn test_drag_and_grab_never_hold_the_same_cube() {
    let mut engine = engine();
    engine.load_model(row(&[0, 10]));
    let camera = top_down();
    engine.dismantle();

    assert!(engine.start_drag(&camera, 0.0, 0.0));
    assert!(engine.flags(0).contains(CubeFlags::DRAGGED));

    assert!(engine.start_grab(&camera, 0.0, 0.0, 0.15));
    assert_eq!(engine.dragged(), None);
    let flags = engine.flags(0);
    assert!(flags.contains(CubeFlags::GRABBED));
    assert!(!flags.contains(CubeFlags::DRAGGED));
    assert!(!engine.start_drag(&camera, 0.0, 0.0));

    // Pointer skips held cubes
    engine.update_pointer(&camera, 0.0, 0.0);
    assert!(!engine.highlighted().contains(&0));
}

#[test]
fn test_empty_model() {
    let mut engine = engine();
    engine.load_model(Vec::new());
    assert_eq!(engine.renderer().instance_count(), 0);

    engine.dismantle();
    assert_eq!(engine.state(), EngineState::Stable);
    let report = engine.on_frame();
    assert_eq!(report.moving, 0);
    engine.rebuild(Vec::new());
    assert_eq!(engine.state(), EngineState::Stable);
    assert!(!engine.start_grab(&top_down(), 0.0, 0.0, 0.5));
    assert_eq!(engine.renderer().instance_count(), 0);
}

#[test]
fn test_rebuild_mid_dismantle_is_exact() {
    let mut engine = engine();
    engine.load_model(red_block(3));
    engine.dismantle();
    for _ in 0..10 {
        engine.on_frame();
    }
    assert_eq!(engine.state(), EngineState::Dismantling);

    engine.reassemble();
    run_until_stable(&mut engine, 2000);
    for i in 0..engine.cube_count() {
        assert_eq!(engine.position(i), engine.target(i));
        assert_eq!(engine.rotation(i), Some(Vec3::ZERO));
        assert_eq!(engine.velocity(i), Some(Vec3::ZERO));
    }
}

#[test]
fn test_inapplicable_calls_change_nothing() {
    let mut engine = engine();
    engine.load_model(row(&[0, 2]));
    engine.on_frame();
    let camera = top_down();
    let before = engine.runtime().positions.clone();

    engine.end_drag();
    engine.update_drag(&camera, 0.3, 0.3);
    engine.update_grab(&camera, 0.3, 0.3, 0.5);
    engine.release_grab();
    assert!(!engine.select_pointed());
    assert!(!engine.start_drag(&camera, 0.0, 0.0));
    assert!(!engine.start_grab(&camera, 0.0, 0.0, 0.15));

    assert_eq!(engine.state(), EngineState::Stable);
    assert_eq!(engine.runtime().positions, before);
    assert!(engine.on_frame().upload.is_idle());
}

#[test]
fn test_indices_stable_across_cycles() {
    let mut engine = engine();
    let mut cubes = row(&[0, 2, 4]);
    cubes[1].color = Color::WHITE;
    engine.load_model(cubes.clone());

    assert!(engine.paint(2, Color::YELLOW));
    engine.dismantle();
    run_until_stable(&mut engine, 2000);
    engine.reassemble();
    run_until_stable(&mut engine, 2000);

    assert_eq!(engine.cube(0), Some(cubes[0]));
    assert_eq!(engine.cube(1), Some(cubes[1]));
    assert_eq!(engine.cube(2), Some(cubes[2].with_color(Color::YELLOW)));
    assert_eq!(engine.renderer().color(1), Some([1.0, 1.0, 1.0, 1.0]));
    assert_eq!(engine.renderer().color(2), Some(YELLOW));
}

#[test]
fn test_history_drives_rebuild() {
    let mut engine = engine();
    let mut history = ModelHistory::new(row(&[0, 2]));
    engine.load_model(history.current().clone());

    history.push(row(&[0, 2, 4]));
    engine.rebuild(history.current().clone());
    run_until_stable(&mut engine, 2000);
    assert_eq!(engine.renderer().instance_count(), 3);

    let previous = history.undo().cloned().unwrap();
    engine.rebuild(previous);
    run_until_stable(&mut engine, 2000);
    assert_eq!(engine.cube_count(), 2);
    assert_eq!(engine.position(1), Some(Vec3::new(2.0, 0.5, 0.0)));
}

#[test]
fn test_gestures_reach_the_engine_through_the_queue() {
    let mut engine = engine();
    engine.load_model(red_block(2));
    let sender = engine.input_sender();
    let mut tracker = GestureTracker::new();

    // Every finger curled: tips level with the palm, joints above
    let mut fist: Hand = [Landmark::new(0.5, 0.5, 0.0); 21];
    for pip in [6, 10, 14, 18] {
        fist[pip].y = 0.45;
    }
    for event in tracker.update(&[fist], 1_500) {
        assert!(sender.send(event));
    }

    let report = engine.on_frame();
    assert_eq!(report.events, 1);
    assert_eq!(report.state, EngineState::Dismantling);
}

#[test]
fn test_camera_events_use_engine_camera() {
    let mut engine = engine();
    let start = engine.orbit().distance();
    let sender = engine.input_sender();
    sender.send(InputEvent::CameraZoom(5.0));
    engine.on_frame();
    assert!((engine.orbit().distance() - (start - 5.0)).abs() < 1e-3);

    sender.send(InputEvent::CameraReset);
    engine.on_frame();
    assert!((engine.orbit().distance() - start).abs() < 1e-4);
}
