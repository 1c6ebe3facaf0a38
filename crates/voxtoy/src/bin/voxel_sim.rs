//! # VOXTOY Headless Harness
//!
//! Runs one full cycle without a window:
//!
//! 1. load a JSON model (or a generated block)
//! 2. optionally replay recorded hand-gesture frames
//! 3. dismantle and run until every cube settles
//! 4. reassemble and run until the model is whole again
//!
//! ```text
//! RUST_LOG=debug voxel_sim --model castle.json --max-frames 6000
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use voxtoy::{GestureFrame, GestureTracker};
use voxtoy_core::{CoreError, Engine, EngineConfig, EngineState, FrameReport};
use voxtoy_rendering::InstancedRenderer;
use voxtoy_shared::{Color, Cube, Model};

#[derive(Parser, Debug)]
#[command(name = "voxel_sim")]
#[command(about = "Headless dismantle/rebuild run of a voxel model")]
struct Cli {
    /// JSON model file (array of {x, y, z, color})
    #[arg(long)]
    model: Option<PathBuf>,

    /// TOML engine config
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of recorded gesture frames to replay after loading
    #[arg(long)]
    gestures: Option<PathBuf>,

    /// Frame limit per phase
    #[arg(long, default_value_t = 5_000)]
    max_frames: u64,

    /// Size of the generated block when no model is given
    #[arg(long, default_value_t = 512)]
    cubes: usize,
}

#[derive(Debug, Error)]
enum SimError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid gesture recording: {0}")]
    Gestures(#[from] serde_json::Error),

    #[error("{phase} did not finish within {frames} frames")]
    Timeout { phase: &'static str, frames: u64 },
}

type SimResult<T> = Result<T, SimError>;

fn read(path: &Path) -> SimResult<String> {
    std::fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// A roughly cubic block of `n` cubes with a two-tone checker.
fn generated_block(n: usize) -> Model {
    let side = (n as f32).cbrt().ceil().max(1.0) as i32;
    let blue = Color::rgb(0x33, 0x66, 0xcc);
    (0..n as i32)
        .map(|i| {
            let (x, y, z) = (i % side, i / (side * side), (i / side) % side);
            let color = if (x + y + z) % 2 == 0 { Color::RED } else { blue };
            Cube::new(x - side / 2, y, z - side / 2, color)
        })
        .collect()
}

fn run_phase(
    engine: &mut Engine<InstancedRenderer>,
    phase: &'static str,
    max_frames: u64,
) -> SimResult<FrameReport> {
    let start = engine.frame();
    for _ in 0..max_frames {
        let report = engine.on_frame();
        if report.state == EngineState::Stable {
            let stats = engine.renderer().stats();
            info!(
                phase,
                frames = report.frame - start,
                transform_uploads = stats.transform_uploads,
                color_uploads = stats.color_uploads,
                draw_calls = stats.draw_calls,
                "phase complete"
            );
            return Ok(report);
        }
    }
    Err(SimError::Timeout {
        phase,
        frames: max_frames,
    })
}

fn replay(engine: &mut Engine<InstancedRenderer>, frames: &[GestureFrame]) {
    let sender = engine.input_sender();
    let mut tracker = GestureTracker::new();
    let mut sent = 0;
    for frame in frames {
        for event in tracker.update(&frame.hands, frame.t_ms) {
            sent += usize::from(sender.send(event));
        }
        engine.on_frame();
    }
    info!(frames = frames.len(), events = sent, state = ?engine.state(), "gesture replay done");
}

fn run(cli: &Cli) -> SimResult<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path).map_err(CoreError::from)?,
        None => EngineConfig::default(),
    };

    let mut engine = Engine::new(config, InstancedRenderer::new());
    match &cli.model {
        Some(path) => {
            engine.load_json(&read(path)?)?;
        }
        None => engine.load_model(generated_block(cli.cubes)),
    }
    if engine.cube_count() == 0 {
        warn!("model is empty, nothing to animate");
        return Ok(());
    }
    engine.on_frame();

    if let Some(path) = &cli.gestures {
        let frames: Vec<GestureFrame> = serde_json::from_str(&read(path)?)?;
        replay(&mut engine, &frames);
        if engine.state() != EngineState::Stable {
            run_phase(&mut engine, "gestures", cli.max_frames)?;
        }
    }

    engine.dismantle();
    run_phase(&mut engine, "dismantle", cli.max_frames)?;

    engine.reassemble();
    run_phase(&mut engine, "rebuild", cli.max_frames)?;

    let misplaced = (0..engine.cube_count())
        .filter(|&i| engine.position(i) != engine.target(i))
        .count();
    info!(cubes = engine.cube_count(), misplaced, frames = engine.frame(), "run finished");
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let cli = Cli::parse();
    info!(?cli, "starting voxel_sim");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "voxel_sim failed");
            ExitCode::FAILURE
        }
    }
}
