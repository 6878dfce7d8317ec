use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use structopt::StructOpt;

use frame_engine::{
    assets::SceneAssets,
    core::{EventSource, LoopControl, SceneEditor, ScriptedInput},
    gpu::headless::HeadlessBackend,
    scene::SceneParams,
    EngineConfig, FrameLoop,
};

#[derive(StructOpt, Debug)]
#[structopt(name = "frame_engine")]
struct CliArgs {
    /// Engine configuration (TOML). Defaults are used when omitted
    #[structopt(long = "config")]
    config: Option<PathBuf>,
    /// Number of frames to render
    #[structopt(long = "frames", default_value = "300")]
    frames: u64,
    /// Output debug info
    #[structopt(long = "verbose")]
    verbose: bool,
}

/// Frames per second, measured over windows of at least one second.
struct FrameRate {
    frames: u64,
    window_start: Instant,
}

impl FrameRate {
    const WINDOW: Duration = Duration::from_secs(1);

    fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
        }
    }

    /// Counts a frame and returns the rate of the window it completed, if any.
    fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Self::WINDOW {
            return None;
        }
        let rate = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(rate)
    }
}

/// Spins the object and the light, and reports the frame rate.
struct DemoInput {
    script: ScriptedInput,
    frame_rate: FrameRate,
}

impl EventSource for DemoInput {
    fn poll(&mut self) -> LoopControl {
        if let Some(fps) = self.frame_rate.tick(Instant::now()) {
            log::info!("FPS: {:.1}", fps);
        }
        self.script.poll()
    }
}

impl SceneEditor for DemoInput {
    fn edit(&mut self, frame: u64, scene: &mut SceneParams) {
        let angle = frame as f32 * 0.01;
        *scene.object.rotate.y_mut() = angle;
        *scene.light.direction.x_mut() = angle.sin();
        self.script.edit(frame, scene);
    }
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let assets = SceneAssets::load(&config.assets).context("loading scene assets")?;
    let backend = HeadlessBackend::new(&config.headless, config.extent());
    let device = backend.device.clone();

    let mut frame_loop = FrameLoop::new(
        backend.device,
        backend.queue,
        backend.surface,
        &config,
        &assets,
    )?;
    let mut input = DemoInput {
        script: ScriptedInput::frames(args.frames),
        frame_rate: FrameRate::new(Instant::now()),
    };

    let started = Instant::now();
    let frames = frame_loop.run(&mut input)?;
    frame_loop.wait_idle()?;
    let elapsed = started.elapsed().max(Duration::from_micros(1));

    let stats = device.stats();
    println!(
        "Rendered {} frames in {:.2?} ({:.1} fps)",
        frames,
        elapsed,
        frames as f64 / elapsed.as_secs_f64()
    );
    println!(
        "GPU: {} submissions, {} draws, {} vertices, {} texture uploads",
        stats.submissions, stats.draws, stats.vertices, stats.texture_uploads
    );
    println!(
        "Hazards: {}, validation errors: {}",
        stats.hazards, stats.validation_errors
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_is_frames_over_window() {
        let start = Instant::now();
        let mut frame_rate = FrameRate::new(start);

        for frame in 1..60 {
            assert_eq!(frame_rate.tick(start + Duration::from_millis(frame * 20)), None);
        }
        // 60 frames in 1.2 seconds
        let rate = frame_rate.tick(start + Duration::from_millis(1200)).unwrap();
        assert!((rate - 50.0).abs() < 1e-3, "{}", rate);

        // the next window starts from zero instead of averaging with the first
        let next = start + Duration::from_millis(1200);
        for frame in 1..10 {
            assert_eq!(frame_rate.tick(next + Duration::from_millis(frame * 100)), None);
        }
        let rate = frame_rate.tick(next + Duration::from_millis(1000)).unwrap();
        assert!((rate - 10.0).abs() < 1e-3, "{}", rate);
    }
}
