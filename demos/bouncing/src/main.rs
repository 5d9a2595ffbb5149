//! # bouncing
//!
//! Runs the frame loop headless for a fixed number of seconds. A second
//! thread plays the part of the windowing layer and feeds pointer and key
//! events: space spawns a ball at the pointer, backspace removes the oldest.

mod sim;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use engine_app::{App, AppConfig, StopHandle};
use engine_platform::input::{self, InputEvent, InputSender};
use engine_platform::HeadlessSurface;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sim::{BACKSPACE, Bouncing, SPACE};

#[derive(Parser)]
#[command(name = "bouncing", about = "Headless bouncing-sprites demo")]
struct Args {
    /// JSON application config; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How long to run before stopping
    #[arg(short, long, default_value_t = 3.0)]
    seconds: f64,

    /// Balls spawned by init
    #[arg(short, long, default_value_t = 32)]
    entities: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bouncing=info".parse()?))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig {
            title: "bouncing".into(),
            pixel_scale: 4,
            show_fps: true,
            ..AppConfig::default()
        },
    };
    let (width, height) = config.render_size();

    let (sender, input) = input::channel();
    let mut app = App::with_config(config);
    app.bind_input(input.clone())?;
    app.bind_surface(HeadlessSurface::new())?;
    app.bind_simulation(Bouncing::new(args.entities, width, height, input)?)?;

    let stop = app.start()?;
    let feeder = thread::Builder::new()
        .name("platform-input".into())
        .spawn({
            let stop = stop.clone();
            move || feed_input(&sender, &stop, width, height)
        })?;

    thread::sleep(Duration::from_secs_f64(args.seconds.max(0.0)));
    stop.stop();
    let summary = app.join()?;
    if feeder.join().is_err() {
        warn!("input thread panicked");
    }

    info!(
        frames = summary.frames,
        updates = summary.updates,
        dropped_time = summary.dropped_time,
        "demo finished"
    );
    Ok(())
}

/// Sweeps the pointer across the canvas and taps keys while the loop runs.
fn feed_input(sender: &InputSender, stop: &StopHandle, width: u32, height: u32) {
    let mut tick: u32 = 0;
    while stop.is_running() {
        let x = (tick.wrapping_mul(3) % width.max(1)) as f32;
        let y = (tick.wrapping_mul(2) % height.max(1)) as f32;
        let mut events = vec![InputEvent::PointerMoved { x, y }];
        match tick % 40 {
            0 => events.push(InputEvent::KeyDown(SPACE)),
            2 => events.push(InputEvent::KeyUp(SPACE)),
            20 => events.push(InputEvent::KeyDown(BACKSPACE)),
            22 => events.push(InputEvent::KeyUp(BACKSPACE)),
            _ => {}
        }
        for event in events {
            if sender.send(event).is_err() {
                return;
            }
        }
        tick = tick.wrapping_add(1);
        thread::sleep(Duration::from_millis(10));
    }
}
