//! # engine_app
//!
//! Fixed-timestep application shell. An [`App`] is configured, given a
//! [`Simulation`] (and optionally an [`Input`](engine_platform::Input) and a
//! [`Surface`](engine_platform::Surface)), then started. The loop runs on its
//! own thread:
//!
//! ```text
//! start ─► init ─► ┌─ update × 0..=max_sub_steps ─► draw ─► present ─► sleep ─┐
//!                  └──────────────────── while running ◄─────────────────────┘
//! ```
//!
//! Frame time beyond `fixed_step * max_sub_steps` is dropped rather than
//! carried into later frames, so a stall never triggers a burst of catch-up
//! updates.

pub mod app;
pub mod config;
pub mod error;
pub mod simulation;
pub mod tick;

pub use app::{App, AppState, LOOP_THREAD_NAME, StopHandle};
pub use config::{AppConfig, ConfigError, TimingConfig};
pub use error::{AppError, Phase};
pub use simulation::Simulation;
pub use tick::{FpsCounter, FrameReport, FrameStepper, LoopSummary};
