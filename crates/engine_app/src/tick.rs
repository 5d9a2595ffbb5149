//! Fixed-timestep frame loop.
//!
//! One iteration of the loop:
//!
//! 1. Measure `dt`, the wall-clock time since the previous iteration began.
//! 2. Slice `dt` into sub-steps of at most `fixed_step` and call `update`
//!    for each, cleaning input after every sub-step. At most
//!    `max_sub_steps` run; whatever is left over is dropped.
//! 3. Call `draw` once and present the canvas.
//! 4. Count the frame towards the once-per-second rate report.
//! 5. Sleep out the rest of the frame budget, then check the running flag.
//!
//! Steps 2 and 4 live in [`FrameStepper`], which takes `dt` as an argument;
//! [`run_loop`] owns the clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use engine_platform::{Canvas, Input, Surface};
use tracing::{debug, error, info};

use crate::config::TimingConfig;
use crate::error::{AppError, Phase};
use crate::simulation::Simulation;

/// Remaining time at or below this is treated as fully consumed.
pub const EPSILON: f64 = 1e-7;

/// What a single [`FrameStepper::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// `update` calls made this frame, at most `max_sub_steps`.
    pub sub_steps: u32,
    /// Seconds of `dt` that were passed to `update`.
    pub simulated: f64,
    /// Seconds of `dt` beyond the sub-step cap. Not carried into the next frame.
    pub dropped: f64,
    /// Frames counted in the window that just closed, if one did.
    pub fps: Option<u32>,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopSummary {
    /// Completed iterations, each with exactly one `draw`.
    pub frames: u64,
    /// `update` calls across all frames.
    pub updates: u64,
    /// Seconds discarded by the sub-step cap.
    pub dropped_time: f64,
}

/// Counts frames over a window of at least one second.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    elapsed: f64,
    frames: u32,
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame of length `dt`. Once the window reaches one second,
    /// returns its frame count and starts a new window.
    pub fn record(&mut self, dt: f64) -> Option<u32> {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < 1.0 {
            return None;
        }
        let frames = self.frames;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(frames)
    }
}

/// Sub-stepping and frame accounting, independent of the wall clock.
#[derive(Debug, Clone)]
pub struct FrameStepper {
    fixed_step: f64,
    max_sub_steps: u32,
    show_fps: bool,
    fps: FpsCounter,
    summary: LoopSummary,
}

impl FrameStepper {
    #[must_use]
    pub fn new(timing: &TimingConfig, show_fps: bool) -> Self {
        Self {
            fixed_step: timing.fixed_step,
            max_sub_steps: timing.max_sub_steps,
            show_fps,
            fps: FpsCounter::new(),
            summary: LoopSummary::default(),
        }
    }

    /// Runs the updates and the draw for a frame that lasted `dt` seconds.
    ///
    /// # Errors
    ///
    /// [`AppError::Simulation`] from the first callback that fails; later
    /// callbacks of the frame are skipped.
    pub fn frame(
        &mut self,
        dt: f64,
        simulation: &mut dyn Simulation,
        canvas: &mut Canvas,
        input: Option<&Input>,
    ) -> Result<FrameReport, AppError> {
        let mut remaining = dt;
        let mut sub_steps = 0;

        while remaining > EPSILON && sub_steps < self.max_sub_steps {
            let step = remaining.min(self.fixed_step);
            simulation
                .update(step)
                .map_err(AppError::simulation(Phase::Update))?;
            remaining -= step;
            sub_steps += 1;
            self.summary.updates += 1;
            if let Some(input) = input {
                input.clean();
            }
        }

        let dropped = remaining.max(0.0);
        if dropped > EPSILON {
            debug!(dt, sub_steps, dropped, "frame time exceeded sub-step cap");
            self.summary.dropped_time += dropped;
        }

        simulation
            .draw(canvas)
            .map_err(AppError::simulation(Phase::Draw))?;
        self.summary.frames += 1;

        let fps = self.fps.record(dt);
        if let Some(fps) = fps.filter(|_| self.show_fps) {
            info!(fps, "frame rate");
        }

        Ok(FrameReport {
            sub_steps,
            simulated: dt - remaining,
            dropped: if dropped > EPSILON { dropped } else { 0.0 },
            fps,
        })
    }

    /// Totals since the stepper was created.
    #[must_use]
    pub fn summary(&self) -> LoopSummary {
        self.summary
    }
}

/// Everything the loop thread owns.
pub(crate) struct LoopContext {
    pub simulation: Box<dyn Simulation>,
    pub input: Option<Input>,
    pub surface: Option<Box<dyn Surface>>,
    pub canvas: Canvas,
    pub timing: TimingConfig,
    pub show_fps: bool,
    pub running: Arc<AtomicBool>,
}

/// Thread body: paces [`FrameStepper`] against the wall clock until the
/// running flag is cleared or a callback fails.
pub(crate) fn run_loop(mut ctx: LoopContext) -> Result<LoopSummary, AppError> {
    let mut stepper = FrameStepper::new(&ctx.timing, ctx.show_fps);

    info!(
        fixed_step = ctx.timing.fixed_step,
        max_sub_steps = ctx.timing.max_sub_steps,
        target_frame_rate = ctx.timing.target_frame_rate,
        "starting frame loop"
    );

    let result = drive(&mut ctx, &mut stepper);
    ctx.running.store(false, Ordering::Release);

    let summary = stepper.summary();
    match &result {
        Ok(()) => info!(
            frames = summary.frames,
            updates = summary.updates,
            dropped_time = summary.dropped_time,
            "frame loop stopped"
        ),
        Err(err) => error!(error = %err, frames = summary.frames, "frame loop failed"),
    }
    result.map(|()| summary)
}

fn drive(ctx: &mut LoopContext, stepper: &mut FrameStepper) -> Result<(), AppError> {
    let budget = Duration::from_secs_f64(ctx.timing.target_frame_period());
    let mut previous = Instant::now();

    while ctx.running.load(Ordering::Acquire) {
        let start = Instant::now();
        let dt = start.duration_since(previous).as_secs_f64();
        previous = start;

        stepper.frame(
            dt,
            ctx.simulation.as_mut(),
            &mut ctx.canvas,
            ctx.input.as_ref(),
        )?;

        if let Some(surface) = ctx.surface.as_mut() {
            surface
                .present(&ctx.canvas)
                .map_err(|cause| AppError::Present { cause })?;
        }

        let elapsed = start.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        } else {
            debug!(
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = budget.as_secs_f64() * 1000.0,
                "frame exceeded time budget"
            );
        }
    }
    Ok(())
}
