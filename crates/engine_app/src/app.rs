//! The application handle: configuration, binding, and the loop thread.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use engine_platform::{Canvas, Input, Surface};
use tracing::{debug, info};

use crate::config::{AppConfig, ConfigError, TimingConfig};
use crate::error::{AppError, Phase};
use crate::simulation::Simulation;
use crate::tick::{self, LoopContext, LoopSummary};

/// Name of the loop thread. Independent of the window title.
pub const LOOP_THREAD_NAME: &str = "engine-loop";

/// Lifecycle of an [`App`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// No simulation bound yet.
    Unconfigured,
    /// Ready to start.
    Configured,
    /// The loop thread is alive, possibly finishing its last iteration after
    /// a stop request.
    Running,
    /// The loop thread has exited, or never started. Terminal.
    Stopped,
}

/// Clears the loop's running flag from any thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Asks the loop to exit after the current iteration.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            info!("stop requested");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Owns the configuration and collaborators until [`start`](Self::start)
/// hands them to the loop thread.
pub struct App {
    config: AppConfig,
    simulation: Option<Box<dyn Simulation>>,
    input: Option<Input>,
    surface: Option<Box<dyn Surface>>,
    started: bool,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<LoopSummary, AppError>>>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("has_input", &self.input.is_some())
            .field("has_surface", &self.surface.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    #[must_use]
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            simulation: None,
            input: None,
            surface: None,
            started: false,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// The configuration as it will be, or was, handed to the loop.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current lifecycle state. Reports [`AppState::Stopped`] only once the
    /// loop thread has returned.
    #[must_use]
    pub fn state(&self) -> AppState {
        if !self.started {
            return if self.simulation.is_some() {
                AppState::Configured
            } else {
                AppState::Unconfigured
            };
        }
        match &self.thread {
            Some(thread) if !thread.is_finished() => AppState::Running,
            _ => AppState::Stopped,
        }
    }

    // -- Configuration (locked once started) --

    /// Logical viewport size in canvas pixels before scaling.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) -> Result<(), AppError> {
        self.ensure_unlocked("viewport size")?;
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        Ok(())
    }

    /// Integer scale applied to the viewport to size the canvas.
    pub fn set_pixel_scale(&mut self, scale: u32) -> Result<(), AppError> {
        self.ensure_unlocked("pixel scale")?;
        self.config.pixel_scale = scale;
        Ok(())
    }

    /// Window title. Logged at start; has no effect on the loop thread.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), AppError> {
        self.ensure_unlocked("title")?;
        self.config.title = title.into();
        Ok(())
    }

    /// Log the measured frame rate once per second at `info`.
    pub fn set_show_fps(&mut self, show_fps: bool) -> Result<(), AppError> {
        self.ensure_unlocked("show fps")?;
        self.config.show_fps = show_fps;
        Ok(())
    }

    /// Sub-step length, sub-step cap and target frame rate.
    pub fn set_timing(&mut self, timing: TimingConfig) -> Result<(), AppError> {
        self.ensure_unlocked("timing")?;
        self.config.timing = timing;
        Ok(())
    }

    /// Replaces the whole configuration.
    pub fn set_config(&mut self, config: AppConfig) -> Result<(), AppError> {
        self.ensure_unlocked("config")?;
        self.config = config;
        Ok(())
    }

    /// The simulation driven by the loop. Required before [`start`](Self::start).
    pub fn bind_simulation(&mut self, simulation: impl Simulation + 'static) -> Result<(), AppError> {
        self.ensure_unlocked("simulation")?;
        self.simulation = Some(Box::new(simulation));
        Ok(())
    }

    /// The loop calls [`Input::clean`] on this handle after every sub-step.
    pub fn bind_input(&mut self, input: Input) -> Result<(), AppError> {
        self.ensure_unlocked("input")?;
        self.input = Some(input);
        Ok(())
    }

    /// Receives the canvas after every `draw`.
    pub fn bind_surface(&mut self, surface: impl Surface + 'static) -> Result<(), AppError> {
        self.ensure_unlocked("surface")?;
        self.surface = Some(Box::new(surface));
        Ok(())
    }

    fn ensure_unlocked(&self, setting: &'static str) -> Result<(), AppError> {
        if self.started {
            return Err(AppError::ConfigurationLocked { setting });
        }
        Ok(())
    }

    // -- Lifecycle --

    /// Validates the configuration, runs `init` on the calling thread, then
    /// spawns the loop thread.
    ///
    /// # Errors
    ///
    /// - [`AppError::AlreadyStarted`] on a second call.
    /// - [`AppError::NoSimulationBound`] if no simulation was bound.
    /// - [`AppError::InvalidConfig`] if the configuration fails validation.
    /// - [`AppError::Simulation`] if `init` fails; the app stays startable.
    /// - [`AppError::Spawn`] if the OS refuses the thread.
    pub fn start(&mut self) -> Result<StopHandle, AppError> {
        if self.started {
            return Err(AppError::AlreadyStarted);
        }
        let simulation = self
            .simulation
            .as_mut()
            .ok_or(AppError::NoSimulationBound)?;

        self.config.validate()?;
        let (width, height) = self.config.render_size();
        let canvas = Canvas::new(width, height)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;

        simulation.init().map_err(AppError::simulation(Phase::Init))?;

        let Some(simulation) = self.simulation.take() else {
            return Err(AppError::NoSimulationBound);
        };
        let ctx = LoopContext {
            simulation,
            input: self.input.clone(),
            surface: self.surface.take(),
            canvas,
            timing: self.config.timing.clone(),
            show_fps: self.config.show_fps,
            running: Arc::clone(&self.running),
        };

        self.started = true;
        self.running.store(true, Ordering::Release);
        let thread = std::thread::Builder::new()
            .name(LOOP_THREAD_NAME.to_string())
            .spawn(move || tick::run_loop(ctx))
            .map_err(|err| {
                self.running.store(false, Ordering::Release);
                AppError::Spawn(err)
            })?;
        self.thread = Some(thread);

        info!(
            title = %self.config.title,
            canvas_width = width,
            canvas_height = height,
            pixel_scale = self.config.pixel_scale,
            "application started"
        );
        Ok(self.stop_handle())
    }

    /// Asks the loop to exit after the current iteration. Callable from any
    /// thread through a [`StopHandle`].
    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    /// A handle that can stop the loop from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Waits for the loop thread to finish.
    ///
    /// Does not stop the loop; call [`stop`](Self::stop) first or have the
    /// simulation stop it.
    ///
    /// # Errors
    ///
    /// The error that terminated the loop, [`AppError::NotStarted`] if
    /// [`start`](Self::start) never succeeded, or [`AppError::LoopPanicked`].
    pub fn join(mut self) -> Result<LoopSummary, AppError> {
        let thread = self.thread.take().ok_or(AppError::NotStarted)?;
        thread.join().map_err(|_| AppError::LoopPanicked)?
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            debug!("application dropped while running; stopping loop");
            self.stop();
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU64;
    use std::time::{Duration, Instant};

    use engine_platform::input::{self, InputEvent, Key};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Call {
        Init,
        Update,
        Draw,
        StopIssued,
    }

    type Log = Arc<Mutex<Vec<Call>>>;

    /// Records callbacks into a shared log. Optionally stops the app from
    /// inside `draw`, or fails.
    #[derive(Default)]
    struct Recorder {
        log: Log,
        stop_after_draws: Option<(usize, StopHandle)>,
        fail_update_at: Option<usize>,
        fail_init: bool,
        draws: usize,
        updates: usize,
    }

    impl Recorder {
        fn new(log: &Log) -> Self {
            Self {
                log: Arc::clone(log),
                ..Self::default()
            }
        }
    }

    impl Simulation for Recorder {
        fn init(&mut self) -> anyhow::Result<()> {
            if self.fail_init {
                anyhow::bail!("no assets");
            }
            self.log.lock().unwrap().push(Call::Init);
            Ok(())
        }

        fn update(&mut self, _dt: f64) -> anyhow::Result<()> {
            if self.fail_update_at == Some(self.updates) {
                anyhow::bail!("update exploded");
            }
            self.updates += 1;
            self.log.lock().unwrap().push(Call::Update);
            Ok(())
        }

        fn draw(&mut self, canvas: &mut Canvas) -> anyhow::Result<()> {
            canvas.clear(0xFF00_0000);
            self.draws += 1;
            let mut log = self.log.lock().unwrap();
            log.push(Call::Draw);
            if let Some((after, handle)) = &self.stop_after_draws {
                if self.draws == *after {
                    handle.stop();
                    log.push(Call::StopIssued);
                }
            }
            Ok(())
        }
    }

    /// Signals on entering `draw`, then blocks until released.
    struct Gate {
        entered: crossbeam_channel::Sender<()>,
        release: crossbeam_channel::Receiver<()>,
    }

    impl Simulation for Gate {
        fn update(&mut self, _dt: f64) -> anyhow::Result<()> {
            Ok(())
        }

        fn draw(&mut self, _canvas: &mut Canvas) -> anyhow::Result<()> {
            let _ = self.entered.try_send(());
            let _ = self.release.recv();
            Ok(())
        }
    }

    struct ThreadName(Arc<Mutex<Option<String>>>);

    impl Simulation for ThreadName {
        fn update(&mut self, _dt: f64) -> anyhow::Result<()> {
            Ok(())
        }

        fn draw(&mut self, _canvas: &mut Canvas) -> anyhow::Result<()> {
            let name = std::thread::current().name().map(str::to_owned);
            *self.0.lock().unwrap() = name;
            Ok(())
        }
    }

    /// Timestamps each `draw`; the first one takes `first_draw` to finish.
    struct Paced {
        draws: Arc<Mutex<Vec<Instant>>>,
        first_draw: Duration,
    }

    impl Paced {
        fn new(draws: &Arc<Mutex<Vec<Instant>>>, first_draw: Duration) -> Self {
            Self {
                draws: Arc::clone(draws),
                first_draw,
            }
        }
    }

    impl Simulation for Paced {
        fn update(&mut self, _dt: f64) -> anyhow::Result<()> {
            Ok(())
        }

        fn draw(&mut self, _canvas: &mut Canvas) -> anyhow::Result<()> {
            let mut draws = self.draws.lock().unwrap();
            draws.push(Instant::now());
            if draws.len() == 1 {
                std::thread::sleep(self.first_draw);
            }
            Ok(())
        }
    }

    struct CountingSurface(Arc<AtomicU64>);

    impl Surface for CountingSurface {
        fn present(&mut self, canvas: &Canvas) -> anyhow::Result<()> {
            assert!(canvas.pixels().iter().all(|&p| p == 0xFF00_0000));
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fast_timing() -> TimingConfig {
        TimingConfig {
            target_frame_rate: 500.0,
            ..TimingConfig::default()
        }
    }

    fn wait_until_stopped(app: &App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.state() != AppState::Stopped {
            assert!(Instant::now() < deadline, "loop thread never finished");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn count(log: &Log, call: Call) -> usize {
        log.lock().unwrap().iter().filter(|&&c| c == call).count()
    }

    #[test]
    fn test_state_transitions() {
        let log = Log::default();
        let mut app = App::new();
        assert_eq!(app.state(), AppState::Unconfigured);

        app.bind_simulation(Recorder::new(&log)).unwrap();
        assert_eq!(app.state(), AppState::Configured);

        app.start().unwrap();
        assert_eq!(app.state(), AppState::Running);

        app.stop();
        wait_until_stopped(&app);
        app.join().unwrap();
    }

    #[test]
    fn test_running_until_last_iteration_returns() {
        let (entered_tx, entered_rx) = crossbeam_channel::bounded(1);
        let (release_tx, release_rx) = crossbeam_channel::bounded(1);
        let mut app = App::new();
        app.bind_simulation(Gate {
            entered: entered_tx,
            release: release_rx,
        })
        .unwrap();
        app.start().unwrap();

        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.stop();
        // The loop thread is still inside draw.
        assert_eq!(app.state(), AppState::Running);

        drop(release_tx);
        wait_until_stopped(&app);
        app.join().unwrap();
    }

    #[test]
    fn test_title_with_nul_does_not_name_the_thread() {
        let seen = Arc::new(Mutex::new(None));
        let mut app = App::new();
        app.set_title("my\0game").unwrap();
        app.bind_simulation(ThreadName(Arc::clone(&seen))).unwrap();

        let handle = app.start().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while seen.lock().unwrap().is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        handle.stop();
        app.join().unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some(LOOP_THREAD_NAME));
    }

    #[test]
    fn test_loop_is_paced_to_target_rate() {
        let draws = Arc::new(Mutex::new(Vec::new()));
        let mut app = App::new();
        app.set_timing(TimingConfig {
            target_frame_rate: 100.0,
            ..TimingConfig::default()
        })
        .unwrap();
        app.bind_simulation(Paced::new(&draws, Duration::ZERO)).unwrap();

        let began = Instant::now();
        let handle = app.start().unwrap();
        std::thread::sleep(Duration::from_millis(200));
        handle.stop();
        let summary = app.join().unwrap();
        let elapsed = began.elapsed().as_secs_f64();

        // Sleeping only ever lengthens a frame, so 100 Hz is a hard ceiling.
        assert!(
            summary.frames as f64 <= elapsed * 100.0 + 2.0,
            "{} frames in {elapsed:.3}s",
            summary.frames
        );
        assert!(summary.frames >= 5, "{} frames", summary.frames);
        assert_eq!(summary.frames as usize, draws.lock().unwrap().len());
    }

    #[test]
    fn test_overrun_is_not_caught_up() {
        let draws = Arc::new(Mutex::new(Vec::new()));
        let mut app = App::new();
        app.set_timing(TimingConfig {
            target_frame_rate: 100.0,
            ..TimingConfig::default()
        })
        .unwrap();
        app.bind_simulation(Paced::new(&draws, Duration::from_millis(100)))
            .unwrap();

        let handle = app.start().unwrap();
        std::thread::sleep(Duration::from_millis(250));
        handle.stop();
        let summary = app.join().unwrap();

        let draws = draws.lock().unwrap();
        assert!(draws.len() >= 3, "{} draws", draws.len());
        // Frames after the slow one keep the normal spacing: no burst of
        // back-to-back frames making up for lost time.
        for pair in draws[1..].windows(2) {
            let gap = pair[1].duration_since(pair[0]);
            assert!(gap >= Duration::from_millis(8), "gap {gap:?}");
        }
        // The long frame's excess beyond four sub-steps was dropped.
        assert!(summary.dropped_time > 0.02, "{}", summary.dropped_time);
        assert!(summary.updates <= summary.frames * 4);
    }

    #[test]
    fn test_start_without_simulation() {
        let mut app = App::new();
        assert!(matches!(app.start(), Err(AppError::NoSimulationBound)));
        assert_eq!(app.state(), AppState::Unconfigured);
    }

    #[test]
    fn test_start_twice() {
        let log = Log::default();
        let mut app = App::new();
        app.bind_simulation(Recorder::new(&log)).unwrap();
        app.start().unwrap();
        assert!(matches!(app.start(), Err(AppError::AlreadyStarted)));
        app.stop();
        app.join().unwrap();
        assert_eq!(count(&log, Call::Init), 1);
    }

    #[test]
    fn test_join_without_start() {
        assert!(matches!(App::new().join(), Err(AppError::NotStarted)));
    }

    #[test]
    fn test_invalid_config_rejected_at_start() {
        let log = Log::default();
        let mut app = App::new();
        app.set_pixel_scale(0).unwrap();
        app.bind_simulation(Recorder::new(&log)).unwrap();

        assert!(matches!(app.start(), Err(AppError::InvalidConfig(_))));
        assert_eq!(app.state(), AppState::Configured);
        assert_eq!(count(&log, Call::Init), 0);
    }

    #[test]
    fn test_init_failure_keeps_app_configured() {
        let log = Log::default();
        let mut app = App::new();
        app.bind_simulation(Recorder {
            fail_init: true,
            ..Recorder::new(&log)
        })
        .unwrap();

        let err = app.start().unwrap_err();
        assert!(matches!(
            err,
            AppError::Simulation {
                phase: Phase::Init,
                ..
            }
        ));
        assert_eq!(app.state(), AppState::Configured);
    }

    #[test]
    fn test_init_runs_before_start_returns() {
        let log = Log::default();
        let mut app = App::new();
        app.bind_simulation(Recorder::new(&log)).unwrap();
        let handle = app.start().unwrap();
        assert_eq!(log.lock().unwrap().first(), Some(&Call::Init));
        handle.stop();
        app.join().unwrap();
    }

    #[test]
    fn test_setters_locked_after_start() {
        let log = Log::default();
        let mut app = App::new();
        app.set_viewport_size(320, 240).unwrap();
        app.set_title("locked").unwrap();
        app.bind_simulation(Recorder::new(&log)).unwrap();
        app.start().unwrap();

        assert!(matches!(
            app.set_viewport_size(1024, 768),
            Err(AppError::ConfigurationLocked {
                setting: "viewport size"
            })
        ));
        assert!(matches!(
            app.set_show_fps(true),
            Err(AppError::ConfigurationLocked { .. })
        ));
        assert!(matches!(
            app.bind_simulation(Recorder::new(&log)),
            Err(AppError::ConfigurationLocked {
                setting: "simulation"
            })
        ));
        assert_eq!(app.config().viewport_width, 320);
        assert_eq!(app.config().viewport_height, 240);
        assert!(!app.config().show_fps);

        app.stop();
        assert!(matches!(
            app.set_title("changed"),
            Err(AppError::ConfigurationLocked { setting: "title" })
        ));
        assert_eq!(app.config().title, "locked");
        app.join().unwrap();
    }

    #[test]
    fn test_stop_from_draw_ends_loop_within_iteration() {
        let log = Log::default();
        let mut app = App::new();
        app.set_timing(fast_timing()).unwrap();
        let handle = app.stop_handle();
        app.bind_simulation(Recorder {
            stop_after_draws: Some((3, handle)),
            ..Recorder::new(&log)
        })
        .unwrap();

        app.start().unwrap();
        let summary = app.join().unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.last(), Some(&Call::StopIssued));
        assert_eq!(log.iter().filter(|&&c| c == Call::Draw).count(), 3);
        assert_eq!(summary.frames, 3);
    }

    #[test]
    fn test_stop_from_other_thread() {
        let log = Log::default();
        let presented = Arc::new(AtomicU64::new(0));
        let mut app = App::new();
        app.set_timing(fast_timing()).unwrap();
        app.bind_simulation(Recorder::new(&log)).unwrap();
        app.bind_surface(CountingSurface(Arc::clone(&presented)))
            .unwrap();

        let handle = app.start().unwrap();
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            handle.stop();
        });
        stopper.join().unwrap();
        let summary = app.join().unwrap();

        let calls_at_exit = log.lock().unwrap().len();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(log.lock().unwrap().len(), calls_at_exit);

        assert!(summary.frames >= 1);
        assert_eq!(summary.frames as usize, count(&log, Call::Draw));
        assert_eq!(summary.updates as usize, count(&log, Call::Update));
        assert_eq!(presented.load(Ordering::SeqCst), summary.frames);
    }

    #[test]
    fn test_update_error_stops_loop_and_surfaces_in_join() {
        let log = Log::default();
        let mut app = App::new();
        app.set_timing(fast_timing()).unwrap();
        app.bind_simulation(Recorder {
            fail_update_at: Some(2),
            ..Recorder::new(&log)
        })
        .unwrap();
        let handle = app.start().unwrap();

        let err = app.join().unwrap_err();
        assert!(matches!(
            err,
            AppError::Simulation {
                phase: Phase::Update,
                ..
            }
        ));
        assert!(err.to_string().contains("update exploded"));
        assert!(!handle.is_running());
        assert_eq!(count(&log, Call::Update), 2);
    }

    #[test]
    fn test_bound_input_is_cleaned_by_loop() {
        let log = Log::default();
        let (tx, input) = input::channel();
        let mut app = App::new();
        app.set_timing(fast_timing()).unwrap();
        app.bind_input(input.clone()).unwrap();
        app.bind_simulation(Recorder::new(&log)).unwrap();
        tx.send(InputEvent::KeyDown(Key(7))).unwrap();

        app.start().unwrap();
        std::thread::sleep(Duration::from_millis(60));
        app.stop();
        app.join().unwrap();

        assert!(input.is_key_down(Key(7)));
        assert_eq!(input.pending(), 0);
    }
}
