use engine_platform::Canvas;

/// The application logic driven by the loop.
///
/// `init` runs once on the thread that calls [`App::start`](crate::App::start),
/// before the loop thread exists. `update` runs zero to `max_sub_steps` times
/// per iteration with `dt` no larger than the fixed step, and `draw` runs
/// exactly once per iteration after the updates. Returning an error from any
/// callback stops the loop.
pub trait Simulation: Send {
    fn init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn update(&mut self, dt: f64) -> anyhow::Result<()>;

    fn draw(&mut self, canvas: &mut Canvas) -> anyhow::Result<()>;
}
