use std::fmt;

use crate::config::ConfigError;

/// Which simulation callback failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Update,
    Draw,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Init => "init",
            Phase::Update => "update",
            Phase::Draw => "draw",
        })
    }
}

/// Errors returned by the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// `start` was called before a simulation was bound.
    #[error("no simulation bound")]
    NoSimulationBound,

    /// A setter or `bind_*` was called after `start`.
    #[error("cannot change {setting} after the application has started")]
    ConfigurationLocked { setting: &'static str },

    #[error("application already started")]
    AlreadyStarted,

    /// `join` was called on an application that never started.
    #[error("application has not been started")]
    NotStarted,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// A simulation callback returned an error; the loop stopped.
    #[error("simulation {phase} failed: {cause:#}")]
    Simulation { phase: Phase, cause: anyhow::Error },

    #[error("presenting frame failed: {cause:#}")]
    Present { cause: anyhow::Error },

    #[error("failed to spawn loop thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("loop thread panicked")]
    LoopPanicked,
}

impl AppError {
    pub(crate) fn simulation(phase: Phase) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| AppError::Simulation { phase, cause }
    }
}
