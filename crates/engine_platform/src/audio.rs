//! Fire-and-forget sound clips.
//!
//! Samples are decoded elsewhere; a [`Clip`] only shares them with whatever
//! [`AudioBackend`] mixes them. Gains are linear; backends receive the
//! effective gain in decibels.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

/// One playback submitted to a backend.
#[derive(Debug, Clone)]
pub struct PlayRequest {
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
    /// `20 · log10(gain · base_gain)`.
    pub gain_db: f32,
}

/// Something that can start playing a request without blocking the caller.
pub trait AudioBackend: Send + Sync {
    fn submit(&self, request: PlayRequest) -> anyhow::Result<()>;
}

/// A pre-decoded sound with a base gain applied to every playback.
#[derive(Debug, Clone)]
pub struct Clip {
    samples: Arc<[f32]>,
    sample_rate: u32,
    base_gain: f32,
}

impl Clip {
    /// A clip played at the per-call gain alone (base gain 1.0).
    #[must_use]
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Self {
        Self::with_gain(samples, sample_rate, 1.0)
    }

    /// A clip whose every playback is scaled by `base_gain`.
    #[must_use]
    pub fn with_gain(samples: impl Into<Arc<[f32]>>, sample_rate: u32, base_gain: f32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
            base_gain,
        }
    }

    /// Effective gain in decibels, or `None` when the product of `gain` and
    /// the base gain is not positive (silence).
    pub fn gain_db(&self, gain: f32) -> Option<f32> {
        let effective = f64::from(gain) * f64::from(self.base_gain);
        (effective > 0.0).then(|| (20.0 * effective.log10()) as f32)
    }

    /// Starts a playback at `gain` on `backend`. Silent playbacks are not
    /// submitted.
    pub fn play(&self, backend: &dyn AudioBackend, gain: f32) -> anyhow::Result<()> {
        let Some(gain_db) = self.gain_db(gain) else {
            trace!(gain, base_gain = self.base_gain, "silent playback skipped");
            return Ok(());
        };
        backend.submit(PlayRequest {
            samples: Arc::clone(&self.samples),
            sample_rate: self.sample_rate,
            gain_db,
        })
    }
}

/// Backend that accepts and discards every request.
#[derive(Debug, Default)]
pub struct NullAudio {
    discarded: AtomicU64,
}

impl NullAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

impl AudioBackend for NullAudio {
    fn submit(&self, request: PlayRequest) -> anyhow::Result<()> {
        trace!(samples = request.samples.len(), gain_db = request.gain_db, "discarding playback");
        self.discarded.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
