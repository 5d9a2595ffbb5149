//! Presentation of a finished frame.

use crate::canvas::Canvas;

/// Receives each frame after `draw` has run.
///
/// A windowed implementation scales the canvas up by the configured pixel
/// scale; the headless one only records what it was given.
pub trait Surface: Send {
    fn present(&mut self, canvas: &Canvas) -> anyhow::Result<()>;
}

/// A surface with no window behind it.
#[derive(Debug, Default, Clone)]
pub struct HeadlessSurface {
    frames: u64,
    last_checksum: Option<u64>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Sum of the pixels of the most recent frame, if any.
    pub fn last_checksum(&self) -> Option<u64> {
        self.last_checksum
    }
}

impl Surface for HeadlessSurface {
    fn present(&mut self, canvas: &Canvas) -> anyhow::Result<()> {
        self.frames += 1;
        self.last_checksum = Some(canvas.pixels().iter().map(|&p| u64::from(p)).sum());
        Ok(())
    }
}
