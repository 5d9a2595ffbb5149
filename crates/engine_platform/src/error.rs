//! Platform-layer error types.

/// Errors raised when building render resources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// A canvas or sprite was requested with a zero dimension.
    #[error("surface size {width}x{height} has a zero dimension")]
    ZeroSize { width: u32, height: u32 },

    /// Sprite pixel data does not match its declared size.
    #[error("expected {expected} pixels, got {actual}")]
    PixelCount { expected: usize, actual: usize },

    /// Every receiving [`Input`](crate::Input) has been dropped.
    #[error("input receiver has been dropped")]
    InputClosed,
}
