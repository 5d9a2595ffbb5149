//! # engine_platform
//!
//! Headless platform collaborators for the application shell: a software
//! [`Canvas`] that `draw` renders into, the [`Surface`] it is presented on,
//! frame-coherent [`Input`] fed from another thread, and audio [`Clip`]s.

pub mod audio;
pub mod canvas;
pub mod error;
pub mod input;
pub mod surface;

pub use audio::{AudioBackend, Clip, NullAudio, PlayRequest};
pub use canvas::{Blittable, Canvas, Sprite};
pub use error::PlatformError;
pub use input::{Input, InputEvent, InputSender, Key, MouseButton};
pub use surface::{HeadlessSurface, Surface};
