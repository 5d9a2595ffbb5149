//! Frame-coherent keyboard and mouse state fed from a platform thread.
//!
//! Platform callbacks push [`InputEvent`]s through an [`InputSender`]. The
//! simulation side holds an [`Input`] and sees those events only after
//! [`Input::clean`], which the frame stepper calls after every sub-step:
//! edge state (`*_pressed`, `*_released`, wheel) is cleared first, then the
//! queue is drained into the new sub-step's state. Level state (`is_*_down`,
//! pointer position) carries over.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{Receiver, Sender};
use tracing::trace;

use crate::error::PlatformError;

/// Platform key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl MouseButton {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
        }
    }
}

/// One raw event from the platform layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    /// Pointer position in canvas pixels.
    PointerMoved { x: f32, y: f32 },
    /// Wheel movement in lines; positive is away from the user.
    Wheel(f32),
}

#[derive(Debug, Clone, Copy, Default)]
struct ButtonFrame {
    down: bool,
    pressed: bool,
    released: bool,
}

#[derive(Debug, Default)]
struct InputState {
    keys_down: HashSet<Key>,
    keys_pressed: HashSet<Key>,
    keys_released: HashSet<Key>,
    buttons: [ButtonFrame; MouseButton::COUNT],
    pointer: (f32, f32),
    wheel: f32,
}

impl InputState {
    fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                // Auto-repeat arrives as repeated downs; only the first is an edge.
                if self.keys_down.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            InputEvent::KeyUp(key) => {
                if self.keys_down.remove(&key) {
                    self.keys_released.insert(key);
                }
            }
            InputEvent::ButtonDown(button) => {
                let frame = &mut self.buttons[button.index()];
                if !frame.down {
                    frame.down = true;
                    frame.pressed = true;
                }
            }
            InputEvent::ButtonUp(button) => {
                let frame = &mut self.buttons[button.index()];
                if frame.down {
                    frame.down = false;
                    frame.released = true;
                }
            }
            InputEvent::PointerMoved { x, y } => self.pointer = (x, y),
            InputEvent::Wheel(lines) => self.wheel += lines,
        }
    }

    fn clear_transients(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        for frame in &mut self.buttons {
            frame.pressed = false;
            frame.released = false;
        }
        self.wheel = 0.0;
    }
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (InputSender, Input) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        InputSender { tx },
        Input {
            state: Arc::new(Mutex::new(InputState::default())),
            rx,
        },
    )
}

/// Platform-side handle; cheap to clone and usable from any thread.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<InputEvent>,
}

impl InputSender {
    /// Queues an event for the next [`Input::clean`].
    ///
    /// # Errors
    ///
    /// [`PlatformError::InputClosed`] once every [`Input`] has been dropped.
    pub fn send(&self, event: InputEvent) -> Result<(), PlatformError> {
        self.tx.send(event).map_err(|_| PlatformError::InputClosed)
    }
}

/// Simulation-side view of the input state.
///
/// Clones share state, so the scheduler and the simulation can each hold one.
#[derive(Debug, Clone)]
pub struct Input {
    state: Arc<Mutex<InputState>>,
    rx: Receiver<InputEvent>,
}

impl Input {
    /// Ends the current sub-step: clears edge state, then applies every
    /// queued event.
    pub fn clean(&self) {
        let mut state = self.lock();
        state.clear_transients();
        while let Ok(event) = self.rx.try_recv() {
            trace!(?event, "input event");
            state.apply(event);
        }
    }

    #[must_use]
    pub fn is_key_down(&self, key: Key) -> bool {
        self.lock().keys_down.contains(&key)
    }

    /// `true` only for the sub-step in which `key` went down.
    #[must_use]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.lock().keys_pressed.contains(&key)
    }

    /// `true` only for the sub-step in which `key` went up.
    #[must_use]
    pub fn key_released(&self, key: Key) -> bool {
        self.lock().keys_released.contains(&key)
    }

    #[must_use]
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.lock().buttons[button.index()].down
    }

    #[must_use]
    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.lock().buttons[button.index()].pressed
    }

    #[must_use]
    pub fn button_released(&self, button: MouseButton) -> bool {
        self.lock().buttons[button.index()].released
    }

    /// Last reported pointer position.
    #[must_use]
    pub fn pointer(&self) -> (f32, f32) {
        self.lock().pointer
    }

    /// Wheel lines accumulated since the last [`clean`](Self::clean).
    #[must_use]
    pub fn wheel(&self) -> f32 {
        self.lock().wheel
    }

    /// Number of events waiting for the next [`clean`](Self::clean).
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    fn lock(&self) -> MutexGuard<'_, InputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
