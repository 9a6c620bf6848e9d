pub mod gesture;
pub mod state;
pub mod transform;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use gesture::{GestureMode, GestureRouter, InputEvent};
pub use state::{PinchState, Point, Size, Transform, ViewportState};
pub use transform::{TransformEngine, WheelDirection};

/// Transform engine shared between the input path and the rotate pipeline.
pub type SharedViewport = Arc<Mutex<TransformEngine>>;

pub fn lock_viewport(viewport: &SharedViewport) -> MutexGuard<'_, TransformEngine> {
    viewport.lock().unwrap_or_else(PoisonError::into_inner)
}
