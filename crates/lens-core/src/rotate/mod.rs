pub mod backend;
pub mod batcher;
pub mod display;
pub mod fs_backend;
pub mod pipeline;
pub mod safety;
pub mod timer;

pub use backend::{BackendOp, ImageBackend};
pub use batcher::{BatchCallback, BusyCheck, ClickBatcher};
pub use display::ImageDisplay;
pub use fs_backend::FsImageBackend;
pub use pipeline::{Checkpoint, MutationPipeline, RotateEvent, RotateOutcome};
pub use safety::{RotationSafetyManager, RotationTicket, ShutdownOutcome};
pub use timer::DelayedTask;
