/// Multiplicative step used by the zoom-in / zoom-out buttons.
pub const ZOOM_STEP_FACTOR: f64 = 1.1;

/// Wheel factor applied when scrolling toward the user (zoom in).
pub const WHEEL_ZOOM_IN_FACTOR: f64 = 1.1;

/// Wheel factor applied when scrolling away from the user (zoom out).
pub const WHEEL_ZOOM_OUT_FACTOR: f64 = 0.9;

/// Upper bound for the viewport scale.
pub const MAX_SCALE: f64 = 5.0;

/// Natural size. Fitting never upscales past this.
pub const NATURAL_SCALE: f64 = 1.0;

/// Tolerance for deciding whether a zoom actually changed the scale.
pub const SCALE_EPSILON: f64 = 1e-9;

/// Quiet period after the last rotate click before the batch fires.
pub const DEFAULT_QUIESCENCE_MS: u64 = 3_000;

/// Rotation contributed by a single click, in degrees.
pub const DEFAULT_DEGREES_PER_CLICK: i32 = 90;

/// How often a due rotate batch looks again while its file is still being
/// rotated.
pub const BUSY_RETRY_MS: u64 = 100;

/// How long a close request waits for in-flight rotations.
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5_000;

/// Poll interval while waiting for in-flight rotations during shutdown.
pub const DEFAULT_SHUTDOWN_POLL_MS: u64 = 100;

/// Suffix for the sibling backup file created before an in-place edit.
pub const BACKUP_SUFFIX: &str = "lens-backup";
