use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_DEGREES_PER_CLICK, DEFAULT_QUIESCENCE_MS, DEFAULT_SHUTDOWN_GRACE_MS,
    DEFAULT_SHUTDOWN_POLL_MS, MAX_SCALE, WHEEL_ZOOM_IN_FACTOR, WHEEL_ZOOM_OUT_FACTOR,
    ZOOM_STEP_FACTOR,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub rotate: RotateConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Upper scale bound. The lower bound is derived from the fit scale.
    pub max_scale: f64,
    /// Factor used by the zoom buttons.
    pub step_factor: f64,
    pub wheel_zoom_in_factor: f64,
    pub wheel_zoom_out_factor: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            max_scale: MAX_SCALE,
            step_factor: ZOOM_STEP_FACTOR,
            wheel_zoom_in_factor: WHEEL_ZOOM_IN_FACTOR,
            wheel_zoom_out_factor: WHEEL_ZOOM_OUT_FACTOR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateConfig {
    /// Quiet period after the last click before the batch is applied.
    pub quiescence_ms: u64,
    pub degrees_per_click: i32,
}

impl RotateConfig {
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: DEFAULT_QUIESCENCE_MS,
            degrees_per_click: DEFAULT_DEGREES_PER_CLICK,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long a close request waits for in-flight rotations before
    /// force-cancelling them.
    pub grace_period_ms: u64,
    pub poll_interval_ms: u64,
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: DEFAULT_SHUTDOWN_GRACE_MS,
            poll_interval_ms: DEFAULT_SHUTDOWN_POLL_MS,
        }
    }
}
