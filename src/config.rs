//! Runtime tuning loaded from an optional YAML file

use crate::{
    constants::{
        DEFAULT_ANNOTATION_FRAMES, DEFAULT_COOLDOWN_FRAMES, DEFAULT_FRAME_HEIGHT,
        DEFAULT_FRAME_MARGIN, DEFAULT_FRAME_WIDTH, DEFAULT_IDLE_SLEEP_MS, DEFAULT_QUEUE_CAPACITY,
        DEFAULT_RENDER_WAIT_MS, DEFAULT_SCROLL_DECAY, DEFAULT_SCROLL_STEP,
        DEFAULT_SCROLL_THRESHOLD, DEFAULT_SCROLL_TICK, DEFAULT_SMOOTHING_FACTOR, MAX_ZOOM_SCALE,
        MIN_ZOOM_SCALE, ZOOM_STEP,
    },
    dispatcher::DispatchTuning,
    filters::{create_filter, PointFilter},
    pipeline::{PipelineSettings, ZoomControl},
    scroll::ScrollTuning,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera configuration
    pub capture: CaptureConfig,

    /// Queue and stage timing
    pub pipeline: PipelineConfig,

    /// Gesture dispatch timing
    pub dispatch: DispatchConfig,

    /// Scroll integrator tuning
    pub scroll: ScrollConfig,

    /// Cursor follow configuration
    pub cursor: CursorConfig,

    /// Digital zoom bounds
    pub zoom: ZoomConfig,

    /// Hand landmark model
    pub vision: VisionConfig,
}

/// Camera parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index
    pub camera_index: i32,

    /// Requested frame width
    pub width: u32,

    /// Requested frame height
    pub height: u32,
}

/// Pipeline queue and timing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capacity of each frame queue
    pub queue_capacity: usize,

    /// Processing sleep when no frame is waiting (ms)
    pub idle_sleep_ms: u64,

    /// Render wait for the next frame (ms)
    pub render_wait_ms: u64,
}

/// One-shot and continuous action parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Iterations a one-shot action is frozen after firing
    pub cooldown_frames: u32,

    /// Frames a click/drag annotation stays visible
    pub annotation_frames: u32,

    /// Velocity added per iteration of a held scroll gesture
    pub scroll_step: f64,
}

/// Scroll tick emission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Wheel amount per tick
    pub tick: f64,

    /// Velocity multiplier after a tick (0.0-1.0)
    pub decay: f64,

    /// Minimum |velocity| that emits a tick
    pub threshold: f64,
}

/// Cursor follow parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Smoothing filter name (exponential, moving_average, none)
    pub filter: String,

    /// Exponential divisor, or moving average window
    pub smoothing: f64,

    /// Frame border ignored when mapping to the screen (px)
    pub margin: u32,
}

/// Zoom bounds and key step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Hand landmark model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Path to the hand landmark ONNX model
    pub hand_model: PathBuf,

    /// Minimum hand presence score (0.0-1.0)
    pub min_confidence: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_sleep_ms: DEFAULT_IDLE_SLEEP_MS,
            render_wait_ms: DEFAULT_RENDER_WAIT_MS,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cooldown_frames: DEFAULT_COOLDOWN_FRAMES,
            annotation_frames: DEFAULT_ANNOTATION_FRAMES,
            scroll_step: DEFAULT_SCROLL_STEP,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_SCROLL_TICK,
            decay: DEFAULT_SCROLL_DECAY,
            threshold: DEFAULT_SCROLL_THRESHOLD,
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            filter: "exponential".to_string(),
            smoothing: DEFAULT_SMOOTHING_FACTOR,
            margin: DEFAULT_FRAME_MARGIN,
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM_SCALE,
            max: MAX_ZOOM_SCALE,
            step: ZOOM_STEP,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            hand_model: PathBuf::from("assets/hand_landmark.onnx"),
            min_confidence: 0.7,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Dispatcher tuning from the dispatch, scroll and cursor sections
    #[must_use]
    pub fn dispatch_tuning(&self) -> DispatchTuning {
        DispatchTuning {
            cooldown_frames: self.dispatch.cooldown_frames,
            annotation_frames: self.dispatch.annotation_frames,
            frame_margin: self.cursor.margin,
            scroll: ScrollTuning {
                step: self.dispatch.scroll_step,
                tick: self.scroll.tick,
                decay: self.scroll.decay,
                threshold: self.scroll.threshold,
            },
        }
    }

    #[must_use]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            queue_capacity: self.pipeline.queue_capacity,
            idle_sleep: Duration::from_millis(self.pipeline.idle_sleep_ms),
            render_wait: Duration::from_millis(self.pipeline.render_wait_ms),
        }
    }

    /// Zoom control starting at `initial`, within the configured bounds
    #[must_use]
    pub fn zoom_control(&self, initial: f64) -> ZoomControl {
        ZoomControl::new(initial, self.zoom.min, self.zoom.max, self.zoom.step)
    }

    /// Create the cursor smoothing filter
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown filter name or bad smoothing value
    pub fn create_cursor_filter(&self) -> Result<Box<dyn PointFilter>> {
        create_filter(&self.cursor.filter, self.cursor.smoothing)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first out-of-range value
    pub fn validate(&self) -> Result<()> {
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(Error::ConfigError(
                "Capture width and height must be greater than 0".to_string(),
            ));
        }
        if self.capture.camera_index < 0 {
            return Err(Error::ConfigError("Camera index must not be negative".to_string()));
        }

        if self.pipeline.queue_capacity == 0 {
            return Err(Error::ConfigError(
                "Queue capacity must be greater than 0".to_string(),
            ));
        }

        if !(self.dispatch.scroll_step.is_finite() && self.dispatch.scroll_step > 0.0) {
            return Err(Error::ConfigError("Scroll step must be positive".to_string()));
        }
        if !(self.scroll.tick.is_finite() && self.scroll.tick > 0.0) {
            return Err(Error::ConfigError("Scroll tick must be positive".to_string()));
        }
        if !(0.0..1.0).contains(&self.scroll.decay) {
            return Err(Error::ConfigError(
                "Scroll decay must be in [0.0, 1.0)".to_string(),
            ));
        }
        if !(self.scroll.threshold.is_finite() && self.scroll.threshold > 0.0) {
            return Err(Error::ConfigError("Scroll threshold must be positive".to_string()));
        }

        if !(self.cursor.smoothing.is_finite() && self.cursor.smoothing >= 1.0) {
            return Err(Error::ConfigError(
                "Cursor smoothing must be at least 1.0".to_string(),
            ));
        }

        if !(self.zoom.min >= 1.0 && self.zoom.min <= self.zoom.max && self.zoom.max.is_finite()) {
            return Err(Error::ConfigError(
                "Zoom bounds must satisfy 1.0 <= min <= max".to_string(),
            ));
        }
        if !(self.zoom.step.is_finite() && self.zoom.step > 0.0) {
            return Err(Error::ConfigError("Zoom step must be positive".to_string()));
        }

        if !(0.0..=1.0).contains(&self.vision.min_confidence) {
            return Err(Error::ConfigError(
                "Minimum hand confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Mouse Configuration

# Camera
capture:
  camera_index: 0
  width: 640
  height: 480

# Frame queues and stage timing
pipeline:
  queue_capacity: 3
  idle_sleep_ms: 1
  render_wait_ms: 10

# Gesture dispatch
dispatch:
  cooldown_frames: 15
  annotation_frames: 15
  scroll_step: 2.0

# Scroll ticks
scroll:
  tick: 0.7
  decay: 0.3
  threshold: 1.0

# Cursor follow
cursor:
  filter: "exponential"
  smoothing: 7.0
  margin: 100

# Digital zoom
zoom:
  min: 1.0
  max: 4.0
  step: 0.1

# Hand landmark model
vision:
  hand_model: "assets/hand_landmark.onnx"
  min_confidence: 0.7
"#;
