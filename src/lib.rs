//! Hand gesture mouse control.
//!
//! A webcam frame stream is turned into pointer actions:
//! 1. Capture reads, mirrors and zooms frames into a small drop-newest queue
//! 2. Processing detects hand landmarks and classifies named gestures
//! 3. The action dispatcher maps gestures to clicks, drags and smooth scrolling
//!    according to the active profile, and makes the cursor follow the hand
//! 4. Rendering shows the annotated frame with short-lived action labels
//!
//! Camera, landmark detection and the preview window are behind the `vision`
//! cargo feature. Everything else runs on plain [`image::RgbImage`] frames, so
//! the core can be driven by scripted sources in tests.
//!
//! # Example
//!
//! ```no_run
//! use hand_mouse::{
//!     dispatcher::{ActionDispatcher, DispatchTuning},
//!     frame::FrameSize,
//!     gestures::GestureTable,
//!     input::DryRunSink,
//!     profile::Profile,
//! };
//! use std::sync::Arc;
//!
//! let profile = Profile::builtin("touch").unwrap_or_default();
//! let mut dispatcher = ActionDispatcher::new(
//!     profile,
//!     Arc::new(GestureTable::presets()),
//!     DryRunSink::new(1920, 1080),
//!     DispatchTuning::default(),
//! );
//!
//! // No hand in view: cooldowns tick, nothing fires
//! let annotations = dispatcher.step(None, FrameSize::new(640, 480));
//! assert!(annotations.is_empty());
//! ```

/// Application wiring and run modes
pub mod app;

/// Configuration management
pub mod config;

/// Constants used throughout the application
pub mod constants;

/// Start/stop control channel for an external shell
pub mod control;

/// Screen mapping and X11 pointer control
pub mod cursor_control;

/// Gesture → action dispatch with edge triggering and cooldowns
pub mod dispatcher;

/// Error types and result handling
pub mod error;

/// Cursor smoothing filters
pub mod filters;

/// Owned RGB frames and frame sources
pub mod frame;

/// Named gesture classification over hand landmarks
pub mod gestures;

/// Pointer action sink interface
pub mod input;

/// Hand landmark types and landmark sources
pub mod landmarks;

/// Capture, processing and render stages
pub mod pipeline;

/// Action → gesture profiles
pub mod profile;

/// Bounded drop-newest frame queue
pub mod queue;

/// Preview display, overlays and the render loop
pub mod render;

/// Smooth scroll velocity integration
pub mod scroll;

/// Persisted profiles, gestures, settings and texts
pub mod store;

/// Numeric helpers
pub mod utils;

/// `OpenCV` camera, `ONNX` hand detector and highgui preview
#[cfg(feature = "vision")]
pub mod vision;

pub use error::{Error, Result};
