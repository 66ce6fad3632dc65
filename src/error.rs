//! Error types for the hand mouse library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON store could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `OpenCV` operation failed
    #[cfg(feature = "vision")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[cfg(feature = "vision")]
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// `X11` window system operation failed
    #[error("X11 error: {0}")]
    X11(String),

    /// Camera could not be opened or read
    #[error("Camera error: {0}")]
    Camera(String),

    /// Hand landmark detection failed
    #[error("Landmark source error: {0}")]
    LandmarkSource(String),

    /// Pointer, button or wheel injection failed
    #[error("Input sink error: {0}")]
    InputSink(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Filter initialization error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Model loading or output error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
