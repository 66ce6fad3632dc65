//! Error handling tests for all modules

use hand_mouse::{
    error::AppError,
    filters::create_filter,
    frame::{Frame, FrameSize},
    landmarks::{Landmark, LandmarkSet},
    utils::safe_cast::{f64_to_i32, f64_to_i32_clamp, i32_to_i16_clamp, u32_to_i32},
};

#[test]
fn test_filter_creation_errors() {
    assert!(create_filter("invalid_filter", 7.0).is_err());

    match create_filter("moving_average", 0.0) {
        Err(AppError::FilterError(msg)) => assert!(msg.contains("Window size")),
        _ => panic!("Expected FilterError"),
    }

    match create_filter("exponential", 0.5) {
        Err(AppError::FilterError(msg)) => assert!(msg.contains("Smoothing factor")),
        _ => panic!("Expected FilterError"),
    }

    assert!(create_filter("exponential", f64::NAN).is_err());
    assert!(create_filter("exponential", f64::INFINITY).is_err());

    // Names are case-insensitive
    assert!(create_filter("Exponential", 7.0).is_ok());
    assert!(create_filter("NONE", 0.0).is_ok());
}

#[test]
fn test_landmark_set_errors() {
    let points = vec![Landmark::default(); 20];
    match LandmarkSet::new(&points) {
        Err(AppError::InvalidInput(msg)) => assert!(msg.contains("21")),
        _ => panic!("Expected InvalidInput"),
    }

    let mut entries: Vec<(usize, f64, f64, f64)> = (0..21).map(|i| (i, 0.5, 0.5, 0.0)).collect();
    assert!(LandmarkSet::from_indexed(&entries).is_ok());

    entries[3].0 = 4;
    assert!(LandmarkSet::from_indexed(&entries).is_err(), "duplicate index");

    entries[3].0 = 21;
    assert!(LandmarkSet::from_indexed(&entries).is_err(), "index out of range");

    entries[3].0 = 3;
    assert!(LandmarkSet::from_indexed(&entries[..20]).is_err(), "missing index");
}

#[test]
fn test_frame_buffer_size_mismatch() {
    let size = FrameSize::new(4, 2);
    assert!(Frame::from_rgb_bytes(size, vec![0; 24]).is_ok());
    match Frame::from_rgb_bytes(size, vec![0; 23]) {
        Err(AppError::InvalidInput(msg)) => assert!(msg.contains("4x2")),
        _ => panic!("Expected InvalidInput"),
    }
}

#[test]
fn test_safe_cast_errors() {
    assert!(u32_to_i32(u32::MAX).is_err());
    assert_eq!(u32_to_i32(1920).unwrap(), 1920);

    assert!(f64_to_i32(f64::NAN).is_err());
    assert!(f64_to_i32(f64::INFINITY).is_err());
    assert!(f64_to_i32(1e12).is_err());
    assert_eq!(f64_to_i32(-3.9).unwrap(), -3);

    assert_eq!(f64_to_i32_clamp(f64::NAN, 0, 10), 0);
    assert_eq!(f64_to_i32_clamp(99.0, 0, 10), 10);
    assert_eq!(i32_to_i16_clamp(100_000, i32::MIN, i32::MAX), i16::MAX);
}

#[test]
fn test_error_messages() {
    let error = AppError::Camera("Camera 3 could not be opened".to_string());
    assert_eq!(error.to_string(), "Camera error: Camera 3 could not be opened");

    let error: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(error.to_string().starts_with("IO error"));

    let error: AppError = serde_json::from_str::<u8>("nope").unwrap_err().into();
    assert!(matches!(error, AppError::Json(_)));
}
