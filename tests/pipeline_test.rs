//! Threaded pipeline runs over scripted sources

mod test_helpers;

use hand_mouse::{
    dispatcher::{ActionDispatcher, DispatchTuning},
    frame::Frame,
    gestures::GestureTable,
    landmarks::LandmarkSet,
    pipeline::{Pipeline, PipelineSettings, StopSignal, ZoomControl},
    profile::Profile,
    render::{Display, HeadlessDisplay, KeyCommand, Overlay},
    Result,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use test_helpers::{
    open_hand, touching, Event, EventLog, MemoryStore, RecordingSink, ScriptedLandmarks, ScriptedSource,
};

fn ring_touch() -> LandmarkSet {
    touching(&[16], 15.0)
}

fn touch_pipeline(
    source: ScriptedSource,
    hand: Option<LandmarkSet>,
    display: Box<dyn Display>,
    zoom: ZoomControl,
    log: &EventLog,
) -> Pipeline<RecordingSink> {
    let dispatcher = ActionDispatcher::new(
        Profile::builtin("touch").unwrap(),
        Arc::new(GestureTable::presets()),
        RecordingSink::new(log),
        DispatchTuning::default(),
    );
    Pipeline::new(
        Box::new(source),
        Box::new(ScriptedLandmarks::constant(hand, log)),
        display,
        dispatcher,
        zoom,
        PipelineSettings::default(),
    )
}

/// Display that answers presented frames with scripted key presses
struct KeyScript {
    keys: VecDeque<KeyCommand>,
    overlays: Arc<Mutex<Vec<String>>>,
}

impl Display for KeyScript {
    fn present(&mut self, _frame: &Frame, overlays: &[Overlay]) -> Result<Option<KeyCommand>> {
        let mut seen = self.overlays.lock().unwrap();
        seen.extend(overlays.iter().map(|o| o.text.clone()));
        Ok(self.keys.pop_front())
    }
}

#[test]
fn test_source_end_releases_drag_before_camera() {
    let log = EventLog::new();
    let store = Arc::new(MemoryStore::new());
    let pipeline = touch_pipeline(
        ScriptedSource::finite(20, &log),
        Some(ring_touch()),
        Box::new(HeadlessDisplay::new()),
        ZoomControl::new(2.0, 1.0, 4.0, 0.1),
        &log,
    )
    .with_store(store.clone());

    let report = pipeline.run(&StopSignal::new());

    assert_eq!(report.frames_captured, 20);
    assert_eq!(report.frames_processed, report.frames_captured - report.frames_dropped_capture);
    assert!(report.frames_processed >= 1);
    assert!(report.drag_released);

    assert_eq!(log.count(&Event::DragStart), 1);
    assert_eq!(log.count(&Event::DragEnd), 1);
    assert_eq!(log.count(&Event::CameraReleased), 1);
    let drag_end = log.position(&Event::DragEnd).unwrap();
    let released = log.position(&Event::CameraReleased).unwrap();
    let closed = log.position(&Event::DetectorClosed).unwrap();
    assert!(drag_end < released);
    assert!(released < closed);

    assert!((store.settings().scale - 2.0).abs() < 1e-9);
}

#[test]
fn test_stop_signal_releases_drag_exactly_once() {
    let log = EventLog::new();
    let pipeline = touch_pipeline(
        ScriptedSource::endless(&log),
        Some(ring_touch()),
        Box::new(HeadlessDisplay::new()),
        ZoomControl::default(),
        &log,
    );

    let stop = StopSignal::new();
    let runner = {
        let stop = stop.clone();
        thread::spawn(move || pipeline.run(&stop))
    };

    assert!(log.wait_for(&Event::DragStart, Duration::from_secs(5)));
    stop.trigger();
    let report = runner.join().unwrap();

    assert!(report.drag_released);
    assert_eq!(log.count(&Event::DragEnd), 1);
    assert!(log.position(&Event::DragEnd).unwrap() < log.position(&Event::CameraReleased).unwrap());
}

#[test]
fn test_no_hand_no_actions() {
    let log = EventLog::new();
    let pipeline = touch_pipeline(
        ScriptedSource::finite(10, &log),
        None,
        Box::new(HeadlessDisplay::new()),
        ZoomControl::default(),
        &log,
    );

    let report = pipeline.run(&StopSignal::new());

    assert!(!report.drag_released);
    assert_eq!(report.hands_detected, 0);
    assert_eq!(log.events(), vec![Event::CameraReleased, Event::DetectorClosed]);
}

#[test]
fn test_keys_zoom_and_quit() {
    let log = EventLog::new();
    let overlays = Arc::new(Mutex::new(Vec::new()));
    let display = KeyScript {
        keys: VecDeque::from([KeyCommand::ZoomIn, KeyCommand::ZoomIn, KeyCommand::ZoomOut, KeyCommand::Quit]),
        overlays: overlays.clone(),
    };
    let store = Arc::new(MemoryStore::new());
    let pipeline = touch_pipeline(
        ScriptedSource::endless(&log),
        Some(open_hand()),
        Box::new(display),
        ZoomControl::default(),
        &log,
    )
    .with_store(store.clone());

    // Quit comes from the display, not from this signal
    let report = pipeline.run(&StopSignal::new());

    assert!((report.final_zoom - 1.6).abs() < 1e-9);
    assert!((store.settings().scale - 1.6).abs() < 1e-9);
    assert_eq!(log.count(&Event::CameraReleased), 1);

    let seen = overlays.lock().unwrap();
    assert_eq!(seen.first().map(String::as_str), Some("ZOOM: 1.50x"));
}
