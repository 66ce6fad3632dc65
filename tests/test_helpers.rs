//! Helper functions and utilities for tests
#![allow(dead_code)]

use hand_mouse::{
    frame::{Frame, FrameSize, FrameSource},
    gestures::GestureDefinition,
    input::{InputSink, MouseButton, ScrollDirection},
    landmarks::{Landmark, LandmarkSet, LandmarkSource},
    profile::Profile,
    store::{ConfigStore, RuntimeSettings},
    Error, Result,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub const FRAME: FrameSize = FrameSize::new(640, 480);

/// Something that happened at the edge of the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MoveTo(i32, i32),
    Click(MouseButton),
    DoubleClick,
    DragStart,
    DragEnd,
    Scroll(ScrollDirection, f64),
    CameraReleased,
    DetectorClosed,
}

/// Shared, ordered record of events from sinks and sources
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    pub fn position(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    /// Events that are not pointer moves
    pub fn actions(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, Event::MoveTo(..)))
            .collect()
    }

    /// Poll until `event` shows up or `timeout` passes
    pub fn wait_for(&self, event: &Event, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.position(event).is_some() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }
}

/// Input sink that records every call
pub struct RecordingSink {
    log: EventLog,
    screen: (u32, u32),
    failing: bool,
}

impl RecordingSink {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            screen: (1920, 1080),
            failing: false,
        }
    }

    /// Records calls but reports every one as failed
    pub fn failing(log: &EventLog) -> Self {
        Self {
            failing: true,
            ..Self::new(log)
        }
    }

    fn record(&self, event: Event) -> Result<()> {
        self.log.push(event);
        if self.failing {
            Err(Error::InputSink("simulated failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl InputSink for RecordingSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.record(Event::MoveTo(x, y))
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.record(Event::Click(button))
    }

    fn double_click(&mut self) -> Result<()> {
        self.record(Event::DoubleClick)
    }

    fn drag_start(&mut self) -> Result<()> {
        self.record(Event::DragStart)
    }

    fn drag_end(&mut self) -> Result<()> {
        self.record(Event::DragEnd)
    }

    fn scroll(&mut self, direction: ScrollDirection, amount: f64) -> Result<()> {
        self.record(Event::Scroll(direction, amount))
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }
}

/// Frame source yielding blank frames
pub struct ScriptedSource {
    log: EventLog,
    remaining: Option<usize>,
    interval: Duration,
}

impl ScriptedSource {
    /// `frames` frames, then end of stream
    pub fn finite(frames: usize, log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            remaining: Some(frames),
            interval: Duration::from_millis(1),
        }
    }

    /// Frames until released
    pub fn endless(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            remaining: None,
            interval: Duration::from_millis(2),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn read(&mut self) -> Result<Option<Frame>> {
        match &mut self.remaining {
            Some(0) => return Ok(None),
            Some(n) => *n -= 1,
            None => {}
        }
        thread::sleep(self.interval);
        Ok(Some(Frame::blank(FRAME)))
    }

    fn release(&mut self) {
        self.log.push(Event::CameraReleased);
    }
}

/// Landmark source replaying a script, repeating the last entry
pub struct ScriptedLandmarks {
    log: EventLog,
    script: Vec<Option<LandmarkSet>>,
    next: usize,
}

impl ScriptedLandmarks {
    pub fn new(script: Vec<Option<LandmarkSet>>, log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            script,
            next: 0,
        }
    }

    pub fn constant(hand: Option<LandmarkSet>, log: &EventLog) -> Self {
        Self::new(vec![hand], log)
    }
}

impl LandmarkSource for ScriptedLandmarks {
    fn detect(&mut self, _frame: &Frame) -> Result<Option<LandmarkSet>> {
        let index = self.next.min(self.script.len().saturating_sub(1));
        self.next += 1;
        Ok(self.script.get(index).cloned().flatten())
    }

    fn annotate(&mut self, _frame: &mut Frame, _hand: &LandmarkSet) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) {
        self.log.push(Event::DetectorClosed);
    }
}

/// In-memory config store
#[derive(Default)]
pub struct MemoryStore {
    pub profiles: HashMap<String, Profile>,
    pub gestures: Vec<GestureDefinition>,
    pub settings: Mutex<RuntimeSettings>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> RuntimeSettings {
        self.settings.lock().unwrap().clone()
    }
}

impl ConfigStore for MemoryStore {
    fn load_profiles(&self) -> Result<HashMap<String, Profile>> {
        Ok(self.profiles.clone())
    }

    fn load_gesture_definitions(&self) -> Result<Vec<GestureDefinition>> {
        Ok(self.gestures.clone())
    }

    fn load_runtime_settings(&self) -> Result<RuntimeSettings> {
        Ok(self.settings())
    }

    fn save_runtime_settings(&self, settings: &RuntimeSettings) -> Result<()> {
        *self.settings.lock().unwrap() = settings.clone();
        Ok(())
    }
}

/// Open hand: fingers spread and extended, every fingertip far from the thumb
pub fn open_hand_points() -> Vec<Landmark> {
    let raw: [(f64, f64); 21] = [
        (0.50, 0.90),
        // thumb
        (0.40, 0.80),
        (0.35, 0.72),
        (0.30, 0.65),
        (0.25, 0.60),
        // index
        (0.42, 0.60),
        (0.42, 0.50),
        (0.42, 0.42),
        (0.42, 0.35),
        // middle
        (0.50, 0.58),
        (0.50, 0.47),
        (0.50, 0.38),
        (0.50, 0.30),
        // ring
        (0.58, 0.60),
        (0.58, 0.50),
        (0.58, 0.42),
        (0.58, 0.36),
        // pinky
        (0.66, 0.64),
        (0.66, 0.56),
        (0.66, 0.50),
        (0.66, 0.44),
    ];
    raw.iter().map(|&(x, y)| Landmark::new(x, y, 0.0)).collect()
}

pub fn open_hand() -> LandmarkSet {
    LandmarkSet::new(&open_hand_points()).unwrap()
}

/// Open hand with the given fingertips moved `distance_px` to the right of
/// the thumb tip
pub fn touching(tips: &[usize], distance_px: f64) -> LandmarkSet {
    let mut points = open_hand_points();
    let thumb = points[4];
    for &tip in tips {
        points[tip] = Landmark::new(
            thumb.x + distance_px / f64::from(FRAME.width),
            thumb.y,
            0.0,
        );
    }
    LandmarkSet::new(&points).unwrap()
}

/// Thumb and index tips `distance_px` apart
pub fn pinch(distance_px: f64) -> LandmarkSet {
    touching(&[8], distance_px)
}

/// Index pointing up, the other three fingers curled
pub fn fist_index_up() -> LandmarkSet {
    let mut points = open_hand_points();
    for (tip, pip) in [(12, 10), (16, 14), (20, 18)] {
        points[tip] = Landmark::new(points[tip].x, points[pip].y + 0.05, 0.0);
    }
    LandmarkSet::new(&points).unwrap()
}
