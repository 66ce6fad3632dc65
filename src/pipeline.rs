//! Three-stage frame pipeline: capture → processing → render.
//!
//! Capture and render run on their own threads; processing runs on the
//! thread that calls [`Pipeline::run`]. Stages talk only through two lossy
//! bounded queues, the shared zoom scale and two stop flags: the external
//! `stop` anyone may trip, and an internal `halt` that processing trips once
//! its ordered shutdown is under way.

use crate::{
    constants::{
        DEFAULT_IDLE_SLEEP_MS, DEFAULT_QUEUE_CAPACITY, DEFAULT_RENDER_WAIT_MS, DEFAULT_ZOOM_SCALE,
        MAX_ZOOM_SCALE, MIN_ZOOM_SCALE, ZOOM_STEP,
    },
    dispatcher::ActionDispatcher,
    frame::{Frame, FrameSource},
    input::InputSink,
    landmarks::LandmarkSource,
    queue::{frame_queue, Pop, QueueReader, QueueWriter},
    render::{render_loop, Display, RenderItem},
    store::ConfigStore,
};
use log::{debug, error, info, trace, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Cooperative stop flag, polled by the stages
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Digital zoom scale shared by the render stage (writer) and capture (reader)
#[derive(Debug, Clone)]
pub struct ZoomControl {
    bits: Arc<AtomicU64>,
    min: f64,
    max: f64,
    step: f64,
}

impl ZoomControl {
    /// Create a control; `initial` is clamped into `[min, max]`
    #[must_use]
    pub fn new(initial: f64, min: f64, max: f64, step: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let initial = if initial.is_finite() { initial.clamp(min, max) } else { min };
        Self {
            bits: Arc::new(AtomicU64::new(initial.to_bits())),
            min,
            max,
            step,
        }
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Set the scale, clamped; non-finite values are ignored
    pub fn set(&self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return self.scale();
        }
        let scale = scale.clamp(self.min, self.max);
        self.bits.store(scale.to_bits(), Ordering::Relaxed);
        scale
    }

    pub fn zoom_in(&self) -> f64 {
        self.set(self.scale() + self.step)
    }

    pub fn zoom_out(&self) -> f64 {
        self.set(self.scale() - self.step)
    }
}

impl Default for ZoomControl {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_SCALE, MIN_ZOOM_SCALE, MAX_ZOOM_SCALE, ZOOM_STEP)
    }
}

/// Queue and timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub queue_capacity: usize,
    /// Processing sleep when the raw queue is empty
    pub idle_sleep: Duration,
    /// Render wait for the next processed frame
    pub render_wait: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_sleep: Duration::from_millis(DEFAULT_IDLE_SLEEP_MS),
            render_wait: Duration::from_millis(DEFAULT_RENDER_WAIT_MS),
        }
    }
}

/// Frame accounting of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub frames_captured: u64,
    /// Dropped because the raw queue was full
    pub frames_dropped_capture: u64,
    pub frames_processed: u64,
    pub hands_detected: u64,
    /// Dropped because the render queue was full
    pub frames_dropped_render: u64,
    pub frames_rendered: u64,
    /// A drag was held at shutdown and released
    pub drag_released: bool,
    pub final_zoom: f64,
}

/// Everything one camera session needs
pub struct Pipeline<S: InputSink> {
    source: Box<dyn FrameSource>,
    landmarks: Box<dyn LandmarkSource>,
    display: Box<dyn Display>,
    dispatcher: ActionDispatcher<S>,
    zoom: ZoomControl,
    store: Option<Arc<dyn ConfigStore>>,
    settings: PipelineSettings,
}

impl<S: InputSink> Pipeline<S> {
    #[must_use]
    pub fn new(
        source: Box<dyn FrameSource>,
        landmarks: Box<dyn LandmarkSource>,
        display: Box<dyn Display>,
        dispatcher: ActionDispatcher<S>,
        zoom: ZoomControl,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            landmarks,
            display,
            dispatcher,
            zoom,
            store: None,
            settings,
        }
    }

    /// Persist the zoom scale to `store` on shutdown
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub const fn zoom(&self) -> &ZoomControl {
        &self.zoom
    }

    /// Run until `stop` trips, the user quits, or the source runs dry
    ///
    /// Shutdown order: release a held drag, persist the zoom scale, stop the
    /// render and capture stages, release the camera, close the landmark
    /// source.
    pub fn run(self, stop: &StopSignal) -> PipelineReport {
        let Self {
            mut source,
            mut landmarks,
            mut display,
            mut dispatcher,
            zoom,
            store,
            settings,
        } = self;

        let (raw_tx, raw_rx) = frame_queue::<Frame>(settings.queue_capacity);
        let (render_tx, render_rx) = frame_queue::<RenderItem>(settings.queue_capacity);
        let halt = StopSignal::new();
        let mut report = PipelineReport::default();

        info!(
            "Starting pipeline (queue capacity {}, zoom {:.2}x)",
            settings.queue_capacity,
            zoom.scale()
        );

        thread::scope(|scope| {
            let zoom_ref = &zoom;
            let halt_ref = &halt;

            let source_ref: &mut dyn FrameSource = source.as_mut();
            let capture = scope.spawn(move || {
                capture_loop(source_ref, &raw_tx, zoom_ref, halt_ref, settings.idle_sleep)
            });

            let display_ref: &mut dyn Display = display.as_mut();
            let render = scope.spawn(move || {
                render_loop(&render_rx, display_ref, zoom_ref, stop, halt_ref, settings.render_wait)
            });

            let stats = process_loop(
                &raw_rx,
                &render_tx,
                landmarks.as_mut(),
                &mut dispatcher,
                stop,
                settings.idle_sleep,
            );
            report.frames_processed = stats.processed;
            report.hands_detected = stats.hands;
            report.frames_dropped_render = stats.dropped;

            report.drag_released = dispatcher.shutdown();
            report.final_zoom = zoom.scale();
            if let Some(store) = &store {
                persist_zoom(store.as_ref(), report.final_zoom);
            }

            halt.trigger();
            report.frames_rendered = render.join().unwrap_or_else(|_| {
                error!("Render thread panicked");
                0
            });
            let (captured, dropped) = capture.join().unwrap_or_else(|_| {
                error!("Capture thread panicked");
                (0, 0)
            });
            report.frames_captured = captured;
            report.frames_dropped_capture = dropped;
        });

        source.release();
        info!("Camera released");
        landmarks.close();

        info!(
            "Pipeline stopped: {} captured ({} dropped), {} processed, {} rendered ({} dropped)",
            report.frames_captured,
            report.frames_dropped_capture,
            report.frames_processed,
            report.frames_rendered,
            report.frames_dropped_render
        );
        report
    }
}

fn persist_zoom(store: &dyn ConfigStore, scale: f64) {
    let result = store.load_runtime_settings().and_then(|mut settings| {
        settings.scale = scale;
        store.save_runtime_settings(&settings)
    });
    match result {
        Ok(()) => info!("Saved zoom scale {scale:.2}"),
        Err(e) => warn!("Failed to save zoom scale: {e}"),
    }
}

/// Read, mirror, zoom and enqueue frames until `halt` trips or the source ends
///
/// Returns `(captured, dropped)`.
fn capture_loop(
    source: &mut dyn FrameSource,
    writer: &QueueWriter<Frame>,
    zoom: &ZoomControl,
    halt: &StopSignal,
    retry_sleep: Duration,
) -> (u64, u64) {
    let mut captured = 0u64;
    let mut dropped = 0u64;
    let mut failing = false;

    while !halt.is_triggered() {
        match source.read() {
            Ok(Some(frame)) => {
                failing = false;
                let frame = frame.mirrored().zoomed(zoom.scale());
                captured += 1;
                if !writer.push(frame) {
                    dropped += 1;
                    trace!("Raw queue full, frame dropped");
                }
            }
            Ok(None) => {
                info!("Frame source exhausted");
                break;
            }
            Err(e) => {
                if failing {
                    debug!("Frame read still failing: {e}");
                } else {
                    warn!("Failed to read frame: {e}");
                    failing = true;
                }
                thread::sleep(retry_sleep);
            }
        }
    }

    debug!("Capture stage stopped after {captured} frames");
    (captured, dropped)
}

struct ProcessStats {
    processed: u64,
    hands: u64,
    dropped: u64,
}

/// Detect, classify and dispatch until `stop` trips or capture ends
fn process_loop<S: InputSink>(
    reader: &QueueReader<Frame>,
    writer: &QueueWriter<RenderItem>,
    landmarks: &mut dyn LandmarkSource,
    dispatcher: &mut ActionDispatcher<S>,
    stop: &StopSignal,
    idle_sleep: Duration,
) -> ProcessStats {
    let mut stats = ProcessStats {
        processed: 0,
        hands: 0,
        dropped: 0,
    };
    let mut window_start = Instant::now();
    let mut window_frames = 0u32;

    loop {
        if stop.is_triggered() {
            info!("Stop requested");
            break;
        }

        let mut frame = match reader.try_pop() {
            Pop::Item(frame) => frame,
            Pop::Empty => {
                thread::sleep(idle_sleep);
                continue;
            }
            Pop::Closed => {
                info!("Capture ended");
                break;
            }
        };

        let size = frame.size();
        let hand = landmarks.detect(&frame).unwrap_or_else(|e| {
            warn!("Landmark detection failed: {e}");
            None
        });
        if let Some(hand) = &hand {
            stats.hands += 1;
            if let Err(e) = landmarks.annotate(&mut frame, hand) {
                debug!("Failed to draw landmarks: {e}");
            }
        }

        let annotations = dispatcher.step(hand.as_ref(), size);
        stats.processed += 1;

        if !writer.push(RenderItem { frame, annotations }) {
            stats.dropped += 1;
            trace!("Render queue full, frame dropped");
        }

        window_frames += 1;
        let elapsed = window_start.elapsed();
        if elapsed >= Duration::from_secs(5) {
            info!(
                "Processing at {:.1} fps",
                f64::from(window_frames) / elapsed.as_secs_f64()
            );
            window_start = Instant::now();
            window_frames = 0;
        }
    }

    stats
}
