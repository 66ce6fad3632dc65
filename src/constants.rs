//! Constants used throughout the application

/// Number of tracked hand landmarks
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Landmark indices of the joints used by the classifier
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Fingertip distance (pixels) below which two fingers touch
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 40.0;

/// Normalized height the index tip must clear its PIP joint by
pub const DEFAULT_INDEX_TIP_TO_PIP_OFFSET: f64 = 0.03;

/// Normalized depth a folded fingertip must sit below its PIP joint
pub const DEFAULT_OTHERS_FOLDED_OFFSET: f64 = 0.015;

/// Iterations a one-shot action stays frozen after firing
pub const DEFAULT_COOLDOWN_FRAMES: u32 = 15;

/// Frames an ephemeral annotation stays on screen
pub const DEFAULT_ANNOTATION_FRAMES: u32 = 15;

/// Velocity added per iteration while a scroll gesture holds
pub const DEFAULT_SCROLL_STEP: f64 = 2.0;

/// Wheel amount emitted per scroll tick
pub const DEFAULT_SCROLL_TICK: f64 = 0.7;

/// Multiplier applied to scroll velocity after each tick
pub const DEFAULT_SCROLL_DECAY: f64 = 0.3;

/// Minimum |velocity| that produces a tick
pub const DEFAULT_SCROLL_THRESHOLD: f64 = 1.0;

/// Cursor low-pass divisor
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 7.0;

/// Frame border (pixels) ignored when mapping the hand to the screen
pub const DEFAULT_FRAME_MARGIN: u32 = 100;

/// Capacity of the raw and annotated frame queues
pub const DEFAULT_QUEUE_CAPACITY: usize = 3;

/// Processing stage sleep when the raw queue is empty
pub const DEFAULT_IDLE_SLEEP_MS: u64 = 1;

/// Render stage wait for the next annotated frame
pub const DEFAULT_RENDER_WAIT_MS: u64 = 10;

/// Digital zoom bounds and key step
pub const DEFAULT_ZOOM_SCALE: f64 = 1.5;
pub const MIN_ZOOM_SCALE: f64 = 1.0;
pub const MAX_ZOOM_SCALE: f64 = 4.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Requested capture resolution
pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Screen size assumed when no display server is available
pub const FALLBACK_SCREEN_WIDTH: u32 = 1920;
pub const FALLBACK_SCREEN_HEIGHT: u32 = 1080;
