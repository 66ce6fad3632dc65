//! Application wiring: profile selection, device setup and run modes.

use crate::{
    config::Config,
    constants::{FALLBACK_SCREEN_HEIGHT, FALLBACK_SCREEN_WIDTH},
    control::{self, Controller},
    cursor_control::X11Sink,
    dispatcher::ActionDispatcher,
    frame::FrameSource,
    gestures::GestureTable,
    input::{DryRunSink, InputSink},
    landmarks::LandmarkSource,
    pipeline::{Pipeline, PipelineReport, StopSignal},
    profile::Profile,
    render::{Display, HeadlessDisplay},
    store::{ConfigStore, JsonStore, Language, RuntimeSettings},
    Result,
};
use log::{error, info, warn};
use std::collections::HashMap;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// Mode that prints usage instead of starting the camera
pub const HELP_MODE: &str = "help";

/// Profile used when nothing else matches
pub const DEFAULT_PROFILE: &str = "default";

const WINDOW_TITLE: &str = "Hand Mouse";

/// Options taken from the command line
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Explicit profile name, or `help`
    pub mode: Option<String>,
    /// Explicit interface language
    pub lang: Option<Language>,
    /// Directory holding the JSON resources
    pub res_dir: PathBuf,
    /// Overrides `capture.camera_index`
    pub camera_index: Option<i32>,
    /// Log pointer actions instead of performing them
    pub dry_run: bool,
    /// Run without a preview window
    pub headless: bool,
    /// Wait for toggle events on stdin instead of starting right away
    pub control_stdio: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            mode: None,
            lang: None,
            res_dir: PathBuf::from("res"),
            camera_index: None,
            dry_run: false,
            headless: false,
            control_stdio: false,
        }
    }
}

/// Mode and language chosen at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub mode: String,
    pub lang: String,
}

impl Selection {
    #[must_use]
    pub fn is_help(&self) -> bool {
        self.mode == HELP_MODE
    }
}

/// Pick the mode and language, recording them in `settings`
///
/// An explicit mode wins over the last used profile. A stored `help` falls
/// back to the default profile, and `help` itself is never stored.
pub fn select_mode(
    explicit_mode: Option<&str>,
    explicit_lang: Option<Language>,
    settings: &mut RuntimeSettings,
) -> Selection {
    let mode = match explicit_mode {
        Some(mode) => mode.to_string(),
        None if settings.last_profile == HELP_MODE => DEFAULT_PROFILE.to_string(),
        None => settings.last_profile.clone(),
    };
    let lang = explicit_lang.map_or_else(|| settings.lang.clone(), |lang| lang.as_str().to_string());

    if mode != HELP_MODE {
        settings.last_profile.clone_from(&mode);
    }
    settings.lang.clone_from(&lang);

    Selection { mode, lang }
}

/// Profile for `mode`
///
/// Lookup order: stored `mode`, built-in `mode`, stored `default`, built-in
/// `default`.
#[must_use]
pub fn resolve_profile(mode: &str, stored: &HashMap<String, Profile>) -> Profile {
    if let Some(profile) = stored.get(mode).cloned().or_else(|| Profile::builtin(mode)) {
        return profile;
    }
    warn!("Unknown profile '{mode}', using '{DEFAULT_PROFILE}'");
    stored
        .get(DEFAULT_PROFILE)
        .cloned()
        .or_else(|| Profile::builtin(DEFAULT_PROFILE))
        .unwrap_or_default()
}

/// Main application
pub struct App {
    config: Config,
    options: AppOptions,
    store: Arc<JsonStore>,
    table: Arc<GestureTable>,
    profile: Profile,
    selection: Selection,
}

impl App {
    /// Load resources, select the profile and persist the selection
    ///
    /// # Errors
    ///
    /// Returns an error if a resource file exists but cannot be parsed
    pub fn new(config: Config, options: AppOptions) -> Result<Self> {
        info!("Initializing Hand Mouse application");
        let store = Arc::new(JsonStore::new(&options.res_dir));

        let mut settings = store.load_runtime_settings()?;
        let selection = select_mode(options.mode.as_deref(), options.lang, &mut settings);
        if let Err(e) = store.save_runtime_settings(&settings) {
            warn!("Failed to save runtime settings: {e}");
        }

        let profiles = store.load_profiles()?;
        let profile = resolve_profile(&selection.mode, &profiles);
        let table = Arc::new(GestureTable::with_presets(store.load_gesture_definitions()?));

        info!(
            "Mode '{}', language '{}', {} gestures loaded",
            selection.mode,
            selection.lang,
            table.len()
        );

        Ok(Self {
            config,
            options,
            store,
            table,
            profile,
            selection,
        })
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Localized usage text
    #[must_use]
    pub fn help_text(&self) -> String {
        match self.store.load_texts() {
            Ok(texts) => texts.get(HELP_MODE, &self.selection.lang),
            Err(e) => {
                warn!("Failed to load text resources: {e}");
                HELP_MODE.to_string()
            }
        }
    }

    /// Run in the selected mode until done
    ///
    /// # Errors
    ///
    /// Returns an error if the camera or detector cannot be started in
    /// standalone mode
    pub fn run(self) -> Result<()> {
        if self.selection.is_help() {
            println!("{}", self.help_text());
            return Ok(());
        }
        if self.options.control_stdio {
            self.run_controlled();
            Ok(())
        } else {
            self.run_standalone().map(|_| ())
        }
    }

    /// Start the camera immediately and run until quit
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline cannot be built
    pub fn run_standalone(&self) -> Result<PipelineReport> {
        let pipeline = self.build_pipeline()?;
        let stop = StopSignal::new();
        let report = pipeline.run(&stop);
        log_report(&report);
        Ok(report)
    }

    /// Serve toggle events from stdin, report status on stdout
    pub fn run_controlled(&self) {
        let (handle, endpoint) = control::channel();
        let (events, status) = handle.into_parts();

        // Blocks on stdin, so it is left detached
        let reader = thread::Builder::new()
            .name("control-stdin".to_string())
            .spawn(move || control::forward_events(BufReader::new(io::stdin()), &events));
        if let Err(e) = reader {
            error!("Failed to start control reader: {e}");
            return;
        }

        let writer = thread::Builder::new()
            .name("control-stdout".to_string())
            .spawn(move || control::forward_status(io::stdout(), &status));
        let writer = match writer {
            Ok(writer) => writer,
            Err(e) => {
                error!("Failed to start status writer: {e}");
                return;
            }
        };

        let reports = Controller::new(endpoint).run(|| self.build_pipeline());
        for report in &reports {
            log_report(report);
        }

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Status writer failed: {e}"),
            Err(_) => error!("Status writer panicked"),
        }
    }

    /// Build a fresh pipeline for one camera session
    ///
    /// # Errors
    ///
    /// Returns an error if the camera, detector or cursor filter cannot be
    /// created
    pub fn build_pipeline(&self) -> Result<Pipeline<Box<dyn InputSink>>> {
        let source = self.open_camera()?;
        let landmarks = self.open_detector()?;
        let display = self.open_display();

        let dispatcher = ActionDispatcher::with_filter(
            self.profile.clone(),
            Arc::clone(&self.table),
            self.open_sink(),
            self.config.dispatch_tuning(),
            self.config.create_cursor_filter()?,
        );

        let scale = self
            .store
            .load_runtime_settings()
            .map(|settings| settings.scale)
            .unwrap_or_else(|e| {
                warn!("Failed to read saved zoom: {e}");
                RuntimeSettings::default().scale
            });

        let store: Arc<dyn ConfigStore> = self.store.clone();
        Ok(Pipeline::new(
            source,
            landmarks,
            display,
            dispatcher,
            self.config.zoom_control(scale),
            self.config.pipeline_settings(),
        )
        .with_store(store))
    }

    fn camera_index(&self) -> i32 {
        self.options.camera_index.unwrap_or(self.config.capture.camera_index)
    }

    fn open_sink(&self) -> Box<dyn InputSink> {
        if self.options.dry_run {
            info!("Dry run: pointer actions are only logged");
            return Box::new(DryRunSink::new(FALLBACK_SCREEN_WIDTH, FALLBACK_SCREEN_HEIGHT));
        }
        match X11Sink::new() {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                warn!("Failed to initialize cursor control: {e}. Falling back to dry run.");
                Box::new(DryRunSink::new(FALLBACK_SCREEN_WIDTH, FALLBACK_SCREEN_HEIGHT))
            }
        }
    }

    #[cfg(feature = "vision")]
    fn open_camera(&self) -> Result<Box<dyn FrameSource>> {
        let capture = &self.config.capture;
        let camera = crate::vision::OpenCvCamera::open(self.camera_index(), capture.width, capture.height)?;
        Ok(Box::new(camera))
    }

    #[cfg(not(feature = "vision"))]
    fn open_camera(&self) -> Result<Box<dyn FrameSource>> {
        Err(crate::Error::Camera(format!(
            "Camera {} unavailable: built without the `vision` feature",
            self.camera_index()
        )))
    }

    #[cfg(feature = "vision")]
    fn open_detector(&self) -> Result<Box<dyn LandmarkSource>> {
        let vision = &self.config.vision;
        let detector = crate::vision::OnnxHandDetector::new(&vision.hand_model, vision.min_confidence)?;
        Ok(Box::new(detector))
    }

    #[cfg(not(feature = "vision"))]
    fn open_detector(&self) -> Result<Box<dyn LandmarkSource>> {
        Err(crate::Error::LandmarkSource(
            "Hand detection unavailable: built without the `vision` feature".to_string(),
        ))
    }

    fn open_display(&self) -> Box<dyn Display> {
        if self.options.headless {
            return Box::new(HeadlessDisplay::new());
        }
        #[cfg(feature = "vision")]
        {
            Box::new(crate::vision::HighGuiDisplay::new(WINDOW_TITLE))
        }
        #[cfg(not(feature = "vision"))]
        {
            info!("No preview window available for '{WINDOW_TITLE}', running headless");
            Box::new(HeadlessDisplay::new())
        }
    }
}

fn log_report(report: &PipelineReport) {
    info!(
        "Session ended: {} frames captured ({} dropped), {} processed, {} with a hand, {} rendered ({} dropped), zoom {:.2}x",
        report.frames_captured,
        report.frames_dropped_capture,
        report.frames_processed,
        report.hands_detected,
        report.frames_rendered,
        report.frames_dropped_render,
        report.final_zoom
    );
    if report.drag_released {
        info!("A held drag was released on shutdown");
    }
}
