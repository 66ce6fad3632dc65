//! Start/stop control of the pipeline from an external shell.
//!
//! The shell sends `{"event": "toggle_camera", "data": {}}` and receives
//! `camera_starting` and `camera_status` events back.

use crate::{
    input::InputSink,
    pipeline::{Pipeline, PipelineReport, StopSignal},
    Result,
};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the controller checks whether a pipeline ended on its own
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shell → core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ControlEvent {
    ToggleCamera {},
}

/// Core → shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum StatusEvent {
    CameraStarting {},
    CameraStatus { running: bool },
}

/// Shell side of the channel pair
#[derive(Debug)]
pub struct ControlHandle {
    events: Sender<ControlEvent>,
    status: Receiver<StatusEvent>,
}

/// Core side of the channel pair
#[derive(Debug)]
pub struct ControlEndpoint {
    events: Receiver<ControlEvent>,
    status: Sender<StatusEvent>,
}

/// Create a connected handle/endpoint pair
#[must_use]
pub fn channel() -> (ControlHandle, ControlEndpoint) {
    let (event_tx, event_rx) = unbounded();
    let (status_tx, status_rx) = unbounded();
    (
        ControlHandle {
            events: event_tx,
            status: status_rx,
        },
        ControlEndpoint {
            events: event_rx,
            status: status_tx,
        },
    )
}

impl ControlHandle {
    /// Send an event; false if the controller is gone
    pub fn send(&self, event: ControlEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn toggle_camera(&self) -> bool {
        self.send(ControlEvent::ToggleCamera {})
    }

    #[must_use]
    pub fn try_status(&self) -> Option<StatusEvent> {
        self.status.try_recv().ok()
    }

    /// Wait up to `timeout` for the next status event
    #[must_use]
    pub fn status_timeout(&self, timeout: Duration) -> Option<StatusEvent> {
        self.status.recv_timeout(timeout).ok()
    }

    /// Split into raw channel ends, for bridging to another transport
    #[must_use]
    pub fn into_parts(self) -> (Sender<ControlEvent>, Receiver<StatusEvent>) {
        (self.events, self.status)
    }
}

impl ControlEndpoint {
    fn notify(&self, event: StatusEvent) {
        if self.status.send(event).is_err() {
            warn!("Control shell is gone, status not delivered");
        }
    }
}

struct Session {
    stop: StopSignal,
    handle: JoinHandle<PipelineReport>,
}

impl Session {
    fn finish(self) -> Option<PipelineReport> {
        self.stop.trigger();
        match self.handle.join() {
            Ok(report) => Some(report),
            Err(_) => {
                error!("Pipeline thread panicked");
                None
            }
        }
    }
}

/// Runs a pipeline on demand
pub struct Controller {
    endpoint: ControlEndpoint,
    session: Option<Session>,
    reports: Vec<PipelineReport>,
}

impl Controller {
    #[must_use]
    pub const fn new(endpoint: ControlEndpoint) -> Self {
        Self {
            endpoint,
            session: None,
            reports: Vec::new(),
        }
    }

    /// Serve toggle events until the shell hangs up
    ///
    /// `launch` builds a fresh pipeline each time the camera is started.
    /// A running pipeline is stopped before returning. Returns the reports
    /// of every session that ran.
    pub fn run<S, F>(mut self, mut launch: F) -> Vec<PipelineReport>
    where
        S: InputSink + 'static,
        F: FnMut() -> Result<Pipeline<S>>,
    {
        info!("Waiting for control events");
        self.endpoint.notify(StatusEvent::CameraStatus { running: false });

        loop {
            match self.endpoint.events.recv_timeout(POLL_INTERVAL) {
                Ok(ControlEvent::ToggleCamera {}) => self.toggle(&mut launch),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Control channel closed");
                    break;
                }
            }
            self.reap();
        }

        if self.stop_session() {
            self.endpoint.notify(StatusEvent::CameraStatus { running: false });
        }
        self.reports
    }

    fn toggle<S, F>(&mut self, launch: &mut F)
    where
        S: InputSink + 'static,
        F: FnMut() -> Result<Pipeline<S>>,
    {
        if self.stop_session() {
            self.endpoint.notify(StatusEvent::CameraStatus { running: false });
            return;
        }

        self.endpoint.notify(StatusEvent::CameraStarting {});
        match launch() {
            Ok(pipeline) => {
                let stop = StopSignal::new();
                let thread_stop = stop.clone();
                let spawned = thread::Builder::new()
                    .name("pipeline".to_string())
                    .spawn(move || pipeline.run(&thread_stop));
                match spawned {
                    Ok(handle) => {
                        self.session = Some(Session { stop, handle });
                        info!("Camera started");
                        self.endpoint.notify(StatusEvent::CameraStatus { running: true });
                    }
                    Err(e) => {
                        error!("Failed to spawn pipeline thread: {e}");
                        self.endpoint.notify(StatusEvent::CameraStatus { running: false });
                    }
                }
            }
            Err(e) => {
                error!("Failed to start camera: {e}");
                self.endpoint.notify(StatusEvent::CameraStatus { running: false });
            }
        }
    }

    /// Stop and join the running session, if any
    fn stop_session(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        info!("Stopping camera");
        if let Some(report) = session.finish() {
            self.reports.push(report);
        }
        true
    }

    /// Collect a session that stopped by itself (quit key, source ended)
    fn reap(&mut self) {
        if self
            .session
            .as_ref()
            .is_some_and(|session| session.handle.is_finished())
        {
            info!("Pipeline stopped on its own");
            self.stop_session();
            self.endpoint.notify(StatusEvent::CameraStatus { running: false });
        }
    }
}

/// Feed JSON-line control events from `reader` until EOF or the controller is gone
///
/// Lines that do not parse are logged and skipped.
pub fn forward_events<R: BufRead>(reader: R, events: &Sender<ControlEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read control input: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ControlEvent>(line) {
            Ok(event) => {
                debug!("Control event {event:?}");
                if events.send(event).is_err() {
                    break;
                }
            }
            Err(e) => warn!("Ignoring malformed control event '{line}': {e}"),
        }
    }
}

/// Write status events to `writer` as JSON lines until the controller hangs up
///
/// # Errors
///
/// Returns an error if writing fails
pub fn forward_status<W: Write>(mut writer: W, status: &Receiver<StatusEvent>) -> Result<()> {
    for event in status {
        serde_json::to_writer(&mut writer, &event)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_format() {
        let event: ControlEvent =
            serde_json::from_value(json!({"event": "toggle_camera", "data": {}})).unwrap();
        assert_eq!(event, ControlEvent::ToggleCamera {});

        assert_eq!(
            serde_json::to_value(StatusEvent::CameraStarting {}).unwrap(),
            json!({"event": "camera_starting", "data": {}})
        );
        assert_eq!(
            serde_json::to_value(StatusEvent::CameraStatus { running: true }).unwrap(),
            json!({"event": "camera_status", "data": {"running": true}})
        );
    }

    #[test]
    fn test_unknown_event_rejected() {
        let parsed = serde_json::from_value::<ControlEvent>(json!({"event": "reboot", "data": {}}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_forward_events_skips_garbage() {
        let input = "{\"event\": \"toggle_camera\", \"data\": {}}\nnot json\n\n{\"event\":\"toggle_camera\",\"data\":{}}\n";
        let (tx, rx) = unbounded();
        forward_events(input.as_bytes(), &tx);
        drop(tx);
        assert_eq!(rx.iter().count(), 2);
    }

    #[test]
    fn test_forward_status_writes_lines() {
        let (tx, rx) = unbounded();
        tx.send(StatusEvent::CameraStarting {}).unwrap();
        tx.send(StatusEvent::CameraStatus { running: true }).unwrap();
        drop(tx);

        let mut out = Vec::new();
        forward_status(&mut out, &rx).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], r#"{"event":"camera_status","data":{"running":true}}"#);
    }

    #[test]
    fn test_handle_send_after_endpoint_drop() {
        let (handle, endpoint) = channel();
        drop(endpoint);
        assert!(!handle.toggle_camera());
        assert!(handle.try_status().is_none());
    }
}
