//! Capture driving loop
//!
//! Runs on the dedicated capture thread. It pulls frames from a
//! [`FrameSource`], hands them to the [`ScanSession`] and applies control
//! messages from the UI thread between frames. While a result is showing the
//! loop blocks on the control channel instead of pulling frames.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::capture::{CaptureError, FrameSource};
use crate::session::{CycleState, FrameOutcome, ScanSession};
use crate::shared::{CaptureToUi, SharedStats, UiToCapture};
use crate::vision::Detector;

/// Consecutive unreadable frames after which the source is treated as broken
const MAX_CONSECUTIVE_FAILURES: u32 = 30;

/// Frames per measurement window of [`FpsMeter`]
const FPS_WINDOW: u32 = 20;

/// Delivery rate from frame timestamps, refreshed once per window
#[derive(Debug, Default)]
struct FpsMeter {
    window_start: Option<Instant>,
    frames: u32,
}

impl FpsMeter {
    /// Count a frame; returns a fresh rate when a window completes
    fn tick(&mut self, timestamp: Instant) -> Option<f64> {
        let Some(start) = self.window_start else {
            self.window_start = Some(timestamp);
            return None;
        };
        self.frames += 1;
        if self.frames < FPS_WINDOW {
            return None;
        }
        let elapsed = timestamp.saturating_duration_since(start).as_secs_f64();
        let frames = self.frames;
        self.window_start = Some(timestamp);
        self.frames = 0;
        (elapsed > 0.0).then(|| frames as f64 / elapsed)
    }
}

/// Whether the loop keeps going after a control message
enum Flow {
    Continue,
    Stop,
}

/// Drives a frame source into a scan session
pub struct CaptureLoop {
    control: Receiver<UiToCapture>,
    ui: Sender<CaptureToUi>,
    stats: SharedStats,
}

impl CaptureLoop {
    pub fn new(control: Receiver<UiToCapture>, ui: Sender<CaptureToUi>, stats: SharedStats) -> Self {
        Self { control, ui, stats }
    }

    /// Run until the source is exhausted, fails, or shutdown is requested.
    ///
    /// `CaptureToUi::Stopped` is always sent before returning.
    pub fn run<S, D>(&self, source: &mut S, session: &mut ScanSession<D>) -> Result<(), CaptureError>
    where
        S: FrameSource + ?Sized,
        D: Detector,
    {
        let result = match source.start() {
            Ok(size) => {
                session.on_camera_started(size);
                let _ = self.ui.send(CaptureToUi::CameraStarted(size));
                self.stats.write().is_capturing = true;

                let pumped = self.pump(source, session);
                source.stop();
                session.on_camera_stopped();
                pumped
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            error!("Capture failed: {}", e);
            self.stats.write().set_error(e.to_string());
            let _ = self.ui.send(CaptureToUi::Error(e.to_string()));
        }

        self.stats.write().is_capturing = false;
        let _ = self.ui.send(CaptureToUi::Stopped);
        result
    }

    fn pump<S, D>(&self, source: &mut S, session: &mut ScanSession<D>) -> Result<(), CaptureError>
    where
        S: FrameSource + ?Sized,
        D: Detector,
    {
        let mut meter = FpsMeter::default();
        let mut failures = 0u32;
        loop {
            loop {
                match self.control.try_recv() {
                    Ok(msg) => {
                        if let Flow::Stop = self.handle(msg, session) {
                            return Ok(());
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!("UI thread disconnected, stopping capture");
                        return Ok(());
                    }
                }
            }

            if session.state() == CycleState::Shown {
                // Capture is paused until the user dismisses the result
                match self.control.recv() {
                    Ok(msg) => {
                        if let Flow::Stop = self.handle(msg, session) {
                            return Ok(());
                        }
                        continue;
                    }
                    Err(_) => {
                        info!("UI thread disconnected, stopping capture");
                        return Ok(());
                    }
                }
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("Frame source exhausted");
                    return Ok(());
                }
                Err(e) if e.is_frame_local() && failures + 1 < MAX_CONSECUTIVE_FAILURES => {
                    failures += 1;
                    warn!("Skipping frame: {}", e);
                    let mut stats = self.stats.write();
                    stats.frames_failed += 1;
                    stats.set_error(e.to_string());
                    continue;
                }
                Err(e) => return Err(e),
            };
            failures = 0;

            let outcome = session.on_frame(&frame, Instant::now());
            let mut stats = self.stats.write();
            stats.frames_seen += 1;
            if let Some(fps) = meter.tick(frame.timestamp) {
                debug!("Capture running at {:.1} fps", fps);
                stats.fps = fps;
            }
            match outcome {
                FrameOutcome::Throttled => stats.throttled += 1,
                FrameOutcome::NoDetection | FrameOutcome::DetectorFailed => stats.detector_runs += 1,
                FrameOutcome::Shown { .. } => {
                    stats.detector_runs += 1;
                    stats.cycles_shown += 1;
                }
                FrameOutcome::Paused | FrameOutcome::NotReady => {}
            }
        }
    }

    fn handle<D: Detector>(&self, msg: UiToCapture, session: &mut ScanSession<D>) -> Flow {
        match msg {
            UiToCapture::ViewMeasured(size) => session.on_view_measured(size),
            UiToCapture::Dismissed { cycle } => {
                session.reset(cycle);
            }
            UiToCapture::Shutdown => {
                info!("Shutdown requested");
                return Flow::Stop;
            }
        }
        Flow::Continue
    }
}
