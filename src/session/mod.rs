//! Detection Cycle
//!
//! [`ScanSession`] is the per-session state object driven by the capture
//! thread. It throttles detector calls, turns results into an annotated still
//! plus markers, and decides whether to forward immediately or wait for a tap.
//!
//! State flow: `Idle -> Detecting -> Detected -> Shown -> Idle`.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::capture::frame::CameraFrame;
use crate::geometry::Size;
use crate::overlay::{annotate_corners, Orientation, OrientationStrategy, OverlayConfig, OverlayMapper, OverlayMarker};
use crate::shared::CaptureToUi;
use crate::vision::{parse_detections, DetectionResult, Detector};

/// Receives decoded content chosen by the user (or the only result)
pub trait ForwardListener: Send + Sync {
    fn forward(&self, content: &str);
}

impl<F> ForwardListener for F
where
    F: Fn(&str) + Send + Sync,
{
    fn forward(&self, content: &str) {
        self(content)
    }
}

/// Forward listener shared between capture and UI threads
pub type SharedForwarder = Arc<dyn ForwardListener>;

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum time between two detector calls in milliseconds
    pub interval_ms: u64,
    /// Orientation correction between sensor frame and preview
    pub orientation: Orientation,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            orientation: Orientation::Identity,
        }
    }
}

impl DetectionConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Detection cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Accepting frames
    Idle,
    /// A detector call is in flight
    Detecting,
    /// Results were found and are being prepared for display
    Detected,
    /// The annotated frame is on screen; live detection is paused
    Shown,
}

/// What happened to a single frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// A result is showing; the frame only feeds the live preview
    Paused,
    /// Frame or view size is unknown, so detections could not be placed
    NotReady,
    /// Still inside the detection cooldown
    Throttled,
    /// Detector returned an error; the frame was skipped
    DetectorFailed,
    /// Detector ran and found nothing usable
    NoDetection,
    /// A result is now showing
    Shown {
        cycle: Uuid,
        results: Vec<DetectionResult>,
    },
}

/// Per-session detection state, owned by the capture thread
pub struct ScanSession<D: Detector> {
    detector: D,
    orientation: Box<dyn OrientationStrategy>,
    config: DetectionConfig,
    overlay: OverlayConfig,
    forwarder: SharedForwarder,
    ui: Sender<CaptureToUi>,
    state: CycleState,
    frame_size: Option<Size>,
    view_size: Option<Size>,
    mapper: Option<OverlayMapper>,
    last_detection: Option<Instant>,
    cycle: Option<Uuid>,
}

impl<D: Detector> ScanSession<D> {
    /// Create a session using the configured orientation strategy
    pub fn new(
        detector: D,
        config: DetectionConfig,
        overlay: OverlayConfig,
        forwarder: SharedForwarder,
        ui: Sender<CaptureToUi>,
    ) -> Self {
        Self {
            detector,
            orientation: Box::new(config.orientation),
            config,
            overlay,
            forwarder,
            ui,
            state: CycleState::Idle,
            frame_size: None,
            view_size: None,
            mapper: None,
            last_detection: None,
            cycle: None,
        }
    }

    /// Replace the orientation strategy
    pub fn with_orientation(mut self, orientation: Box<dyn OrientationStrategy>) -> Self {
        self.orientation = orientation;
        self.rebuild_mapper();
        self
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Cycle currently on screen
    pub fn cycle(&self) -> Option<Uuid> {
        self.cycle
    }

    pub fn mapper(&self) -> Option<&OverlayMapper> {
        self.mapper.as_ref()
    }

    /// Frame delivery started at `size`
    pub fn on_camera_started(&mut self, size: Size) {
        info!("Camera started: {}", size);
        self.frame_size = Some(size);
        self.rebuild_mapper();
    }

    /// Frame delivery stopped
    pub fn on_camera_stopped(&mut self) {
        info!("Camera stopped");
        self.frame_size = None;
        self.mapper = None;
    }

    /// The preview view has been laid out at `size`
    pub fn on_view_measured(&mut self, size: Size) {
        debug!("View measured: {}", size);
        self.view_size = Some(size);
        self.rebuild_mapper();
    }

    fn rebuild_mapper(&mut self) {
        let (Some(frame), Some(view)) = (self.frame_size, self.view_size) else {
            self.mapper = None;
            return;
        };

        let preview = self.orientation.preview_size(frame);
        self.mapper = match OverlayMapper::new(preview, view) {
            Ok(mapper) => {
                info!(
                    "Preview {} in view {}: scale = {:.3}, crop = {:?}",
                    preview,
                    view,
                    mapper.scale(),
                    mapper.crop_axis()
                );
                Some(mapper)
            }
            Err(e) => {
                warn!("Cannot map overlay coordinates yet: {}", e);
                None
            }
        };
    }

    /// Process one frame delivered at `now`
    pub fn on_frame(&mut self, frame: &CameraFrame, now: Instant) -> FrameOutcome {
        if self.state != CycleState::Idle {
            return FrameOutcome::Paused;
        }
        let Some(mapper) = self.mapper else {
            return FrameOutcome::NotReady;
        };
        if let Some(last) = self.last_detection {
            if now.saturating_duration_since(last) < self.config.interval() {
                return FrameOutcome::Throttled;
            }
        }

        self.last_detection = Some(now);
        self.state = CycleState::Detecting;

        let mut points = Vec::new();
        let contents = match self.detector.detect_and_decode(&frame.gray, &mut points) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Detector failed on frame: {}", e);
                self.state = CycleState::Idle;
                return FrameOutcome::DetectorFailed;
            }
        };

        let results = parse_detections(&contents, &points);
        if results.is_empty() {
            self.state = CycleState::Idle;
            return FrameOutcome::NoDetection;
        }

        self.state = CycleState::Detected;
        let cycle = Uuid::new_v4();
        let image = self
            .orientation
            .orient_image(annotate_corners(&frame.rgba, &results, self.overlay.corner_style()));

        let markers = if let [only] = results.as_slice() {
            info!("Single QR code detected, forwarding");
            self.forwarder.forward(&only.content);
            Vec::new()
        } else {
            info!("{} QR codes detected, waiting for a tap", results.len());
            let frame_size = frame.size();
            results
                .iter()
                .map(|r| {
                    let anchor = mapper.map(self.orientation.to_preview(r.center(), frame_size));
                    if !mapper.contains(anchor) {
                        debug!("Marker for {:?} falls outside the view at {:?}", r.content, anchor);
                    }
                    OverlayMarker::new(anchor, r.content.as_str())
                })
                .collect()
        };

        if self.ui.send(CaptureToUi::ShowResult { cycle, image, markers }).is_err() {
            warn!("UI thread is gone; result for cycle {} not shown", cycle);
        }

        self.state = CycleState::Shown;
        self.cycle = Some(cycle);
        FrameOutcome::Shown { cycle, results }
    }

    /// User dismissed the result of `cycle`; returns whether the session reset
    pub fn reset(&mut self, cycle: Uuid) -> bool {
        if self.state != CycleState::Shown || self.cycle != Some(cycle) {
            debug!("Ignoring dismissal of stale cycle {}", cycle);
            return false;
        }
        info!("Result dismissed, resuming detection");
        self.state = CycleState::Idle;
        self.cycle = None;
        true
    }
}
