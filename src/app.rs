//! Application Coordinator
//!
//! Spawns the capture thread, runs the UI loop on the calling thread and
//! plays the user's part (dismissing results, tapping markers) according to
//! [`Interaction`].

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, RecvTimeoutError};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::capture::driver::CaptureLoop;
use crate::capture::FrameSource;
use crate::config::AppConfig;
use crate::overlay::ResultPresenter;
use crate::session::{ScanSession, SharedForwarder};
use crate::shared::{CaptureToUi, RuntimeStats, SharedStats, UiToCapture};
use crate::storage;
use crate::vision::Detector;

/// How often the UI loop wakes up when no message arrives
const UI_TICK: Duration = Duration::from_millis(20);

/// Simulated user behaviour while a result is on screen
#[derive(Debug, Clone)]
pub struct Interaction {
    /// Dismiss a shown result after this long
    pub dismiss_after: Duration,
    /// Tap every marker of a multi-code result
    pub tap_all: bool,
    /// Save every frozen frame here
    pub save_dir: Option<PathBuf>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            dismiss_after: Duration::from_millis(1000),
            tap_all: false,
            save_dir: None,
        }
    }
}

/// Main application coordinator
pub struct ScannerApp {
    config: AppConfig,
    stats: SharedStats,
}

impl ScannerApp {
    /// Create a new application coordinator
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            stats: Arc::new(RwLock::new(RuntimeStats::default())),
        }
    }

    /// Run one scanning session until the source is exhausted
    pub fn run<S, D>(
        &self,
        source: S,
        detector: D,
        forwarder: SharedForwarder,
        interaction: &Interaction,
    ) -> Result<RuntimeStats>
    where
        S: FrameSource + 'static,
        D: Detector + 'static,
    {
        let (to_ui, from_capture) = unbounded();
        let (to_capture, control) = unbounded();

        let mut session = ScanSession::new(
            detector,
            self.config.detection.clone(),
            self.config.overlay.clone(),
            forwarder.clone(),
            to_ui.clone(),
        );
        let capture_loop = CaptureLoop::new(control, to_ui, self.stats.clone());

        let mut presenter = ResultPresenter::new(self.config.overlay.marker_size, forwarder, to_capture.clone());
        // Layout pass done: the view has its final size before the first frame
        presenter.measure(self.config.view.size());

        let handle = std::thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || {
                info!("Capture thread starting...");
                let mut source = source;
                let result = capture_loop.run(&mut source, &mut session);
                info!("Capture thread exiting...");
                result
            })?;

        let mut shown_at: Option<Instant> = None;
        loop {
            match from_capture.recv_timeout(UI_TICK) {
                Ok(CaptureToUi::CameraStarted(size)) => info!("Preview running at {}", size),
                Ok(CaptureToUi::ShowResult { cycle, image, markers }) => {
                    if let Some(dir) = &interaction.save_dir {
                        match storage::save_result_image(&image, dir, cycle) {
                            Ok(path) => info!("Saved result image to {:?}", path),
                            Err(e) => warn!("Could not save result image: {:#}", e),
                        }
                    }
                    if presenter.show_result(cycle, image, markers) {
                        shown_at = Some(Instant::now());
                        if interaction.tap_all {
                            let tags: Vec<String> = presenter.markers().iter().map(|m| m.tag.clone()).collect();
                            for tag in tags {
                                presenter.tap_marker(&tag);
                            }
                        }
                    }
                }
                Ok(CaptureToUi::Error(e)) => error!("Capture reported: {}", e),
                Ok(CaptureToUi::Stopped) => break,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some(at) = shown_at {
                if at.elapsed() >= interaction.dismiss_after {
                    presenter.dismiss();
                    shown_at = None;
                }
            }
        }

        let _ = to_capture.send(UiToCapture::Shutdown);
        let captured = handle
            .join()
            .map_err(|_| anyhow!("Capture thread panicked"))?;

        let stats = self.stats.read().clone();
        info!(
            "Session finished: {} frame(s) at {:.1} fps, {} skipped, {} detector run(s), {} result(s) shown",
            stats.frames_seen, stats.fps, stats.frames_failed, stats.detector_runs, stats.cycles_shown
        );
        captured.context("Capture failed")?;
        Ok(stats)
    }
}
