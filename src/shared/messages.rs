//! Message types for communication between capture and UI threads

use image::RgbaImage;
use uuid::Uuid;

use crate::geometry::Size;
use crate::overlay::OverlayMarker;

/// Messages sent from the capture thread to the UI thread
#[derive(Debug, Clone)]
pub enum CaptureToUi {
    /// Frame delivery started at this resolution
    CameraStarted(Size),
    /// Freeze the preview on an annotated frame and attach hotspot markers
    ShowResult {
        cycle: Uuid,
        image: RgbaImage,
        markers: Vec<OverlayMarker>,
    },
    /// Error occurred on the capture thread
    Error(String),
    /// Frame delivery has stopped for good
    Stopped,
}

/// Messages sent from the UI thread to the capture thread
#[derive(Debug, Clone, PartialEq)]
pub enum UiToCapture {
    /// The preview view finished layout with this size
    ViewMeasured(Size),
    /// The user dismissed the result of this cycle
    Dismissed { cycle: Uuid },
    /// Request the capture loop to stop
    Shutdown,
}
