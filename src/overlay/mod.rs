//! Overlay Presentation Layer
//!
//! Turns detector output into something a user can act on: corner dots on a
//! frozen frame, hotspot markers positioned in layout space, and the
//! UI-thread view model that owns them.

pub mod annotate;
pub mod mapper;
pub mod markers;
pub mod orientation;
pub mod presenter;

pub use annotate::{annotate_corners, CornerStyle};
pub use mapper::{MapError, OverlayMapper};
pub use markers::{MarkerLayer, OverlayMarker, MARKER_TAG_PREFIX};
pub use orientation::{Orientation, OrientationStrategy};
pub use presenter::ResultPresenter;

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Side of a square hotspot marker in layout pixels
    pub marker_size: u32,
    /// Radius of the corner dots drawn on the frozen frame
    pub corner_radius: i32,
    /// Corner dot color (RGBA)
    pub corner_color: [u8; 4],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            marker_size: 100,
            corner_radius: 10,
            corner_color: [0, 255, 0, 255],
        }
    }
}

impl OverlayConfig {
    pub fn corner_style(&self) -> CornerStyle {
        CornerStyle {
            radius: self.corner_radius,
            color: Rgba(self.corner_color),
        }
    }
}
