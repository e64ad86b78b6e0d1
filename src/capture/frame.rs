//! Frame data structures for captured camera content

use image::{DynamicImage, GrayImage, RgbaImage};
use std::time::Instant;

use crate::geometry::Size;

/// A captured camera frame with its grayscale companion
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// Color pixels (RGBA)
    pub rgba: RgbaImage,
    /// Single-channel pixels handed to the detector
    pub gray: GrayImage,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl CameraFrame {
    /// Create a frame from RGBA pixels, deriving the grayscale plane
    pub fn from_rgba(rgba: RgbaImage) -> Self {
        let gray = DynamicImage::ImageRgba8(rgba.clone()).to_luma8();
        Self {
            rgba,
            gray,
            timestamp: Instant::now(),
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Get frame dimensions
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}
