//! Preview-to-layout coordinate mapping
//!
//! The preview is scaled uniformly to fill the view and center-cropped along
//! whichever axis overflows. Mapping a preview pixel into layout space undoes
//! that scale and subtracts the cropped (letterbox) offset.

use thiserror::Error;

use crate::geometry::{Point, Size};

/// Errors raised when a mapper cannot be built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("view has not been measured yet ({0})")]
    ViewNotMeasured(Size),
    #[error("frame has no pixels ({0})")]
    EmptyFrame(Size),
}

/// Axis along which the scaled preview overflows the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropAxis {
    Horizontal,
    Vertical,
}

/// Maps preview-space points into the measured view's layout space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMapper {
    preview: Size,
    view: Size,
    scale: f32,
    crop: CropAxis,
}

impl OverlayMapper {
    /// Build a mapper for a preview shown in a measured view
    pub fn new(preview: Size, view: Size) -> Result<Self, MapError> {
        if view.is_empty() {
            return Err(MapError::ViewNotMeasured(view));
        }
        if preview.is_empty() {
            return Err(MapError::EmptyFrame(preview));
        }

        let h_scale = preview.width as f32 / view.width as f32;
        let v_scale = preview.height as f32 / view.height as f32;
        let crop = if preview.aspect() < view.aspect() {
            CropAxis::Horizontal
        } else {
            CropAxis::Vertical
        };

        Ok(Self {
            preview,
            view,
            scale: h_scale.min(v_scale),
            crop,
        })
    }

    /// Preview pixels per layout pixel
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn crop_axis(&self) -> CropAxis {
        self.crop
    }

    pub fn view(&self) -> Size {
        self.view
    }

    /// Offset (dx, dy) subtracted from scaled coordinates
    pub fn letterbox_offset(&self) -> (f32, f32) {
        match self.crop {
            CropAxis::Horizontal => {
                let dx = (self.preview.width as f32 / self.scale - self.view.width as f32) / 2.0;
                (dx, 0.0)
            }
            CropAxis::Vertical => {
                let dy = (self.preview.height as f32 / self.scale - self.view.height as f32) / 2.0;
                (0.0, dy)
            }
        }
    }

    /// Map a preview-space point into layout space
    pub fn map(&self, point: Point) -> Point {
        let (dx, dy) = self.letterbox_offset();
        Point::new(point.x / self.scale - dx, point.y / self.scale - dy)
    }

    /// Whether a layout-space point falls inside the visible view
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.view.width as f32
            && point.y <= self.view.height as f32
    }
}
