//! Vision Layer
//!
//! The QR localization and decoding itself is delegated to a pre-built
//! detector behind the [`Detector`] trait. This module only defines that seam
//! and turns the detector's raw output into [`DetectionResult`]s.

pub mod rqrr_detector;

pub use rqrr_detector::RqrrDetector;

use image::GrayImage;
use thiserror::Error;
use tracing::warn;

use crate::geometry::Point;

/// Number of floats in one corner matrix (4 points x 2 coordinates)
pub const CORNER_VALUES: usize = 8;

/// Errors reported by a detector backend
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("detector rejected frame of {width}x{height}")]
    UnsupportedFrame { width: u32, height: u32 },
    #[error("detector backend failed: {0}")]
    Backend(String),
}

/// A pre-built QR detector
pub trait Detector: Send {
    /// Detect and decode every QR code in a single-channel frame.
    ///
    /// Returns the decoded strings (empty = nothing found). For each string the
    /// detector pushes one corner matrix of [`CORNER_VALUES`] floats onto
    /// `points`, positionally aligned with the returned list. Corner order is
    /// top-left, top-right, bottom-right, bottom-left.
    fn detect_and_decode(
        &mut self,
        gray: &GrayImage,
        points: &mut Vec<Vec<f32>>,
    ) -> Result<Vec<String>, DetectError>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect_and_decode(
        &mut self,
        gray: &GrayImage,
        points: &mut Vec<Vec<f32>>,
    ) -> Result<Vec<String>, DetectError> {
        (**self).detect_and_decode(gray, points)
    }
}

/// One decoded QR code with its corners in frame space
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    /// Decoded text
    pub content: String,
    /// Corner points: top-left, top-right, bottom-right, bottom-left
    pub corners: [Point; 4],
}

impl DetectionResult {
    /// Build a result from an 8-value corner matrix
    pub fn from_raw(content: &str, values: &[f32]) -> Option<Self> {
        if values.len() != CORNER_VALUES || values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let corner = |i: usize| Point::new(values[i * 2], values[i * 2 + 1]);
        Some(Self {
            content: content.to_string(),
            corners: [corner(0), corner(1), corner(2), corner(3)],
        })
    }

    /// Hotspot position: midpoint of the top-right / bottom-left diagonal
    pub fn center(&self) -> Point {
        self.corners[1].midpoint(&self.corners[3])
    }
}

/// Pair decoded strings with their corner matrices.
///
/// An entry whose matrix is missing or malformed is skipped on its own; the
/// remaining entries are still returned.
pub fn parse_detections(contents: &[String], points: &[Vec<f32>]) -> Vec<DetectionResult> {
    contents
        .iter()
        .enumerate()
        .filter_map(|(i, content)| {
            let parsed = points
                .get(i)
                .and_then(|values| DetectionResult::from_raw(content, values));
            if parsed.is_none() {
                warn!("Skipping detection {} ({:?}): missing or malformed corner points", i, content);
            }
            parsed
        })
        .collect()
}
