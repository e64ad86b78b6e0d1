//! QR detector backed by the rqrr crate

use image::GrayImage;
use rqrr::PreparedImage;
use std::time::Instant;
use tracing::debug;

use super::{DetectError, Detector};

/// Detector that runs rqrr grid detection and decoding on each frame
#[derive(Debug)]
pub struct RqrrDetector {
    /// Frames smaller than this in either dimension are rejected
    min_dimension: u32,
}

impl RqrrDetector {
    /// Create a detector with default settings
    pub fn new() -> Self {
        Self { min_dimension: 21 }
    }
}

impl Default for RqrrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for RqrrDetector {
    fn detect_and_decode(
        &mut self,
        gray: &GrayImage,
        points: &mut Vec<Vec<f32>>,
    ) -> Result<Vec<String>, DetectError> {
        let (width, height) = gray.dimensions();
        if width < self.min_dimension || height < self.min_dimension {
            return Err(DetectError::UnsupportedFrame { width, height });
        }

        let start = Instant::now();
        let mut prepared = PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| gray.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();

        let mut contents = Vec::with_capacity(grids.len());
        for grid in grids {
            match grid.decode() {
                Ok((_, content)) => {
                    let corners = grid
                        .bounds
                        .iter()
                        .flat_map(|p| [p.x as f32, p.y as f32])
                        .collect();
                    points.push(corners);
                    contents.push(content);
                }
                Err(e) => {
                    debug!("Grid decode failed: {:?}", e);
                }
            }
        }

        debug!(
            "rqrr detection on {}x{} complete in {:?}: {} code(s)",
            width,
            height,
            start.elapsed(),
            contents.len()
        );
        Ok(contents)
    }
}
