//! Frame Capture Layer
//!
//! Frames come from a [`FrameSource`], an explicit producer that the capture
//! loop pulls from. Nothing here knows about a platform camera API; the
//! bundled source replays image files as if they were camera frames.

pub mod driver;
pub mod frame;

use image::imageops::FilterType;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use crate::capture::frame::CameraFrame;
use crate::geometry::Size;

/// Capture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Frames wider than this are scaled down (0 = no cap)
    pub max_frame_width: u32,
    /// Maximum frames per second to deliver (0 = unpaced)
    pub max_fps: u32,
    /// Restart from the first input once the sequence is exhausted
    pub loop_frames: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_frame_width: 720,
            max_fps: 30,
            loop_frames: false,
        }
    }
}

/// Errors raised by frame sources
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input images found")]
    NoInputs,
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame source has not been started")]
    NotStarted,
}

impl CaptureError {
    /// Whether the error only spoils the frame being read, so delivery can go on
    pub fn is_frame_local(&self) -> bool {
        matches!(self, CaptureError::Io { .. } | CaptureError::Decode { .. })
    }
}

/// Producer of successive camera frames
///
/// `start` and `stop` play the role of the camera's started/stopped
/// notifications; `start` reports the resolution every delivered frame has.
pub trait FrameSource: Send {
    /// Begin delivery and report the frame resolution
    fn start(&mut self) -> Result<Size, CaptureError>;

    /// Next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<CameraFrame>, CaptureError>;

    /// End delivery
    fn stop(&mut self);
}

/// Replays still images as a camera feed
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    config: CaptureConfig,
    index: usize,
    frame_size: Option<Size>,
    last_delivery: Option<Instant>,
}

impl ImageSequenceSource {
    /// Build a source from files and/or directories of images
    pub fn from_inputs(inputs: &[PathBuf], config: CaptureConfig) -> Result<Self, CaptureError> {
        let mut paths = Vec::new();
        for input in inputs {
            if input.is_dir() {
                paths.extend(list_images(input)?);
            } else {
                paths.push(input.clone());
            }
        }

        if paths.is_empty() {
            return Err(CaptureError::NoInputs);
        }

        info!("Image sequence source with {} frame(s)", paths.len());
        Ok(Self {
            paths,
            config,
            index: 0,
            frame_size: None,
            last_delivery: None,
        })
    }

    /// Number of distinct frames in the sequence
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    fn load(&self, path: &Path) -> Result<RgbaImage, CaptureError> {
        let img = image::open(path).map_err(|source| CaptureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(fit_width(img.to_rgba8(), self.config.max_frame_width))
    }

    fn pace(&mut self) {
        if self.config.max_fps == 0 {
            return;
        }
        let min_interval = Duration::from_secs_f64(1.0 / self.config.max_fps as f64);
        if let Some(last) = self.last_delivery {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                std::thread::sleep(min_interval - elapsed);
            }
        }
        self.last_delivery = Some(Instant::now());
    }
}

impl FrameSource for ImageSequenceSource {
    fn start(&mut self) -> Result<Size, CaptureError> {
        let first = self.load(&self.paths[0])?;
        let size = Size::new(first.width(), first.height());
        self.frame_size = Some(size);
        self.index = 0;
        info!("Frame source started at {}", size);
        Ok(size)
    }

    fn next_frame(&mut self) -> Result<Option<CameraFrame>, CaptureError> {
        let size = self.frame_size.ok_or(CaptureError::NotStarted)?;

        if self.index >= self.paths.len() {
            if !self.config.loop_frames {
                return Ok(None);
            }
            self.index = 0;
        }

        let path = self.paths[self.index].clone();
        self.index += 1;

        let mut rgba = self.load(&path)?;
        if rgba.dimensions() != (size.width, size.height) {
            debug!("Resizing {:?} to source resolution {}", path, size);
            rgba = image::imageops::resize(&rgba, size.width, size.height, FilterType::Triangle);
        }

        self.pace();
        Ok(Some(CameraFrame::from_rgba(rgba)))
    }

    fn stop(&mut self) {
        self.frame_size = None;
        info!("Frame source stopped");
    }
}

/// Scale an image down so its width does not exceed `max_width`
fn fit_width(img: RgbaImage, max_width: u32) -> RgbaImage {
    let (width, height) = img.dimensions();
    if max_width == 0 || width <= max_width {
        return img;
    }
    let new_height = ((height as u64 * max_width as u64) / width as u64).max(1) as u32;
    image::imageops::resize(&img, max_width, new_height, FilterType::Triangle)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg" | "bmp"))
        .unwrap_or(false)
}

/// Image files in a directory, sorted by name
fn list_images(dir: &Path) -> Result<Vec<PathBuf>, CaptureError> {
    let entries = std::fs::read_dir(dir).map_err(|source| CaptureError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn unpaced() -> CaptureConfig {
        CaptureConfig {
            max_fps: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_capture_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.max_frame_width, 720);
        assert_eq!(config.max_fps, 30);
        assert!(!config.loop_frames);
    }

    #[test]
    fn test_fit_width_caps_wide_frames() {
        let img = RgbaImage::new(1440, 1080);
        let fitted = fit_width(img, 720);
        assert_eq!(fitted.dimensions(), (720, 540));

        let small = RgbaImage::new(320, 240);
        assert_eq!(fit_width(small, 720).dimensions(), (320, 240));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let dir = TempDir::new().unwrap();
        let result = ImageSequenceSource::from_inputs(&[dir.path().to_path_buf()], unpaced());
        assert!(matches!(result, Err(CaptureError::NoInputs)));
    }

    #[test]
    fn test_directory_sequence_delivers_in_order_then_ends() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "b.png", 40, 30);
        write_png(dir.path(), "a.png", 40, 30);
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let mut source =
            ImageSequenceSource::from_inputs(&[dir.path().to_path_buf()], unpaced()).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.paths[0].file_name().unwrap(), "a.png");

        assert_eq!(source.start().unwrap(), Size::new(40, 30));
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_mismatched_frame_resized_to_source_resolution() {
        let dir = TempDir::new().unwrap();
        let first = write_png(dir.path(), "first.png", 40, 30);
        let second = write_png(dir.path(), "second.png", 80, 20);

        let mut source = ImageSequenceSource::from_inputs(&[first, second], unpaced()).unwrap();
        source.start().unwrap();
        source.next_frame().unwrap();
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.size(), Size::new(40, 30));
    }

    #[test]
    fn test_looping_source_restarts() {
        let dir = TempDir::new().unwrap();
        let only = write_png(dir.path(), "only.png", 16, 16);
        let config = CaptureConfig {
            loop_frames: true,
            ..unpaced()
        };

        let mut source = ImageSequenceSource::from_inputs(&[only], config).unwrap();
        source.start().unwrap();
        for _ in 0..3 {
            assert!(source.next_frame().unwrap().is_some());
        }
    }

    #[test]
    fn test_undecodable_frame_is_skipped_by_next_call() {
        let dir = TempDir::new().unwrap();
        let first = write_png(dir.path(), "a.png", 16, 16);
        let broken = dir.path().join("b.png");
        std::fs::write(&broken, "not a png").unwrap();
        let last = write_png(dir.path(), "c.png", 16, 16);

        let mut source = ImageSequenceSource::from_inputs(&[first, broken, last], unpaced()).unwrap();
        source.start().unwrap();
        assert!(source.next_frame().unwrap().is_some());

        let err = source.next_frame().unwrap_err();
        assert!(matches!(err, CaptureError::Decode { .. }));
        assert!(err.is_frame_local());

        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
        assert!(!CaptureError::NotStarted.is_frame_local());
    }

    #[test]
    fn test_next_frame_before_start_fails() {
        let dir = TempDir::new().unwrap();
        let only = write_png(dir.path(), "only.png", 16, 16);
        let mut source = ImageSequenceSource::from_inputs(&[only], unpaced()).unwrap();
        assert!(matches!(source.next_frame(), Err(CaptureError::NotStarted)));
    }
}
