//! Orientation correction between the sensor frame and the displayed preview
//!
//! Devices disagree about how the sensor image is rotated relative to the
//! preview, so the correction is a strategy the session is configured with.

use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};

/// Converts frame-space geometry into preview space before layout mapping
pub trait OrientationStrategy: Send + std::fmt::Debug {
    /// Size of the preview image produced from a frame of `frame` size
    fn preview_size(&self, frame: Size) -> Size;

    /// Position of a frame-space point in preview space
    fn to_preview(&self, point: Point, frame: Size) -> Point;

    /// The annotated still as it appears in the preview, so it lines up with
    /// markers placed through [`to_preview`](Self::to_preview).
    /// Left in frame orientation unless overridden.
    fn orient_image(&self, image: RgbaImage) -> RgbaImage {
        image
    }
}

/// Built-in orientation strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Preview matches the frame
    #[default]
    Identity,
    /// Preview dimensions are swapped but point coordinates are left as-is
    #[value(name = "swap_axes")]
    SwapAxes,
    /// Frame is rotated 90 degrees clockwise into the preview
    #[value(name = "rotate90")]
    Rotate90,
    /// Frame is rotated 270 degrees clockwise into the preview
    #[value(name = "rotate270")]
    Rotate270,
}

impl OrientationStrategy for Orientation {
    fn preview_size(&self, frame: Size) -> Size {
        match self {
            Orientation::Identity => frame,
            Orientation::SwapAxes | Orientation::Rotate90 | Orientation::Rotate270 => frame.swapped(),
        }
    }

    fn to_preview(&self, point: Point, frame: Size) -> Point {
        match self {
            Orientation::Identity | Orientation::SwapAxes => point,
            Orientation::Rotate90 => Point::new(frame.height as f32 - point.y, point.x),
            Orientation::Rotate270 => Point::new(point.y, frame.width as f32 - point.x),
        }
    }

    fn orient_image(&self, image: RgbaImage) -> RgbaImage {
        match self {
            Orientation::Identity | Orientation::SwapAxes => image,
            Orientation::Rotate90 => imageops::rotate90(&image),
            Orientation::Rotate270 => imageops::rotate270(&image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Size = Size {
        width: 1280,
        height: 720,
    };

    #[test]
    fn test_identity_keeps_everything() {
        let p = Point::new(100.0, 50.0);
        assert_eq!(Orientation::Identity.preview_size(FRAME), FRAME);
        assert_eq!(Orientation::Identity.to_preview(p, FRAME), p);
    }

    #[test]
    fn test_swap_axes_only_swaps_dimensions() {
        let p = Point::new(100.0, 50.0);
        assert_eq!(Orientation::SwapAxes.preview_size(FRAME), Size::new(720, 1280));
        assert_eq!(Orientation::SwapAxes.to_preview(p, FRAME), p);
    }

    #[test]
    fn test_rotate90_moves_top_left_to_top_right() {
        let preview = Orientation::Rotate90.preview_size(FRAME);
        let p = Orientation::Rotate90.to_preview(Point::new(0.0, 0.0), FRAME);
        assert_eq!(p, Point::new(preview.width as f32, 0.0));
    }

    #[test]
    fn test_rotations_keep_center_fixed() {
        let center = Point::new(640.0, 360.0);
        assert_eq!(Orientation::Rotate90.to_preview(center, FRAME), Point::new(360.0, 640.0));
        assert_eq!(Orientation::Rotate270.to_preview(center, FRAME), Point::new(360.0, 640.0));
    }

    #[test]
    fn test_rotated_still_matches_rotated_points() {
        use image::Rgba;

        let frame = Size::new(4, 2);
        let mut image = RgbaImage::new(frame.width, frame.height);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));

        let rotated = Orientation::Rotate90.orient_image(image.clone());
        assert_eq!(rotated.dimensions(), (2, 4));
        let p = Orientation::Rotate90.to_preview(Point::new(0.5, 0.5), frame);
        assert_eq!(rotated.get_pixel(p.x as u32, p.y as u32)[0], 255);

        let rotated = Orientation::Rotate270.orient_image(image.clone());
        assert_eq!(rotated.dimensions(), (2, 4));
        let p = Orientation::Rotate270.to_preview(Point::new(0.5, 0.5), frame);
        assert_eq!(rotated.get_pixel(p.x as u32, p.y as u32)[0], 255);

        assert_eq!(Orientation::SwapAxes.orient_image(image.clone()), image);
    }

    #[test]
    fn test_orientation_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            orientation: Orientation,
        }
        let parsed: Wrapper = toml::from_str("orientation = \"swap_axes\"").unwrap();
        assert_eq!(parsed.orientation, Orientation::SwapAxes);
    }
}
