//! Drawing detection corners onto a frozen frame

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::vision::DetectionResult;

/// Style of the corner dots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerStyle {
    pub radius: i32,
    pub color: Rgba<u8>,
}

/// Clone `frame` and mark every corner of every result on the copy
pub fn annotate_corners(frame: &RgbaImage, results: &[DetectionResult], style: CornerStyle) -> RgbaImage {
    let mut annotated = frame.clone();
    for result in results {
        for corner in &result.corners {
            let center = (corner.x.round() as i32, corner.y.round() as i32);
            draw_filled_circle_mut(&mut annotated, center, style.radius, style.color);
        }
    }
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn result_at(values: [f32; 8]) -> DetectionResult {
        DetectionResult::from_raw("code", &values).unwrap()
    }

    #[test]
    fn test_corners_drawn_on_copy_only() {
        let frame = RgbaImage::from_pixel(100, 100, WHITE);
        let result = result_at([20.0, 20.0, 80.0, 20.0, 80.0, 80.0, 20.0, 80.0]);
        let style = CornerStyle { radius: 3, color: GREEN };

        let annotated = annotate_corners(&frame, &[result], style);

        assert_eq!(*annotated.get_pixel(20, 20), GREEN);
        assert_eq!(*annotated.get_pixel(80, 80), GREEN);
        assert_eq!(*annotated.get_pixel(50, 50), WHITE);
        assert_eq!(*frame.get_pixel(20, 20), WHITE);
    }

    #[test]
    fn test_corners_outside_frame_are_clipped() {
        let frame = RgbaImage::from_pixel(50, 50, WHITE);
        let result = result_at([-5.0, -5.0, 60.0, -5.0, 60.0, 60.0, -5.0, 60.0]);
        let style = CornerStyle { radius: 10, color: GREEN };

        let annotated = annotate_corners(&frame, &[result], style);
        assert_eq!(annotated.dimensions(), (50, 50));
        assert_eq!(*annotated.get_pixel(0, 0), GREEN);
    }
}
