use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::pipeline::types::PixelGeometry;

const MARKER_RADIUS: i32 = 5;
const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const POLYGON_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Draws the landmark markers and the wrist polygon outline on a copy of
/// the photo. The result is the base image of the annotated composite.
pub fn draw_landmarks(photo: &RgbImage, geometry: &PixelGeometry) -> RgbImage {
    let mut out = photo.clone();

    for point in [geometry.left_px, geometry.center_px, geometry.right_px] {
        draw_filled_circle_mut(&mut out, point, MARKER_RADIUS, MARKER_COLOR);
    }

    // Closed outline, last vertex joined back to the first.
    let n = geometry.polygon_px.len();
    for i in 0..n {
        let (x0, y0) = geometry.polygon_px[i];
        let (x1, y1) = geometry.polygon_px[(i + 1) % n];
        draw_line_segment_mut(
            &mut out,
            (x0 as f32, y0 as f32),
            (x1 as f32, y1 as f32),
            POLYGON_COLOR,
        );
    }

    out
}
