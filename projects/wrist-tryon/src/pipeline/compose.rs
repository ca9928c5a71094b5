// Overlay compositor: scales, rotates and places an RGBA overlay onto a
// wrist photo according to the normalized pixel geometry.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use crate::pipeline::annotate;
use crate::pipeline::types::{GeometryError, PixelGeometry, TryOnComposite};

/// Maps the detector's raw rotation angle to the angle actually applied to
/// the overlay image.
///
/// The detector measures in its own convention; the two-piece table below
/// converts it to the image rotation convention. The 90 boundary belongs to
/// the first branch.
pub fn draw_angle(rotation_angle: f64) -> f64 {
    if (0.0..=90.0).contains(&rotation_angle) {
        270.0 - rotation_angle
    } else {
        90.0 - rotation_angle
    }
}

/// Resizes the overlay to the wrist length and rotates it by the corrected
/// draw angle.
///
/// The output has the resized overlay's dimensions; pixels the rotation
/// pulls in from outside the source bounds are fully transparent. The input
/// asset is left untouched.
pub fn transform_overlay(
    overlay: &RgbaImage,
    geometry: &PixelGeometry,
    rotation_angle: f64,
) -> Result<RgbaImage, GeometryError> {
    if geometry.wrist_length_px == 0.0 {
        return Err(GeometryError::DegenerateGeometry {
            x: geometry.left_px.0,
            y: geometry.left_px.1,
        });
    }

    let resize_factor = geometry.wrist_length_px / overlay.width() as f64;
    let new_width = (overlay.width() as f64 * resize_factor).round() as u32;
    let new_height = (overlay.height() as f64 * resize_factor).round() as u32;
    let resized = imageops::resize(overlay, new_width, new_height, FilterType::Triangle);

    let angle = draw_angle(rotation_angle);
    // rotate_about_center is clockwise-positive; the draw angle is
    // counter-clockwise-positive.
    let theta = (-angle).to_radians() as f32;
    Ok(rotate_about_center(
        &resized,
        theta,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    ))
}

/// Top-left placement of the transformed overlay: the midpoint of the wrist
/// endpoints minus half the overlay dimensions, clamped to stay ≥ 0.
///
/// No clamping against the right/bottom edge; the blend skips pixels that
/// fall outside the photo.
pub fn placement(geometry: &PixelGeometry, overlay_w: u32, overlay_h: u32) -> (i32, i32) {
    let anchor_x = (geometry.left_px.0 + geometry.right_px.0).div_euclid(2);
    let anchor_y = (geometry.left_px.1 + geometry.right_px.1).div_euclid(2);

    let top_left_x = (anchor_x - (overlay_w as i32).div_euclid(2)).max(0);
    let top_left_y = (anchor_y - (overlay_h as i32).div_euclid(2)).max(0);

    (top_left_x, top_left_y)
}

/// Blends the transformed overlay over a base image into a fresh buffer.
///
/// Any overlay pixel with alpha > 0 replaces the destination color channels
/// outright; alpha == 0 leaves the destination untouched. Neither input is
/// mutated.
pub fn blend_overlay(base: &RgbImage, overlay: &RgbaImage, top_left: (i32, i32)) -> RgbImage {
    let mut out = base.clone();
    let (width, height) = (out.width() as i32, out.height() as i32);

    for (ox, oy, pixel) in overlay.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        let x = top_left.0 + ox as i32;
        let y = top_left.1 + oy as i32;
        if x >= 0 && x < width && y >= 0 && y < height {
            out.put_pixel(x as u32, y as u32, Rgb([pixel[0], pixel[1], pixel[2]]));
        }
    }

    out
}

/// Runs the full compositing pass and produces both previews: one over the
/// annotated photo, one over the clean photo. Same transformed overlay and
/// placement for both.
pub fn try_on(
    photo: &RgbImage,
    geometry: &PixelGeometry,
    rotation_angle: f64,
    overlay: &RgbaImage,
) -> Result<TryOnComposite, GeometryError> {
    let transformed = transform_overlay(overlay, geometry, rotation_angle)?;
    let top_left = placement(geometry, transformed.width(), transformed.height());

    let annotated_base = annotate::draw_landmarks(photo, geometry);

    Ok(TryOnComposite {
        annotated: blend_overlay(&annotated_base, &transformed, top_left),
        clean: blend_overlay(photo, &transformed, top_left),
    })
}
