use crate::pipeline::types::{GeometryError, PixelGeometry, WristDetection};

/// Projects the detector's fractional/percentage coordinates onto a photo's
/// pixel grid.
///
/// `left`/`right` fractions are scaled by the image dimensions and truncated
/// to whole pixels. Polygon vertices are percentages and divided by 100
/// before scaling; that unit split mirrors the detector contract. The center
/// is recomputed as the midpoint of `left` and `right`; the detector's own
/// `center` field is ignored for placement.
pub fn normalize(
    detection: &WristDetection,
    img_width: u32,
    img_height: u32,
) -> Result<PixelGeometry, GeometryError> {
    if img_width == 0 || img_height == 0 {
        return Err(GeometryError::InvalidImageDimensions {
            width: img_width,
            height: img_height,
        });
    }

    check_finite("left", &detection.left)?;
    check_finite("right", &detection.right)?;
    if !detection.rotation_angle.is_finite() {
        return Err(GeometryError::MalformedDetection {
            field: "rotation_angle",
            reason: format!("non-finite value {}", detection.rotation_angle),
        });
    }
    if detection.polygon.len() < 3 {
        return Err(GeometryError::MalformedDetection {
            field: "polygon",
            reason: format!("{} vertices, need at least 3", detection.polygon.len()),
        });
    }
    for vertex in &detection.polygon {
        check_finite("polygon", vertex)?;
    }

    let w = img_width as f64;
    let h = img_height as f64;

    let left_px = to_pixel(&detection.left, w, h);
    let right_px = to_pixel(&detection.right, w, h);

    // Midpoint of the fractional endpoints, then scaled; not the detector's
    // center field.
    let center = [
        (detection.left[0] + detection.right[0]) / 2.0,
        (detection.left[1] + detection.right[1]) / 2.0,
    ];
    let center_px = to_pixel(&center, w, h);

    // Polygon vertices are percentages of the image dimensions.
    let polygon_px = detection
        .polygon
        .iter()
        .map(|v| ((v[0] * w / 100.0) as i32, (v[1] * h / 100.0) as i32))
        .collect();

    let dx = (right_px.0 - left_px.0) as f64;
    let dy = (right_px.1 - left_px.1) as f64;
    let wrist_length_px = (dx * dx + dy * dy).sqrt();

    Ok(PixelGeometry {
        left_px,
        right_px,
        center_px,
        polygon_px,
        wrist_length_px,
    })
}

fn check_finite(field: &'static str, coords: &[f64; 2]) -> Result<(), GeometryError> {
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(GeometryError::MalformedDetection {
            field,
            reason: format!("non-finite coordinate ({}, {})", coords[0], coords[1]),
        });
    }
    Ok(())
}

fn to_pixel(fraction: &[f64; 2], w: f64, h: f64) -> (i32, i32) {
    ((fraction[0] * w) as i32, (fraction[1] * h) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detection() -> WristDetection {
        WristDetection {
            left: [0.25, 0.5],
            right: [0.75, 0.5],
            center: [0.9, 0.9],
            rotation_angle: 45.0,
            polygon: vec![[25.0, 40.0], [75.0, 40.0], [75.0, 60.0], [25.0, 60.0]],
        }
    }

    #[test]
    fn test_projects_fractions_to_pixels() {
        let geometry = normalize(&sample_detection(), 800, 600).unwrap();

        assert_eq!(geometry.left_px, (200, 300));
        assert_eq!(geometry.right_px, (600, 300));
        assert_eq!(geometry.wrist_length_px, 400.0);
    }

    #[test]
    fn test_center_is_midpoint_not_detector_center() {
        // The detector claims center at (0.9, 0.9); placement must use the
        // endpoint midpoint instead.
        let geometry = normalize(&sample_detection(), 800, 600).unwrap();
        assert_eq!(geometry.center_px, (400, 300));
    }

    #[test]
    fn test_polygon_uses_percentage_units() {
        let geometry = normalize(&sample_detection(), 800, 600).unwrap();
        assert_eq!(
            geometry.polygon_px,
            vec![(200, 240), (600, 240), (600, 360), (200, 360)]
        );
    }

    #[test]
    fn test_wrist_length_is_zero_for_coincident_endpoints() {
        let mut detection = sample_detection();
        detection.right = detection.left;
        let geometry = normalize(&detection, 800, 600).unwrap();
        assert_eq!(geometry.left_px, geometry.right_px);
        assert_eq!(geometry.wrist_length_px, 0.0);
    }

    #[test]
    fn test_rejects_short_polygon() {
        let mut detection = sample_detection();
        detection.polygon.truncate(2);
        let err = normalize(&detection, 800, 600).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::MalformedDetection { field: "polygon", .. }
        ));
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        let mut detection = sample_detection();
        detection.left = [f64::NAN, 0.5];
        let err = normalize(&detection, 800, 600).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::MalformedDetection { field: "left", .. }
        ));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let err = normalize(&sample_detection(), 0, 600).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::InvalidImageDimensions { width: 0, height: 600 }
        ));
    }
}
