// Core data model for the try-on compositing pipeline.
//
// This module contains the structs that flow between the detector client,
// the landmark normalizer and the overlay compositor.

use image::{RgbImage, RgbaImage};
use serde::Deserialize;
use thiserror::Error;

/// Wrist landmarks as reported by the remote detector for one photo.
///
/// `left`/`right`/`center` are fractions of image width/height in [0, 1].
/// `polygon` vertices are percentages of image width/height in [0, 100].
/// The two unit conventions are part of the detector contract and are kept
/// distinct on purpose.
#[derive(Debug, Clone, Deserialize)]
pub struct WristDetection {
    pub left: [f64; 2],
    pub right: [f64; 2],
    /// Center as reported by the detector. Unreliable in practice; placement
    /// recomputes the center from the `left`/`right` midpoint instead.
    #[allow(dead_code)]
    pub center: [f64; 2],
    /// Degrees in [0, 180], in the detector's own angle convention.
    pub rotation_angle: f64,
    pub polygon: Vec<[f64; 2]>,
}

/// Wrist geometry projected onto a specific photo's pixel grid.
///
/// Built fresh per photo from a [`WristDetection`] and the photo dimensions,
/// immutable once built.
#[derive(Debug, Clone)]
pub struct PixelGeometry {
    pub left_px: (i32, i32),
    pub right_px: (i32, i32),
    pub center_px: (i32, i32),
    pub polygon_px: Vec<(i32, i32)>,
    pub wrist_length_px: f64,
}

/// An overlay item from the catalog, decoded to RGBA.
///
/// Never mutated by the compositor; resize and rotation allocate new
/// buffers so the asset can be reused across attempts.
#[derive(Debug, Clone)]
pub struct OverlayAsset {
    pub name: String,
    pub image: RgbaImage,
}

/// The two composited previews produced from one try-on request.
///
/// Both share the same transformed overlay and placement; only the base
/// image differs.
#[derive(Debug)]
pub struct TryOnComposite {
    /// Composite over the photo with landmark markers and polygon outline.
    pub annotated: RgbImage,
    /// Composite over the untouched photo.
    pub clean: RgbImage,
}

/// Failures of the normalization and compositing steps.
///
/// All variants represent bad input rather than transient conditions; none
/// are retryable and none trigger partial recovery.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("malformed detection: {field}: {reason}")]
    MalformedDetection {
        field: &'static str,
        reason: String,
    },
    #[error("invalid image dimensions {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },
    #[error("degenerate wrist geometry: endpoints coincide at ({x}, {y})")]
    DegenerateGeometry { x: i32, y: i32 },
}
