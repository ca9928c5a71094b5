use std::io::Cursor;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, CatalogError};
use crate::detector::DetectorError;
use crate::pipeline::types::{GeometryError, PixelGeometry, TryOnComposite};
use crate::pipeline::{compose, normalize};
use crate::web::server::AppState;

#[derive(Deserialize)]
pub struct TryOnQuery {
    pub item: String,
}

#[derive(Serialize)]
pub struct GeometrySummary {
    pub left_px: (i32, i32),
    pub right_px: (i32, i32),
    pub center_px: (i32, i32),
    pub wrist_length_px: f64,
}

#[derive(Serialize)]
pub struct TryOnResponse {
    pub item: String,
    pub draw_angle: f64,
    pub geometry: GeometrySummary,
    /// PNG previews, base64-encoded for direct embedding by the caller.
    pub annotated_png_base64: String,
    pub clean_png_base64: String,
}

/// Request failure mapped to an HTTP status with a JSON error body.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<GeometryError> for ApiError {
    fn from(err: GeometryError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    }
}

impl From<DetectorError> for ApiError {
    fn from(err: DetectorError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn get_items(State(state): State<Arc<AppState>>) -> Json<Vec<CatalogEntry>> {
    Json(state.catalog.list())
}

pub async fn get_item_image(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let Some(path) = state.catalog.resolve(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_str(mime.as_ref()).unwrap(),
                )],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Failed to read catalog asset {}: {}", name, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Run one try-on: detect landmarks on the uploaded photo, normalize them,
/// composite the chosen item, and return both previews.
pub async fn try_on_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TryOnQuery>,
    body: Bytes,
) -> Result<Json<TryOnResponse>, ApiError> {
    let item = query.item.clone();
    let photo_bytes = body.to_vec();

    let worker_state = state.clone();
    let worker_item = item.clone();
    let outcome =
        tokio::task::spawn_blocking(move || run_pipeline(&worker_state, &worker_item, photo_bytes))
            .await
            .map_err(|e| {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("pipeline task failed: {e}"),
                )
            })??;

    let annotated_png = encode_png(&outcome.composite.annotated)?;
    let clean_png = encode_png(&outcome.composite.clean)?;

    Ok(Json(TryOnResponse {
        item,
        draw_angle: outcome.draw_angle,
        geometry: GeometrySummary {
            left_px: outcome.geometry.left_px,
            right_px: outcome.geometry.right_px,
            center_px: outcome.geometry.center_px,
            wrist_length_px: outcome.geometry.wrist_length_px,
        },
        annotated_png_base64: BASE64.encode(&annotated_png),
        clean_png_base64: BASE64.encode(&clean_png),
    }))
}

struct PipelineOutcome {
    geometry: PixelGeometry,
    draw_angle: f64,
    composite: TryOnComposite,
}

/// The full blocking pipeline for one photo: decode, detect, normalize,
/// composite. Stateless; every invocation gets its own buffers.
fn run_pipeline(
    state: &AppState,
    item: &str,
    photo_bytes: Vec<u8>,
) -> Result<PipelineOutcome, ApiError> {
    let photo = image::load_from_memory(&photo_bytes)
        .map_err(|e| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("could not decode uploaded photo: {e}"),
            )
        })?
        .to_rgb8();

    let asset = state.catalog.load(item)?;
    let detection = state.detector.detect_wrist(photo_bytes)?;
    let geometry = normalize::normalize(&detection, photo.width(), photo.height())?;
    let composite = compose::try_on(&photo, &geometry, detection.rotation_angle, &asset.image)?;

    tracing::info!(
        "composited '{}' at anchor ({}, {}), wrist length {:.1}px",
        asset.name,
        geometry.center_px.0,
        geometry.center_px.1,
        geometry.wrist_length_px
    );

    Ok(PipelineOutcome {
        draw_angle: compose::draw_angle(detection.rotation_angle),
        geometry,
        composite,
    })
}

fn encode_png(image: &image::RgbImage) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode preview: {e}"),
            )
        })?;
    Ok(bytes)
}
