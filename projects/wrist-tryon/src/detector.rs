//! Wrist landmark detector client.
//!
//! Uploads a photo to the remote detection service as multipart form data
//! and decodes the landmark response. The round-trip is blocking; async
//! callers run the whole pipeline inside `spawn_blocking`.

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use thiserror::Error;

use crate::pipeline::types::WristDetection;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures of the detector round-trip, each distinct and reportable.
///
/// None of these are retryable from the pipeline's perspective; the caller
/// decides whether to prompt for a new photo.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detector unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("detector returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("detector response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("detector response has no `results` key")]
    MissingResults,
    #[error("detector response has no `wrist` key")]
    MissingWrist,
    #[error("detector wrist payload is malformed: {0}")]
    MalformedWrist(#[source] serde_json::Error),
}

/// Client for the wrist coordinate service.
#[derive(Debug, Clone)]
pub struct DetectorClient {
    endpoint: String,
    token: Option<String>,
    client: Client,
}

impl DetectorClient {
    /// Create a client for the given endpoint; `token` enables bearer
    /// authentication for deployments that require it.
    pub fn new(endpoint: String, token: Option<String>) -> Result<Self, DetectorError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            endpoint,
            token,
            client,
        })
    }

    /// Upload one JPEG photo and return its wrist landmarks.
    pub fn detect_wrist(&self, photo_jpeg: Vec<u8>) -> Result<WristDetection, DetectorError> {
        let form = multipart::Form::new().part(
            "image",
            multipart::Part::bytes(photo_jpeg)
                .file_name("photo.jpg")
                .mime_str("image/jpeg")?,
        );

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DetectorError::Status(status));
        }

        let body = response.text()?;
        let detection = parse_response(&body)?;
        tracing::info!(
            "wrist landmarks received: rotation_angle {}, {} polygon vertices",
            detection.rotation_angle,
            detection.polygon.len()
        );
        Ok(detection)
    }
}

/// Decode the detector response body, reporting each contract violation
/// (invalid JSON, missing `results`, missing `wrist`, malformed wrist
/// fields) as its own error.
fn parse_response(body: &str) -> Result<WristDetection, DetectorError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(DetectorError::InvalidJson)?;
    let results = value.get("results").ok_or(DetectorError::MissingResults)?;
    let wrist = results.get("wrist").ok_or(DetectorError::MissingWrist)?;
    serde_json::from_value(wrist.clone()).map_err(DetectorError::MalformedWrist)
}
