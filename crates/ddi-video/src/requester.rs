//! Client for the video generation endpoint.
//!
//! One round trip per call. A finished video and a render still in progress
//! are distinct outcomes; nothing here polls or retries.

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::payload::AnimationPayload;

/// Header carrying the deterministic pair key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Animation request errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Animation request failed: {0}")]
    RequestFailed(String),
}

pub type AnimationResult<T> = Result<T, AnimationError>;

/// Successful outcome of an animation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// The video is available at this URL.
    Ready(String),
    /// The service accepted the request and is still rendering.
    Pending { job_id: Option<String> },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody {
    video_url: Option<String>,
    status: Option<String>,
    job_id: Option<String>,
    error: Option<String>,
}

/// Sends animation payloads to the video generation service.
pub struct AnimationRequester {
    client: HttpClient,
    endpoint: Url,
}

impl AnimationRequester {
    /// Create a requester with a bounded request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> AnimationResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AnimationError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnimationError::RequestFailed(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request an animation for a complete payload.
    pub fn request_animation(&self, payload: &AnimationPayload) -> AnimationResult<AnimationOutcome> {
        payload.validate()?;

        let key = payload.idempotency_key();
        debug!(endpoint = %self.endpoint, key = %key, "requesting animation");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(IDEMPOTENCY_HEADER, &key)
            .json(payload)
            .send()
            .map_err(|e| failed(format!("transport: {}", e)))?;

        let status = response.status();
        let body: Option<ResponseBody> = response.json().ok();

        let outcome = match (status, body) {
            (StatusCode::OK, Some(ResponseBody { video_url: Some(url), .. }))
                if !url.trim().is_empty() =>
            {
                AnimationOutcome::Ready(url)
            }
            (StatusCode::ACCEPTED, Some(body))
                if body.status.as_deref().map_or(true, |s| s.eq_ignore_ascii_case("pending")) =>
            {
                AnimationOutcome::Pending { job_id: body.job_id }
            }
            (StatusCode::ACCEPTED, None) => AnimationOutcome::Pending { job_id: None },
            (status, body) => {
                let reason = body
                    .and_then(|b| b.error)
                    .unwrap_or_else(|| "unexpected response".to_string());
                return Err(failed(format!("status {}: {}", status.as_u16(), reason)));
            }
        };

        info!(key = %key, ready = matches!(outcome, AnimationOutcome::Ready(_)), "animation requested");
        Ok(outcome)
    }
}

fn failed(reason: String) -> AnimationError {
    warn!(reason = %reason, "animation request failed");
    AnimationError::RequestFailed(reason)
}
