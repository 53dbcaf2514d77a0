//! Illustration generation via an Ideogram-compatible image API.

use crate::config::GenerationConfig;
use crate::error::CourseGenError;
use crate::output::GeneratedImage;
use crate::prompts;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const PROVIDER: &str = "ideogram";

/// Client for the image generation API.
///
/// NOTE: Do NOT derive `Debug` on this struct — `api_key` would be exposed.
pub struct ImageClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    aspect_ratio: String,
    rendering_speed: String,
    style_type: String,
    include_base64: bool,
    download_timeout: Duration,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    prompt: &'a str,
    aspect_ratio: &'a str,
    rendering_speed: &'a str,
    style_type: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    data: Vec<WireImage>,
}

#[derive(Deserialize)]
struct WireImage {
    #[serde(default)]
    url: Option<String>,
}

impl ImageClient {
    /// Build a client from the configuration, or fail with
    /// [`CourseGenError::ImageApiNotConfigured`] when no API key is set.
    pub fn new(config: &GenerationConfig) -> Result<Self, CourseGenError> {
        let api_key = config
            .image_api_key
            .clone()
            .ok_or(CourseGenError::ImageApiNotConfigured)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| CourseGenError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.image_base_url.trim_end_matches('/').to_string(),
            aspect_ratio: config.aspect_ratio.clone(),
            rendering_speed: config.rendering_speed.clone(),
            style_type: config.style_type.clone(),
            include_base64: config.include_base64,
            download_timeout: Duration::from_secs(config.image_download_timeout_secs),
        })
    }

    /// Generate one illustration for `description`.
    ///
    /// The description is wrapped in the fixed realistic-educational style
    /// block before being sent. Single attempt; failures are returned to the
    /// caller, which records them as a per-artifact error.
    pub async fn generate(&self, description: &str) -> Result<GeneratedImage, CourseGenError> {
        let prompt = prompts::image_prompt(description);
        let url = format!("{}/v1/ideogram-v3/generate", self.base_url);

        let body = WireRequest {
            prompt: &prompt,
            aspect_ratio: &self.aspect_ratio,
            rendering_speed: &self.rendering_speed,
            style_type: &self.style_type,
        };

        debug!(url = %url, "requesting image generation");

        let response = self
            .http
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CourseGenError::ImageGeneration {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CourseGenError::ImageGeneration {
                detail: format!("HTTP {status}: {text}"),
            });
        }

        let reply: WireResponse =
            response
                .json()
                .await
                .map_err(|e| CourseGenError::ImageGeneration {
                    detail: format!("invalid response body: {e}"),
                })?;

        let image_url = reply
            .data
            .into_iter()
            .next()
            .and_then(|i| i.url)
            .ok_or_else(|| CourseGenError::ImageGeneration {
                detail: "response contained no image URL".to_string(),
            })?;

        let image_base64 = if self.include_base64 {
            Some(self.download_base64(&image_url).await?)
        } else {
            None
        };

        Ok(GeneratedImage {
            image_id: Uuid::new_v4().to_string(),
            image_url,
            s3_url: None,
            prompt_used: prompt,
            provider: PROVIDER.to_string(),
            image_base64,
        })
    }

    /// Download a generated image and base64-encode its bytes.
    async fn download_base64(&self, url: &str) -> Result<String, CourseGenError> {
        let response = self
            .http
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| CourseGenError::ImageDownload {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CourseGenError::ImageDownload {
                url: url.to_string(),
                detail: format!("HTTP {status}"),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CourseGenError::ImageDownload {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
    }
}
