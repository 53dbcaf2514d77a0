//! S3 persistence for generated images.
//!
//! Provider image URLs expire; uploading a copy under `courses/{image_id}.png`
//! gives the LMS a durable URL. Credentials come from the default AWS
//! provider chain (environment, profile, instance metadata).

use crate::config::GenerationConfig;
use crate::error::CourseGenError;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use std::time::Duration;
use tracing::{debug, info};

/// Uploads generated images into an S3 bucket.
pub struct ImageStore {
    s3: aws_sdk_s3::Client,
    bucket: String,
    http: reqwest::Client,
}

impl ImageStore {
    /// Build a store against the configured bucket and region.
    pub async fn new(config: &GenerationConfig) -> Result<Self, CourseGenError> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .load()
            .await;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.image_download_timeout_secs))
            .build()
            .map_err(|e| CourseGenError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            s3: aws_sdk_s3::Client::new(&aws_config),
            bucket: config.s3_bucket.clone(),
            http,
        })
    }

    /// Download the image at `url` and upload it under the key for
    /// `image_id`. Returns the public S3 URL.
    pub async fn upload_from_url(
        &self,
        url: &str,
        image_id: &str,
    ) -> Result<String, CourseGenError> {
        let response = self
            .http
            .get(url)
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

        let key = s3_key(image_id);
        debug!(bucket = %self.bucket, key = %key, bytes = bytes.len(), "uploading image");

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type("image/png")
            .send()
            .await
            .map_err(|e| CourseGenError::StorageUpload {
                key: key.clone(),
                detail: e.to_string(),
            })?;

        let public = public_url(&self.bucket, &key);
        info!(url = %public, "image persisted to S3");
        Ok(public)
    }
}

/// Object key for a generated image.
pub fn s3_key(image_id: &str) -> String {
    format!("courses/{image_id}.png")
}

/// Public virtual-hosted-style URL for an object.
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com/{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        assert_eq!(
            s3_key("7a1e2f00-0000-4000-8000-000000000000"),
            "courses/7a1e2f00-0000-4000-8000-000000000000.png"
        );
    }

    #[test]
    fn public_url_layout() {
        assert_eq!(
            public_url("lisa-research", "courses/abc.png"),
            "https://lisa-research.s3.amazonaws.com/courses/abc.png"
        );
    }
}
