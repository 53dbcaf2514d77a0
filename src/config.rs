//! Configuration types for course generation.
//!
//! All behaviour is controlled through [`GenerationConfig`], built via its
//! [`GenerationConfigBuilder`] or loaded from the environment with
//! [`GenerationConfig::from_env`]. Keeping every knob in one struct makes it
//! trivial to share configs across handlers, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! Base URLs for the three external services are configurable so tests can
//! point every client at a local mock server.

use crate::error::CourseGenError;
use crate::llm::ChatClient;
use crate::progress::GenerationProgress;
use std::fmt;
use std::sync::Arc;

/// Configuration for a PDF-to-course generation run.
///
/// Built via [`GenerationConfig::builder()`], [`GenerationConfig::default()`],
/// or [`GenerationConfig::from_env()`].
///
/// # Example
/// ```rust
/// use pdf2course::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .model("gpt-4o-mini")
///     .temperature(0.7)
///     .include_base64(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Chat model identifier. Default: "gpt-4o-mini".
    pub model: String,

    /// Sampling temperature for the curriculum completion. Default: 0.7.
    ///
    /// The curriculum prompt asks the model to *expand* module content with
    /// examples and use cases, so a mid-range temperature is deliberate —
    /// near-zero produces dry restatements of the source text.
    pub temperature: f32,

    /// Maximum tokens the model may generate for the curriculum. Default: 4000.
    ///
    /// The reply carries the full JSON curriculum including 350–400 words per
    /// module; setting this too low truncates the JSON mid-object and the
    /// parse fails with the raw text attached.
    pub max_tokens: u32,

    /// API key for the chat completion service (`OPENAI_API_KEY`).
    pub chat_api_key: Option<String>,

    /// Base URL of the chat completion service. Default: "https://api.openai.com".
    pub chat_base_url: String,

    /// Pre-constructed chat client. Takes precedence over `chat_api_key`.
    /// Useful in tests or when the caller needs custom middleware.
    pub chat_client: Option<Arc<dyn ChatClient>>,

    /// API key for the image generation service (`IDEOGRAM_API_KEY`).
    pub image_api_key: Option<String>,

    /// Base URL of the image generation service. Default: "https://api.ideogram.ai".
    pub image_base_url: String,

    /// Aspect ratio requested for generated images. Default: "1x1".
    pub aspect_ratio: String,

    /// Rendering speed tier. Default: "DEFAULT".
    pub rendering_speed: String,

    /// Style type. Default: "REALISTIC".
    pub style_type: String,

    /// Generate cover and module illustrations at all. Default: true.
    ///
    /// Disabling skips every image API call; outcomes carry neither an image
    /// nor an error. Useful for text-only dry runs.
    pub generate_images: bool,

    /// Download each generated image and embed it as base64. Default: true.
    pub include_base64: bool,

    /// Upload generated images to S3. Default: true.
    pub upload_to_s3: bool,

    /// S3 bucket for persisted images. Default: "lisa-research".
    pub s3_bucket: String,

    /// AWS region for the S3 client. Default: "us-east-1".
    pub s3_region: String,

    /// Base URL of the LMS API. Default: "https://admin.lisaapp.net".
    pub lms_base_url: String,

    /// Bearer token for the LMS API (`LMS_AUTHORIZATION_TOKEN`).
    /// Request-level tokens take precedence over this.
    pub lms_token: Option<String>,

    /// Prefix for generated course UIDs. Default: "C".
    pub uid_prefix: String,

    /// Per-API-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Timeout for downloading a generated image, in seconds. Default: 30.
    pub image_download_timeout_secs: u64,

    /// Optional progress observer, driven once per pipeline stage and once
    /// per module illustration.
    pub progress: Option<Arc<dyn GenerationProgress>>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            chat_api_key: None,
            chat_base_url: "https://api.openai.com".to_string(),
            chat_client: None,
            image_api_key: None,
            image_base_url: "https://api.ideogram.ai".to_string(),
            aspect_ratio: "1x1".to_string(),
            rendering_speed: "DEFAULT".to_string(),
            style_type: "REALISTIC".to_string(),
            generate_images: true,
            include_base64: true,
            upload_to_s3: true,
            s3_bucket: "lisa-research".to_string(),
            s3_region: "us-east-1".to_string(),
            lms_base_url: "https://admin.lisaapp.net".to_string(),
            lms_token: None,
            uid_prefix: "C".to_string(),
            api_timeout_secs: 60,
            image_download_timeout_secs: 30,
            progress: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("chat_api_key", &self.chat_api_key.as_ref().map(|_| "<redacted>"))
            .field("chat_base_url", &self.chat_base_url)
            .field("chat_client", &self.chat_client.as_ref().map(|_| "<dyn ChatClient>"))
            .field("image_api_key", &self.image_api_key.as_ref().map(|_| "<redacted>"))
            .field("image_base_url", &self.image_base_url)
            .field("generate_images", &self.generate_images)
            .field("include_base64", &self.include_base64)
            .field("upload_to_s3", &self.upload_to_s3)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_region", &self.s3_region)
            .field("lms_base_url", &self.lms_base_url)
            .field("lms_token", &self.lms_token.as_ref().map(|_| "<redacted>"))
            .field("uid_prefix", &self.uid_prefix)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// Reads `OPENAI_API_KEY`, `IDEOGRAM_API_KEY`, `S3_BUCKET_NAME`,
    /// `AWS_REGION`, and `LMS_AUTHORIZATION_TOKEN`, plus the base-URL
    /// overrides `OPENAI_BASE_URL`, `IDEOGRAM_BASE_URL`, and `LMS_BASE_URL`.
    /// Absent variables leave the defaults in place.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.chat_api_key = non_empty_env("OPENAI_API_KEY");
        config.image_api_key = non_empty_env("IDEOGRAM_API_KEY");
        config.lms_token = non_empty_env("LMS_AUTHORIZATION_TOKEN");
        if let Some(bucket) = non_empty_env("S3_BUCKET_NAME") {
            config.s3_bucket = bucket;
        }
        if let Some(region) = non_empty_env("AWS_REGION") {
            config.s3_region = region;
        }
        if let Some(url) = non_empty_env("OPENAI_BASE_URL") {
            config.chat_base_url = url;
        }
        if let Some(url) = non_empty_env("IDEOGRAM_BASE_URL") {
            config.image_base_url = url;
        }
        if let Some(url) = non_empty_env("LMS_BASE_URL") {
            config.lms_base_url = url;
        }
        config
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn chat_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.chat_api_key = Some(key.into());
        self
    }

    pub fn chat_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.chat_base_url = url.into();
        self
    }

    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.config.chat_client = Some(client);
        self
    }

    pub fn image_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.image_api_key = Some(key.into());
        self
    }

    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.image_base_url = url.into();
        self
    }

    pub fn aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.config.aspect_ratio = ratio.into();
        self
    }

    pub fn rendering_speed(mut self, speed: impl Into<String>) -> Self {
        self.config.rendering_speed = speed.into();
        self
    }

    pub fn style_type(mut self, style: impl Into<String>) -> Self {
        self.config.style_type = style.into();
        self
    }

    pub fn generate_images(mut self, v: bool) -> Self {
        self.config.generate_images = v;
        self
    }

    pub fn include_base64(mut self, v: bool) -> Self {
        self.config.include_base64 = v;
        self
    }

    pub fn upload_to_s3(mut self, v: bool) -> Self {
        self.config.upload_to_s3 = v;
        self
    }

    pub fn s3_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.s3_bucket = bucket.into();
        self
    }

    pub fn s3_region(mut self, region: impl Into<String>) -> Self {
        self.config.s3_region = region.into();
        self
    }

    pub fn lms_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.lms_base_url = url.into();
        self
    }

    pub fn lms_token(mut self, token: impl Into<String>) -> Self {
        self.config.lms_token = Some(token.into());
        self
    }

    pub fn uid_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.uid_prefix = prefix.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn image_download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.image_download_timeout_secs = secs;
        self
    }

    pub fn progress(mut self, progress: Arc<dyn GenerationProgress>) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, CourseGenError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(CourseGenError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(CourseGenError::InvalidConfig(format!(
                "temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        if c.model.is_empty() {
            return Err(CourseGenError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}
