//! Output types: the curriculum as returned by the model and the assembled
//! course with its generated artifacts.
//!
//! [`CurriculumPlan`] mirrors the JSON schema the prompt asks the model to
//! produce; every field is defaulted because models under-fill optional keys.
//! [`CourseOutput`] is the caller-facing result: course info, cover and
//! per-module illustration outcomes, plus run statistics. Illustration
//! failures live *inside* the outcome ([`ArtifactOutcome::error`]) so a
//! course with one broken image still serialises as a complete course.

use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};

// ── Model-facing curriculum schema ───────────────────────────────────────

/// The structured curriculum parsed from the chat completion reply.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CurriculumPlan {
    #[serde(default)]
    pub course_title: String,
    #[serde(default)]
    pub course_description: String,
    #[serde(default)]
    pub course_cover_image_prompt: String,
    #[serde(default)]
    pub modules: Vec<ModulePlan>,
}

/// One module of the curriculum as planned by the model.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModulePlan {
    /// 1-based position; absent in sloppy model output, fixed up by position.
    #[serde(default)]
    pub module_number: Option<u32>,
    #[serde(default)]
    pub module_title: String,
    #[serde(default)]
    pub module_image_prompt: String,
    #[serde(default)]
    pub module_content: String,
}

// ── Assembled course ─────────────────────────────────────────────────────

/// Course-level metadata of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseInfo {
    pub course_title: String,
    pub course_description: String,
    /// Name of the uploaded PDF, carried through for traceability.
    pub pdf_filename: String,
    /// Length in characters of the extracted source text.
    pub text_length: usize,
}

/// A successfully generated (and possibly persisted) illustration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Fresh UUID assigned at generation time; also the S3 key stem.
    pub image_id: String,
    /// URL returned by the image provider.
    pub image_url: String,
    /// Durable S3 URL, when upload was enabled and succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_url: Option<String>,
    /// The full (style-wrapped) prompt sent to the provider.
    pub prompt_used: String,
    pub provider: String,
    /// Base64-encoded image bytes, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl GeneratedImage {
    /// Best URL for downstream consumers: the durable S3 copy when present,
    /// the provider URL otherwise.
    pub fn best_url(&self) -> &str {
        self.s3_url.as_deref().unwrap_or(&self.image_url)
    }
}

/// The outcome of one illustration attempt.
///
/// Exactly one of `image` / `error` is set after a real attempt; both stay
/// `None` when image generation was disabled for the run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArtifactOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<GeneratedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ArtifactError>,
    pub duration_ms: u64,
}

impl ArtifactOutcome {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn ok(image: GeneratedImage, duration_ms: u64) -> Self {
        Self {
            image: Some(image),
            error: None,
            duration_ms,
        }
    }

    pub fn failed(error: ArtifactError, duration_ms: u64) -> Self {
        Self {
            image: None,
            error: Some(error),
            duration_ms,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.image.is_some()
    }

    /// Best URL for publishing, when an image exists.
    pub fn best_url(&self) -> Option<&str> {
        self.image.as_ref().map(|i| i.best_url())
    }
}

/// One module of the final course, with its illustration outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleArtifact {
    pub module_number: u32,
    pub module_title: String,
    pub module_content: String,
    pub image: ArtifactOutcome,
}

/// Statistics for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationStats {
    pub modules_total: usize,
    pub images_generated: usize,
    pub images_failed: usize,
    pub llm_prompt_tokens: u64,
    pub llm_completion_tokens: u64,
    pub llm_duration_ms: u64,
    pub image_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The complete result of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOutput {
    pub info: CourseInfo,
    pub cover: ArtifactOutcome,
    pub modules: Vec<ModuleArtifact>,
    /// The curriculum exactly as parsed from the model, before artifact
    /// assembly. Kept for clients that render the raw plan.
    pub raw_curriculum: CurriculumPlan,
    pub stats: GenerationStats,
}

// ── Publish results ──────────────────────────────────────────────────────

/// Result of pushing one module slide to the LMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideResult {
    pub module_number: u32,
    pub module_title: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of publishing a course and its slides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub course_id: String,
    pub course_title: String,
    pub cover_image_url: String,
    pub total_modules: usize,
    pub successful_slides: usize,
    pub failed_slides: usize,
    pub slides: Vec<SlideResult>,
}
