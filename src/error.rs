//! Error types for the pdf2course library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CourseGenError`] — **Fatal**: the generation cannot proceed at all
//!   (not a PDF, no extractable text, chat API not configured, publish
//!   rejected). Returned as `Err(CourseGenError)` from the top-level
//!   `generate*` and `publish*` functions.
//!
//! * [`ArtifactError`] — **Non-fatal**: a single illustration failed
//!   (image API hiccup, S3 upload refused) but the course text is fine.
//!   Stored inside [`crate::output::ArtifactOutcome`] so callers can inspect
//!   partial success rather than losing the whole course to one bad image.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! failed illustration, log and continue, or publish the course with the
//! images that did render.

use thiserror::Error;

/// All fatal errors returned by the pdf2course library.
///
/// Per-illustration failures use [`ArtifactError`] and are stored in
/// [`crate::output::ArtifactOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum CourseGenError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The uploaded bytes are not a PDF (missing `%PDF` magic).
    #[error("Input is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: [u8; 4] },

    /// The PDF parser rejected the document.
    #[error("Failed to extract text from PDF: {detail}")]
    PdfExtraction { detail: String },

    /// The PDF parsed but contained no extractable text.
    #[error("No text could be extracted from the PDF")]
    EmptyDocument,

    // ── Chat completion errors ────────────────────────────────────────────
    /// No chat API key was supplied and no client was injected.
    #[error("Chat completion API is not configured.\n{hint}")]
    ChatNotConfigured { hint: String },

    /// The chat completion API returned an error.
    #[error("Chat completion API error: {detail}")]
    ChatApi { detail: String },

    /// The model reply could not be parsed into a curriculum.
    ///
    /// Carries the raw reply so callers can surface it for debugging, the
    /// way the original service returned the unparsed curriculum text.
    #[error("Failed to parse curriculum JSON: {detail}")]
    CurriculumParse { detail: String, raw: String },

    // ── Image generation errors ───────────────────────────────────────────
    /// No image API key is configured.
    #[error("Image generation API key not configured. Set IDEOGRAM_API_KEY.")]
    ImageApiNotConfigured,

    /// The image generation API refused the request or returned no image.
    #[error("Image generation failed: {detail}")]
    ImageGeneration { detail: String },

    /// A generated image URL could not be downloaded.
    #[error("Failed to download image from '{url}': {detail}")]
    ImageDownload { url: String, detail: String },

    // ── Storage errors ────────────────────────────────────────────────────
    /// S3 PutObject failed.
    #[error("Failed to upload '{key}' to object storage: {detail}")]
    StorageUpload { key: String, detail: String },

    // ── Publish errors ────────────────────────────────────────────────────
    /// No bearer token available for the LMS API.
    #[error("No authorization token set. Provide one in the request or via LMS_AUTHORIZATION_TOKEN.")]
    MissingToken,

    /// The course has no cover image URL to publish with.
    #[error("Course cover image URL is required to create the course")]
    CoverImageMissing,

    /// The LMS API returned a non-success status.
    #[error("LMS API request failed with status {status}: {detail}")]
    PublishFailed { status: u16, detail: String },

    /// Course creation responded but no course id could be extracted.
    #[error("Course creation returned no usable course id")]
    CourseIdMissing,

    /// The freshly created course could not be found on verification.
    #[error("Course '{course_id}' was created but could not be verified")]
    CourseNotFound { course_id: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single illustration.
///
/// Stored in [`crate::output::ArtifactOutcome`] when the cover or a module
/// image fails. Course generation continues regardless.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ArtifactError {
    /// The image API call failed or returned no URL.
    #[error("image generation failed: {detail}")]
    Generation { detail: String },

    /// The image rendered but could not be persisted to object storage.
    #[error("image upload failed: {detail}")]
    Upload { detail: String },
}
