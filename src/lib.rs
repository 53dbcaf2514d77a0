//! # pdf2course
//!
//! Turn a PDF into a structured, illustrated course and optionally publish
//! it to an LMS.
//!
//! ```text
//! PDF bytes
//!    │  extract          pdf text extraction
//!    ▼
//! plain text
//!    │  split            heading-based section splitter
//!    ▼
//! raw modules
//!    │  curriculum       one chat completion → structured JSON plan
//!    ▼
//! curriculum plan
//!    │  image + storage  cover & module illustrations → S3
//!    ▼
//! CourseOutput ──publish──▶ LMS course + slides
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pdf2course::{generate, GenerationConfig};
//!
//! # async fn run() -> Result<(), pdf2course::CourseGenError> {
//! let config = GenerationConfig::from_env();
//! let pdf = std::fs::read("course.pdf").map_err(|e| {
//!     pdf2course::CourseGenError::Internal(e.to_string())
//! })?;
//! let course = generate(&pdf, "course.pdf", &config).await?;
//! println!("{} modules", course.modules.len());
//! # Ok(())
//! # }
//! ```
//!
//! The HTTP API ([`server::router`]) and the CLI binary are thin shells over
//! the same [`generate`] / [`publish`] entry points.

pub mod config;
pub mod error;
pub mod generate;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod server;

pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use error::{ArtifactError, CourseGenError};
pub use generate::{generate, generate_and_publish, publish, PublishOptions};
pub use llm::{ChatClient, ChatRequest, ChatResponse, OpenAiChatClient};
pub use output::{
    ArtifactOutcome, CourseInfo, CourseOutput, CurriculumPlan, GeneratedImage, GenerationStats,
    ModuleArtifact, ModulePlan, PublishOutcome, SlideResult,
};
pub use pipeline::split::{split_sections, RawModule};
pub use progress::{GenerationProgress, Stage};
