//! End-to-end orchestration: PDF bytes in, assembled course (and optionally
//! a published LMS course) out.
//!
//! Generation is strictly sequential: one chat completion, then one
//! illustration at a time. Illustration failures never abort the run; they
//! are recorded per artifact so a course with nine good images and one bad
//! one still comes back whole.

use crate::config::GenerationConfig;
use crate::error::{ArtifactError, CourseGenError};
use crate::llm::{ChatClient, OpenAiChatClient};
use crate::output::{
    ArtifactOutcome, CourseInfo, CourseOutput, GenerationStats, ModuleArtifact, PublishOutcome,
    SlideResult,
};
use crate::pipeline::curriculum::generate_curriculum;
use crate::pipeline::extract::extract_text;
use crate::pipeline::image::ImageClient;
use crate::pipeline::publish::{generate_uid, LmsClient};
use crate::pipeline::split::split_sections;
use crate::pipeline::storage::ImageStore;
use crate::progress::Stage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Options for publishing a generated course to the LMS.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Organisation the course is created under.
    pub org_id: String,
    /// Course UID; generated from the configured prefix when absent.
    pub uid: Option<String>,
    /// Bearer token; falls back to the configured token when absent.
    pub token: Option<String>,
}

/// Generate a complete course from PDF bytes.
pub async fn generate(
    pdf_bytes: &[u8],
    filename: &str,
    config: &GenerationConfig,
) -> Result<CourseOutput, CourseGenError> {
    let run_start = Instant::now();

    // ── Step 1: extract text ─────────────────────────────────────────────
    report_stage(config, Stage::Extracting);
    let text = extract_text(pdf_bytes)?;
    if text.trim().is_empty() {
        return Err(CourseGenError::EmptyDocument);
    }

    // ── Step 2: split into modules ───────────────────────────────────────
    report_stage(config, Stage::Splitting);
    let raw_modules = split_sections(&text);
    info!(
        filename = %filename,
        chars = text.len(),
        modules = raw_modules.len(),
        "document split"
    );

    // ── Step 3: curriculum via chat completion ───────────────────────────
    report_stage(config, Stage::Curriculum);
    let chat = resolve_chat_client(config)?;
    let llm_start = Instant::now();
    let (plan, chat_response) = generate_curriculum(chat.as_ref(), &raw_modules, config).await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    // ── Step 4: illustration setup ───────────────────────────────────────
    let images = ImageSetup::resolve(config).await;

    // ── Step 5: cover illustration ───────────────────────────────────────
    report_stage(config, Stage::CoverImage);
    let image_start = Instant::now();
    let cover_prompt = if plan.course_cover_image_prompt.is_empty() {
        format!(
            "Professional course cover image for the course '{}'",
            plan.course_title
        )
    } else {
        plan.course_cover_image_prompt.clone()
    };
    let cover = images.render(&cover_prompt).await;

    // ── Step 6: module illustrations, sequential ─────────────────────────
    report_stage(config, Stage::ModuleImages);
    let total = plan.modules.len();
    let mut modules = Vec::with_capacity(total);
    for (i, planned) in plan.modules.iter().enumerate() {
        let module_number = planned.module_number.unwrap_or((i + 1) as u32);
        let module_title = if planned.module_title.is_empty() {
            format!("Module {}", i + 1)
        } else {
            planned.module_title.clone()
        };

        if let Some(progress) = &config.progress {
            progress.on_module_image_start(module_number, total);
        }

        let module_prompt = if planned.module_image_prompt.is_empty() {
            format!("Educational illustration for the module '{module_title}'")
        } else {
            planned.module_image_prompt.clone()
        };
        let image = images.render(&module_prompt).await;

        if let Some(progress) = &config.progress {
            progress.on_module_image_complete(module_number, total, image.is_ok());
        }

        modules.push(ModuleArtifact {
            module_number,
            module_title,
            module_content: planned.module_content.clone(),
            image,
        });
    }
    let image_duration_ms = image_start.elapsed().as_millis() as u64;

    // ── Step 7: assemble ─────────────────────────────────────────────────
    let images_generated = modules.iter().filter(|m| m.image.is_ok()).count()
        + usize::from(cover.is_ok());
    let images_failed = modules.iter().filter(|m| m.image.error.is_some()).count()
        + usize::from(cover.error.is_some());

    let stats = GenerationStats {
        modules_total: modules.len(),
        images_generated,
        images_failed,
        llm_prompt_tokens: chat_response.prompt_tokens,
        llm_completion_tokens: chat_response.completion_tokens,
        llm_duration_ms,
        image_duration_ms,
        total_duration_ms: run_start.elapsed().as_millis() as u64,
    };

    if let Some(progress) = &config.progress {
        progress.on_complete(stats.modules_total, images_generated, images_failed);
    }

    info!(
        course_title = %plan.course_title,
        modules = stats.modules_total,
        images_generated,
        images_failed,
        duration_ms = stats.total_duration_ms,
        "course generated"
    );

    Ok(CourseOutput {
        info: CourseInfo {
            course_title: plan.course_title.clone(),
            course_description: plan.course_description.clone(),
            pdf_filename: filename.to_string(),
            text_length: text.len(),
        },
        cover,
        modules,
        raw_curriculum: plan,
        stats,
    })
}

/// Publish a generated course to the LMS: create the course, verify it,
/// then push one slide per module.
///
/// Slide failures are recorded per slide; course creation and verification
/// failures are fatal.
pub async fn publish(
    course: &CourseOutput,
    options: &PublishOptions,
    config: &GenerationConfig,
) -> Result<PublishOutcome, CourseGenError> {
    // ── Step 1: resolve token and cover ──────────────────────────────────
    let token = options
        .token
        .clone()
        .or_else(|| config.lms_token.clone())
        .ok_or(CourseGenError::MissingToken)?;

    let cover_url = course
        .cover
        .best_url()
        .ok_or(CourseGenError::CoverImageMissing)?
        .to_string();

    let lms = LmsClient::new(config, token)?;

    // ── Step 2: create and verify the course ─────────────────────────────
    let uid = options
        .uid
        .clone()
        .unwrap_or_else(|| generate_uid(&config.uid_prefix));

    let course_id = lms
        .create_course(&course.info.course_title, &uid, &options.org_id, &cover_url)
        .await?;

    if !lms.verify_course(&course_id).await {
        return Err(CourseGenError::CourseNotFound { course_id });
    }

    // ── Step 3: slides, one per module ───────────────────────────────────
    let mut slides = Vec::with_capacity(course.modules.len());
    for module in &course.modules {
        // No illustration means no slide: recorded as failed, LMS not called.
        let Some(image_url) = module.image.best_url() else {
            warn!(module = module.module_number, "module has no image URL, skipping slide");
            slides.push(SlideResult {
                module_number: module.module_number,
                module_title: module.module_title.clone(),
                success: false,
                error: Some("No image URL available".to_string()),
            });
            continue;
        };
        let result = lms
            .create_slide(
                &course_id,
                &module.module_title,
                &module.module_content,
                image_url,
            )
            .await;

        if let Err(e) = &result {
            warn!(
                module = module.module_number,
                error = %e,
                "slide creation failed"
            );
        }

        slides.push(SlideResult {
            module_number: module.module_number,
            module_title: module.module_title.clone(),
            success: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        });
    }

    let successful_slides = slides.iter().filter(|s| s.success).count();
    let failed_slides = slides.len() - successful_slides;

    info!(
        course_id = %course_id,
        successful_slides,
        failed_slides,
        "course published"
    );

    Ok(PublishOutcome {
        course_id,
        course_title: course.info.course_title.clone(),
        cover_image_url: cover_url,
        total_modules: course.modules.len(),
        successful_slides,
        failed_slides,
        slides,
    })
}

/// Generate a course and publish it in one call.
pub async fn generate_and_publish(
    pdf_bytes: &[u8],
    filename: &str,
    options: &PublishOptions,
    config: &GenerationConfig,
) -> Result<(CourseOutput, PublishOutcome), CourseGenError> {
    let course = generate(pdf_bytes, filename, config).await?;
    let outcome = publish(&course, options, config).await?;
    Ok((course, outcome))
}

fn report_stage(config: &GenerationConfig, stage: Stage) {
    if let Some(progress) = &config.progress {
        progress.on_stage(stage);
    }
}

fn resolve_chat_client(config: &GenerationConfig) -> Result<Arc<dyn ChatClient>, CourseGenError> {
    if let Some(client) = &config.chat_client {
        return Ok(Arc::clone(client));
    }
    Ok(Arc::new(OpenAiChatClient::new(config)?))
}

/// Illustration capability for a run, resolved once up front.
enum ImageSetup {
    /// Images disabled in configuration; every outcome is skipped.
    Disabled,
    /// No API key; every outcome carries the same configuration error.
    Unconfigured(String),
    Ready {
        client: ImageClient,
        store: Option<ImageStore>,
    },
}

impl ImageSetup {
    async fn resolve(config: &GenerationConfig) -> Self {
        if !config.generate_images {
            return Self::Disabled;
        }
        let client = match ImageClient::new(config) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "image generation unavailable");
                return Self::Unconfigured(e.to_string());
            }
        };
        let store = if config.upload_to_s3 {
            match ImageStore::new(config).await {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!(error = %e, "object storage unavailable, keeping provider URLs only");
                    None
                }
            }
        } else {
            None
        };
        Self::Ready { client, store }
    }

    /// Generate (and optionally persist) one illustration. Any failure in
    /// the generate-then-upload sequence turns the whole artifact into an
    /// error outcome.
    async fn render(&self, description: &str) -> ArtifactOutcome {
        let (client, store) = match self {
            Self::Disabled => return ArtifactOutcome::skipped(),
            Self::Unconfigured(detail) => {
                return ArtifactOutcome::failed(
                    ArtifactError::Generation {
                        detail: detail.clone(),
                    },
                    0,
                )
            }
            Self::Ready { client, store } => (client, store.as_ref()),
        };

        let start = Instant::now();
        let mut image = match client.generate(description).await {
            Ok(image) => image,
            Err(e) => {
                return ArtifactOutcome::failed(
                    ArtifactError::Generation {
                        detail: e.to_string(),
                    },
                    start.elapsed().as_millis() as u64,
                )
            }
        };

        if let Some(store) = store {
            match store.upload_from_url(&image.image_url, &image.image_id).await {
                Ok(s3_url) => image.s3_url = Some(s3_url),
                Err(e) => {
                    return ArtifactOutcome::failed(
                        ArtifactError::Upload {
                            detail: e.to_string(),
                        },
                        start.elapsed().as_millis() as u64,
                    )
                }
            }
        }

        ArtifactOutcome::ok(image, start.elapsed().as_millis() as u64)
    }
}
