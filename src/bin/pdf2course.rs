//! pdf2course CLI: generate courses from PDFs, extract text, or run the
//! HTTP API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2course::{
    generate, publish, GenerationConfig, GenerationProgress, PublishOptions, Stage,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

#[derive(Parser)]
#[command(
    name = "pdf2course",
    version,
    about = "Generate illustrated course curricula from PDF documents",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a course from a PDF and write it as JSON.
    Generate {
        /// Input PDF file.
        input: PathBuf,

        /// Output JSON file (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Chat model to use.
        #[arg(long, default_value = "gpt-4o-mini")]
        model: String,

        /// Skip cover and module illustration generation.
        #[arg(long)]
        no_images: bool,

        /// Skip embedding images as base64 in the output.
        #[arg(long)]
        no_base64: bool,

        /// Skip uploading images to S3.
        #[arg(long)]
        no_upload: bool,

        /// Publish the generated course to the LMS.
        #[arg(long, requires = "org_id")]
        publish: bool,

        /// Organisation id for publishing.
        #[arg(long)]
        org_id: Option<String>,

        /// Course UID (generated when omitted).
        #[arg(long)]
        uid: Option<String>,

        /// LMS bearer token (falls back to LMS_AUTHORIZATION_TOKEN).
        #[arg(long, env = "LMS_AUTHORIZATION_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Extract and print the plain text of a PDF.
    Extract {
        /// Input PDF file.
        input: PathBuf,
    },

    /// Run the HTTP API server.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "0.0.0.0:5001")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf2course=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            input,
            output,
            model,
            no_images,
            no_base64,
            no_upload,
            publish: do_publish,
            org_id,
            uid,
            token,
        } => {
            run_generate(
                input, output, model, no_images, no_base64, no_upload, do_publish, org_id, uid,
                token,
            )
            .await
        }
        Command::Extract { input } => run_extract(input),
        Command::Serve { addr } => {
            let config = GenerationConfig::from_env();
            pdf2course::server::serve(addr, config)
                .await
                .context("server error")
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_generate(
    input: PathBuf,
    output: Option<PathBuf>,
    model: String,
    no_images: bool,
    no_base64: bool,
    no_upload: bool,
    do_publish: bool,
    org_id: Option<String>,
    uid: Option<String>,
    token: Option<String>,
) -> Result<()> {
    let pdf = std::fs::read(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input.pdf".to_string());

    let mut config = GenerationConfig::from_env();
    config.model = model;
    config.generate_images = !no_images;
    config.include_base64 = !no_base64;
    config.upload_to_s3 = !no_upload;
    config.progress = Some(Arc::new(CliProgress::new()));

    let course = generate(&pdf, &filename, &config)
        .await
        .context("course generation failed")?;

    eprintln!(
        "Generated '{}' with {} modules ({} images ok, {} failed)",
        course.info.course_title,
        course.stats.modules_total,
        course.stats.images_generated,
        course.stats.images_failed,
    );

    if do_publish {
        let options = PublishOptions {
            // Presence enforced by clap (`requires = "org_id"`).
            org_id: org_id.unwrap_or_default(),
            uid,
            token,
        };
        let outcome = publish(&course, &options, &config)
            .await
            .context("publishing failed")?;
        eprintln!(
            "Published course {} ({} slides ok, {} failed)",
            outcome.course_id, outcome.successful_slides, outcome.failed_slides,
        );
    }

    let json = serde_json::to_string_pretty(&course)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_extract(input: PathBuf) -> Result<()> {
    let pdf = std::fs::read(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let text = pdf2course::pipeline::extract::extract_text(&pdf)?;
    println!("{text}");
    Ok(())
}

/// indicatif-backed progress rendering for the CLI.
struct CliProgress {
    bar: Mutex<ProgressBar>,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self {
            bar: Mutex::new(bar),
        }
    }

    fn set_message(&self, msg: String) {
        if let Ok(bar) = self.bar.lock() {
            bar.set_message(msg);
        }
    }
}

impl GenerationProgress for CliProgress {
    fn on_stage(&self, stage: Stage) {
        let msg = match stage {
            Stage::Extracting => "Extracting text from PDF...",
            Stage::Splitting => "Splitting text into modules...",
            Stage::Curriculum => "Generating curriculum...",
            Stage::CoverImage => "Generating cover image...",
            Stage::ModuleImages => "Generating module images...",
        };
        self.set_message(msg.to_string());
    }

    fn on_module_image_start(&self, number: u32, total: usize) {
        self.set_message(format!("Generating module image {number}/{total}..."));
    }

    fn on_complete(&self, modules: usize, images_generated: usize, images_failed: usize) {
        if let Ok(bar) = self.bar.lock() {
            bar.finish_with_message(format!(
                "Done: {modules} modules, {images_generated} images, {images_failed} failed"
            ));
        }
    }
}
