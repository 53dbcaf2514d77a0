//! HTTP API: an axum router exposing the generation pipeline.
//!
//! The router is a thin shell over the library: handlers validate input,
//! call into [`crate::generate`] / the pipeline clients, and map
//! [`CourseGenError`] onto status codes. A session-scoped LMS token can be
//! set once via `/set-token` and is then used by the publish endpoints;
//! request-level tokens always win over it.

use crate::config::GenerationConfig;
use crate::error::CourseGenError;
use crate::generate::{generate, generate_and_publish, PublishOptions};
use crate::output::SlideResult;
use crate::pipeline::extract::extract_text;
use crate::pipeline::image::ImageClient;
use crate::pipeline::publish::{generate_uid, LmsClient};
use crate::pipeline::storage::ImageStore;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// 50 MiB upload ceiling, matching typical course PDFs with headroom.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared state: the run configuration plus the session LMS token.
pub struct AppState {
    config: GenerationConfig,
    token: RwLock<Option<String>>,
}

type SharedState = Arc<AppState>;

/// Build the API router.
pub fn router(config: GenerationConfig) -> Router {
    let state = Arc::new(AppState {
        token: RwLock::new(config.lms_token.clone()),
        config,
    });

    Router::new()
        .route("/health", get(health))
        .route("/extract-text", post(extract_text_handler))
        .route("/generate-curriculum", post(generate_curriculum_handler))
        .route("/generate-image", post(generate_image_handler))
        .route("/set-token", post(set_token))
        .route("/get-token", get(get_token))
        .route("/validate-token", post(validate_token))
        .route("/create-course", post(create_course))
        .route("/create-module-slides", post(create_module_slides))
        .route("/generate-and-publish", post(generate_and_publish_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, config: GenerationConfig) -> Result<(), CourseGenError> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CourseGenError::Internal(format!("bind {addr}: {e}")))?;
    info!(addr = %addr, "serving HTTP API");
    axum::serve(listener, app)
        .await
        .map_err(|e| CourseGenError::Internal(format!("server: {e}")))
}

// ── Error mapping ────────────────────────────────────────────────────────

/// Handler-level error: either a request validation failure or a library
/// error mapped onto a status code.
enum ApiError {
    BadRequest(String),
    Course(CourseGenError),
}

impl From<CourseGenError> for ApiError {
    fn from(e: CourseGenError) -> Self {
        Self::Course(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Course(e) => {
                let status = match &e {
                    CourseGenError::NotAPdf { .. }
                    | CourseGenError::EmptyDocument
                    | CourseGenError::MissingToken
                    | CourseGenError::CoverImageMissing
                    | CourseGenError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
                    CourseGenError::ChatApi { .. }
                    | CourseGenError::CurriculumParse { .. }
                    | CourseGenError::ImageGeneration { .. }
                    | CourseGenError::ImageDownload { .. }
                    | CourseGenError::StorageUpload { .. }
                    | CourseGenError::PublishFailed { .. }
                    | CourseGenError::CourseNotFound { .. } => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!(error = %e, "request failed");
                }
                (status, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ── Multipart handling ───────────────────────────────────────────────────

struct PdfUpload {
    filename: String,
    bytes: Vec<u8>,
    org_id: Option<String>,
    uid: Option<String>,
    token: Option<String>,
}

/// Pull the `pdf_file` part (and optional publish fields) out of a
/// multipart form, with the original's validation messages.
async fn read_pdf_upload(mut multipart: Multipart) -> Result<PdfUpload, ApiError> {
    let mut upload = PdfUpload {
        filename: String::new(),
        bytes: Vec::new(),
        org_id: None,
        uid: None,
        token: None,
    };
    let mut saw_file = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "pdf_file" => {
                saw_file = true;
                upload.filename = field.file_name().unwrap_or_default().to_string();
                upload.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?
                    .to_vec();
            }
            "org_id" => upload.org_id = read_text_field(field).await?,
            "uid" => upload.uid = read_text_field(field).await?,
            "authorization_token" => upload.token = read_text_field(field).await?,
            _ => {}
        }
    }

    if !saw_file {
        return Err(ApiError::BadRequest("No PDF file uploaded".to_string()));
    }
    if upload.filename.is_empty() {
        return Err(ApiError::BadRequest("No file selected".to_string()));
    }
    if !upload.filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::BadRequest("File must be a PDF".to_string()));
    }
    if upload.bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    Ok(upload)
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>, ApiError> {
    let text = field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid form field: {e}")))?;
    Ok(Some(text).filter(|t| !t.is_empty()))
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": "pdf2course" }))
}

async fn extract_text_handler(
    State(_state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let upload = read_pdf_upload(multipart).await?;
    let text = extract_text(&upload.bytes)?;
    if text.trim().is_empty() {
        return Err(ApiError::Course(CourseGenError::EmptyDocument));
    }
    Ok(Json(json!({
        "filename": upload.filename,
        "text_length": text.len(),
        "text": text,
    })))
}

async fn generate_curriculum_handler(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let upload = read_pdf_upload(multipart).await?;
    let course = generate(&upload.bytes, &upload.filename, &state.config).await?;
    Ok(Json(serde_json::to_value(&course).map_err(|e| {
        ApiError::Course(CourseGenError::Internal(format!("serialize output: {e}")))
    })?))
}

#[derive(Deserialize)]
struct GenerateImageRequest {
    text: String,
}

async fn generate_image_handler(
    State(state): State<SharedState>,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text is required".to_string()));
    }

    let client = ImageClient::new(&state.config)?;
    let mut image = client.generate(&request.text).await?;

    if state.config.upload_to_s3 {
        let store = ImageStore::new(&state.config).await?;
        image.s3_url = Some(store.upload_from_url(&image.image_url, &image.image_id).await?);
    }

    Ok(Json(serde_json::to_value(&image).map_err(|e| {
        ApiError::Course(CourseGenError::Internal(format!("serialize image: {e}")))
    })?))
}

#[derive(Deserialize)]
struct SetTokenRequest {
    token: String,
}

async fn set_token(
    State(state): State<SharedState>,
    Json(request): Json<SetTokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.token.trim().is_empty() {
        return Err(ApiError::BadRequest("Token is required".to_string()));
    }
    *state.token.write().await = Some(request.token);
    Ok(Json(json!({ "message": "Token set successfully" })))
}

async fn get_token(State(state): State<SharedState>) -> Json<serde_json::Value> {
    // The token itself is never echoed back.
    let set = state.token.read().await.is_some();
    Json(json!({ "token_set": set }))
}

#[derive(Deserialize, Default)]
struct ValidateTokenRequest {
    #[serde(default)]
    token: Option<String>,
}

async fn validate_token(
    State(state): State<SharedState>,
    Json(request): Json<ValidateTokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = resolve_token(&state, request.token).await?;
    let lms = LmsClient::new(&state.config, token)?;
    let valid = lms.validate_token().await;
    Ok(Json(json!({ "valid": valid })))
}

#[derive(Deserialize)]
struct CreateCourseRequest {
    title: String,
    org_id: String,
    cover_image_url: String,
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

async fn create_course(
    State(state): State<SharedState>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Course title is required".to_string()));
    }
    if request.org_id.trim().is_empty() {
        return Err(ApiError::BadRequest("org_id is required".to_string()));
    }
    if request.cover_image_url.trim().is_empty() {
        return Err(ApiError::Course(CourseGenError::CoverImageMissing));
    }

    let token = resolve_token(&state, request.token).await?;
    let lms = LmsClient::new(&state.config, token)?;
    let uid = request
        .uid
        .unwrap_or_else(|| generate_uid(&state.config.uid_prefix));

    let course_id = lms
        .create_course(&request.title, &uid, &request.org_id, &request.cover_image_url)
        .await?;
    if !lms.verify_course(&course_id).await {
        return Err(ApiError::Course(CourseGenError::CourseNotFound { course_id }));
    }

    Ok(Json(json!({ "course_id": course_id, "uid": uid })))
}

#[derive(Deserialize)]
struct SlideModuleRequest {
    module_number: u32,
    module_title: String,
    module_content: String,
    image_url: String,
}

#[derive(Deserialize)]
struct CreateSlidesRequest {
    course_id: String,
    modules: Vec<SlideModuleRequest>,
    #[serde(default)]
    token: Option<String>,
}

async fn create_module_slides(
    State(state): State<SharedState>,
    Json(request): Json<CreateSlidesRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.course_id.trim().is_empty() {
        return Err(ApiError::BadRequest("course_id is required".to_string()));
    }
    if request.modules.is_empty() {
        return Err(ApiError::BadRequest("At least one module is required".to_string()));
    }

    let token = resolve_token(&state, request.token).await?;
    let lms = LmsClient::new(&state.config, token)?;

    let mut slides = Vec::with_capacity(request.modules.len());
    for module in &request.modules {
        // Same contract as the publish flow: no image URL, no LMS call.
        if module.image_url.trim().is_empty() {
            slides.push(SlideResult {
                module_number: module.module_number,
                module_title: module.module_title.clone(),
                success: false,
                error: Some("No image URL available".to_string()),
            });
            continue;
        }
        let result = lms
            .create_slide(
                &request.course_id,
                &module.module_title,
                &module.module_content,
                &module.image_url,
            )
            .await;
        slides.push(SlideResult {
            module_number: module.module_number,
            module_title: module.module_title.clone(),
            success: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        });
    }

    let successful = slides.iter().filter(|s| s.success).count();
    Ok(Json(json!({
        "course_id": request.course_id,
        "total_modules": slides.len(),
        "successful_slides": successful,
        "failed_slides": slides.len() - successful,
        "slides": slides,
    })))
}

async fn generate_and_publish_handler(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let upload = read_pdf_upload(multipart).await?;
    let org_id = upload
        .org_id
        .clone()
        .ok_or_else(|| ApiError::BadRequest("org_id is required".to_string()))?;
    let token = Some(resolve_token(&state, upload.token.clone()).await?);

    let options = PublishOptions {
        org_id,
        uid: upload.uid.clone(),
        token,
    };
    let (course, outcome) =
        generate_and_publish(&upload.bytes, &upload.filename, &options, &state.config).await?;

    Ok(Json(json!({
        "course": course,
        "publish": outcome,
    })))
}

/// Request token > session token > configured token.
async fn resolve_token(
    state: &SharedState,
    request_token: Option<String>,
) -> Result<String, ApiError> {
    if let Some(token) = request_token.filter(|t| !t.trim().is_empty()) {
        return Ok(token);
    }
    if let Some(token) = state.token.read().await.clone() {
        return Ok(token);
    }
    state
        .config
        .lms_token
        .clone()
        .ok_or(ApiError::Course(CourseGenError::MissingToken))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> Router {
        router(GenerationConfig::default())
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn set_token_then_get_token() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(
                Request::post("/set-token")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"token":"abc"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/get-token").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["token_set"], true);
    }

    #[tokio::test]
    async fn empty_token_rejected() {
        let response = test_router()
            .oneshot(
                Request::post("/set-token")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"token":"  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Token"));
    }

    #[tokio::test]
    async fn get_token_unset() {
        let response = test_router()
            .oneshot(Request::get("/get-token").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["token_set"], false);
    }

    #[tokio::test]
    async fn create_course_requires_title() {
        let response = test_router()
            .oneshot(
                Request::post("/create-course")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"title":"","org_id":"o","cover_image_url":"https://x/c.png"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_course_requires_org_id() {
        let response = test_router()
            .oneshot(
                Request::post("/create-course")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"title":"T","org_id":" ","cover_image_url":"https://x/c.png"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "org_id is required");
    }

    #[tokio::test]
    async fn create_slides_skips_modules_without_image_url() {
        // The LMS is never contacted for an image-less module, so no mock
        // server is needed here.
        let response = test_router()
            .oneshot(
                Request::post("/create-module-slides")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"course_id":"c1","token":"t","modules":[
                            {"module_number":1,"module_title":"M1",
                             "module_content":"body","image_url":""}
                        ]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["successful_slides"], 0);
        assert_eq!(json["failed_slides"], 1);
        assert_eq!(json["slides"][0]["error"], "No image URL available");
    }

    #[tokio::test]
    async fn create_slides_requires_modules() {
        let response = test_router()
            .oneshot(
                Request::post("/create-module-slides")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"course_id":"c1","modules":[],"token":"t"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validate_token_without_any_token_is_400() {
        let response = test_router()
            .oneshot(
                Request::post("/validate-token")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
