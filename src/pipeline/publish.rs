//! LMS publishing: course (cohort) creation, slide creation, token checks.
//!
//! The LMS wraps its payloads inconsistently across endpoints, so course-id
//! extraction walks a fallback chain over the response JSON rather than
//! deserialising into a fixed shape. All calls are single-attempt.

use crate::config::GenerationConfig;
use crate::error::CourseGenError;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the LMS admin API.
///
/// NOTE: Do NOT derive `Debug` on this struct — `token` would be exposed.
pub struct LmsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl LmsClient {
    /// Build a client with the given bearer token.
    pub fn new(config: &GenerationConfig, token: String) -> Result<Self, CourseGenError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| CourseGenError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.lms_base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Create a course (cohort). Returns the extracted course id.
    pub async fn create_course(
        &self,
        title: &str,
        uid: &str,
        org_id: &str,
        cover_image_url: &str,
    ) -> Result<String, CourseGenError> {
        let url = format!("{}/v1/cohort/new", self.base_url);
        let payload = course_payload(title, uid, org_id, cover_image_url);

        debug!(url = %url, uid = %uid, "creating course");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CourseGenError::PublishFailed {
                status: 0,
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.as_u16() != 200 && status.as_u16() != 201 {
            return Err(CourseGenError::PublishFailed {
                status: status.as_u16(),
                detail: body.to_string(),
            });
        }

        let course_id = extract_course_id(&body).ok_or(CourseGenError::CourseIdMissing)?;
        info!(course_id = %course_id, "course created");
        Ok(course_id)
    }

    /// Check that a freshly created course is retrievable. Transport errors
    /// fold into `false`; the caller decides whether that is fatal.
    pub async fn verify_course(&self, course_id: &str) -> bool {
        let url = format!("{}/v1/cohort/{course_id}", self.base_url);
        match self.http.get(&url).bearer_auth(&self.token).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(course_id = %course_id, error = %e, "course verification failed");
                false
            }
        }
    }

    /// Create one slide under a course. Returns `Err` with the LMS status
    /// and body on rejection.
    pub async fn create_slide(
        &self,
        course_id: &str,
        module_title: &str,
        module_content: &str,
        image_url: &str,
    ) -> Result<(), CourseGenError> {
        let url = format!("{}/v2/slides/cohort/{course_id}", self.base_url);
        let payload = slide_payload(module_title, module_content, image_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CourseGenError::PublishFailed {
                status: 0,
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() != 200 && status.as_u16() != 201 {
            let text = response.text().await.unwrap_or_default();
            return Err(CourseGenError::PublishFailed {
                status: status.as_u16(),
                detail: text,
            });
        }

        debug!(course_id = %course_id, title = %module_title, "slide created");
        Ok(())
    }

    /// Check the token by fetching the caller's profile.
    pub async fn validate_token(&self) -> bool {
        let url = format!("{}/v1/user/profile", self.base_url);
        match self.http.get(&url).bearer_auth(&self.token).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "token validation request failed");
                false
            }
        }
    }
}

/// Course creation payload. Field names and constants follow the LMS API.
fn course_payload(title: &str, uid: &str, org_id: &str, cover_image_url: &str) -> Value {
    json!({
        "title": title,
        "details": "",
        "uid": uid,
        "orgId": org_id,
        "mode": "offline",
        "type": "C",
        "duration": {"duration": 30},
        "supportedLanguages": "en_US",
        "icon": null,
        "coverImage": cover_image_url,
    })
}

/// Slide payload: title and body as text blocks, image fullscreen.
fn slide_payload(module_title: &str, module_content: &str, image_url: &str) -> Value {
    json!({
        "type": "default",
        "title": {
            "text": module_title,
            "alignment": "left",
            "weight": "bold",
        },
        "description": {
            "text": module_content,
            "alignment": "left",
            "weight": "normal",
        },
        "textContainerSize": "auto",
        "media": {
            "type": "image",
            "url": image_url,
            "alignment": "fullscreen",
        },
        "options": [],
        "assessmentPrompt": "",
        "restrictScroll": false,
        "maxDuration": 0,
    })
}

/// Walk the known response shapes for a course id, most specific first.
pub fn extract_course_id(body: &Value) -> Option<String> {
    let candidates = [
        "/results/data/cohortDetails/_id",
        "/results/data/cohortDetails/id",
        "/id",
        "/courseId",
        "/cohortId",
        "/_id",
        "/data/id",
        "/data/courseId",
        "/data/cohortId",
    ];
    for pointer in candidates {
        if let Some(id) = body.pointer(pointer).and_then(value_as_id) {
            return Some(id);
        }
    }
    None
}

/// Ids arrive as strings or numbers depending on the endpoint.
fn value_as_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Generate a course UID: `{prefix}-{UTC timestamp}`.
pub fn generate_uid(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().format("%Y%m%d%H%M%S"))
}
