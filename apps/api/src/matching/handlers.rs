//! Axum route handlers for the Analysis API.

use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::documents::{extract_text, Upload};
use crate::errors::AppError;
use crate::matching::engine::AnalysisResult;
use crate::state::AppState;

/// Both fields are optional; a missing or null text is analyzed as empty.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeTextRequest {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub jd_text: Option<String>,
}

async fn run_analysis(
    state: &AppState,
    resume_text: &str,
    jd_text: &str,
) -> Result<Json<AnalysisResult>, AppError> {
    // an unrepresentable deadline is treated as none
    let deadline = state
        .config
        .analysis_timeout_secs
        .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)));

    let result = match deadline {
        Some(deadline) => {
            state
                .engine
                .analyze_with_deadline(resume_text, jd_text, Some(deadline))
                .await?
        }
        None => state.engine.analyze(resume_text, jd_text).await?,
    };

    info!(
        matched = result.matched.len(),
        missing = result.missing.len(),
        similarity = result.overall_similarity,
        "analysis served"
    );
    Ok(Json(result))
}

/// POST /api/v1/analyze/text
///
/// Compares already-extracted resume and job-description text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    tracing::debug!(user_id = %user.session.user_id, "text analysis requested");

    let resume_text = request.resume_text.unwrap_or_default();
    let jd_text = request.jd_text.unwrap_or_default();
    run_analysis(&state, &resume_text, &jd_text).await
}

/// POST /api/v1/analyze
///
/// Multipart upload with `resume` and `jd` files (PDF or plain text).
/// Both documents must yield text before any analysis runs.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    tracing::debug!(user_id = %user.session.user_id, "upload analysis requested");

    let mut resume: Option<Upload> = None;
    let mut jd: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let slot = match field.name() {
            Some("resume") => &mut resume,
            Some("jd") => &mut jd,
            _ => continue,
        };

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        *slot = Some(Upload {
            filename,
            content_type,
            data,
        });
    }

    let (Some(resume), Some(jd)) = (resume, jd) else {
        return Err(AppError::Validation("Upload both files".to_string()));
    };

    let resume_text = extract_text(resume).await?;
    let jd_text = extract_text(jd).await?;
    run_analysis(&state, &resume_text, &jd_text).await
}
