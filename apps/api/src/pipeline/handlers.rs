use std::convert::Infallible;

use axum::{
    extract::{Multipart, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use bytes::Bytes;
use futures::stream::Stream;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::cv::CvDocument;
use crate::pipeline::{PipelineEvent, Progress, ResumeSummary};
use crate::resumes::repo;
use crate::state::AppState;

/// Uploaded resume size cap.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// POST /api/v1/resumes/onboard
///
/// Multipart PDF upload answered with an SSE stream of pipeline stage
/// events. The stream is a cooperative single pass: stage events as they
/// complete, then one `completed` (or one `error`), and the stream closes.
pub async fn handle_onboard(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let pdf = read_pdf_field(&mut multipart).await?;
    info!(
        "Onboarding upload from {}: {} bytes",
        auth.email,
        pdf.len()
    );

    let (progress, rx) = Progress::channel(32);
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        // Failures are already on the stream as the single error event.
        let _ = pipeline.run_onboarding(&auth, pdf, &progress).await;
    });

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok(to_sse_event(&event)), rx))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[derive(Deserialize)]
pub struct ManualResumeRequest {
    pub title: Option<String>,
    pub document: CvDocument,
}

/// POST /api/v1/resumes
/// Client-supplied structured document → compiled, stored artifact.
pub async fn handle_manual(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ManualResumeRequest>,
) -> Result<Json<ResumeSummary>, AppError> {
    let summary = state
        .pipeline
        .run_manual(&auth, request.title, request.document, &Progress::silent())
        .await?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
pub struct TailorRequest {
    pub job_url: String,
    /// Base resume to tailor; defaults to the most recent one.
    pub resume_id: Option<Uuid>,
}

/// POST /api/v1/resumes/tailor
pub async fn handle_tailor(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<TailorRequest>,
) -> Result<Json<ResumeSummary>, AppError> {
    let base_row = match request.resume_id {
        Some(id) => repo::get_resume(&state.db, auth.user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?,
        None => repo::latest_resume(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No resume to tailor; onboard one first".to_string())
            })?,
    };

    let base: CvDocument = serde_json::from_value(base_row.cv_json).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Stored CV JSON failed to parse: {e}"))
    })?;

    let job_text = state.jobs.fetch_text(&request.job_url).await?;

    let summary = state
        .pipeline
        .run_tailoring(&auth, &base, &job_text, &Progress::silent())
        .await?;
    Ok(Json(summary))
}

async fn read_pdf_field(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default();
        if name == "file" || name == "resume" {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            if data.is_empty() {
                return Err(AppError::Validation("Uploaded file is empty".to_string()));
            }
            if data.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::Validation(
                    "File size exceeds the 10MB limit".to_string(),
                ));
            }
            return Ok(data);
        }
    }
    Err(AppError::Validation(
        "Missing multipart field 'file'".to_string(),
    ))
}

fn to_sse_event(event: &PipelineEvent) -> Event {
    let name = match event {
        PipelineEvent::Stage { .. } => "stage",
        PipelineEvent::Completed { .. } => "completed",
        PipelineEvent::Error { .. } => "error",
    };
    Event::default()
        .event(name)
        .json_data(event)
        .unwrap_or_else(|_| Event::default().event("error").data("event serialization failed"))
}
