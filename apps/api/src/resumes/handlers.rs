use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::rows::{UserPreferencesRow, UserResumeRow};
use crate::resumes::repo;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<UserResumeRow>,
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = repo::list_resumes(&state.db, auth.user_id).await?;
    Ok(Json(ResumeListResponse { resumes }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResumeRow>, AppError> {
    let resume = repo::get_resume(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id
/// Removes the record and its stored artifacts.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = repo::delete_resume(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    state.store.delete_resume(&deleted.s3_key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/preferences
pub async fn handle_get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserPreferencesRow>, AppError> {
    let preferences = repo::get_preferences(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No preferences yet; generate a resume first".to_string())
        })?;
    Ok(Json(preferences))
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub counters: Vec<crate::models::rows::UsageCounterRow>,
}

/// GET /api/v1/stats: public usage counters.
pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let counters = repo::get_counters(&state.db).await?;
    Ok(Json(StatsResponse { counters }))
}
