//! Outreach email generation.
//!
//! Generates a job-specific email from the user's derived preferences and
//! persists it. Delivery (Gmail OAuth) is an external collaborator; this
//! service only produces and records drafts.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::llm::prompts::OUTREACH_EMAIL_PROMPT;
use crate::resumes::repo;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GenerateEmailRequest {
    pub job_url: String,
    pub recipient: Option<String>,
    pub instructions: Option<String>,
}

/// The JSON shape the LLM is instructed to return.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

#[derive(Serialize)]
pub struct GenerateEmailResponse {
    pub email_id: Uuid,
    pub subject: String,
    pub body: String,
}

/// POST /api/v1/emails/generate
pub async fn handle_generate_email(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<GenerateEmailRequest>,
) -> Result<Json<GenerateEmailResponse>, AppError> {
    let preferences = repo::get_preferences(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No profile data yet; generate a resume first".to_string())
        })?;

    let preferences_json = serde_json::json!({
        "summary": preferences.summary,
        "skills": preferences.skills,
        "projects": preferences.projects,
    })
    .to_string();

    let job_text = state.jobs.fetch_text(&request.job_url).await?;

    let prompt = OUTREACH_EMAIL_PROMPT
        .replace("{preferences_json}", &preferences_json)
        .replace("{job_text}", &job_text)
        .replace(
            "{instructions}",
            request.instructions.as_deref().unwrap_or("(none)"),
        );

    let draft: EmailDraft = state.llm.generate_json(&prompt).await?;

    let email_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO emails (id, user_id, recipient, subject, body)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(email_id)
    .bind(auth.user_id)
    .bind(&request.recipient)
    .bind(&draft.subject)
    .bind(&draft.body)
    .execute(&state.db)
    .await?;

    repo::bump_counter(&state.db, repo::COUNTER_EMAILS_GENERATED).await?;

    info!("Generated outreach email {} for {}", email_id, auth.email);

    Ok(Json(GenerateEmailResponse {
        email_id,
        subject: draft.subject,
        body: draft.body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::parse_llm_json;

    #[test]
    fn test_email_draft_parses_from_fenced_llm_output() {
        let raw = "```json\n{\"subject\": \"Re: Rust role\", \"body\": \"Hello...\"}\n```";
        let draft: EmailDraft = parse_llm_json(raw).unwrap();
        assert_eq!(draft.subject, "Re: Rust role");
    }

    #[test]
    fn test_email_draft_missing_field_is_parse_error() {
        let raw = "{\"subject\": \"no body here\"}";
        assert!(parse_llm_json::<EmailDraft>(raw).is_err());
    }
}
