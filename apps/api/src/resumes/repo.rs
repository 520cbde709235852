//! Database operations for resumes, preferences and usage counters.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::cv::CvDocument;
use crate::models::rows::{UsageCounterRow, UserPreferencesRow, UserResumeRow};
use crate::pipeline::ResumeRepository;
use crate::store::PdfArtifact;

/// Counter bumped once per successful pipeline run.
pub const COUNTER_RESUMES_GENERATED: &str = "resumes_generated";
/// Counter bumped once per generated outreach email.
pub const COUNTER_EMAILS_GENERATED: &str = "emails_generated";

pub async fn insert_resume(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
    title: &str,
    document: &CvDocument,
    artifact: &PdfArtifact,
) -> Result<(), AppError> {
    let cv_json = serde_json::to_value(document)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize CV: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO user_resumes (id, user_id, title, cv_json, resume_url, thumbnail_url, s3_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(resume_id)
    .bind(user_id)
    .bind(title)
    .bind(&cv_json)
    .bind(&artifact.url)
    .bind(&artifact.thumbnail_url)
    .bind(&artifact.key)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_resumes(pool: &PgPool, user_id: Uuid) -> Result<Vec<UserResumeRow>, AppError> {
    Ok(sqlx::query_as::<_, UserResumeRow>(
        "SELECT * FROM user_resumes WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<Option<UserResumeRow>, AppError> {
    Ok(sqlx::query_as::<_, UserResumeRow>(
        "SELECT * FROM user_resumes WHERE id = $1 AND user_id = $2",
    )
    .bind(resume_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

/// Most recent resume, the tailoring base when no explicit id is given.
pub async fn latest_resume(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<UserResumeRow>, AppError> {
    Ok(sqlx::query_as::<_, UserResumeRow>(
        "SELECT * FROM user_resumes WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

/// Deletes the row and returns it so the caller can drop the stored object.
pub async fn delete_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<Option<UserResumeRow>, AppError> {
    Ok(sqlx::query_as::<_, UserResumeRow>(
        "DELETE FROM user_resumes WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(resume_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

/// Upserts the per-user derived preferences. Last write wins; concurrent
/// pipeline runs for the same user are not serialized.
pub async fn upsert_preferences(
    pool: &PgPool,
    user_id: Uuid,
    document: &CvDocument,
) -> Result<(), AppError> {
    let derived = derive_preferences(document);

    sqlx::query(
        r#"
        INSERT INTO user_preferences (user_id, summary, skills, projects, updated_at)
        VALUES ($1, $2, $3, $4, now())
        ON CONFLICT (user_id) DO UPDATE
        SET summary = EXCLUDED.summary,
            skills = EXCLUDED.skills,
            projects = EXCLUDED.projects,
            updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(&derived.summary)
    .bind(&derived.skills)
    .bind(&derived.projects)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_preferences(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<UserPreferencesRow>, AppError> {
    Ok(sqlx::query_as::<_, UserPreferencesRow>(
        "SELECT * FROM user_preferences WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

pub async fn bump_counter(pool: &PgPool, name: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO usage_counters (name, value) VALUES ($1, 1)
        ON CONFLICT (name) DO UPDATE SET value = usage_counters.value + 1
        "#,
    )
    .bind(name)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_counters(pool: &PgPool) -> Result<Vec<UsageCounterRow>, AppError> {
    Ok(
        sqlx::query_as::<_, UsageCounterRow>("SELECT * FROM usage_counters ORDER BY name")
            .fetch_all(pool)
            .await?,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Preference derivation
// ────────────────────────────────────────────────────────────────────────────

pub struct DerivedPreferences {
    pub summary: Option<String>,
    pub skills: serde_json::Value,
    pub projects: serde_json::Value,
}

/// Flattens the parts of a document the tailoring and email features reuse:
/// the summary text, all skill items, and project names.
pub fn derive_preferences(document: &CvDocument) -> DerivedPreferences {
    let summary = document
        .sections
        .summary
        .as_ref()
        .and_then(|s| s.content.as_deref())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let skills: Vec<String> = document
        .sections
        .skills
        .iter()
        .flat_map(|s| s.categories.iter())
        .flat_map(|c| c.items.iter())
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();

    let projects: Vec<String> = document
        .sections
        .projects
        .iter()
        .flat_map(|s| s.items.iter())
        .filter_map(|p| p.name.as_deref())
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    DerivedPreferences {
        summary,
        skills: serde_json::json!(skills),
        projects: serde_json::json!(projects),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline seam
// ────────────────────────────────────────────────────────────────────────────

/// Postgres-backed persistence stage of the pipeline.
pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn persist_run(
        &self,
        user: &AuthUser,
        resume_id: Uuid,
        title: &str,
        document: &CvDocument,
        artifact: &PdfArtifact,
    ) -> Result<(), AppError> {
        insert_resume(&self.pool, resume_id, user.user_id, title, document, artifact).await?;
        upsert_preferences(&self.pool, user.user_id, document).await?;
        bump_counter(&self.pool, COUNTER_RESUMES_GENERATED).await?;

        info!(
            "Persisted resume {} ('{}') for user {}",
            resume_id, title, user.email
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{
        CvSections, ProjectItem, SkillCategory, SkillsSection, Summary,
    };

    #[test]
    fn test_derive_preferences_flattens_document() {
        let document = CvDocument {
            sections: CvSections {
                summary: Some(Summary {
                    section_title: None,
                    content: Some("Systems engineer.".to_string()),
                }),
                skills: Some(SkillsSection {
                    section_title: None,
                    categories: vec![
                        SkillCategory {
                            name: Some("Languages".to_string()),
                            items: vec!["Rust".to_string(), "SQL".to_string()],
                        },
                        SkillCategory {
                            name: None,
                            items: vec!["  ".to_string(), "Kafka".to_string()],
                        },
                    ],
                }),
                projects: Some(crate::models::cv::ItemSection {
                    section_title: None,
                    items: vec![ProjectItem {
                        name: Some("vitae".to_string()),
                        ..ProjectItem::default()
                    }],
                }),
                ..CvSections::default()
            },
            ..CvDocument::default()
        };

        let derived = derive_preferences(&document);
        assert_eq!(derived.summary.as_deref(), Some("Systems engineer."));
        assert_eq!(derived.skills, serde_json::json!(["Rust", "SQL", "Kafka"]));
        assert_eq!(derived.projects, serde_json::json!(["vitae"]));
    }

    #[test]
    fn test_derive_preferences_empty_document() {
        let derived = derive_preferences(&CvDocument::default());
        assert!(derived.summary.is_none());
        assert_eq!(derived.skills, serde_json::json!([]));
        assert_eq!(derived.projects, serde_json::json!([]));
    }
}
