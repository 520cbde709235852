use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A generated resume artifact: one row per successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// The structured document the artifact was rendered from; tailoring
    /// starts from the most recent of these.
    pub cv_json: Value,
    pub resume_url: String,
    pub thumbnail_url: Option<String>,
    pub s3_key: String,
    pub created_at: DateTime<Utc>,
}

/// Derived per-user extraction, overwritten on every pipeline run.
/// Latest write wins; concurrent runs are not serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserPreferencesRow {
    pub user_id: Uuid,
    pub summary: Option<String>,
    pub skills: Value,
    pub projects: Value,
    pub updated_at: DateTime<Utc>,
}

/// A generated outreach email (generation only; delivery is the mail
/// collaborator's concern).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Global usage counter row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageCounterRow {
    pub name: String,
    pub value: i64,
}
