//! Real-time notification side channel.
//!
//! Notifications are queued as detached tasks after the request outcome is
//! already determined: a publish failure is logged on its own target and can
//! never fail the parent request.

use redis::AsyncCommands;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

impl NotificationEvent {
    pub fn resume_ready(resume_id: Uuid, resume_url: &str) -> Self {
        Self {
            kind: "resume_ready".to_string(),
            message: "Your resume is ready".to_string(),
            resume_id: Some(resume_id),
            resume_url: Some(resume_url.to_string()),
        }
    }

    pub fn pipeline_failed(message: &str) -> Self {
        Self {
            kind: "pipeline_failed".to_string(),
            message: message.to_string(),
            resume_id: None,
            resume_url: None,
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    redis: redis::Client,
}

impl Notifier {
    pub fn new(redis: redis::Client) -> Self {
        Self { redis }
    }

    /// Queues the publish on a detached task. Fire-and-forget by design:
    /// the caller's response does not wait for (or observe) the outcome.
    pub fn publish_detached(&self, user_id: Uuid, event: NotificationEvent) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.publish(user_id, &event).await {
                warn!(target: "notify", user_id = %user_id, "Notification publish failed: {e}");
            }
        });
    }

    async fn publish(&self, user_id: Uuid, event: &NotificationEvent) -> anyhow::Result<()> {
        let channel = format!("user:{user_id}:events");
        let payload = serde_json::to_string(event)?;
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let receivers: i64 = conn.publish(&channel, payload).await?;
        debug!(target: "notify", "Published {} to {channel} ({receivers} receivers)", event.kind);
        Ok(())
    }
}
