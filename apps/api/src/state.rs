use sqlx::PgPool;

use crate::config::Config;
use crate::llm::LlmClient;
use crate::pipeline::Pipeline;
use crate::scrape::JobPageClient;
use crate::store::ArtifactStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Everything here is explicitly constructed in `main`,
/// including the page cache inside [`JobPageClient`], so nothing leaks
/// between requests through module globals.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub llm: LlmClient,
    pub store: ArtifactStore,
    pub jobs: JobPageClient,
    pub pipeline: Pipeline,
}
