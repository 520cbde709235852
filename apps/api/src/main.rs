mod auth;
mod cache;
mod compiler;
mod config;
mod db;
mod emails;
mod errors;
mod extract;
mod latex;
mod llm;
mod models;
mod notify;
mod pipeline;
mod resumes;
mod routes;
mod scrape;
mod state;
mod store;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::compiler::PdfCompiler;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::llm::{ApiKeyRing, LlmClient};
use crate::notify::Notifier;
use crate::pipeline::Pipeline;
use crate::resumes::repo::PgResumeRepository;
use crate::routes::build_router;
use crate::scrape::{default_page_cache, JobPageClient};
use crate::state::AppState;
use crate::store::ArtifactStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("vitae_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize Redis (notification side channel)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let notifier = Notifier::new(redis);
    info!("Redis client initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let store = ArtifactStore::new(
        s3,
        config.s3_bucket.clone(),
        config.s3_public_base_url.clone(),
    );
    info!("S3 client initialized");

    // Initialize LLM client with the configured key ring
    let keys = ApiKeyRing::new(config.llm_api_keys.clone());
    info!("LLM client initialized (model: {}, {} keys)", config.llm_model, keys.len());
    let llm = LlmClient::new(keys, config.llm_base_url.clone(), config.llm_model.clone());

    // TeX engine
    let pdf_compiler = PdfCompiler::new(config.pdflatex_bin.clone());
    info!("PDF compiler: {}", config.pdflatex_bin);

    // Job page client with its injected TTL cache
    let jobs = JobPageClient::new(Arc::new(default_page_cache()));

    // Pipeline over its collaborator seams
    let pipeline = Pipeline::new(
        Arc::new(llm.clone()),
        Arc::new(pdf_compiler),
        Arc::new(store.clone()),
        Arc::new(PgResumeRepository::new(db.clone())),
        notifier,
    );

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        llm,
        store,
        jobs,
        pipeline,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "vitae-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
