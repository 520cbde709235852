use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails fast at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Public base URL artifacts are served from (CDN or the S3 endpoint).
    pub s3_public_base_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// One or more LLM API keys, comma-separated. Requests rotate through
    /// them round-robin.
    pub llm_api_keys: Vec<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    /// HS256 secret for the bearer session tokens.
    pub session_secret: String,
    /// TeX engine binary; override for non-standard installs.
    pub pdflatex_bin: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_api_keys: Vec<String> = require_env("LLM_API_KEYS")?
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if llm_api_keys.is_empty() {
            anyhow::bail!("LLM_API_KEYS must contain at least one key");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_public_base_url: std::env::var("S3_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| require_default_public_url()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            llm_api_keys,
            llm_base_url: std::env::var("LLM_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta/models".to_string()
            }),
            llm_model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            session_secret: require_env("SESSION_SECRET")?,
            pdflatex_bin: std::env::var("PDFLATEX_BIN").unwrap_or_else(|_| "pdflatex".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn require_default_public_url() -> String {
    // Falls back to the S3 endpoint + bucket path style used by MinIO.
    match (std::env::var("S3_ENDPOINT"), std::env::var("S3_BUCKET")) {
        (Ok(endpoint), Ok(bucket)) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        _ => String::new(),
    }
}
