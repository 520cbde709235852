//! Resume pipeline: orchestrates a generation request through its stages.
//!
//! Flow: extract → LLM transform → compose → compile → store → persist →
//! notify. Stages run strictly in sequence; nothing is retried
//! automatically, and a failure short-circuits the chain with exactly one
//! error event. Collaborators enter through trait seams so the orchestration
//! itself is testable without network, TeX or a database.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::compiler::{CompiledPdf, PdfCompiler};
use crate::errors::AppError;
use crate::extract::extract_pdf_text;
use crate::latex::compose;
use crate::llm::prompts::{STRUCTURE_CV_PROMPT, TAILOR_CV_PROMPT};
use crate::llm::LlmClient;
use crate::models::cv::CvDocument;
use crate::notify::{NotificationEvent, Notifier};
use crate::store::{ArtifactStore, PdfArtifact};

pub mod handlers;

// ────────────────────────────────────────────────────────────────────────────
// Stages and events
// ────────────────────────────────────────────────────────────────────────────

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Uploaded,
    Extracted,
    LlmTransformed,
    Composed,
    Compiled,
    Stored,
    Persisted,
    Notified,
}

/// What a successful run hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeSummary {
    pub resume_id: Uuid,
    pub title: String,
    pub resume_url: String,
    pub thumbnail_url: Option<String>,
}

/// Progress events streamed to the client during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Stage { stage: Stage },
    Completed { resume: ResumeSummary },
    Error { message: String },
}

/// Progress reporting handle. The silent variant drops events; the channel
/// variant feeds the onboarding SSE stream. Send failures (client gone) are
/// ignored; progress is cooperative, not transactional.
#[derive(Clone, Default)]
pub struct Progress {
    tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl Progress {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<PipelineEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx: Some(tx) }, rx)
    }

    pub fn silent() -> Self {
        Self { tx: None }
    }

    async fn send(&self, event: PipelineEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event).await;
        }
    }

    async fn stage(&self, stage: Stage) {
        self.send(PipelineEvent::Stage { stage }).await;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Collaborator seams
// ────────────────────────────────────────────────────────────────────────────

/// LLM-backed document transformations.
#[async_trait]
pub trait CvTransformer: Send + Sync {
    async fn structure(&self, resume_text: &str) -> Result<CvDocument, AppError>;
    async fn tailor(&self, base: &CvDocument, job_text: &str) -> Result<CvDocument, AppError>;
}

#[async_trait]
impl CvTransformer for LlmClient {
    async fn structure(&self, resume_text: &str) -> Result<CvDocument, AppError> {
        let prompt = STRUCTURE_CV_PROMPT.replace("{resume_text}", resume_text);
        let document: CvDocument = self.generate_json(&prompt).await?;
        document.validate().map_err(AppError::Validation)?;
        Ok(document)
    }

    async fn tailor(&self, base: &CvDocument, job_text: &str) -> Result<CvDocument, AppError> {
        let cv_json = serde_json::to_string_pretty(base)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize CV: {e}")))?;
        let prompt = TAILOR_CV_PROMPT
            .replace("{cv_json}", &cv_json)
            .replace("{job_text}", job_text);
        let document: CvDocument = self.generate_json(&prompt).await?;
        document.validate().map_err(AppError::Validation)?;
        Ok(document)
    }
}

#[async_trait]
pub trait CompileEngine: Send + Sync {
    async fn compile(&self, latex: &str, job_name: &str) -> Result<CompiledPdf, AppError>;
}

#[async_trait]
impl CompileEngine for PdfCompiler {
    async fn compile(&self, latex: &str, job_name: &str) -> Result<CompiledPdf, AppError> {
        PdfCompiler::compile(self, latex, job_name).await
    }
}

#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn upload_resume(
        &self,
        user_id: Uuid,
        artifact_id: Uuid,
        name: &str,
        pdf: Vec<u8>,
        thumbnail_png: Option<Vec<u8>>,
    ) -> Result<PdfArtifact, AppError>;
}

#[async_trait]
impl ArtifactSink for ArtifactStore {
    async fn upload_resume(
        &self,
        user_id: Uuid,
        artifact_id: Uuid,
        name: &str,
        pdf: Vec<u8>,
        thumbnail_png: Option<Vec<u8>>,
    ) -> Result<PdfArtifact, AppError> {
        ArtifactStore::upload_resume(self, user_id, artifact_id, name, pdf, thumbnail_png).await
    }
}

/// Database writes at the end of a successful run.
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn persist_run(
        &self,
        user: &AuthUser,
        resume_id: Uuid,
        title: &str,
        document: &CvDocument,
        artifact: &PdfArtifact,
    ) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Pipeline {
    transformer: Arc<dyn CvTransformer>,
    compiler: Arc<dyn CompileEngine>,
    store: Arc<dyn ArtifactSink>,
    repository: Arc<dyn ResumeRepository>,
    notifier: Notifier,
}

impl Pipeline {
    pub fn new(
        transformer: Arc<dyn CvTransformer>,
        compiler: Arc<dyn CompileEngine>,
        store: Arc<dyn ArtifactSink>,
        repository: Arc<dyn ResumeRepository>,
        notifier: Notifier,
    ) -> Self {
        Self {
            transformer,
            compiler,
            store,
            repository,
            notifier,
        }
    }

    /// Onboarding entry point: uploaded PDF → full chain.
    pub async fn run_onboarding(
        &self,
        user: &AuthUser,
        pdf: Bytes,
        progress: &Progress,
    ) -> Result<ResumeSummary, AppError> {
        progress.stage(Stage::Uploaded).await;

        let resume_text = match extract_pdf_text(pdf).await {
            Ok(text) => text,
            Err(e) => return self.abort(user, progress, e).await,
        };
        progress.stage(Stage::Extracted).await;

        let document = match self.transformer.structure(&resume_text).await {
            Ok(document) => document,
            Err(e) => return self.abort(user, progress, e).await,
        };
        progress.stage(Stage::LlmTransformed).await;

        self.finish(user, None, document, progress).await
    }

    /// Manual entry point: client-supplied structured document.
    pub async fn run_manual(
        &self,
        user: &AuthUser,
        title: Option<String>,
        document: CvDocument,
        progress: &Progress,
    ) -> Result<ResumeSummary, AppError> {
        if let Err(msg) = document.validate() {
            return self.abort(user, progress, AppError::Validation(msg)).await;
        }
        self.finish(user, title, document, progress).await
    }

    /// Tailoring entry point: stored document + job posting text.
    pub async fn run_tailoring(
        &self,
        user: &AuthUser,
        base: &CvDocument,
        job_text: &str,
        progress: &Progress,
    ) -> Result<ResumeSummary, AppError> {
        let document = match self.transformer.tailor(base, job_text).await {
            Ok(document) => document,
            Err(e) => return self.abort(user, progress, e).await,
        };
        progress.stage(Stage::LlmTransformed).await;

        self.finish(user, None, document, progress).await
    }

    /// Shared tail: compose → compile → store → persist → notify.
    async fn finish(
        &self,
        user: &AuthUser,
        title: Option<String>,
        document: CvDocument,
        progress: &Progress,
    ) -> Result<ResumeSummary, AppError> {
        // Composed: pure, deterministic; failures here would be programming
        // errors, not runtime conditions.
        let latex = compose(&document);
        progress.stage(Stage::Composed).await;

        let resume_id = Uuid::new_v4();
        let job_name = format!("resume-{}", resume_id.simple());

        let compiled = match self.compiler.compile(&latex, &job_name).await {
            Ok(compiled) => compiled,
            Err(e) => return self.abort(user, progress, e).await,
        };
        progress.stage(Stage::Compiled).await;

        let title = title.unwrap_or_else(|| derive_title(&document));
        let artifact = match self
            .store
            .upload_resume(
                user.user_id,
                resume_id,
                &title,
                compiled.pdf,
                compiled.thumbnail_png,
            )
            .await
        {
            Ok(artifact) => artifact,
            Err(e) => return self.abort(user, progress, e).await,
        };
        progress.stage(Stage::Stored).await;

        if let Err(e) = self
            .repository
            .persist_run(user, resume_id, &title, &document, &artifact)
            .await
        {
            return self.abort(user, progress, e).await;
        }
        progress.stage(Stage::Persisted).await;

        // Detached side channel: the run's outcome is already decided.
        self.notifier.publish_detached(
            user.user_id,
            NotificationEvent::resume_ready(resume_id, &artifact.url),
        );
        progress.stage(Stage::Notified).await;

        let summary = ResumeSummary {
            resume_id,
            title,
            resume_url: artifact.url,
            thumbnail_url: artifact.thumbnail_url,
        };
        progress
            .send(PipelineEvent::Completed {
                resume: summary.clone(),
            })
            .await;

        info!(
            "Pipeline completed for user {}: resume {}",
            user.email, resume_id
        );
        Ok(summary)
    }

    /// Emits the single error event for a failed run and propagates the
    /// error. Every short-circuit path funnels through here exactly once.
    async fn abort(
        &self,
        user: &AuthUser,
        progress: &Progress,
        error: AppError,
    ) -> Result<ResumeSummary, AppError> {
        progress
            .send(PipelineEvent::Error {
                message: error.to_string(),
            })
            .await;
        self.notifier.publish_detached(
            user.user_id,
            NotificationEvent::pipeline_failed(&error.to_string()),
        );
        Err(error)
    }
}

/// Resume title derived from the document header, with a plain fallback.
fn derive_title(document: &CvDocument) -> String {
    document
        .sections
        .header
        .as_ref()
        .map(|h| h.name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| format!("{name} — Resume"))
        .unwrap_or_else(|| "Resume".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::parse_llm_json;
    use crate::models::cv::{CvMetadata, CvSections, Header};

    struct JunkLlm;

    #[async_trait]
    impl CvTransformer for JunkLlm {
        async fn structure(&self, _resume_text: &str) -> Result<CvDocument, AppError> {
            parse_llm_json("Sure! Here is your resume as JSON: oops")
        }

        async fn tailor(&self, _base: &CvDocument, _job: &str) -> Result<CvDocument, AppError> {
            parse_llm_json("Sure! Here is your resume as JSON: oops")
        }
    }

    struct OkLlm;

    #[async_trait]
    impl CvTransformer for OkLlm {
        async fn structure(&self, _resume_text: &str) -> Result<CvDocument, AppError> {
            Ok(sample_doc())
        }

        async fn tailor(&self, base: &CvDocument, _job: &str) -> Result<CvDocument, AppError> {
            Ok(base.clone())
        }
    }

    struct UnreachableCompiler;

    #[async_trait]
    impl CompileEngine for UnreachableCompiler {
        async fn compile(&self, _latex: &str, _job: &str) -> Result<CompiledPdf, AppError> {
            panic!("compiler must not run after a transform failure");
        }
    }

    struct FakeCompiler;

    #[async_trait]
    impl CompileEngine for FakeCompiler {
        async fn compile(&self, latex: &str, _job: &str) -> Result<CompiledPdf, AppError> {
            assert!(latex.contains("\\documentclass"));
            Ok(CompiledPdf {
                pdf: b"%PDF-1.5 fake".to_vec(),
                thumbnail_png: None,
            })
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl ArtifactSink for UnreachableStore {
        async fn upload_resume(
            &self,
            _user_id: Uuid,
            _artifact_id: Uuid,
            _name: &str,
            _pdf: Vec<u8>,
            _thumbnail_png: Option<Vec<u8>>,
        ) -> Result<PdfArtifact, AppError> {
            panic!("store must not run after a transform failure");
        }
    }

    struct FakeStore;

    #[async_trait]
    impl ArtifactSink for FakeStore {
        async fn upload_resume(
            &self,
            user_id: Uuid,
            artifact_id: Uuid,
            name: &str,
            _pdf: Vec<u8>,
            _thumbnail_png: Option<Vec<u8>>,
        ) -> Result<PdfArtifact, AppError> {
            Ok(PdfArtifact {
                url: format!("https://cdn.test/resumes/{user_id}/{artifact_id}.pdf"),
                key: format!("resumes/{user_id}/{artifact_id}.pdf"),
                name: name.to_string(),
                thumbnail_url: None,
            })
        }
    }

    struct NoopRepo;

    #[async_trait]
    impl ResumeRepository for NoopRepo {
        async fn persist_run(
            &self,
            _user: &AuthUser,
            _resume_id: Uuid,
            _title: &str,
            _document: &CvDocument,
            _artifact: &PdfArtifact,
        ) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn test_user() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
        }
    }

    fn test_notifier() -> Notifier {
        // Client construction is lazy; nothing connects unless a publish
        // actually runs, and publishes are detached best-effort tasks.
        Notifier::new(redis::Client::open("redis://127.0.0.1/").unwrap())
    }

    fn sample_doc() -> CvDocument {
        CvDocument {
            metadata: CvMetadata {
                section_order: Some(vec!["header".to_string()]),
            },
            sections: CvSections {
                header: Some(Header {
                    name: "Jane Doe".to_string(),
                    ..Header::default()
                }),
                ..CvSections::default()
            },
        }
    }

    async fn drain(mut rx: mpsc::Receiver<PipelineEvent>) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_unparseable_llm_output_short_circuits_with_one_error_event() {
        let pipeline = Pipeline::new(
            Arc::new(JunkLlm),
            Arc::new(UnreachableCompiler),
            Arc::new(UnreachableStore),
            Arc::new(NoopRepo),
            test_notifier(),
        );

        let (progress, rx) = Progress::channel(16);
        let result = pipeline
            .run_tailoring(&test_user(), &sample_doc(), "a job", &progress)
            .await;
        drop(progress);

        assert!(matches!(result, Err(AppError::AiResponseParse { .. })));

        let events = drain(rx).await;
        let errors = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::Error { .. }))
            .count();
        assert_eq!(errors, 1, "exactly one error event, got {events:?}");
        assert!(
            !events.iter().any(|e| matches!(
                e,
                PipelineEvent::Stage {
                    stage: Stage::Composed | Stage::Compiled | Stage::Stored
                }
            )),
            "no stage after the failed transform may be reported"
        );
    }

    #[tokio::test]
    async fn test_successful_run_reports_stages_in_order() {
        let pipeline = Pipeline::new(
            Arc::new(OkLlm),
            Arc::new(FakeCompiler),
            Arc::new(FakeStore),
            Arc::new(NoopRepo),
            test_notifier(),
        );

        let (progress, rx) = Progress::channel(16);
        let summary = pipeline
            .run_manual(&test_user(), None, sample_doc(), &progress)
            .await
            .unwrap();
        drop(progress);

        assert_eq!(summary.title, "Jane Doe — Resume");
        assert!(summary.resume_url.ends_with(".pdf"));

        let stages: Vec<Stage> = drain(rx)
            .await
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Stage { stage } => Some(*stage),
                _ => None,
            })
            .collect();
        assert_eq!(
            stages,
            vec![
                Stage::Composed,
                Stage::Compiled,
                Stage::Stored,
                Stage::Persisted,
                Stage::Notified
            ]
        );
    }

    #[tokio::test]
    async fn test_manual_run_rejects_blank_header_name() {
        let pipeline = Pipeline::new(
            Arc::new(OkLlm),
            Arc::new(UnreachableCompiler),
            Arc::new(UnreachableStore),
            Arc::new(NoopRepo),
            test_notifier(),
        );

        let mut doc = sample_doc();
        doc.sections.header.as_mut().unwrap().name = "  ".to_string();

        let result = pipeline
            .run_manual(&test_user(), None, doc, &Progress::silent())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_derive_title_falls_back_without_header() {
        assert_eq!(derive_title(&CvDocument::default()), "Resume");
        assert_eq!(derive_title(&sample_doc()), "Jane Doe — Resume");
    }
}
