//! LaTeX → PDF compilation via a local TeX engine.
//!
//! Each compile job owns a fresh `TempDir`; the guard removes every temp file
//! (`.tex`, `.pdf`, `.log`, `.aux`) on success and failure paths alike, and
//! concurrent jobs can never collide because no two jobs share a directory.
//! The engine runs twice so cross-references and layout lengths settle.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Prefix for compile workspace directories under the system temp dir.
const WORKDIR_PREFIX: &str = "vitae-job-";

const ENGINE_PASSES: u32 = 2;

/// Result of a successful compile. The thumbnail is best-effort: a missing
/// `pdftoppm` binary degrades to `None`, never to an error.
pub struct CompiledPdf {
    pub pdf: Vec<u8>,
    pub thumbnail_png: Option<Vec<u8>>,
}

#[derive(Clone)]
pub struct PdfCompiler {
    engine_bin: String,
}

impl PdfCompiler {
    pub fn new(engine_bin: String) -> Self {
        Self { engine_bin }
    }

    /// Compiles `latex` into PDF bytes. `job_name` scopes the workspace and
    /// the produced file names; callers pass a per-request unique value.
    pub async fn compile(&self, latex: &str, job_name: &str) -> Result<CompiledPdf, AppError> {
        let workdir = tempfile::Builder::new()
            .prefix(&format!("{WORKDIR_PREFIX}{job_name}-"))
            .tempdir()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create workdir: {e}")))?;

        let result = self.compile_in(workdir.path(), latex, job_name).await;
        // workdir guard drops here: temp files are gone on every exit path.
        result
    }

    async fn compile_in(
        &self,
        dir: &Path,
        latex: &str,
        job_name: &str,
    ) -> Result<CompiledPdf, AppError> {
        let tex_path = dir.join(format!("{job_name}.tex"));
        tokio::fs::write(&tex_path, latex)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write tex source: {e}")))?;

        for pass in 1..=ENGINE_PASSES {
            let output = Command::new(&self.engine_bin)
                .arg("-interaction=nonstopmode")
                .arg("-halt-on-error")
                .arg(format!("{job_name}.tex"))
                .current_dir(dir)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .output()
                .await
                .map_err(|e| {
                    AppError::Compile(format!("Failed to run {}: {e}", self.engine_bin))
                })?;

            if !output.status.success() {
                let log = tokio::fs::read_to_string(dir.join(format!("{job_name}.log")))
                    .await
                    .unwrap_or_default();
                return Err(AppError::Compile(log_excerpt(&log)));
            }
            debug!("Engine pass {pass}/{ENGINE_PASSES} succeeded for {job_name}");
        }

        let pdf_path = dir.join(format!("{job_name}.pdf"));
        let pdf = tokio::fs::read(&pdf_path).await.map_err(|e| {
            AppError::Compile(format!("Engine reported success but produced no PDF: {e}"))
        })?;

        let thumbnail_png = self.render_thumbnail(dir, &pdf_path, job_name).await;

        Ok(CompiledPdf { pdf, thumbnail_png })
    }

    /// First-page PNG render via `pdftoppm`. Any failure is logged and
    /// swallowed; a resume without a thumbnail is still a resume.
    async fn render_thumbnail(&self, dir: &Path, pdf_path: &Path, job_name: &str) -> Option<Vec<u8>> {
        let out_stem = dir.join(format!("{job_name}-thumb"));
        let status = Command::new("pdftoppm")
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg("72")
            .arg(pdf_path)
            .arg(&out_stem)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => {
                tokio::fs::read(out_stem.with_extension("png")).await.ok()
            }
            Ok(status) => {
                warn!("pdftoppm exited with {status}; skipping thumbnail");
                None
            }
            Err(e) => {
                warn!("pdftoppm unavailable ({e}); skipping thumbnail");
                None
            }
        }
    }
}

/// Condenses a TeX log to the part worth returning: the first error marker
/// and its context, or the tail of the log when no marker is present.
fn log_excerpt(log: &str) -> String {
    if log.trim().is_empty() {
        return "engine produced no log output".to_string();
    }

    let lines: Vec<&str> = log.lines().collect();
    if let Some(pos) = lines.iter().position(|l| l.starts_with('!')) {
        let end = (pos + 4).min(lines.len());
        return lines[pos..end].join("\n");
    }

    let start = lines.len().saturating_sub(10);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn leftover_workdirs(job_name: &str) -> Vec<std::path::PathBuf> {
        let prefix = format!("{WORKDIR_PREFIX}{job_name}-");
        std::fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_failed_compile_removes_its_temp_files() {
        // `false` exits non-zero without producing a log: the compile fails
        // and the workspace, including the .tex we wrote, must be gone.
        let compiler = PdfCompiler::new("false".to_string());
        let job = format!("t{}", Uuid::new_v4().simple());

        let result = compiler.compile("\\documentclass{article}", &job).await;
        assert!(matches!(result, Err(AppError::Compile(_))));
        assert!(
            leftover_workdirs(&job).is_empty(),
            "temp files must be removed after a failed compile"
        );
    }

    #[tokio::test]
    async fn test_failed_compile_leaves_concurrent_jobs_untouched() {
        // A second in-flight job's workspace must survive the first job's
        // failure handler.
        let other_job = format!("t{}", Uuid::new_v4().simple());
        let other_dir = tempfile::Builder::new()
            .prefix(&format!("{WORKDIR_PREFIX}{other_job}-"))
            .tempdir()
            .unwrap();
        let other_tex = other_dir.path().join(format!("{other_job}.tex"));
        std::fs::write(&other_tex, "\\documentclass{article}").unwrap();

        let compiler = PdfCompiler::new("false".to_string());
        let failing_job = format!("t{}", Uuid::new_v4().simple());
        let _ = compiler.compile("\\documentclass{article}", &failing_job).await;

        assert!(other_tex.exists(), "unrelated job's files must be untouched");
        assert!(leftover_workdirs(&failing_job).is_empty());
    }

    #[tokio::test]
    async fn test_missing_engine_binary_is_a_compile_error() {
        let compiler = PdfCompiler::new("definitely-not-a-tex-engine".to_string());
        let job = format!("t{}", Uuid::new_v4().simple());
        let result = compiler.compile("x", &job).await;
        assert!(matches!(result, Err(AppError::Compile(_))));
        assert!(leftover_workdirs(&job).is_empty());
    }

    #[test]
    fn test_log_excerpt_picks_error_marker_context() {
        let log = "line one\n! Undefined control sequence.\nl.12 \\foo\nmore\neven more\ntail";
        let excerpt = log_excerpt(log);
        assert!(excerpt.starts_with("! Undefined control sequence."));
        assert!(excerpt.contains("l.12"));
        assert!(!excerpt.contains("line one"));
    }

    #[test]
    fn test_log_excerpt_falls_back_to_tail() {
        let log = (0..30).map(|i| format!("l{i}")).collect::<Vec<_>>().join("\n");
        let excerpt = log_excerpt(&log);
        assert!(excerpt.contains("l29"));
        assert!(!excerpt.contains("l5\n"));
    }
}
