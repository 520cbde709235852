//! PDF text extraction.
//!
//! `pdf-extract` is synchronous and CPU-bound, so extraction runs on the
//! blocking thread pool. An empty result is an error: the pipeline never
//! accepts a partial or blank extraction.

use bytes::Bytes;

use crate::errors::AppError;

/// Extracts plain text from an uploaded PDF. Fails with a client-meaningful
/// error for unreadable documents and for documents with no text layer.
pub async fn extract_pdf_text(data: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task panicked: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "PDF contains no extractable text".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_bytes_fail_with_validation_error() {
        let result = extract_pdf_text(Bytes::from_static(b"definitely not a pdf")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
