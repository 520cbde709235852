//! Artifact store client: uploads compiled PDFs (and thumbnails) to the
//! S3-compatible object store and hands back durable URLs.

use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// A stored, durably addressable artifact.
#[derive(Debug, Clone)]
pub struct PdfArtifact {
    pub url: String,
    pub key: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Clone)]
pub struct ArtifactStore {
    s3: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl ArtifactStore {
    pub fn new(s3: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            s3,
            bucket,
            public_base_url,
        }
    }

    /// Uploads a compiled resume PDF and its optional first-page thumbnail.
    /// Returns only after the store has confirmed both writes; the caller's
    /// local copies can be dropped afterwards.
    pub async fn upload_resume(
        &self,
        user_id: Uuid,
        artifact_id: Uuid,
        name: &str,
        pdf: Vec<u8>,
        thumbnail_png: Option<Vec<u8>>,
    ) -> Result<PdfArtifact, AppError> {
        let key = format!("resumes/{user_id}/{artifact_id}.pdf");
        self.put(&key, pdf, "application/pdf").await?;

        let thumbnail_url = match thumbnail_png {
            Some(png) => {
                let thumb_key = format!("resumes/{user_id}/{artifact_id}.png");
                self.put(&thumb_key, png, "image/png").await?;
                Some(self.url_for(&thumb_key))
            }
            None => None,
        };

        info!("Uploaded resume artifact s3://{}/{}", self.bucket, key);

        Ok(PdfArtifact {
            url: self.url_for(&key),
            key,
            name: name.to_string(),
            thumbnail_url,
        })
    }

    /// Removes a stored artifact and its thumbnail (best effort on the
    /// thumbnail, which may never have existed).
    pub async fn delete_resume(&self, key: &str) -> Result<(), AppError> {
        self.s3
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        let thumb_key = key.replace(".pdf", ".png");
        let _ = self
            .s3
            .delete_object()
            .bucket(&self.bucket)
            .key(&thumb_key)
            .send()
            .await;

        Ok(())
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), key)
    }
}
