//! Local filesystem implementation of `MediaStorage`.
//!
//! Files are content-addressed: the name is the SHA-256 of the bytes, so the
//! same upload is written once however many rows point at it. References
//! look like `ids/3f2a….jpg` and are served by the HTTP layer under the
//! configured URL prefix.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use domains::{DomainError, DomainResult, MediaStorage, Upload, UploadCategory};
use sha2::{Digest, Sha256};
use tokio::fs;

const PDF_MAGIC: &[u8] = b"%PDF-";

pub struct LocalMediaStorage {
    /// Root directory for all uploads (e.g. "./data/uploads").
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root and one directory per category.
    pub async fn prepare(&self) -> std::io::Result<()> {
        for category in [
            UploadCategory::ValidId,
            UploadCategory::SelfieWithId,
            UploadCategory::ProfilePicture,
            UploadCategory::ItemPhoto,
        ] {
            fs::create_dir_all(self.root.join(category.dir())).await?;
        }
        Ok(())
    }
}

/// Category rules first, then that the bytes really are what the declared
/// type claims.
fn check(category: UploadCategory, upload: &Upload) -> DomainResult<()> {
    category.check(upload)?;

    let genuine = if upload.content_type.type_() == mime::IMAGE {
        image::guess_format(&upload.bytes).is_ok()
    } else {
        upload.bytes.starts_with(PDF_MAGIC)
    };
    if !genuine {
        return Err(DomainError::field(category.field_name(), category.type_error()));
    }
    Ok(())
}

fn extension(upload: &Upload) -> String {
    if let Ok(format) = image::guess_format(&upload.bytes) {
        if let Some(ext) = format.extensions_str().first() {
            return (*ext).to_string();
        }
    }
    if upload.content_type.essence_str() == mime::APPLICATION_PDF.essence_str() {
        return "pdf".to_string();
    }
    mime_guess::get_mime_extensions(&upload.content_type)
        .and_then(|exts| exts.first())
        .map(|ext| (*ext).to_string())
        .unwrap_or_else(|| "bin".to_string())
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(&self, category: UploadCategory, upload: Upload) -> DomainResult<String> {
        check(category, &upload)?;

        let hash = hex::encode(Sha256::digest(&upload.bytes));
        let reference = format!("{}/{}.{}", category.dir(), hash, extension(&upload));
        let target = self.root.join(&reference);

        let io_error = |err: std::io::Error| {
            tracing::error!(error = %err, path = %target.display(), "failed to store upload");
            DomainError::internal("failed to store upload")
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        if !fs::try_exists(&target).await.map_err(io_error)? {
            fs::write(&target, &upload.bytes).await.map_err(io_error)?;
            tracing::debug!(%reference, bytes = upload.len(), "stored upload");
        }
        Ok(reference)
    }
}
