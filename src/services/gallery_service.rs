use serde_json::Value;

use crate::config::UploadLimits;
use crate::database::DocumentStore;
use crate::models::{build_gallery_document, GalleryUploadResponse, MediaReference, UploadedFile, MAX_GALLERY_FILES};
use crate::services::media_store::MediaStore;
use crate::services::upload_service::validate_batch;
use crate::utils::{document_to_json, AppError};

/// Uploads a batch of up to five files one at a time and stores them as one gallery document.
///
/// The first failed upload aborts the batch: nothing is persisted and the files
/// already uploaded are not rolled back.
pub async fn upload_gallery(
    db: &dyn DocumentStore,
    media: &dyn MediaStore,
    limits: &UploadLimits,
    files: Vec<UploadedFile>,
) -> Result<GalleryUploadResponse, AppError> {
    let kinds = validate_batch(&files, limits, MAX_GALLERY_FILES)?;

    log::info!("🖼️  Uploading gallery batch of {} files", files.len());

    let mut images: Vec<MediaReference> = Vec::with_capacity(files.len());
    for (index, (file, kind)) in files.into_iter().zip(kinds).enumerate() {
        match media.upload(file.bytes, kind).await {
            Ok(reference) => images.push(reference),
            Err(e) => {
                if !images.is_empty() {
                    let orphaned: Vec<&str> = images.iter().map(|m| m.public_id.as_str()).collect();
                    log::warn!("⚠️ Gallery batch aborted, orphaned media: {:?}", orphaned);
                }
                return Err(AppError::UploadFailed(format!(
                    "file {} ('{}'): {}",
                    index + 1,
                    file.file_name,
                    e
                )));
            }
        }
    }

    if let Err(e) = db.insert_gallery(build_gallery_document(&images)).await {
        log::warn!("⚠️ Gallery insert failed, {} uploaded media orphaned", images.len());
        return Err(AppError::UploadFailed(e.to_string()));
    }

    log::info!("✅ Gallery stored with {} images", images.len());

    Ok(GalleryUploadResponse {
        message: "Images uploaded successfully".to_string(),
        images,
    })
}

pub async fn list_galleries(db: &dyn DocumentStore) -> Result<Vec<Value>, AppError> {
    let galleries = db.list_galleries().await?;
    Ok(galleries.into_iter().map(document_to_json).collect())
}
