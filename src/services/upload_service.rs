use actix_multipart::Multipart;
use futures::stream::StreamExt;
use mongodb::bson::Document;

use crate::config::UploadLimits;
use crate::models::{MediaKind, UploadedFile};
use crate::utils::AppError;

/// Text fields larger than this are rejected
const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;

/// Most text fields accepted in one request
const MAX_TEXT_FIELDS: usize = 100;

/// A decoded multipart request: buffered file parts plus text metadata fields
#[derive(Debug, Default)]
pub struct MultipartUpload {
    pub files: Vec<UploadedFile>,
    pub fields: Document,
}

/// Decodes a multipart body into memory.
///
/// Parts carrying a filename are files, everything else is a text field
/// (a repeated name keeps the last value). A part with an empty filename is an
/// unfilled file input and is skipped. File count, per-file size and text field
/// count are enforced while streaming so an oversized body is never fully buffered.
pub async fn collect_multipart(
    mut payload: Multipart,
    limits: &UploadLimits,
    max_files: usize,
) -> Result<MultipartUpload, AppError> {
    let mut upload = MultipartUpload::default();
    let mut text_fields = 0usize;

    while let Some(field) = payload.next().await {
        let mut field = field?;

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|f| f.to_string());

        match file_name {
            Some(file_name) if file_name.is_empty() => {
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
                log::debug!("📎 Skipping empty file input '{}'", name);
            }
            Some(file_name) => {
                if upload.files.len() >= max_files {
                    return Err(AppError::TooManyFiles(max_files));
                }

                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk?;
                    if bytes.len() + chunk.len() > limits.max_file_size {
                        return Err(AppError::TooLarge(limits.max_file_size));
                    }
                    bytes.extend_from_slice(&chunk);
                }

                log::debug!("📎 Received file '{}' ({}, {} bytes)", file_name, content_type, bytes.len());

                upload.files.push(UploadedFile {
                    field_name: name,
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                text_fields += 1;
                if text_fields > MAX_TEXT_FIELDS {
                    return Err(AppError::InvalidRequest(format!(
                        "too many fields (max {})",
                        MAX_TEXT_FIELDS
                    )));
                }

                let mut raw = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk?;
                    if raw.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
                        return Err(AppError::InvalidRequest(format!("field '{}' is too long", name)));
                    }
                    raw.extend_from_slice(&chunk);
                }

                if name.is_empty() {
                    continue;
                }

                let value = String::from_utf8(raw)
                    .map_err(|_| AppError::InvalidRequest(format!("field '{}' is not valid UTF-8", name)))?;
                upload.fields.insert(name, value);
            }
        }
    }

    Ok(upload)
}

/// Checks declared type and size of one file. Returns the resource type to upload as.
pub fn validate_file(file: &UploadedFile, limits: &UploadLimits) -> Result<MediaKind, AppError> {
    let kind = MediaKind::from_content_type(&file.content_type)
        .ok_or_else(|| AppError::UnsupportedMedia(file.content_type.clone()))?;

    if file.size() > limits.max_file_size {
        return Err(AppError::TooLarge(limits.max_file_size));
    }

    Ok(kind)
}

/// Validates every file of a batch before any of them is sent anywhere.
pub fn validate_batch(
    files: &[UploadedFile],
    limits: &UploadLimits,
    max_files: usize,
) -> Result<Vec<MediaKind>, AppError> {
    if files.is_empty() {
        return Err(AppError::MissingFile);
    }
    if files.len() > max_files {
        return Err(AppError::TooManyFiles(max_files));
    }
    files.iter().map(|f| validate_file(f, limits)).collect()
}
