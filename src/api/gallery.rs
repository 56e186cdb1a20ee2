use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};

use crate::config::UploadLimits;
use crate::database::DocumentStore;
use crate::models::MAX_GALLERY_FILES;
use crate::services::{collect_multipart, gallery_service, MediaStore};

/// POST /gallery - Uploads up to five files as one gallery entry
#[utoipa::path(
    post,
    path = "/gallery",
    tag = "Gallery",
    request_body(content = String, content_type = "multipart/form-data",
        description = "One to five image/video files"),
    responses(
        (status = 201, description = "Batch stored", body = crate::models::GalleryUploadResponse),
        (status = 400, description = "No files, or more than five"),
        (status = 413, description = "A file is larger than the limit"),
        (status = 415, description = "A file is not an image or video"),
        (status = 500, description = "Upload or store failure")
    )
)]
pub async fn upload_gallery(
    db: web::Data<dyn DocumentStore>,
    media: web::Data<dyn MediaStore>,
    limits: web::Data<UploadLimits>,
    payload: Multipart,
) -> impl Responder {
    log::info!("📝 POST /gallery");

    let upload = match collect_multipart(payload, &limits, MAX_GALLERY_FILES).await {
        Ok(upload) => upload,
        Err(e) => return e.error_response(),
    };

    match gallery_service::upload_gallery(db.get_ref(), media.get_ref(), &limits, upload.files).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => e.error_response(),
    }
}

/// GET /gallery - Every stored gallery batch
#[utoipa::path(
    get,
    path = "/gallery",
    tag = "Gallery",
    responses(
        (status = 200, description = "All gallery documents"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_galleries(db: web::Data<dyn DocumentStore>) -> impl Responder {
    match gallery_service::list_galleries(db.get_ref()).await {
        Ok(galleries) => HttpResponse::Ok().json(galleries),
        Err(e) => e.error_response(),
    }
}
