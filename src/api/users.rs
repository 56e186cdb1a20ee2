use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};

use crate::config::UploadLimits;
use crate::database::DocumentStore;
use crate::models::{DeleteUserRequest, UpdateUserRequest};
use crate::services::{collect_multipart, user_service, MediaStore};

/// POST /adduser - Uploads the avatar and creates the user
#[utoipa::path(
    post,
    path = "/adduser",
    tag = "Users",
    request_body(content = String, content_type = "multipart/form-data",
        description = "One image/video file plus any text fields"),
    responses(
        (status = 201, description = "User created", body = crate::models::AddUserResponse),
        (status = 400, description = "No file, or more than one"),
        (status = 413, description = "File larger than the limit"),
        (status = 415, description = "File is not an image or video"),
        (status = 500, description = "Upload or store failure")
    )
)]
pub async fn add_user(
    db: web::Data<dyn DocumentStore>,
    media: web::Data<dyn MediaStore>,
    limits: web::Data<UploadLimits>,
    payload: Multipart,
) -> impl Responder {
    log::info!("📝 POST /adduser");

    let upload = match collect_multipart(payload, &limits, 1).await {
        Ok(upload) => upload,
        Err(e) => return e.error_response(),
    };

    match user_service::add_user(db.get_ref(), media.get_ref(), &limits, upload).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => e.error_response(),
    }
}

/// GET /allusers - Every stored user, unpaginated
#[utoipa::path(
    get,
    path = "/allusers",
    tag = "Users",
    responses(
        (status = 200, description = "All user documents"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_users(db: web::Data<dyn DocumentStore>) -> impl Responder {
    match user_service::list_users(db.get_ref()).await {
        Ok(users) => {
            log::info!("📋 Listed {} users", users.len());
            HttpResponse::Ok().json(users)
        }
        Err(e) => e.error_response(),
    }
}

/// PUT /userUpdate - Overwrites the supplied fields of one user
#[utoipa::path(
    put,
    path = "/userUpdate",
    tag = "Users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = crate::models::UpdateUserResponse),
        (status = 400, description = "Missing or malformed _id"),
        (status = 404, description = "No user with that _id"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn update_user(
    db: web::Data<dyn DocumentStore>,
    request: web::Json<UpdateUserRequest>,
) -> impl Responder {
    log::info!("🔧 PUT /userUpdate - {:?}", request.id);

    match user_service::update_user(db.get_ref(), request.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

/// DELETE /deleteuser - Deletes the avatar media, then the user
#[utoipa::path(
    delete,
    path = "/deleteuser",
    tag = "Users",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted", body = crate::models::DeleteUserResponse),
        (status = 400, description = "Missing or malformed _id"),
        (status = 404, description = "No user with that _id"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn delete_user(
    db: web::Data<dyn DocumentStore>,
    media: web::Data<dyn MediaStore>,
    request: web::Json<DeleteUserRequest>,
) -> impl Responder {
    log::info!("🗑️  DELETE /deleteuser - {:?}", request.id);

    match user_service::delete_user(db.get_ref(), media.get_ref(), request.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}
