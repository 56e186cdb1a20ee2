use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Media Gallery Service API",
        version = "0.1.0",
        description = "User records with uploaded avatars and multi-image galleries. \n\nBinary media is stored on Cloudinary; documents live in MongoDB."
    ),
    paths(
        // Users
        crate::api::users::add_user,
        crate::api::users::list_users,
        crate::api::users::update_user,
        crate::api::users::delete_user,

        // Gallery
        crate::api::gallery::upload_gallery,
        crate::api::gallery::list_galleries,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::MediaReference,
            crate::models::MediaKind,
            crate::models::AddUserResponse,
            crate::models::InsertResult,
            crate::models::UpdateUserRequest,
            crate::models::UpdateUserResponse,
            crate::models::UpdateResult,
            crate::models::DeleteUserRequest,
            crate::models::DeleteUserResponse,
            crate::models::GalleryUploadResponse,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Users", description = "Create users with an avatar upload, list, update and delete them."),
        (name = "Gallery", description = "Batch uploads of up to five images or videos."),
        (name = "Health", description = "Service and database health."),
    )
)]
pub struct ApiDoc;
