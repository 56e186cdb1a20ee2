pub mod gallery;
pub mod health;
pub mod swagger;
pub mod users;

use actix_web::web;

use crate::utils::AppError;

/// Registers every route. Handlers expect `Data<dyn DocumentStore>`,
/// `Data<dyn MediaStore>` and `Data<UploadLimits>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .route("/", web::get().to(health::root))
    .route("/health", web::get().to(health::health_check))
    .route("/adduser", web::post().to(users::add_user))
    .route("/allusers", web::get().to(users::list_users))
    .route("/userUpdate", web::put().to(users::update_user))
    .route("/deleteuser", web::delete().to(users::delete_user))
    .route("/gallery", web::post().to(gallery::upload_gallery))
    .route("/gallery", web::get().to(gallery::list_galleries));
}
