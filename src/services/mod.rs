pub mod gallery_service;
pub mod media_store;
pub mod upload_service;
pub mod user_service;

pub use media_store::*;
pub use upload_service::*;
