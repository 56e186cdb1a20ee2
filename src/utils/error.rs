use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    MissingFile,
    TooManyFiles(usize),
    MissingId,
    InvalidId(String),
    InvalidRequest(String),
    TooLarge(usize),
    UnsupportedMedia(String),
    NotFound(String),
    UploadFailed(String),
    MediaStoreError(String),
    DatabaseError(String),
    Configuration(String),
}

impl AppError {
    /// Message returned to the caller. Server-side failures stay generic.
    pub fn public_message(&self) -> String {
        match self {
            AppError::UploadFailed(_) => "Failed to upload media".to_string(),
            AppError::MediaStoreError(_) => "Media store request failed".to_string(),
            AppError::DatabaseError(_) => "Database operation failed".to_string(),
            AppError::Configuration(_) => "Service misconfigured".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingFile => write!(f, "No file uploaded"),
            AppError::TooManyFiles(max) => write!(f, "Too many files: at most {} allowed", max),
            AppError::MissingId => write!(f, "Missing _id"),
            AppError::InvalidId(id) => write!(f, "Invalid _id: {}", id),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::TooLarge(limit) => write!(f, "File too large: limit is {} bytes", limit),
            AppError::UnsupportedMedia(mime) => {
                write!(f, "Only images and videos are allowed (got {})", mime)
            }
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::UploadFailed(msg) => write!(f, "Upload failed: {}", msg),
            AppError::MediaStoreError(msg) => write!(f, "Media store error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(e: actix_multipart::MultipartError) -> Self {
        AppError::InvalidRequest(format!("malformed multipart body: {}", e))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile
            | AppError::TooManyFiles(_)
            | AppError::MissingId
            | AppError::InvalidId(_)
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UploadFailed(_)
            | AppError::MediaStoreError(_)
            | AppError::DatabaseError(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("❌ {}", self);
        } else {
            log::warn!("⚠️ {}", self);
        }

        HttpResponse::build(status).json(serde_json::json!({
            "success": false,
            "error": self.public_message()
        }))
    }
}
