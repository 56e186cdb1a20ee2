use std::env;

use crate::utils::AppError;

pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 50;

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: Option<String>,
    pub base_url: String,
}

/// Per-file limits applied before anything is sent to the media store
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_file_size: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: String,
    pub database_url: String,
    pub database_name: String,
    pub cloudinary: CloudinaryConfig,
    pub limits: UploadLimits,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| AppError::Configuration(format!("{} must be set", key)))
        };

        let database_url = match get("MONGODB_URI") {
            Some(uri) => uri,
            None => {
                let user = require("DB_USER")?;
                let pass = require("DB_PASS")?;
                let cluster = get("DB_CLUSTER").unwrap_or_else(|| "cluster0.mongodb.net".to_string());
                format!(
                    "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
                    urlencoding::encode(&user),
                    urlencoding::encode(&pass),
                    cluster
                )
            }
        };

        let max_file_size_mb = match get("MAX_FILE_SIZE_MB") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                AppError::Configuration(format!("MAX_FILE_SIZE_MB is not a number: {}", raw))
            })?,
            None => DEFAULT_MAX_FILE_SIZE_MB,
        };
        let max_file_size = max_file_size_mb.checked_mul(1024 * 1024).ok_or_else(|| {
            AppError::Configuration(format!("MAX_FILE_SIZE_MB is too large: {}", max_file_size_mb))
        })?;

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").unwrap_or_else(|| "3000".to_string()),
            database_url,
            database_name: get("DB_NAME").unwrap_or_else(|| "mediaGallery".to_string()),
            cloudinary: CloudinaryConfig {
                cloud_name: require("CLOUDINARY_CLOUD_NAME")?,
                api_key: require("CLOUDINARY_API_KEY")?,
                api_secret: require("CLOUDINARY_API_SECRET")?,
                folder: get("CLOUDINARY_FOLDER"),
                base_url: get("CLOUDINARY_BASE_URL")
                    .unwrap_or_else(|| "https://api.cloudinary.com".to_string()),
            },
            limits: UploadLimits { max_file_size },
        })
    }

    /// Connection string with the password masked, for logging
    pub fn redacted_database_url(&self) -> String {
        match (self.database_url.find("://"), self.database_url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => format!(
                "{}://***@{}",
                &self.database_url[..scheme_end],
                &self.database_url[at + 1..]
            ),
            _ => self.database_url.clone(),
        }
    }
}
