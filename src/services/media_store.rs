use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::config::CloudinaryConfig;
use crate::models::{MediaKind, MediaReference};
use crate::utils::AppError;

/// Async contract over the external media host.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, kind: MediaKind) -> Result<MediaReference, AppError>;

    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<(), AppError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: Option<String>,
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Cloudinary REST client (signed uploads, no SDK)
pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name,
            kind,
            action
        )
    }

    async fn read_error(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => format!("{}: {}", status, body.error.message),
            Err(_) => format!("{}", status),
        }
    }
}

#[async_trait]
impl MediaStore for CloudinaryClient {
    async fn upload(&self, bytes: Vec<u8>, kind: MediaKind) -> Result<MediaReference, AppError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let mut params: Vec<(&'static str, String)> = vec![("timestamp", timestamp)];
        if let Some(folder) = &self.config.folder {
            params.push(("folder", folder.clone()));
        }
        let signature = sign_params(&params, &self.config.api_secret);

        let size = bytes.len();
        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name("upload"))
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        log::info!("☁️  Uploading {} bytes to media store ({})", size, kind);

        let response = self
            .http
            .post(self.endpoint(kind, "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::UploadFailed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UploadFailed(Self::read_error(response).await));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::UploadFailed(format!("unreadable response: {}", e)))?;

        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| AppError::UploadFailed("response carried no URL".into()))?;

        let public_id = match body.public_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                log::warn!("⚠️ Media store returned no public_id, deriving it from {}", url);
                derive_public_id(&url).ok_or_else(|| {
                    AppError::UploadFailed(format!("cannot derive public id from {}", url))
                })?
            }
        };

        log::info!("✅ Uploaded media {}", public_id);
        Ok(MediaReference { url, public_id })
    }

    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<(), AppError> {
        // destroy has no "auto" resource type
        let kind = match kind {
            MediaKind::Auto => MediaKind::Image,
            other => other,
        };

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let params: Vec<(&'static str, String)> = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
        ];
        let signature = sign_params(&params, &self.config.api_secret);

        let mut form = params;
        form.push(("api_key", self.config.api_key.clone()));
        form.push(("signature", signature));

        log::info!("🗑️  Destroying media {} ({})", public_id, kind);

        let response = self
            .http
            .post(self.endpoint(kind, "destroy"))
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::MediaStoreError(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::MediaStoreError(Self::read_error(response).await));
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| AppError::MediaStoreError(format!("unreadable response: {}", e)))?;

        if body.result != "ok" {
            return Err(AppError::MediaStoreError(format!(
                "destroy of '{}' returned '{}'",
                public_id, body.result
            )));
        }

        Ok(())
    }
}

/// Signs request parameters: sorted `k=v` pairs joined by `&`, secret appended, SHA-1 hex.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params
        .iter()
        .filter(|(k, v)| {
            !v.is_empty() && !matches!(*k, "file" | "api_key" | "resource_type" | "cloud_name")
        })
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fallback only: recovers the asset id from a delivery URL,
/// e.g. `.../image/upload/v1712/folder/cat.jpg` -> `folder/cat`.
pub fn derive_public_id(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next()?;
    let (_, path) = without_query.split_once("/upload/")?;

    let path = match path.split_once('/') {
        Some((first, rest))
            if first.len() > 1
                && first.starts_with('v')
                && first[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            rest
        }
        _ => path,
    };

    let public_id = match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => path,
    };

    if public_id.is_empty() {
        None
    } else {
        Some(public_id.to_string())
    }
}
