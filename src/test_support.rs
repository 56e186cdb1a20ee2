//! In-memory doubles for the document and media stores, plus multipart builders.

use actix_web::error::PayloadError;
use actix_web::http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use actix_web::web::Bytes;
use async_trait::async_trait;
use futures::stream::{self, Stream};
use mongodb::bson::{oid::ObjectId, Document};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::database::DocumentStore;
use crate::models::{MediaKind, MediaReference, UpdateResult};
use crate::services::MediaStore;
use crate::utils::AppError;

pub const BOUNDARY: &str = "----media-gallery-test-boundary";

#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<Vec<Document>>,
    galleries: Mutex<Vec<Document>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn seed_user(&self, mut user: Document) -> ObjectId {
        let id = ObjectId::new();
        user.insert("_id", id);
        self.users.lock().unwrap().push(user);
        id
    }

    pub fn users(&self) -> Vec<Document> {
        self.users.lock().unwrap().clone()
    }

    pub fn galleries(&self) -> Vec<Document> {
        self.galleries.lock().unwrap().clone()
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("write refused by test store".into()));
        }
        Ok(())
    }

    fn has_id(doc: &Document, id: ObjectId) -> bool {
        doc.get_object_id("_id").map(|d| d == id).unwrap_or(false)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert_user(&self, mut user: Document) -> Result<ObjectId, AppError> {
        self.check_writable()?;
        let id = ObjectId::new();
        user.insert("_id", id);
        self.users.lock().unwrap().push(user);
        Ok(id)
    }

    async fn list_users(&self) -> Result<Vec<Document>, AppError> {
        Ok(self.users())
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        Ok(self.users().into_iter().find(|u| Self::has_id(u, id)))
    }

    async fn update_user(&self, id: ObjectId, fields: Document) -> Result<UpdateResult, AppError> {
        self.check_writable()?;
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| Self::has_id(u, id)) else {
            return Ok(UpdateResult { matched_count: 0, modified_count: 0 });
        };

        let mut modified = false;
        for (key, value) in fields {
            if user.get(&key) != Some(&value) {
                user.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn delete_user(&self, id: ObjectId) -> Result<u64, AppError> {
        self.check_writable()?;
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| !Self::has_id(u, id));
        Ok((before - users.len()) as u64)
    }

    async fn insert_gallery(&self, mut gallery: Document) -> Result<ObjectId, AppError> {
        self.check_writable()?;
        let id = ObjectId::new();
        gallery.insert("_id", id);
        self.galleries.lock().unwrap().push(gallery);
        Ok(id)
    }

    async fn list_galleries(&self) -> Result<Vec<Document>, AppError> {
        Ok(self.galleries())
    }
}

/// Media store double that counts calls and can fail on demand.
#[derive(Default)]
pub struct FakeMediaStore {
    upload_calls: AtomicUsize,
    destroy_calls: AtomicUsize,
    fail_upload_on: Mutex<Option<usize>>,
    fail_destroy: AtomicBool,
    uploaded: Mutex<Vec<MediaReference>>,
    destroyed: Mutex<Vec<(String, MediaKind)>>,
}

impl FakeMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the n-th upload call (1-based) fail.
    pub fn fail_upload_on(&self, call: usize) {
        *self.fail_upload_on.lock().unwrap() = Some(call);
    }

    pub fn fail_destroy(&self) {
        self.fail_destroy.store(true, Ordering::SeqCst);
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }

    pub fn uploaded(&self) -> Vec<MediaReference> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<(String, MediaKind)> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn upload(&self, _bytes: Vec<u8>, kind: MediaKind) -> Result<MediaReference, AppError> {
        let call = self.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_upload_on.lock().unwrap() == Some(call) {
            return Err(AppError::UploadFailed(format!("upload {} refused", call)));
        }

        let reference = MediaReference {
            url: format!("https://media.test/{}/upload/v1/media/{}.bin", kind, call),
            public_id: format!("media/{}", call),
        };
        self.uploaded.lock().unwrap().push(reference.clone());
        Ok(reference)
    }

    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<(), AppError> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(AppError::MediaStoreError(format!("{} not found", public_id)));
        }
        self.destroyed.lock().unwrap().push((public_id.to_string(), kind));
        Ok(())
    }
}

/// One part of a multipart/form-data body
pub struct Part {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

impl Part {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }

    pub fn file(name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: Some(content_type.to_string()),
            data: data.to_vec(),
        }
    }
}

/// Encodes parts as a multipart body. Returns the content-type header value and the body.
pub fn multipart_body(parts: &[Part]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = &part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = &part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Headers plus a one-chunk payload stream, for driving `Multipart::new` directly.
pub fn multipart_payload(
    parts: &[Part],
) -> (HeaderMap, impl Stream<Item = Result<Bytes, PayloadError>> + 'static) {
    let (content_type, body) = multipart_body(parts);

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&content_type).expect("valid content type"),
    );

    (headers, stream::once(async move { Ok(Bytes::from(body)) }))
}
