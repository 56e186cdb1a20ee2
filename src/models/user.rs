use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::media::{MediaKind, MediaReference};

pub const USERS_COLLECTION: &str = "users";

/// Builds the stored user document: caller metadata plus the uploaded avatar.
/// The avatar fields win over any same-named metadata. `resourceType` is kept
/// because the media store scopes deletion by it.
pub fn build_user_document(metadata: Document, media: &MediaReference, kind: MediaKind) -> Document {
    let mut user = metadata;
    user.remove("_id");
    user.insert("imageUrl", media.url.clone());
    user.insert("publicId", media.public_id.clone());
    user.insert("resourceType", kind.as_str());
    user
}

/// Resource type recorded on a stored user, if any
pub fn stored_media_kind(user: &Document) -> Option<MediaKind> {
    user.get_str("resourceType").ok().and_then(MediaKind::from_name)
}

/// Update request: `_id` plus any fields to overwrite
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,

    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub fields: Map<String, Value>,
}

/// Delete request
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DeleteUserRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,

    #[serde(rename = "publicId")]
    pub public_id: Option<String>,

    /// Media resource type of the avatar; defaults to image
    #[serde(rename = "resourceType")]
    pub resource_type: Option<MediaKind>,
}

/// Acknowledgement of the insert, shaped like the driver's insert result
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InsertResult {
    pub acknowledged: bool,
    #[serde(rename = "insertedId")]
    pub inserted_id: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AddUserResponse {
    pub message: String,
    #[schema(value_type = Object)]
    pub user: Value,
    #[serde(rename = "dbResult")]
    pub db_result: InsertResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct UpdateResult {
    #[serde(rename = "matchedCount")]
    pub matched_count: u64,
    #[serde(rename = "modifiedCount")]
    pub modified_count: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UpdateUserResponse {
    pub message: String,
    pub result: UpdateResult,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteUserResponse {
    pub message: String,
}

/// Filter matching a single user by id
pub fn id_filter(id: mongodb::bson::oid::ObjectId) -> Document {
    doc! { "_id": id }
}
