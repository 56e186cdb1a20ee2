use serde_json::Value;

use crate::config::UploadLimits;
use crate::database::DocumentStore;
use crate::models::{
    build_user_document, stored_media_kind, AddUserResponse, DeleteUserRequest, DeleteUserResponse,
    InsertResult, MediaKind, UpdateUserRequest, UpdateUserResponse,
};
use crate::services::media_store::MediaStore;
use crate::services::upload_service::{validate_batch, MultipartUpload};
use crate::utils::{document_to_json, json_to_document, parse_object_id, AppError};

/// Uploads the avatar, then stores the user document carrying its URL and public id.
///
/// A failed insert after a successful upload leaves the media orphaned.
pub async fn add_user(
    db: &dyn DocumentStore,
    media: &dyn MediaStore,
    limits: &UploadLimits,
    upload: MultipartUpload,
) -> Result<AddUserResponse, AppError> {
    let kinds = validate_batch(&upload.files, limits, 1)?;
    let file = upload.files.into_iter().next().ok_or(AppError::MissingFile)?;

    log::info!(
        "👤 Adding user with avatar '{}' from field '{}'",
        file.file_name,
        file.field_name
    );

    let kind = kinds[0];
    let media_ref = media
        .upload(file.bytes, kind)
        .await
        .map_err(|e| AppError::UploadFailed(e.to_string()))?;

    let mut user = build_user_document(upload.fields, &media_ref, kind);

    let inserted_id = match db.insert_user(user.clone()).await {
        Ok(id) => id,
        Err(e) => {
            log::warn!("⚠️ Media {} is orphaned: user insert failed", media_ref.public_id);
            return Err(AppError::UploadFailed(e.to_string()));
        }
    };
    user.insert("_id", inserted_id);

    log::info!("✅ User {} created", inserted_id.to_hex());

    Ok(AddUserResponse {
        message: "User added successfully".to_string(),
        user: document_to_json(user),
        db_result: InsertResult {
            acknowledged: true,
            inserted_id: inserted_id.to_hex(),
        },
    })
}

pub async fn list_users(db: &dyn DocumentStore) -> Result<Vec<Value>, AppError> {
    let users = db.list_users().await?;
    Ok(users.into_iter().map(document_to_json).collect())
}

/// Partial update: only the supplied fields are overwritten.
pub async fn update_user(
    db: &dyn DocumentStore,
    request: UpdateUserRequest,
) -> Result<UpdateUserResponse, AppError> {
    let id = parse_object_id(request.id.as_deref().ok_or(AppError::MissingId)?)?;

    let mut fields = request.fields;
    fields.remove("_id");
    if let Some(key) = fields.keys().find(|k| k.starts_with('$') || k.contains('.')) {
        return Err(AppError::InvalidRequest(format!("field name '{}' is not allowed", key)));
    }
    let fields = json_to_document(fields)?;

    let result = db.update_user(id, fields).await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound(format!("user {}", id.to_hex())));
    }

    log::info!(
        "✏️  User {} updated (modified: {})",
        id.to_hex(),
        result.modified_count
    );

    Ok(UpdateUserResponse {
        message: "User updated successfully".to_string(),
        result,
    })
}

/// Requests media deletion first, then removes the document whatever the media outcome was.
///
/// Without an explicit `resourceType` the one recorded on the stored user is used,
/// falling back to image.
pub async fn delete_user(
    db: &dyn DocumentStore,
    media: &dyn MediaStore,
    request: DeleteUserRequest,
) -> Result<DeleteUserResponse, AppError> {
    let id = parse_object_id(request.id.as_deref().ok_or(AppError::MissingId)?)?;

    match request.public_id.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(public_id) => {
            let kind = match request.resource_type {
                Some(kind) => kind,
                None => db
                    .find_user(id)
                    .await?
                    .as_ref()
                    .and_then(stored_media_kind)
                    .unwrap_or(MediaKind::Image),
            };
            if let Err(e) = media.destroy(public_id, kind).await {
                log::warn!("⚠️ Could not delete media {} for user {}: {}", public_id, id.to_hex(), e);
            }
        }
        None => log::warn!("⚠️ No publicId given for user {}, media left in place", id.to_hex()),
    }

    let deleted = db.delete_user(id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("user {}", id.to_hex())));
    }

    log::info!("🗑️  User {} deleted", id.to_hex());

    Ok(DeleteUserResponse {
        message: "User deleted successfully".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UploadedFile;
    use crate::test_support::{FakeMediaStore, InMemoryStore};
    use mongodb::bson::{doc, oid::ObjectId};

    fn avatar_upload(content_type: &str) -> MultipartUpload {
        MultipartUpload {
            files: vec![UploadedFile {
                field_name: "image".into(),
                file_name: "me.png".into(),
                content_type: content_type.into(),
                bytes: vec![1, 2, 3],
            }],
            fields: doc! { "name": "Sabbir", "email": "sabbir@example.com" },
        }
    }

    fn update_request(value: serde_json::Value) -> UpdateUserRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn add_user_returns_media_url_and_persists() {
        let db = InMemoryStore::new();
        let media = FakeMediaStore::new();

        let response = add_user(&db, &media, &UploadLimits::default(), avatar_upload("image/png"))
            .await
            .unwrap();

        let uploaded = media.uploaded();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(response.user["imageUrl"], uploaded[0].url.as_str());
        assert_eq!(response.user["publicId"], uploaded[0].public_id.as_str());
        assert_eq!(response.user["_id"], response.db_result.inserted_id.as_str());

        let listed = list_users(&db).await.unwrap();
        assert_eq!(listed, vec![response.user]);
    }

    #[tokio::test]
    async fn add_user_rejects_text_before_uploading() {
        let db = InMemoryStore::new();
        let media = FakeMediaStore::new();

        let err = add_user(&db, &media, &UploadLimits::default(), avatar_upload("text/plain"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedMedia(_)));
        assert_eq!(media.upload_calls(), 0);
        assert!(db.users().is_empty());
    }

    #[tokio::test]
    async fn add_user_without_file_is_missing_file() {
        let db = InMemoryStore::new();
        let media = FakeMediaStore::new();
        let upload = MultipartUpload {
            files: vec![],
            fields: doc! { "name": "NoFile" },
        };

        let err = add_user(&db, &media, &UploadLimits::default(), upload).await.unwrap_err();
        assert!(matches!(err, AppError::MissingFile));
        assert_eq!(media.upload_calls(), 0);
    }

    #[tokio::test]
    async fn add_user_store_failure_orphans_media() {
        let db = InMemoryStore::new();
        db.fail_writes();
        let media = FakeMediaStore::new();

        let err = add_user(&db, &media, &UploadLimits::default(), avatar_upload("image/png"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UploadFailed(_)));
        assert_eq!(media.upload_calls(), 1);
        assert_eq!(media.destroy_calls(), 0);
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let db = InMemoryStore::new();
        let id = db.seed_user(doc! { "name": "Old", "city": "Khulna", "imageUrl": "u", "publicId": "p" });

        let response = update_user(
            &db,
            update_request(serde_json::json!({ "_id": id.to_hex(), "name": "New" })),
        )
        .await
        .unwrap();

        assert_eq!(response.result.matched_count, 1);
        assert_eq!(response.result.modified_count, 1);

        let stored = db.users().remove(0);
        assert_eq!(stored.get_str("name").unwrap(), "New");
        assert_eq!(stored.get_str("city").unwrap(), "Khulna");
        assert_eq!(stored.get_str("publicId").unwrap(), "p");
        assert_eq!(stored.get_object_id("_id").unwrap(), id);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found_and_mutates_nothing() {
        let db = InMemoryStore::new();
        db.seed_user(doc! { "name": "Keep" });
        let before = db.users();

        let err = update_user(
            &db,
            update_request(serde_json::json!({ "_id": ObjectId::new().to_hex(), "name": "X" })),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(db.users(), before);
    }

    #[tokio::test]
    async fn update_requires_well_formed_id() {
        let db = InMemoryStore::new();

        let err = update_user(&db, update_request(serde_json::json!({ "name": "X" })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingId));

        let err = update_user(&db, update_request(serde_json::json!({ "_id": "zzz", "name": "X" })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidId(_)));
    }

    #[tokio::test]
    async fn update_rejects_operator_and_dotted_keys() {
        let db = InMemoryStore::new();
        let id = db.seed_user(doc! { "name": "Keep" });
        let before = db.users();

        for body in [
            serde_json::json!({ "_id": id.to_hex(), "$where": "1" }),
            serde_json::json!({ "_id": id.to_hex(), "address.city": "Rajshahi" }),
        ] {
            let err = update_user(&db, update_request(body)).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }
        assert_eq!(db.users(), before);
    }

    #[tokio::test]
    async fn delete_uses_stored_resource_type_of_video_avatar() {
        let db = InMemoryStore::new();
        let media = FakeMediaStore::new();

        let added = add_user(&db, &media, &UploadLimits::default(), avatar_upload("video/mp4"))
            .await
            .unwrap();
        assert_eq!(added.user["resourceType"], "video");

        let request = DeleteUserRequest {
            id: Some(added.db_result.inserted_id.clone()),
            public_id: Some(added.user["publicId"].as_str().unwrap().to_string()),
            resource_type: None,
        };
        delete_user(&db, &media, request).await.unwrap();

        assert_eq!(media.destroyed(), vec![("media/1".to_string(), MediaKind::Video)]);
        assert!(db.users().is_empty());
    }

    #[tokio::test]
    async fn delete_destroys_media_then_removes_document() {
        let db = InMemoryStore::new();
        let media = FakeMediaStore::new();
        let id = db.seed_user(doc! { "name": "Gone", "publicId": "avatars/gone" });

        let request = DeleteUserRequest {
            id: Some(id.to_hex()),
            public_id: Some("avatars/gone".into()),
            resource_type: None,
        };
        delete_user(&db, &media, request).await.unwrap();

        assert_eq!(media.destroyed(), vec![("avatars/gone".to_string(), MediaKind::Image)]);
        assert!(list_users(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_proceeds_when_media_delete_fails() {
        let db = InMemoryStore::new();
        let media = FakeMediaStore::new();
        media.fail_destroy();
        let id = db.seed_user(doc! { "name": "Gone" });

        let request = DeleteUserRequest {
            id: Some(id.to_hex()),
            public_id: Some("missing".into()),
            resource_type: Some(MediaKind::Video),
        };
        delete_user(&db, &media, request).await.unwrap();

        assert_eq!(media.destroy_calls(), 1);
        assert!(db.users().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let db = InMemoryStore::new();
        let media = FakeMediaStore::new();

        let request = DeleteUserRequest {
            id: Some(ObjectId::new().to_hex()),
            public_id: None,
            resource_type: None,
        };
        let err = delete_user(&db, &media, request).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let request = DeleteUserRequest { id: None, public_id: Some("p".into()), resource_type: None };
        let err = delete_user(&db, &media, request).await.unwrap_err();
        assert!(matches!(err, AppError::MissingId));
        assert_eq!(media.destroy_calls(), 0);
    }
}
