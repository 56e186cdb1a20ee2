use async_trait::async_trait;
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::{Client, Collection, Database};

use crate::models::{id_filter, UpdateResult, GALLERIES_COLLECTION, USERS_COLLECTION};
use crate::utils::AppError;

/// Collection-level operations the handlers need from the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    async fn insert_user(&self, user: Document) -> Result<ObjectId, AppError>;

    async fn list_users(&self) -> Result<Vec<Document>, AppError>;

    async fn find_user(&self, id: ObjectId) -> Result<Option<Document>, AppError>;

    /// `$set` the given fields on one user. An empty field set only checks for a match.
    async fn update_user(&self, id: ObjectId, fields: Document) -> Result<UpdateResult, AppError>;

    /// Returns the number of deleted documents (0 or 1).
    async fn delete_user(&self, id: ObjectId) -> Result<u64, AppError>;

    async fn insert_gallery(&self, gallery: Document) -> Result<ObjectId, AppError>;

    async fn list_galleries(&self) -> Result<Vec<Document>, AppError>;
}

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));
        client_options.app_name = Some("media-gallery-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        let mongodb = Self { client, db };
        mongodb.ping().await?;

        Ok(mongodb)
    }

    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }

    /// Closes the connection pool. Call once the HTTP server has stopped.
    pub async fn close(self) {
        self.client.shutdown().await;
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<ObjectId, AppError> {
        let result = self.collection(collection).insert_one(document).await?;
        result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError(format!(
                "insert into '{}' returned a non-ObjectId id: {}",
                collection, result.inserted_id
            ))
        })
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        let mut cursor = self.collection(collection).find(doc! {}).await?;

        let mut documents = Vec::new();
        while let Some(result) = cursor.next().await {
            documents.push(result?);
        }
        Ok(documents)
    }
}

#[async_trait]
impl DocumentStore for MongoDB {
    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn insert_user(&self, user: Document) -> Result<ObjectId, AppError> {
        self.insert(USERS_COLLECTION, user).await
    }

    async fn list_users(&self) -> Result<Vec<Document>, AppError> {
        self.find_all(USERS_COLLECTION).await
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        Ok(self.collection(USERS_COLLECTION).find_one(id_filter(id)).await?)
    }

    async fn update_user(&self, id: ObjectId, fields: Document) -> Result<UpdateResult, AppError> {
        let users = self.collection(USERS_COLLECTION);

        // `$set` with an empty document is rejected by the server
        if fields.is_empty() {
            let matched = users.count_documents(id_filter(id)).await?;
            return Ok(UpdateResult { matched_count: matched, modified_count: 0 });
        }

        let result = users
            .update_one(id_filter(id), doc! { "$set": fields })
            .await?;

        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_user(&self, id: ObjectId) -> Result<u64, AppError> {
        let result = self
            .collection(USERS_COLLECTION)
            .delete_one(id_filter(id))
            .await?;
        Ok(result.deleted_count)
    }

    async fn insert_gallery(&self, gallery: Document) -> Result<ObjectId, AppError> {
        self.insert(GALLERIES_COLLECTION, gallery).await
    }

    async fn list_galleries(&self) -> Result<Vec<Document>, AppError> {
        self.find_all(GALLERIES_COLLECTION).await
    }
}
