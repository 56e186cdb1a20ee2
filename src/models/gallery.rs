use mongodb::bson::{doc, Bson, Document};
use serde::Serialize;

use super::media::MediaReference;

pub const GALLERIES_COLLECTION: &str = "galleries";

/// Maximum number of files accepted in one gallery upload
pub const MAX_GALLERY_FILES: usize = 5;

/// One gallery document per upload batch, holding every image of the batch in order.
pub fn build_gallery_document(images: &[MediaReference]) -> Document {
    let images: Vec<Bson> = images
        .iter()
        .map(|m| {
            Bson::Document(doc! {
                "url": m.url.clone(),
                "publicId": m.public_id.clone(),
            })
        })
        .collect();

    doc! {
        "images": images,
        "createdAt": mongodb::bson::DateTime::now(),
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GalleryUploadResponse {
    pub message: String,
    pub images: Vec<MediaReference>,
}
