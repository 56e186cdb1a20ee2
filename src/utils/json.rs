use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde_json::{Map, Value};

use super::error::AppError;

/// Parses a client-supplied identifier into a store-native ObjectId.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingId);
    }
    ObjectId::parse_str(trimmed).map_err(|_| AppError::InvalidId(trimmed.to_string()))
}

/// Renders a stored document as plain JSON, with ObjectIds as hex strings.
pub fn document_to_json(doc: Document) -> Value {
    let map: Map<String, Value> = doc
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect();
    Value::Object(map)
}

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::DateTime(dt) => Value::String(
            dt.try_to_rfc3339_string()
                .unwrap_or_else(|_| dt.timestamp_millis().to_string()),
        ),
        other => other.into_relaxed_extjson(),
    }
}

/// Converts a flat JSON object into a document suitable for `$set`.
pub fn json_to_document(fields: Map<String, Value>) -> Result<Document, AppError> {
    let mut doc = Document::new();
    for (key, value) in fields {
        let bson = mongodb::bson::to_bson(&value)
            .map_err(|e| AppError::InvalidRequest(format!("field '{}': {}", key, e)))?;
        doc.insert(key, bson);
    }
    Ok(doc)
}
