use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::Document as DomainDocument;
use crate::domain::value_objects::{ContentHash, ProcessingStatus};
use crate::infrastructure::database::schema::documents;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable, Associations)]
#[diesel(belongs_to(super::CollectionModel, foreign_key = collection_id))]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub title: String,
    pub source_text: String,
    pub content_type: String,
    pub content_hash: String,
    pub processing_status: String,
    pub status_reason: Option<String>,
    pub chunk_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentModel {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub title: String,
    pub source_text: String,
    pub content_type: String,
    pub content_hash: String,
    pub processing_status: String,
    pub status_reason: Option<String>,
    pub chunk_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&DomainDocument> for NewDocumentModel {
    fn from(document: &DomainDocument) -> Self {
        Self {
            id: document.id(),
            collection_id: document.collection_id(),
            title: document.title().to_string(),
            source_text: document.source_text().to_string(),
            content_type: document.content_type().to_string(),
            content_hash: document.content_hash().to_string(),
            processing_status: document.processing_status().as_str().to_string(),
            status_reason: document
                .processing_status()
                .failure_reason()
                .map(|r| r.to_string()),
            chunk_count: document.chunk_count(),
            created_at: document.created_at(),
            updated_at: document.updated_at(),
        }
    }
}

impl TryFrom<DocumentModel> for DomainDocument {
    type Error = String;

    fn try_from(model: DocumentModel) -> Result<Self, Self::Error> {
        let status = ProcessingStatus::from_parts(&model.processing_status, model.status_reason)?;
        let content_hash = ContentHash::new(model.content_hash)?;

        Ok(DomainDocument::from_database(
            model.id,
            model.collection_id,
            model.title,
            model.source_text,
            model.content_type,
            content_hash,
            status,
            model.chunk_count,
            model.created_at,
            model.updated_at,
        ))
    }
}
