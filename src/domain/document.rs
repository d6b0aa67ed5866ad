use super::metadata::DocumentMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub library_id: Uuid,
    pub title: String,
    /// Ordered by creation; cascading delete removes entries as their
    /// owning chunk is deleted.
    pub chunks: Vec<Uuid>,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(library_id: Uuid, title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            library_id,
            title,
            chunks: Vec::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn add_chunk(&mut self, chunk_id: Uuid) {
        self.chunks.push(chunk_id);
        self.metadata.updated_at = chrono::Utc::now();
    }

    pub fn remove_chunk(&mut self, chunk_id: Uuid) {
        self.chunks.retain(|id| *id != chunk_id);
        self.metadata.updated_at = chrono::Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentCreate {
    pub library_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DocumentUpdate {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub library_id: Uuid,
    pub title: String,
    pub chunks: Vec<Uuid>,
    pub metadata: DocumentMetadata,
}

impl From<&Document> for DocumentResponse {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id,
            library_id: d.library_id,
            title: d.title.clone(),
            chunks: d.chunks.clone(),
            metadata: d.metadata.clone(),
        }
    }
}
