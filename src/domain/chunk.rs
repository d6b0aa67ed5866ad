use super::metadata::ChunkMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub text: String,
    /// Populated on create and regenerated whenever `text` changes; never
    /// left stale alongside the index's copy of the same vector.
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(document_id: Uuid, text: String, embedding: Vec<f32>, metadata: ChunkMetadata) -> Self {
        Self { id: Uuid::new_v4(), document_id, text, embedding, metadata }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkCreate {
    pub document_id: Uuid,
    pub text: String,
    pub section: Option<String>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChunkUpdate {
    pub text: Option<String>,
    pub section: Option<String>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunkResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl From<&Chunk> for ChunkResponse {
    fn from(c: &Chunk) -> Self {
        Self {
            id: c.id,
            document_id: c.document_id,
            text: c.text.clone(),
            metadata: c.metadata.clone(),
        }
    }
}
