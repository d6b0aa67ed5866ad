use super::metadata::LibraryMetadata;
use crate::index::IndexBlob;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub index_type: String,
    pub index_data: IndexBlob,
    /// Ordered by creation; cascading delete removes entries as their
    /// owning document is deleted.
    pub documents: Vec<Uuid>,
    pub metadata: LibraryMetadata,
}

impl Library {
    pub fn new(title: String, description: String, index_type: String) -> crate::error::IndexResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description,
            index_data: IndexBlob::empty(&index_type)?,
            index_type,
            documents: Vec::new(),
            metadata: LibraryMetadata::default(),
        })
    }

    pub fn add_document(&mut self, document_id: Uuid) {
        self.documents.push(document_id);
        self.metadata.updated_at = chrono::Utc::now();
    }

    pub fn remove_document(&mut self, document_id: Uuid) {
        self.documents.retain(|id| *id != document_id);
        self.metadata.updated_at = chrono::Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub index_type: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LibraryUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub index_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub index_type: String,
    pub documents: Vec<Uuid>,
    pub metadata: LibraryMetadata,
}

impl From<&Library> for LibraryResponse {
    fn from(l: &Library) -> Self {
        Self {
            id: l.id,
            title: l.title.clone(),
            description: l.description.clone(),
            index_type: l.index_type.clone(),
            documents: l.documents.clone(),
            metadata: l.metadata.clone(),
        }
    }
}
