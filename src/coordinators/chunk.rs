use crate::domain::chunk::{Chunk, ChunkCreate, ChunkUpdate};
use crate::domain::metadata::ChunkMetadata;
use crate::embedder::{Embedder, InputType};
use crate::error::{IndexError, IndexResult};
use crate::index_service::IndexService;
use crate::scheduler::{Key, OperationScheduler};
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ChunkCoordinator {
    store: Arc<Store>,
    index_service: Arc<IndexService>,
    embedder: Arc<dyn Embedder>,
    scheduler: OperationScheduler,
}

impl ChunkCoordinator {
    pub fn new(
        store: Arc<Store>,
        index_service: Arc<IndexService>,
        embedder: Arc<dyn Embedder>,
        scheduler: OperationScheduler,
    ) -> Self {
        Self { store, index_service, embedder, scheduler }
    }

    pub fn get_chunk(&self, id: Uuid) -> IndexResult<Chunk> {
        self.store.get_chunk(id)
    }

    pub fn list_chunks(&self) -> Vec<Chunk> {
        self.store.list_chunks()
    }

    /// Embeds `text` on write (§4.3) and enqueues the resulting chunk +
    /// vector insertion under the owning library's key.
    pub async fn create_chunk(&self, create: ChunkCreate) -> IndexResult<Chunk> {
        let document = self
            .store
            .get_document(create.document_id)
            .map_err(|_| IndexError::ParentNotFound(format!("document {}", create.document_id)))?;

        let embeddings = self.embedder.embed(&[create.text.clone()], InputType::Document).await?;
        let vector = embeddings.into_iter().next().unwrap_or_default();

        let metadata = ChunkMetadata {
            section: create.section.unwrap_or_else(|| "Body".to_string()),
            order: create.order.unwrap_or(0),
            ..ChunkMetadata::default()
        };
        let chunk = Chunk::new(create.document_id, create.text, vector.clone(), metadata);
        let chunk_id = chunk.id;
        let document_id = create.document_id;
        let library_id = document.library_id;

        let store = self.store.clone();
        let index_service = self.index_service.clone();
        self.scheduler
            .submit(Key::new("library", library_id), move || {
                let chunk = chunk.clone();
                async move {
                    store.save_chunk(chunk.clone())?;
                    let mut document = store.get_document(document_id)?;
                    document.add_chunk(chunk_id);
                    store.save_document(document)?;
                    index_service.add_vector(library_id, chunk_id, vector)?;
                    Ok::<Chunk, IndexError>(chunk)
                }
            })
            .await
    }

    /// On a text change, regenerates the embedding and replaces the vector
    /// under the same id so the index is never left stale.
    pub async fn update_chunk(&self, id: Uuid, update: ChunkUpdate) -> IndexResult<Chunk> {
        let chunk = self.store.get_chunk(id)?;
        let document = self.store.get_document(chunk.document_id)?;
        let library_id = document.library_id;

        let new_vector = match &update.text {
            Some(text) => {
                let embeddings = self.embedder.embed(&[text.clone()], InputType::Document).await?;
                Some(embeddings.into_iter().next().unwrap_or_default())
            }
            None => None,
        };

        let store = self.store.clone();
        let index_service = self.index_service.clone();
        self.scheduler
            .submit(Key::new("library", library_id), move || async move {
                let mut chunk = store.get_chunk(id)?;
                if let Some(text) = update.text {
                    chunk.text = text;
                }
                if let Some(section) = update.section {
                    chunk.metadata.section = section;
                }
                if let Some(order) = update.order {
                    chunk.metadata.order = order;
                }
                chunk.metadata.updated_at = chrono::Utc::now();

                if let Some(vector) = new_vector {
                    chunk.embedding = vector.clone();
                    index_service.delete_vector(library_id, id)?;
                    index_service.add_vector(library_id, id, vector)?;
                }

                store.save_chunk(chunk.clone())?;
                Ok::<Chunk, IndexError>(chunk)
            })
            .await
    }

    pub async fn delete_chunk(&self, id: Uuid) -> IndexResult<()> {
        let chunk = self.store.get_chunk(id)?;
        let document = self.store.get_document(chunk.document_id)?;
        let library_id = document.library_id;
        let document_id = chunk.document_id;

        let store = self.store.clone();
        let index_service = self.index_service.clone();
        self.scheduler
            .submit(Key::new("library", library_id), move || async move {
                index_service.delete_vector(library_id, id)?;
                store.delete_chunk(id)?;
                let mut document = store.get_document(document_id)?;
                document.remove_chunk(id);
                store.save_document(document)?;
                Ok::<(), IndexError>(())
            })
            .await
    }
}
