//! Stateless load-mutate-store policy layer gluing the index subsystem to
//! persistent storage. Every call loads the current library, mutates or
//! queries its `index_data`, and — for mutations — persists the result
//! before returning. No in-process cache: correctness relies entirely on
//! the scheduler's per-key mutual exclusion, not on anything held here.

use crate::domain::chunk::Chunk;
use crate::embedder::{Embedder, InputType};
use crate::error::IndexResult;
use crate::index::IndexStats;
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

pub struct IndexService {
    store: Arc<Store>,
    embedder: Arc<dyn Embedder>,
}

impl IndexService {
    pub fn new(store: Arc<Store>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Inserts (or replaces, for an id already present) a vector under `chunk_id`
    /// in `library_id`'s index, then persists the library.
    pub fn add_vector(&self, library_id: Uuid, chunk_id: Uuid, vector: Vec<f32>) -> IndexResult<()> {
        let mut library = self.store.get_library(library_id)?;
        library.index_data.add(chunk_id, vector)?;
        self.store.save_library(library)?;
        Ok(())
    }

    pub fn delete_vector(&self, library_id: Uuid, chunk_id: Uuid) -> IndexResult<()> {
        let mut library = self.store.get_library(library_id)?;
        library.index_data.delete(chunk_id);
        self.store.save_library(library)?;
        Ok(())
    }

    /// Embeds `query_text` as a query vector, searches the library's index,
    /// and resolves the returned ids to their current chunk records.
    pub async fn search(&self, library_id: Uuid, query_text: &str, k: usize) -> IndexResult<Vec<Chunk>> {
        let library = self.store.get_library(library_id)?;
        let embeddings = self.embedder.embed(&[query_text.to_string()], InputType::Query).await?;
        let query_vector = embeddings.into_iter().next().unwrap_or_default();
        let ids = library.index_data.search(&query_vector, k)?;
        Ok(ids.into_iter().filter_map(|id| self.store.get_chunk(id).ok()).collect())
    }

    /// Rebuilds the library's index from scratch under a (possibly new)
    /// index type, re-inserting every surviving chunk's stored embedding.
    pub fn rebuild_index(&self, library_id: Uuid, new_type: &str) -> IndexResult<()> {
        let mut library = self.store.get_library(library_id)?;
        let mut rebuilt = crate::index::IndexBlob::empty(new_type)?;
        for document_id in library.documents.clone() {
            let Ok(document) = self.store.get_document(document_id) else { continue };
            for chunk in self.store.chunks_for_document(&document) {
                rebuilt.add(chunk.id, chunk.embedding.clone())?;
            }
        }
        library.index_data = rebuilt;
        library.index_type = new_type.to_string();
        self.store.save_library(library)?;
        Ok(())
    }

    pub fn stats(&self, library_id: Uuid) -> IndexResult<IndexStats> {
        Ok(self.store.get_library(library_id)?.index_data.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::Library;
    use crate::domain::metadata::ChunkMetadata;

    fn temp_store() -> Arc<Store> {
        let dir = std::env::temp_dir().join(format!("vectorlib-index-service-{}", Uuid::new_v4()));
        Arc::new(Store::new(dir).unwrap())
    }

    #[tokio::test]
    async fn add_search_delete_round_trip() {
        let store = temp_store();
        let embedder: Arc<dyn Embedder> = Arc::new(crate::embedder::FakeEmbedder::new(4));
        let service = IndexService::new(store.clone(), embedder);

        let library = Library::new("t".into(), "d".into(), "flat".into()).unwrap();
        let library_id = library.id;
        store.save_library(library).unwrap();

        let chunk = Chunk::new(Uuid::new_v4(), "hello".into(), vec![1.0, 0.0, 0.0, 0.0], ChunkMetadata::default());
        store.save_chunk(chunk.clone()).unwrap();
        service.add_vector(library_id, chunk.id, chunk.embedding.clone()).unwrap();

        let stats = service.stats(library_id).unwrap();
        assert_eq!(stats.count, 1);

        service.delete_vector(library_id, chunk.id).unwrap();
        let stats = service.stats(library_id).unwrap();
        assert_eq!(stats.count, 0);
    }

    #[tokio::test]
    async fn rebuild_reindexes_every_surviving_chunk() {
        let store = temp_store();
        let embedder: Arc<dyn Embedder> = Arc::new(crate::embedder::FakeEmbedder::new(4));
        let service = IndexService::new(store.clone(), embedder);

        let library = Library::new("t".into(), "d".into(), "flat".into()).unwrap();
        let library_id = library.id;
        let mut library = library;

        let mut document = crate::domain::document::Document::new(library_id, "doc".into());
        let chunk = Chunk::new(document.id, "hello".into(), vec![0.0, 1.0, 0.0, 0.0], ChunkMetadata::default());
        document.add_chunk(chunk.id);
        library.add_document(document.id);

        store.save_chunk(chunk.clone()).unwrap();
        store.save_document(document).unwrap();
        library.index_data.add(chunk.id, chunk.embedding.clone()).unwrap();
        store.save_library(library).unwrap();

        service.rebuild_index(library_id, "ivf").unwrap();
        let reloaded = store.get_library(library_id).unwrap();
        assert_eq!(reloaded.index_type, "ivf");
        assert_eq!(reloaded.index_data.stats().count, 1);
    }
}
