//! Embedded JSON-file persistence adapter: one file per entity collection,
//! a `DashMap` in-memory cache, atomic tmp-then-rename writes on every
//! mutation. Stands in for the distilled system's MongoDB-backed
//! repositories, generalized from the reference backend's single-entity
//! workspace registry to three collections.

use crate::domain::{chunk::Chunk, document::Document, library::Library};
use crate::error::{IndexError, IndexResult};
use dashmap::DashMap;
use std::path::PathBuf;
use uuid::Uuid;

pub struct Store {
    data_dir: PathBuf,
    libraries: DashMap<Uuid, Library>,
    documents: DashMap<Uuid, Document>,
    chunks: DashMap<Uuid, Chunk>,
}

impl Store {
    pub fn new(data_dir: PathBuf) -> IndexResult<Self> {
        std::fs::create_dir_all(&data_dir)?;
        let libraries = load_collection(&data_dir.join("libraries.json"))?;
        let documents = load_collection(&data_dir.join("documents.json"))?;
        let chunks = load_collection(&data_dir.join("chunks.json"))?;
        Ok(Self { data_dir, libraries, documents, chunks })
    }

    fn persist_libraries(&self) -> IndexResult<()> {
        persist_collection(&self.data_dir.join("libraries.json"), &self.libraries)
    }

    fn persist_documents(&self) -> IndexResult<()> {
        persist_collection(&self.data_dir.join("documents.json"), &self.documents)
    }

    fn persist_chunks(&self) -> IndexResult<()> {
        persist_collection(&self.data_dir.join("chunks.json"), &self.chunks)
    }

    // --- libraries ---

    pub fn get_library(&self, id: Uuid) -> IndexResult<Library> {
        self.libraries
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or_else(|| IndexError::NotFound(format!("library {id}")))
    }

    pub fn list_libraries(&self) -> Vec<Library> {
        self.libraries.iter().map(|e| e.value().clone()).collect()
    }

    pub fn save_library(&self, library: Library) -> IndexResult<Library> {
        self.libraries.insert(library.id, library.clone());
        self.persist_libraries()?;
        Ok(library)
    }

    pub fn delete_library(&self, id: Uuid) -> IndexResult<()> {
        self.libraries.remove(&id);
        self.persist_libraries()
    }

    // --- documents ---

    pub fn get_document(&self, id: Uuid) -> IndexResult<Document> {
        self.documents
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or_else(|| IndexError::NotFound(format!("document {id}")))
    }

    pub fn list_documents(&self) -> Vec<Document> {
        self.documents.iter().map(|e| e.value().clone()).collect()
    }

    pub fn save_document(&self, document: Document) -> IndexResult<Document> {
        self.documents.insert(document.id, document.clone());
        self.persist_documents()?;
        Ok(document)
    }

    pub fn delete_document(&self, id: Uuid) -> IndexResult<()> {
        self.documents.remove(&id);
        self.persist_documents()
    }

    // --- chunks ---

    pub fn get_chunk(&self, id: Uuid) -> IndexResult<Chunk> {
        self.chunks
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or_else(|| IndexError::NotFound(format!("chunk {id}")))
    }

    pub fn list_chunks(&self) -> Vec<Chunk> {
        self.chunks.iter().map(|e| e.value().clone()).collect()
    }

    /// Chunks belonging to a given document, in the document's declared order.
    pub fn chunks_for_document(&self, document: &Document) -> Vec<Chunk> {
        document.chunks.iter().filter_map(|id| self.chunks.get(id).map(|e| e.value().clone())).collect()
    }

    pub fn save_chunk(&self, chunk: Chunk) -> IndexResult<Chunk> {
        self.chunks.insert(chunk.id, chunk.clone());
        self.persist_chunks()?;
        Ok(chunk)
    }

    pub fn delete_chunk(&self, id: Uuid) -> IndexResult<()> {
        self.chunks.remove(&id);
        self.persist_chunks()
    }
}

fn load_collection<T>(path: &PathBuf) -> IndexResult<DashMap<Uuid, T>>
where
    T: serde::de::DeserializeOwned,
{
    let map = DashMap::new();
    if let Ok(content) = std::fs::read_to_string(path) {
        let entries: std::collections::HashMap<Uuid, T> = serde_json::from_str(&content)?;
        for (id, value) in entries {
            map.insert(id, value);
        }
    }
    Ok(map)
}

fn persist_collection<T>(path: &PathBuf, map: &DashMap<Uuid, T>) -> IndexResult<()>
where
    T: serde::Serialize + Clone,
{
    let entries: std::collections::HashMap<String, T> =
        map.iter().map(|e| (e.key().to_string(), e.value().clone())).collect();
    let json = serde_json::to_string_pretty(&entries)?;
    // Atomic write: write to temp file then rename, so a crash mid-write
    // never leaves the collection file truncated or corrupt.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::Library;

    #[test]
    fn save_and_reload_round_trips() {
        let dir = std::env::temp_dir().join(format!("vectorlib-test-{}", Uuid::new_v4()));
        let store = Store::new(dir.clone()).unwrap();
        let lib = Library::new("t".into(), "d".into(), "flat".into()).unwrap();
        let id = lib.id;
        store.save_library(lib).unwrap();

        let reloaded = Store::new(dir.clone()).unwrap();
        assert_eq!(reloaded.get_library(id).unwrap().id, id);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn get_missing_library_is_not_found() {
        let dir = std::env::temp_dir().join(format!("vectorlib-test-{}", Uuid::new_v4()));
        let store = Store::new(dir.clone()).unwrap();
        assert!(matches!(store.get_library(Uuid::new_v4()), Err(IndexError::NotFound(_))));
        std::fs::remove_dir_all(&dir).ok();
    }
}
