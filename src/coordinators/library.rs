use crate::domain::library::{Library, LibraryCreate, LibraryUpdate};
use crate::error::{IndexError, IndexResult};
use crate::index_service::IndexService;
use crate::scheduler::{Key, OperationScheduler};
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

/// Deletes a document and every one of its chunks, removing each chunk's
/// vector from the library index first, then the chunk record, then the
/// document record itself — cascade first, parent last. Called only from
/// within a closure already running under the owning library's key.
pub(super) fn cascade_delete_document(
    store: &Store,
    index_service: &IndexService,
    document_id: Uuid,
) -> IndexResult<()> {
    let document = store.get_document(document_id)?;
    for chunk_id in document.chunks.clone() {
        index_service.delete_vector(document.library_id, chunk_id)?;
        store.delete_chunk(chunk_id)?;
    }
    store.delete_document(document_id)?;
    Ok(())
}

#[derive(Clone)]
pub struct LibraryCoordinator {
    store: Arc<Store>,
    index_service: Arc<IndexService>,
    scheduler: OperationScheduler,
}

impl LibraryCoordinator {
    pub fn new(store: Arc<Store>, index_service: Arc<IndexService>, scheduler: OperationScheduler) -> Self {
        Self { store, index_service, scheduler }
    }

    pub fn create_library(&self, create: LibraryCreate) -> IndexResult<Library> {
        let library = Library::new(create.title, create.description, create.index_type)?;
        self.store.save_library(library)
    }

    pub fn get_library(&self, id: Uuid) -> IndexResult<Library> {
        self.store.get_library(id)
    }

    pub fn list_libraries(&self) -> Vec<Library> {
        self.store.list_libraries()
    }

    pub async fn update_library(&self, id: Uuid, update: LibraryUpdate) -> IndexResult<Library> {
        let store = self.store.clone();
        let index_service = self.index_service.clone();
        self.scheduler
            .submit(Key::new("library", id), move || async move {
                let mut library = store.get_library(id)?;
                if let Some(title) = update.title {
                    library.title = title;
                }
                if let Some(description) = update.description {
                    library.description = description;
                }
                library.metadata.updated_at = chrono::Utc::now();
                store.save_library(library)?;

                if let Some(index_type) = update.index_type {
                    if index_type != store.get_library(id)?.index_type {
                        index_service.rebuild_index(id, &index_type)?;
                    }
                }
                store.get_library(id)
            })
            .await
    }

    pub async fn delete_library(&self, id: Uuid) -> IndexResult<()> {
        let store = self.store.clone();
        let index_service = self.index_service.clone();
        self.scheduler
            .submit(Key::new("library", id), move || async move {
                let library = store.get_library(id)?;
                for document_id in library.documents.clone() {
                    cascade_delete_document(&store, &index_service, document_id)?;
                }
                store.delete_library(id)?;
                Ok::<(), IndexError>(())
            })
            .await
    }
}
