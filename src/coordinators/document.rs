use super::library::cascade_delete_document;
use crate::domain::document::{Document, DocumentCreate, DocumentUpdate};
use crate::error::{IndexError, IndexResult};
use crate::index_service::IndexService;
use crate::scheduler::{Key, OperationScheduler};
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct DocumentCoordinator {
    store: Arc<Store>,
    index_service: Arc<IndexService>,
    scheduler: OperationScheduler,
}

impl DocumentCoordinator {
    pub fn new(store: Arc<Store>, index_service: Arc<IndexService>, scheduler: OperationScheduler) -> Self {
        Self { store, index_service, scheduler }
    }

    pub fn get_document(&self, id: Uuid) -> IndexResult<Document> {
        self.store.get_document(id)
    }

    pub fn list_documents(&self) -> Vec<Document> {
        self.store.list_documents()
    }

    pub async fn create_document(&self, create: DocumentCreate) -> IndexResult<Document> {
        let library_id = create.library_id;
        let store = self.store.clone();
        self.scheduler
            .submit(Key::new("library", library_id), move || async move {
                let mut library = store
                    .get_library(library_id)
                    .map_err(|_| IndexError::ParentNotFound(format!("library {library_id}")))?;
                let document = Document::new(library_id, create.title);
                store.save_document(document.clone())?;
                library.add_document(document.id);
                store.save_library(library)?;
                Ok::<Document, IndexError>(document)
            })
            .await
    }

    pub async fn update_document(&self, id: Uuid, update: DocumentUpdate) -> IndexResult<Document> {
        let document = self.store.get_document(id)?;
        let store = self.store.clone();
        self.scheduler
            .submit(Key::new("library", document.library_id), move || async move {
                let mut document = store.get_document(id)?;
                if let Some(title) = update.title {
                    document.title = title;
                }
                document.metadata.updated_at = chrono::Utc::now();
                store.save_document(document.clone())?;
                Ok::<Document, IndexError>(document)
            })
            .await
    }

    pub async fn delete_document(&self, id: Uuid) -> IndexResult<()> {
        let document = self.store.get_document(id)?;
        let library_id = document.library_id;
        let store = self.store.clone();
        let index_service = self.index_service.clone();
        self.scheduler
            .submit(Key::new("library", library_id), move || async move {
                cascade_delete_document(&store, &index_service, id)?;
                let mut library = store.get_library(library_id)?;
                library.remove_document(id);
                store.save_library(library)?;
                Ok::<(), IndexError>(())
            })
            .await
    }
}
