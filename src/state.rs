use crate::config::AppConfig;
use crate::coordinators::{ChunkCoordinator, DocumentCoordinator, LibraryCoordinator};
use crate::embedder::{Embedder, HttpEmbedder};
use crate::index_service::IndexService;
use crate::scheduler::OperationScheduler;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<Store>,
    pub index_service: Arc<IndexService>,
    pub scheduler: OperationScheduler,
    pub libraries: LibraryCoordinator,
    pub documents: DocumentCoordinator,
    pub chunks: ChunkCoordinator,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let data_dir = std::path::PathBuf::from(&config.data_dir);
        let store = Arc::new(Store::new(data_dir)?);

        let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(
            config.embedder_base_url.clone(),
            config.embedder_api_key.clone(),
            config.embedder_model.clone(),
        ));

        let index_service = Arc::new(IndexService::new(store.clone(), embedder.clone()));
        let scheduler = OperationScheduler::new();

        let libraries = LibraryCoordinator::new(store.clone(), index_service.clone(), scheduler.clone());
        let documents = DocumentCoordinator::new(store.clone(), index_service.clone(), scheduler.clone());
        let chunks =
            ChunkCoordinator::new(store.clone(), index_service.clone(), embedder.clone(), scheduler.clone());

        Ok(Self { config, store, index_service, scheduler, libraries, documents, chunks })
    }
}
