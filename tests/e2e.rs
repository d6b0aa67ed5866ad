//! End-to-end scenario tests exercising the coordinators together against a
//! temp-directory-backed persistence store and a deterministic fake embedder.

use std::sync::Arc;
use uuid::Uuid;
use vectorlib::coordinators::{ChunkCoordinator, DocumentCoordinator, LibraryCoordinator};
use vectorlib::domain::chunk::ChunkCreate;
use vectorlib::domain::document::DocumentCreate;
use vectorlib::domain::library::{LibraryCreate, LibraryUpdate};
use vectorlib::embedder::{Embedder, FakeEmbedder};
use vectorlib::index_service::IndexService;
use vectorlib::scheduler::OperationScheduler;
use vectorlib::store::Store;

struct Harness {
    libraries: LibraryCoordinator,
    documents: DocumentCoordinator,
    chunks: ChunkCoordinator,
}

fn harness() -> Harness {
    let dir = std::env::temp_dir().join(format!("vectorlib-e2e-{}", Uuid::new_v4()));
    let store = Arc::new(Store::new(dir).unwrap());
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::new(4));
    let index_service = Arc::new(IndexService::new(store.clone(), embedder.clone()));
    let scheduler = OperationScheduler::new();

    Harness {
        libraries: LibraryCoordinator::new(store.clone(), index_service.clone(), scheduler.clone()),
        documents: DocumentCoordinator::new(store.clone(), index_service.clone(), scheduler.clone()),
        chunks: ChunkCoordinator::new(store, index_service, embedder, scheduler),
    }
}

#[tokio::test]
async fn deleting_a_document_removes_its_chunks_and_their_vectors() {
    let h = harness();
    let library = h
        .libraries
        .create_library(LibraryCreate { title: "lib".into(), description: "".into(), index_type: "flat".into() })
        .unwrap();
    let document = h
        .documents
        .create_document(DocumentCreate { library_id: library.id, title: "doc".into() })
        .await
        .unwrap();
    let chunk = h
        .chunks
        .create_chunk(ChunkCreate {
            document_id: document.id,
            text: "hello".into(),
            section: None,
            order: None,
        })
        .await
        .unwrap();

    let stats_before = h.libraries.get_library(library.id).unwrap().index_data.stats();
    assert_eq!(stats_before.count, 1);

    h.documents.delete_document(document.id).await.unwrap();

    assert!(h.chunks.get_chunk(chunk.id).is_err());
    assert!(h.documents.get_document(document.id).is_err());
    let stats_after = h.libraries.get_library(library.id).unwrap().index_data.stats();
    assert_eq!(stats_after.count, 0);
}

#[tokio::test]
async fn ten_concurrent_chunk_inserts_all_land() {
    let h = harness();
    let library = h
        .libraries
        .create_library(LibraryCreate { title: "lib".into(), description: "".into(), index_type: "flat".into() })
        .unwrap();
    let document = h
        .documents
        .create_document(DocumentCreate { library_id: library.id, title: "doc".into() })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let chunks = h.chunks.clone();
        let document_id = document.id;
        handles.push(tokio::spawn(async move {
            chunks
                .create_chunk(ChunkCreate {
                    document_id,
                    text: format!("chunk {i}"),
                    section: None,
                    order: None,
                })
                .await
                .unwrap()
        }));
    }
    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().id);
    }
    assert_eq!(ids.len(), 10);

    let stats = h.libraries.get_library(library.id).unwrap().index_data.stats();
    assert_eq!(stats.count, 10);
}

#[tokio::test]
async fn changing_index_type_rebuilds_from_surviving_chunks() {
    let h = harness();
    let library = h
        .libraries
        .create_library(LibraryCreate { title: "lib".into(), description: "".into(), index_type: "flat".into() })
        .unwrap();
    let document = h
        .documents
        .create_document(DocumentCreate { library_id: library.id, title: "doc".into() })
        .await
        .unwrap();
    h.chunks
        .create_chunk(ChunkCreate { document_id: document.id, text: "alpha".into(), section: None, order: None })
        .await
        .unwrap();
    h.chunks
        .create_chunk(ChunkCreate { document_id: document.id, text: "beta".into(), section: None, order: None })
        .await
        .unwrap();

    let updated = h
        .libraries
        .update_library(
            library.id,
            LibraryUpdate { title: None, description: None, index_type: Some("ivf".into()) },
        )
        .await
        .unwrap();

    assert_eq!(updated.index_type, "ivf");
    assert_eq!(updated.index_data.stats().count, 2);
}
