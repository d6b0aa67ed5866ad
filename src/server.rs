use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes;
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/shutdown", post(routes::health::shutdown_handler))
        .route("/library", post(routes::library::create_library).get(routes::library::list_libraries))
        .route(
            "/library/{id}",
            get(routes::library::get_library)
                .put(routes::library::update_library)
                .delete(routes::library::delete_library),
        )
        .route("/document", post(routes::document::create_document).get(routes::document::list_documents))
        .route(
            "/document/{id}",
            get(routes::document::get_document)
                .put(routes::document::update_document)
                .delete(routes::document::delete_document),
        )
        .route("/chunks", post(routes::chunk::create_chunk).get(routes::chunk::list_chunks))
        .route(
            "/chunks/{id}",
            get(routes::chunk::get_chunk).put(routes::chunk::update_chunk).delete(routes::chunk::delete_chunk),
        )
        .route("/search", post(routes::search::search))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
