pub mod chunk;
pub mod document;
pub mod library;
pub mod metadata;

pub use chunk::Chunk;
pub use document::Document;
pub use library::Library;
