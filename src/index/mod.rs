//! The per-library vector index subsystem: a closed tagged union of three
//! interchangeable nearest-neighbor variants behind one dispatch point.
//!
//! Each variant is a distinct value of `IndexBlob`, not an implementation of
//! an open trait object — the set of variants is fixed and known at compile
//! time, so dispatch is a `match`, not a vtable.

mod flat;
mod hnsw;
mod ivf;

pub use flat::FlatIndex;
pub use hnsw::HnswIndex;
pub use ivf::IvfIndex;

use crate::error::{IndexError, IndexResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Variant-specific counters plus the common fields every `stats()` call returns.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub variant: &'static str,
    pub count: usize,
    pub dimension: usize,
    pub extra: serde_json::Value,
}

/// Capability set every index variant implements. Not used as a trait
/// object — `IndexBlob` dispatches to these inherent-shaped methods via a
/// `match`, so this trait exists mainly to pin the shared method surface
/// and to let generic test helpers iterate over variants.
pub trait VectorIndex {
    fn add(&mut self, id: Uuid, v: Vec<f32>) -> IndexResult<()>;
    fn delete(&mut self, id: Uuid);
    fn search(&self, q: &[f32], k: usize) -> IndexResult<Vec<Uuid>>;
    fn stats(&self) -> IndexStats;
    fn dimension(&self) -> Option<usize>;
}

/// Self-describing serialized index state. This is the `Library.index_data`
/// blob of the data model: round-tripping through `serde_json` must be
/// lossless (the round-trip law, invariant 4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IndexBlob {
    Flat(FlatIndex),
    Ivf(IvfIndex),
    Hnsw(HnswIndex),
}

impl IndexBlob {
    /// Construct an empty index of the named type. `index_type` must be one
    /// of `flat`, `ivf`, `hnsw` — anything else is `UnknownIndexType`.
    pub fn empty(index_type: &str) -> IndexResult<Self> {
        match index_type {
            "flat" => Ok(IndexBlob::Flat(FlatIndex::new())),
            "ivf" => Ok(IndexBlob::Ivf(IvfIndex::new(IvfIndex::DEFAULT_N_CLUSTERS, IvfIndex::DEFAULT_N_PROBE))),
            "hnsw" => Ok(IndexBlob::Hnsw(HnswIndex::new(
                HnswIndex::DEFAULT_M,
                HnswIndex::DEFAULT_EF_CONSTRUCTION,
            ))),
            other => Err(IndexError::UnknownIndexType(other.to_string())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            IndexBlob::Flat(_) => "flat",
            IndexBlob::Ivf(_) => "ivf",
            IndexBlob::Hnsw(_) => "hnsw",
        }
    }

    pub fn add(&mut self, id: Uuid, v: Vec<f32>) -> IndexResult<()> {
        match self {
            IndexBlob::Flat(i) => i.add(id, v),
            IndexBlob::Ivf(i) => i.add(id, v),
            IndexBlob::Hnsw(i) => i.add(id, v),
        }
    }

    pub fn delete(&mut self, id: Uuid) {
        match self {
            IndexBlob::Flat(i) => i.delete(id),
            IndexBlob::Ivf(i) => i.delete(id),
            IndexBlob::Hnsw(i) => i.delete(id),
        }
    }

    pub fn search(&self, q: &[f32], k: usize) -> IndexResult<Vec<Uuid>> {
        match self {
            IndexBlob::Flat(i) => i.search(q, k),
            IndexBlob::Ivf(i) => i.search(q, k),
            IndexBlob::Hnsw(i) => i.search(q, k),
        }
    }

    pub fn stats(&self) -> IndexStats {
        match self {
            IndexBlob::Flat(i) => i.stats(),
            IndexBlob::Ivf(i) => i.stats(),
            IndexBlob::Hnsw(i) => i.stats(),
        }
    }

    pub fn dimension(&self) -> Option<usize> {
        match self {
            IndexBlob::Flat(i) => i.dimension(),
            IndexBlob::Ivf(i) => i.dimension(),
            IndexBlob::Hnsw(i) => i.dimension(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rejects_unknown_type() {
        assert!(matches!(
            IndexBlob::empty("bogus"),
            Err(IndexError::UnknownIndexType(_))
        ));
    }

    #[test]
    fn empty_accepts_known_types() {
        assert!(IndexBlob::empty("flat").is_ok());
        assert!(IndexBlob::empty("ivf").is_ok());
        assert!(IndexBlob::empty("hnsw").is_ok());
    }

    #[test]
    fn round_trip_preserves_type_and_contents() {
        let mut blob = IndexBlob::empty("flat").unwrap();
        let id = Uuid::new_v4();
        blob.add(id, vec![1.0, 0.0, 0.0]).unwrap();
        let json = serde_json::to_string(&blob).unwrap();
        let restored: IndexBlob = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.type_name(), "flat");
        assert_eq!(restored.search(&[1.0, 0.0, 0.0], 1).unwrap(), vec![id]);
    }
}
