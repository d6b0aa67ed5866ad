use super::{IndexStats, VectorIndex};
use crate::error::{IndexError, IndexResult};
use crate::similarity::{cosine_similarity, validate_dimension};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{BinaryHeap, HashMap};
use uuid::Uuid;

/// Exhaustive nearest-neighbor index. Keeps every vector in memory in
/// insertion order and scores all of them on every search — O(N*D) per
/// query, fine for up to a few thousand vectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: Option<usize>,
    /// Insertion order is the tie-break for equal-similarity results, so
    /// this is a `Vec`, not a `HashMap`, with a side index for O(1) lookup.
    order: Vec<Uuid>,
    vectors: HashMap<Uuid, Vec<f32>>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, id: Uuid, v: Vec<f32>) -> IndexResult<()> {
        match self.dimension {
            None => self.dimension = Some(v.len()),
            Some(d) => validate_dimension(&v, d)?,
        }
        if !self.vectors.contains_key(&id) {
            self.order.push(id);
        }
        self.vectors.insert(id, v);
        Ok(())
    }

    fn delete(&mut self, id: Uuid) {
        if self.vectors.remove(&id).is_some() {
            self.order.retain(|x| *x != id);
        }
    }

    fn search(&self, q: &[f32], k: usize) -> IndexResult<Vec<Uuid>> {
        if self.vectors.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(d) = self.dimension {
            validate_dimension(q, d)?;
        }
        // Bounded min-heap of size k keyed by similarity, with insertion
        // order folded into the key so ties break toward earlier inserts.
        let mut heap: BinaryHeap<std::cmp::Reverse<(OrderedFloat<f32>, std::cmp::Reverse<usize>, Uuid)>> =
            BinaryHeap::with_capacity(k + 1);
        for (pos, id) in self.order.iter().enumerate() {
            let vec = &self.vectors[id];
            let sim = cosine_similarity(q, vec);
            let key = (OrderedFloat(sim), std::cmp::Reverse(pos), *id);
            heap.push(std::cmp::Reverse(key));
            if heap.len() > k {
                heap.pop();
            }
        }
        let mut results: Vec<_> = heap.into_iter().map(|std::cmp::Reverse(k)| k).collect();
        results.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1).reverse()));
        Ok(results.into_iter().map(|(_, _, id)| id).collect())
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            variant: "flat",
            count: self.vectors.len(),
            dimension: self.dimension.unwrap_or(0),
            extra: serde_json::json!({}),
        }
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx() -> FlatIndex {
        FlatIndex::new()
    }

    #[test]
    fn empty_search_returns_empty() {
        let i = idx();
        assert_eq!(VectorIndex::search(&i, &[1.0, 0.0], 3).unwrap(), vec![]);
    }

    #[test]
    fn exact_match_recall() {
        let mut i = idx();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        VectorIndex::add(&mut i, a, vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        VectorIndex::add(&mut i, b, vec![0.0, 1.0, 0.0, 0.0]).unwrap();
        VectorIndex::add(&mut i, c, vec![0.0, 0.0, 1.0, 0.0]).unwrap();
        let result = VectorIndex::search(&i, &[1.0, 0.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(result[0], a);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn dimension_mismatch_after_first_insert() {
        let mut i = idx();
        VectorIndex::add(&mut i, Uuid::new_v4(), vec![1.0, 0.0]).unwrap();
        let err = VectorIndex::add(&mut i, Uuid::new_v4(), vec![1.0, 0.0, 0.0]);
        assert!(matches!(err, Err(IndexError::DimensionMismatch { .. })));
        assert_eq!(VectorIndex::stats(&i).count, 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut i = idx();
        let id = Uuid::new_v4();
        VectorIndex::delete(&mut i, id);
        VectorIndex::add(&mut i, id, vec![1.0]).unwrap();
        VectorIndex::delete(&mut i, id);
        VectorIndex::delete(&mut i, id);
        assert_eq!(VectorIndex::stats(&i).count, 0);
    }

    #[test]
    fn add_delete_identity() {
        let mut i = idx();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        VectorIndex::add(&mut i, a, vec![1.0, 0.0]).unwrap();
        let before = VectorIndex::search(&i, &[1.0, 0.0], 5).unwrap();
        VectorIndex::add(&mut i, b, vec![0.0, 1.0]).unwrap();
        VectorIndex::delete(&mut i, b);
        let after = VectorIndex::search(&i, &[1.0, 0.0], 5).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn k_monotonicity() {
        let mut i = idx();
        for _ in 0..5 {
            VectorIndex::add(&mut i, Uuid::new_v4(), vec![1.0, 0.1, 0.0, 0.0]).unwrap();
        }
        let k2 = VectorIndex::search(&i, &[1.0, 0.0, 0.0, 0.0], 2).unwrap();
        let k4 = VectorIndex::search(&i, &[1.0, 0.0, 0.0, 0.0], 4).unwrap();
        assert_eq!(&k4[..2], &k2[..]);
    }

    #[test]
    fn round_trip_json() {
        let mut i = idx();
        let id = Uuid::new_v4();
        VectorIndex::add(&mut i, id, vec![1.0, 2.0, 3.0]).unwrap();
        let json = serde_json::to_string(&i).unwrap();
        let restored: FlatIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(
            VectorIndex::search(&restored, &[1.0, 2.0, 3.0], 1).unwrap(),
            vec![id]
        );
    }
}
