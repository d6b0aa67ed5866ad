use super::{IndexStats, VectorIndex};
use crate::error::IndexResult;
use crate::similarity::{cosine_similarity, normalize, validate_dimension};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const NUM_LAYERS: usize = 10;

/// Hierarchical navigable small world: a layered proximity graph. Vectors
/// are normalized on insert so cosine similarity reduces to dot product,
/// though we keep calling the shared `cosine_similarity` helper since the
/// stored vectors are already unit length and the cost is identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HnswIndex {
    dimension: Option<usize>,
    m: usize,
    ef_construction: usize,
    vectors: HashMap<Uuid, Vec<f32>>,
    layers: Vec<HashMap<Uuid, HashSet<Uuid>>>,
    entry_points: Vec<Option<Uuid>>,
    /// Seed for the layer-assignment RNG, carried through serialization so
    /// round-tripping an index and continuing to insert stays deterministic
    /// in tests. `None` means "seed from entropy" (production default).
    seed: Option<u64>,
    #[serde(skip)]
    rng: RefCell<Option<StdRng>>,
}

impl HnswIndex {
    pub const DEFAULT_M: usize = 16;
    pub const DEFAULT_EF_CONSTRUCTION: usize = 5;

    pub fn new(m: usize, ef_construction: usize) -> Self {
        Self {
            dimension: None,
            m,
            ef_construction,
            vectors: HashMap::new(),
            layers: vec![HashMap::new(); NUM_LAYERS],
            entry_points: vec![None; NUM_LAYERS],
            seed: None,
            rng: RefCell::new(None),
        }
    }

    /// Construct with a fixed RNG seed, for reproducible end-to-end tests
    /// (the `ef_search >= 2k` probabilistic recall scenario).
    pub fn with_seed(m: usize, ef_construction: usize, seed: u64) -> Self {
        let mut idx = Self::new(m, ef_construction);
        idx.seed = Some(seed);
        idx
    }

    fn rng_draw(&self) -> f64 {
        let mut guard = self.rng.borrow_mut();
        if guard.is_none() {
            *guard = Some(match self.seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            });
        }
        guard.as_mut().unwrap().gen::<f64>()
    }

    /// `L = min(floor(-ln(U(0,1)) * M/4), num_layers - 1)`.
    fn random_layer(&self) -> usize {
        let scale = self.m as f64 / 4.0;
        let u: f64 = self.rng_draw().max(f64::MIN_POSITIVE);
        let l = (-u.ln() * scale).floor() as i64;
        l.clamp(0, (NUM_LAYERS - 1) as i64) as usize
    }

    /// Greedy beam search within a single layer, starting from `start_id`
    /// (or the layer's entry point). Expands neighbor sets, tracks a
    /// visited set, and keeps a descending-similarity-ordered frontier
    /// truncated to `width`.
    fn search_layer(
        &self,
        query: &[f32],
        layer: usize,
        width: usize,
        start_id: Option<Uuid>,
    ) -> Vec<(Uuid, f32)> {
        let entry = start_id.or(self.entry_points[layer]);
        let Some(start) = entry else {
            return Vec::new();
        };
        if !self.vectors.contains_key(&start) {
            return Vec::new();
        }

        let mut visited: HashSet<Uuid> = HashSet::new();
        visited.insert(start);
        let mut queue: std::collections::VecDeque<Uuid> = std::collections::VecDeque::new();
        queue.push_back(start);
        let mut result: Vec<(Uuid, f32)> = Vec::new();

        while let Some(current) = queue.pop_front() {
            let sim = cosine_similarity(query, &self.vectors[&current]);
            result.push((current, sim));
            if let Some(neighbors) = self.layers[layer].get(&current) {
                for &n in neighbors {
                    if visited.insert(n) {
                        queue.push_back(n);
                    }
                }
            }
        }

        result.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        result.truncate(width);
        result
    }
}

impl VectorIndex for HnswIndex {
    fn add(&mut self, id: Uuid, mut v: Vec<f32>) -> IndexResult<()> {
        if let Some(d) = self.dimension {
            validate_dimension(&v, d)?;
        }
        normalize(&mut v)?;
        if self.dimension.is_none() {
            self.dimension = Some(v.len());
        }
        // Insert-or-replace: drop any prior layer memberships/edges for
        // this id before reinserting, so a repeat `add` never leaves stale
        // graph structure from the old vector behind.
        self.delete(id);
        self.vectors.insert(id, v.clone());

        let top_layer = self.random_layer();
        for l in 0..=top_layer {
            self.layers[l].entry(id).or_insert_with(HashSet::new);
            let candidates = self.search_layer(&v, l, self.ef_construction, None);
            let neighbor_ids: Vec<Uuid> = candidates
                .into_iter()
                .map(|(nid, _)| nid)
                .filter(|nid| *nid != id)
                .collect();
            for neighbor in neighbor_ids {
                self.layers[l].entry(id).or_insert_with(HashSet::new).insert(neighbor);
                self.layers[l].entry(neighbor).or_insert_with(HashSet::new).insert(id);
            }
            if self.entry_points[l].is_none() {
                self.entry_points[l] = Some(id);
            }
        }
        Ok(())
    }

    fn delete(&mut self, id: Uuid) {
        if !self.vectors.contains_key(&id) {
            return;
        }
        for layer in self.layers.iter_mut() {
            if let Some(neighbors) = layer.remove(&id) {
                for neighbor in neighbors {
                    if let Some(n_neighbors) = layer.get_mut(&neighbor) {
                        n_neighbors.remove(&id);
                    }
                }
            }
        }
        self.vectors.remove(&id);
        for (i, ep) in self.entry_points.iter_mut().enumerate() {
            if *ep == Some(id) {
                *ep = self.layers[i].keys().next().copied();
            }
        }
    }

    fn search(&self, q: &[f32], k: usize) -> IndexResult<Vec<Uuid>> {
        if self.vectors.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(d) = self.dimension {
            validate_dimension(q, d)?;
        }
        let mut q = q.to_vec();
        normalize(&mut q)?;

        let mut current_id = self.entry_points[NUM_LAYERS - 1];
        for layer in (1..NUM_LAYERS).rev() {
            let candidates = self.search_layer(&q, layer, self.ef_construction, current_id);
            if let Some((best, _)) = candidates.first() {
                current_id = Some(*best);
            }
        }
        let ef_search = (2 * k).max(10);
        let bottom = self.search_layer(&q, 0, ef_search, current_id);
        let mut ranked = bottom;
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        ranked.truncate(k);
        Ok(ranked.into_iter().map(|(id, _)| id).collect())
    }

    fn stats(&self) -> IndexStats {
        let layer_degrees: Vec<HashMap<String, usize>> = self
            .layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|(id, neighbors)| (id.to_string(), neighbors.len()))
                    .collect()
            })
            .collect();
        IndexStats {
            variant: "hnsw",
            count: self.vectors.len(),
            dimension: self.dimension.unwrap_or(0),
            extra: serde_json::json!({
                "m": self.m,
                "ef_construction": self.ef_construction,
                "layers": layer_degrees,
            }),
        }
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_search_is_empty() {
        let i = HnswIndex::with_seed(4, 10, 42);
        assert_eq!(VectorIndex::search(&i, &[1.0, 0.0], 1).unwrap(), vec![]);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut i = HnswIndex::with_seed(4, 10, 1);
        let id = Uuid::new_v4();
        VectorIndex::add(&mut i, id, vec![1.0, 0.0]).unwrap();
        VectorIndex::delete(&mut i, id);
        VectorIndex::delete(&mut i, id);
        assert_eq!(VectorIndex::stats(&i).count, 0);
    }

    #[test]
    fn recall_with_small_seeded_population() {
        let mut i = HnswIndex::with_seed(4, 10, 7);
        let mut ids = Vec::new();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            let v: Vec<f32> = (0..8).map(|_| rng.gen::<f32>() - 0.5).collect();
            let id = Uuid::new_v4();
            VectorIndex::add(&mut i, id, v.clone()).unwrap();
            ids.push((id, v));
        }
        let mut hits = 0;
        for (id, v) in &ids {
            let result = VectorIndex::search(&i, v, 1).unwrap();
            if result.first() == Some(id) {
                hits += 1;
            }
        }
        assert!(hits as f64 / ids.len() as f64 > 0.5);
    }

    #[test]
    fn round_trip_preserves_graph() {
        let mut i = HnswIndex::with_seed(4, 10, 3);
        let id = Uuid::new_v4();
        VectorIndex::add(&mut i, id, vec![1.0, 0.0, 0.0]).unwrap();
        let json = serde_json::to_string(&i).unwrap();
        let restored: HnswIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(
            VectorIndex::search(&restored, &[1.0, 0.0, 0.0], 1).unwrap(),
            vec![id]
        );
    }

    #[test]
    fn dimension_pinning() {
        let mut i = HnswIndex::with_seed(4, 10, 3);
        VectorIndex::add(&mut i, Uuid::new_v4(), vec![1.0, 0.0]).unwrap();
        let err = VectorIndex::add(&mut i, Uuid::new_v4(), vec![1.0, 0.0, 0.0]);
        assert!(err.is_err());
    }
}
