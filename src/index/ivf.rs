use super::{IndexStats, VectorIndex};
use crate::error::IndexResult;
use crate::similarity::{dot, normalize, validate_dimension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Inverted-file index: vectors are normalized on insert and partitioned
/// into coarse cells; queries only scan the top `n_probe` cells.
///
/// Cluster construction is deterministic (seed-by-insertion-order), not
/// k-means, so the same insertion sequence always produces the same
/// clustering — useful for tests and for avoiding an external ML
/// dependency. See `rebuild_clusters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IvfIndex {
    dimension: Option<usize>,
    n_clusters: usize,
    n_probe: usize,
    /// Ledger of insertion order — a `HashMap`'s iteration order is not
    /// insertion order, so seed-center selection reads this, not `vectors`.
    insertion_order: Vec<Uuid>,
    vectors: HashMap<Uuid, Vec<f32>>,
    cluster_centers: Vec<Vec<f32>>,
    cluster_assignments: Vec<Vec<Uuid>>,
}

impl IvfIndex {
    pub const DEFAULT_N_CLUSTERS: usize = 100;
    pub const DEFAULT_N_PROBE: usize = 10;

    pub fn new(n_clusters: usize, n_probe: usize) -> Self {
        Self {
            dimension: None,
            n_clusters,
            n_probe,
            insertion_order: Vec::new(),
            vectors: HashMap::new(),
            cluster_centers: Vec::new(),
            cluster_assignments: Vec::new(),
        }
    }

    /// Seed-by-insertion-order clustering: the first `min(N, n_clusters)`
    /// vectors by insertion order become cluster centers; every vector is
    /// then assigned to the center with highest cosine similarity, ties
    /// broken toward the lower cluster index. Rebuilt from scratch on
    /// every structural mutation (add/delete) per the spec's cluster
    /// construction policy.
    fn rebuild_clusters(&mut self) {
        self.cluster_assignments = vec![Vec::new(); self.n_clusters];
        self.cluster_centers.clear();
        if self.vectors.is_empty() {
            return;
        }
        let n_seed = self.n_clusters.min(self.insertion_order.len());
        for id in self.insertion_order.iter().take(n_seed) {
            self.cluster_centers.push(self.vectors[id].clone());
        }
        for id in &self.insertion_order {
            let vec = &self.vectors[id];
            let cluster = self.closest_cluster(vec);
            self.cluster_assignments[cluster].push(*id);
        }
    }

    /// Index of the cluster center with highest cosine similarity to
    /// `vec`, ties broken by lowest index. Vectors are already
    /// unit-normalized, so plain dot product is cosine similarity.
    fn closest_cluster(&self, vec: &[f32]) -> usize {
        let mut best = 0usize;
        let mut best_sim = f32::NEG_INFINITY;
        for (i, center) in self.cluster_centers.iter().enumerate() {
            let sim = dot(vec, center);
            if sim > best_sim {
                best_sim = sim;
                best = i;
            }
        }
        best
    }

    /// Indices of the `n_probe` cluster centers closest to `q`, ordered
    /// descending by similarity.
    fn probe_clusters(&self, q: &[f32]) -> Vec<usize> {
        if self.cluster_centers.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(usize, f32)> = self
            .cluster_centers
            .iter()
            .enumerate()
            .map(|(i, c)| (i, dot(q, c)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        scored
            .into_iter()
            .take(self.n_probe)
            .map(|(i, _)| i)
            .collect()
    }
}

impl VectorIndex for IvfIndex {
    fn add(&mut self, id: Uuid, mut v: Vec<f32>) -> IndexResult<()> {
        if let Some(d) = self.dimension {
            validate_dimension(&v, d)?;
        }
        normalize(&mut v)?;
        if self.dimension.is_none() {
            self.dimension = Some(v.len());
        }
        if !self.vectors.contains_key(&id) {
            self.insertion_order.push(id);
        }
        self.vectors.insert(id, v);
        self.rebuild_clusters();
        Ok(())
    }

    fn delete(&mut self, id: Uuid) {
        if self.vectors.remove(&id).is_some() {
            self.insertion_order.retain(|x| *x != id);
            self.rebuild_clusters();
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

        let probed = self.probe_clusters(&q);
        // Maintain a descending-similarity-ordered top-k list, mirroring
        // the binary-insertion-with-truncation approach directly rather
        // than a heap abstraction.
        let mut top_k: Vec<(Uuid, f32)> = Vec::with_capacity(k + 1);
        for cluster in probed {
            for id in &self.cluster_assignments[cluster] {
                let sim = dot(&q, &self.vectors[id]);
                let pos = top_k.partition_point(|(_, s)| *s >= sim);
                top_k.insert(pos, (*id, sim));
                if top_k.len() > k {
                    top_k.pop();
                }
            }
        }
        Ok(top_k.into_iter().map(|(id, _)| id).collect())
    }

    fn stats(&self) -> IndexStats {
        let cluster_sizes: HashMap<usize, usize> = self
            .cluster_assignments
            .iter()
            .enumerate()
            .map(|(i, v)| (i, v.len()))
            .collect();
        IndexStats {
            variant: "ivf",
            count: self.vectors.len(),
            dimension: self.dimension.unwrap_or(0),
            extra: serde_json::json!({
                "n_clusters": self.n_clusters,
                "n_probe": self.n_probe,
                "cluster_sizes": cluster_sizes,
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
        let i = IvfIndex::new(2, 2);
        assert_eq!(VectorIndex::search(&i, &[1.0, 0.0], 1).unwrap(), vec![]);
    }

    #[test]
    fn exact_match_recall_with_full_probe() {
        let mut i = IvfIndex::new(2, 2);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        VectorIndex::add(&mut i, a, vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        VectorIndex::add(&mut i, b, vec![0.0, 1.0, 0.0, 0.0]).unwrap();
        VectorIndex::add(&mut i, c, vec![0.0, 0.0, 1.0, 0.0]).unwrap();
        let result = VectorIndex::search(&i, &[1.0, 0.0, 0.0, 0.0], 1).unwrap();
        assert_eq!(result, vec![a]);
    }

    #[test]
    fn fewer_vectors_than_clusters_behaves_like_flat() {
        let mut i = IvfIndex::new(100, 10);
        let a = Uuid::new_v4();
        VectorIndex::add(&mut i, a, vec![1.0, 0.0]).unwrap();
        assert_eq!(VectorIndex::search(&i, &[1.0, 0.0], 1).unwrap(), vec![a]);
    }

    #[test]
    fn delete_is_idempotent_and_rebuilds() {
        let mut i = IvfIndex::new(2, 2);
        let id = Uuid::new_v4();
        VectorIndex::add(&mut i, id, vec![1.0, 0.0]).unwrap();
        VectorIndex::delete(&mut i, id);
        VectorIndex::delete(&mut i, id);
        assert_eq!(VectorIndex::stats(&i).count, 0);
    }

    #[test]
    fn round_trip_preserves_search_order() {
        let mut i = IvfIndex::new(2, 2);
        for n in 0..5 {
            let v = vec![1.0, n as f32 * 0.01, 0.0, 0.0];
            VectorIndex::add(&mut i, Uuid::new_v4(), v).unwrap();
        }
        let before = VectorIndex::search(&i, &[1.0, 0.0, 0.0, 0.0], 5).unwrap();
        let json = serde_json::to_string(&i).unwrap();
        let restored: IvfIndex = serde_json::from_str(&json).unwrap();
        let after = VectorIndex::search(&restored, &[1.0, 0.0, 0.0, 0.0], 5).unwrap();
        assert_eq!(before, after);
    }
}
