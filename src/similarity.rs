//! Pure numeric primitives shared by every index variant: normalization,
//! cosine similarity, and dimension/zero-vector validation.

use crate::error::{IndexError, IndexResult};

/// L2 norm of a vector.
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Normalize `v` to unit length in place. Fails if `v` is the zero vector.
pub fn normalize(v: &mut [f32]) -> IndexResult<()> {
    let n = norm(v);
    if n == 0.0 {
        return Err(IndexError::ZeroVector);
    }
    for x in v.iter_mut() {
        *x /= n;
    }
    Ok(())
}

/// Cosine similarity between two vectors of equal length. Callers are
/// responsible for dimension validation; this does not check lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let na = norm(a);
    let nb = norm(b);
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

/// Dot product — equivalent to cosine similarity when both operands are
/// already unit-normalized (the IVF/HNSW case).
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Validate that `v` has exactly `dimension` components.
pub fn validate_dimension(v: &[f32], dimension: usize) -> IndexResult<()> {
    if v.len() != dimension {
        return Err(IndexError::DimensionMismatch {
            expected: dimension,
            actual: v.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_unit_vector_is_noop() {
        let mut v = vec![1.0, 0.0, 0.0];
        normalize(&mut v).unwrap();
        assert!((norm(&v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_zero_vector_errors() {
        let mut v = vec![0.0, 0.0];
        assert!(matches!(normalize(&mut v), Err(IndexError::ZeroVector)));
    }

    #[test]
    fn cosine_similarity_orthogonal_is_zero() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_identical_is_one() {
        let a = [1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn dimension_mismatch_detected() {
        let v = [1.0, 0.0];
        assert!(matches!(
            validate_dimension(&v, 3),
            Err(IndexError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }
}
