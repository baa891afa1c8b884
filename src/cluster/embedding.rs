//! Spectral embedding of an affinity graph.
//!
//! Rows of the embedding come from the eigenvectors of the smallest
//! eigenvalues of the graph Laplacian.

use crate::error::{DivclustError, Result};
use crate::primitives::Matrix;
use nalgebra::SymmetricEigen;
use tracing::{debug, warn};

/// Graph Laplacian of `affinity` with self-loops ignored, plus the vector
/// used to rescale embedding rows (sqrt of degree, or 1 for isolated nodes).
fn laplacian(affinity: &Matrix<f64>, normed: bool) -> (Matrix<f64>, Vec<f64>) {
    let n = affinity.n_rows();
    let degree: Vec<f64> = (0..n)
        .map(|i| (0..n).filter(|&j| j != i).map(|j| affinity.get(i, j)).sum())
        .collect();

    let mut lap = Matrix::zeros(n, n);
    if normed {
        let scale: Vec<f64> = degree
            .iter()
            .map(|&d| if d > 0.0 { d.sqrt() } else { 1.0 })
            .collect();
        for i in 0..n {
            for j in 0..n {
                let v = if i == j {
                    if degree[i] > 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    -affinity.get(i, j) / (scale[i] * scale[j])
                };
                lap.set(i, j, v);
            }
        }
        (lap, scale)
    } else {
        for i in 0..n {
            for j in 0..n {
                let v = if i == j { degree[i] } else { -affinity.get(i, j) };
                lap.set(i, j, v);
            }
        }
        (lap, vec![1.0; n])
    }
}

/// Number of connected components of the graph with edges where `a_ij > 0`.
pub(crate) fn connected_components(affinity: &Matrix<f64>) -> usize {
    let n = affinity.n_rows();
    let mut seen = vec![false; n];
    let mut components = 0;
    let mut stack = Vec::new();

    for start in 0..n {
        if seen[start] {
            continue;
        }
        components += 1;
        seen[start] = true;
        stack.push(start);
        while let Some(i) = stack.pop() {
            for j in 0..n {
                if !seen[j] && (affinity.get(i, j) > 0.0 || affinity.get(j, i) > 0.0) {
                    seen[j] = true;
                    stack.push(j);
                }
            }
        }
    }
    components
}

/// Projects the nodes of a graph onto the first eigenvectors of its Laplacian.
///
/// Returns an n×d matrix (d = `n_components`, clamped to n, minus one when
/// `drop_first`). With `norm_laplacian` the symmetric normalized Laplacian
/// `I − D^{-1/2} A D^{-1/2}` is used and each row is divided by `sqrt(degree)`.
/// Every eigenvector is sign-flipped so its largest-magnitude entry is positive.
///
/// # Errors
///
/// `DimensionMismatch` for a non-square affinity, `InvalidInput` for an
/// empty one or zero components.
///
/// # Examples
///
/// ```
/// use divclust::cluster::spectral_embedding;
/// use divclust::primitives::Matrix;
///
/// let a = Matrix::from_vec(3, 3, vec![
///     1.0, 0.9, 0.1,
///     0.9, 1.0, 0.1,
///     0.1, 0.1, 1.0,
/// ]).expect("valid");
/// let emb = spectral_embedding(&a, 2, true, false).expect("embedding");
/// assert_eq!(emb.shape(), (3, 2));
/// ```
pub fn spectral_embedding(
    affinity: &Matrix<f64>,
    n_components: usize,
    norm_laplacian: bool,
    drop_first: bool,
) -> Result<Matrix<f64>> {
    if !affinity.is_square() {
        return Err(DivclustError::DimensionMismatch {
            expected: format!("square affinity ({0}x{0})", affinity.n_rows()),
            actual: format!("{}x{}", affinity.n_rows(), affinity.n_cols()),
        });
    }
    let n = affinity.n_rows();
    if n == 0 {
        return Err(DivclustError::invalid_input("Cannot embed an empty graph"));
    }
    if n_components == 0 {
        return Err(DivclustError::invalid_hyperparameter(
            "n_components",
            n_components,
            "n_components >= 1",
        ));
    }

    let mut d = n_components;
    if drop_first {
        d += 1;
    }
    if d > n {
        debug!(requested = d, n_samples = n, "clamping embedding dimension");
        d = n;
    }

    if connected_components(affinity) > 1 {
        warn!("graph is not fully connected, spectral embedding may not work as expected");
    }

    let (lap, scale) = laplacian(affinity, norm_laplacian);
    let eigen = SymmetricEigen::new(lap.to_dmatrix());

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]).then(a.cmp(&b)));

    let first = usize::from(drop_first);
    let cols = &order[first..d];
    let mut embedding = Matrix::zeros(n, cols.len());
    for (c, &k) in cols.iter().enumerate() {
        let column = eigen.eigenvectors.column(k);
        let pivot = column
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
        for i in 0..n {
            embedding.set(i, c, sign * column[i] / scale[i]);
        }
    }

    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blocks() -> Matrix<f64> {
        // two tight groups {0,1,2} and {3,4,5} with weak coupling
        let n = 6;
        let mut a = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let same = (i < 3) == (j < 3);
                a.set(i, j, if same { 1.0 } else { 0.01 });
            }
        }
        a
    }

    #[test]
    fn test_shape_and_clamp() {
        let a = two_blocks();
        assert_eq!(spectral_embedding(&a, 2, true, false).expect("ok").shape(), (6, 2));
        assert_eq!(spectral_embedding(&a, 20, true, false).expect("ok").shape(), (6, 6));
        assert_eq!(spectral_embedding(&a, 2, true, true).expect("ok").shape(), (6, 2));
    }

    #[test]
    fn test_second_vector_separates_blocks() {
        let emb = spectral_embedding(&two_blocks(), 2, true, false).expect("ok");
        let col = emb.column(1);
        let left = col[0].signum();
        assert!(col[..3].iter().all(|v| v.signum() == left));
        assert!(col[3..].iter().all(|v| v.signum() == -left));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let emb = spectral_embedding(&two_blocks(), 2, true, false).expect("ok");
        for c in 0..emb.n_cols() {
            let col = emb.column(c);
            let pivot = col
                .iter()
                .copied()
                .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
            assert!(pivot >= 0.0);
        }
    }

    #[test]
    fn test_first_vector_constant_for_regular_graph() {
        // first eigenvector of the normalized Laplacian is D^{1/2}·1, so rows
        // divided by sqrt(degree) are constant
        let emb = spectral_embedding(&two_blocks(), 1, true, false).expect("ok");
        let col = emb.column(0);
        assert!(col.iter().all(|v| (v - col[0]).abs() < 1e-8));
    }

    #[test]
    fn test_unnormalized_laplacian() {
        let emb = spectral_embedding(&two_blocks(), 2, false, false).expect("ok");
        assert_eq!(emb.shape(), (6, 2));
    }

    #[test]
    fn test_disconnected_graph_still_embeds() {
        let a = Matrix::from_vec(3, 3, vec![1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0]).expect("valid");
        assert_eq!(connected_components(&a), 2);
        let emb = spectral_embedding(&a, 2, true, false).expect("ok");
        assert!(emb.is_finite());
    }

    #[test]
    fn test_non_square_rejected() {
        let a = Matrix::zeros(2, 3);
        assert!(matches!(
            spectral_embedding(&a, 1, true, false),
            Err(DivclustError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_components_rejected() {
        assert!(spectral_embedding(&two_blocks(), 0, true, false).is_err());
    }
}
