//! Affinity (similarity graph) construction for spectral clustering.

use crate::error::{DivclustError, Result};
use crate::primitives::{squared_euclidean, Matrix};
use serde::{Deserialize, Serialize};

/// How the affinity matrix is derived from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Affinity {
    /// Input is already an n×n affinity matrix.
    Precomputed,
    /// Symmetrized k-nearest-neighbour connectivity graph of the rows.
    NearestNeighbors,
    /// Input is an n×n distance matrix; build the k-NN graph from it.
    PrecomputedNearestNeighbors,
    /// exp(-γ‖x−y‖²)
    #[default]
    Rbf,
    /// exp(-γ‖x−y‖₁)
    Laplacian,
    /// (γ⟨x,y⟩ + coef0)^degree
    Polynomial,
}

/// Kernel and graph parameters for [`affinity_matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffinityParams {
    /// Neighbours per row for the k-NN graphs (clamped to n).
    pub n_neighbors: usize,
    /// Kernel coefficient.
    pub gamma: f64,
    /// Polynomial degree.
    pub degree: f64,
    /// Polynomial offset.
    pub coef0: f64,
}

impl Default for AffinityParams {
    fn default() -> Self {
        Self {
            n_neighbors: 10,
            gamma: 1.0,
            degree: 3.0,
            coef0: 1.0,
        }
    }
}

fn require_square(x: &Matrix<f64>) -> Result<()> {
    if x.is_square() {
        Ok(())
    } else {
        Err(DivclustError::DimensionMismatch {
            expected: format!("square matrix ({0}x{0})", x.n_rows()),
            actual: format!("{}x{}", x.n_rows(), x.n_cols()),
        })
    }
}

fn require_non_negative(x: &Matrix<f64>, what: &str) -> Result<()> {
    if x.as_slice().iter().all(|v| v.is_finite() && *v >= 0.0) {
        Ok(())
    } else {
        Err(DivclustError::invalid_input(format!(
            "{what} must contain finite, non-negative values"
        )))
    }
}

/// Symmetrized binary k-NN graph: `0.5 · (C + Cᵀ)` where row i of C marks the
/// `n_neighbors` closest rows (itself included) under `dist(i, j)`.
fn knn_graph(n: usize, n_neighbors: usize, dist: impl Fn(usize, usize) -> f64) -> Matrix<f64> {
    let k = n_neighbors.clamp(1, n.max(1));
    let mut connectivity = Matrix::zeros(n, n);
    let mut order: Vec<usize> = Vec::with_capacity(n);

    for i in 0..n {
        order.clear();
        order.extend(0..n);
        // self first, then ascending distance, index breaks ties
        order.sort_by(|&a, &b| {
            let da = if a == i { f64::NEG_INFINITY } else { dist(i, a) };
            let db = if b == i { f64::NEG_INFINITY } else { dist(i, b) };
            da.total_cmp(&db).then(a.cmp(&b))
        });
        for &j in order.iter().take(k) {
            connectivity.set(i, j, 1.0);
        }
    }

    let mut sym = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            sym.set(i, j, 0.5 * (connectivity.get(i, j) + connectivity.get(j, i)));
        }
    }
    sym
}

fn kernel_matrix(x: &Matrix<f64>, kernel: impl Fn(&[f64], &[f64]) -> f64) -> Matrix<f64> {
    let n = x.n_rows();
    let mut a = Matrix::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let v = kernel(x.row(i), x.row(j));
            a.set(i, j, v);
            a.set(j, i, v);
        }
    }
    a
}

/// Builds the n×n affinity matrix for `x` under `mode`.
///
/// # Errors
///
/// `DimensionMismatch` if a precomputed mode receives a non-square matrix;
/// `InvalidInput` if a precomputed matrix has negative or non-finite entries
/// or `x` is empty.
pub fn affinity_matrix(x: &Matrix<f64>, mode: Affinity, params: &AffinityParams) -> Result<Matrix<f64>> {
    if x.n_rows() == 0 {
        return Err(DivclustError::invalid_input("Cannot build an affinity for zero samples"));
    }
    let n = x.n_rows();

    let a = match mode {
        Affinity::Precomputed => {
            require_square(x)?;
            require_non_negative(x, "precomputed affinity")?;
            x.clone()
        }
        Affinity::PrecomputedNearestNeighbors => {
            require_square(x)?;
            require_non_negative(x, "precomputed distance matrix")?;
            knn_graph(n, params.n_neighbors, |i, j| x.get(i, j))
        }
        Affinity::NearestNeighbors => {
            knn_graph(n, params.n_neighbors, |i, j| squared_euclidean(x.row(i), x.row(j)))
        }
        Affinity::Rbf => {
            let gamma = params.gamma;
            kernel_matrix(x, |a, b| (-gamma * squared_euclidean(a, b)).exp())
        }
        Affinity::Laplacian => {
            let gamma = params.gamma;
            kernel_matrix(x, |a, b| {
                let l1: f64 = a.iter().zip(b).map(|(p, q)| (p - q).abs()).sum();
                (-gamma * l1).exp()
            })
        }
        Affinity::Polynomial => {
            let AffinityParams {
                gamma, degree, coef0, ..
            } = *params;
            kernel_matrix(x, |a, b| {
                let dot: f64 = a.iter().zip(b).map(|(p, q)| p * q).sum();
                (gamma * dot + coef0).powf(degree)
            })
        }
    };

    if !a.is_finite() {
        return Err(DivclustError::invalid_input("affinity matrix has non-finite entries"));
    }
    Ok(a)
}
