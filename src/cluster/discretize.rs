//! Discretization of a spectral embedding into hard labels.
//!
//! Searches for the rotation of the (row-normalized) embedding closest to a
//! discrete partition matrix, alternating between labelling rows by their
//! largest rotated coordinate and re-solving the rotation with an SVD
//! (Yu & Shi, "Multiclass spectral clustering", 2003).

use crate::error::{DivclustError, Result};
use crate::primitives::Matrix;
use nalgebra::{DMatrix, SVD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// SVD sweep limit inside one discretization iteration.
const SVD_MAX_SWEEPS: usize = 1000;

/// Result of a discretization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discretization {
    /// Label of every row, in `0..n_components`.
    pub labels: Vec<usize>,
    /// Final normalized-cut objective `2·(n − Σσ)`.
    pub objective: f64,
    /// Iterations run by the successful restart.
    pub n_iter: usize,
    /// Restarts abandoned because the SVD failed.
    pub n_restarts: usize,
}

/// Rotation search turning an embedding into a partition.
///
/// # Examples
///
/// ```
/// use divclust::cluster::Discretizer;
/// use divclust::primitives::Matrix;
///
/// let v = Matrix::from_vec(4, 2, vec![
///     1.0, 0.0,
///     1.0, 0.0,
///     0.0, 1.0,
///     0.0, 1.0,
/// ]).expect("valid");
/// let out = Discretizer::new().with_random_state(0).fit(&v).expect("converges");
/// assert_eq!(out.labels[0], out.labels[1]);
/// assert_ne!(out.labels[0], out.labels[2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discretizer {
    max_restarts: usize,
    max_iters: usize,
    random_state: Option<u64>,
}

impl Default for Discretizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Discretizer {
    /// Creates a discretizer with 30 restarts and 20 iterations per restart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_restarts: 30,
            max_iters: 20,
            random_state: None,
        }
    }

    /// Sets the number of restarts allowed after an SVD failure.
    #[must_use]
    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Sets the iteration cap of one restart.
    #[must_use]
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Sets or clears the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    /// Discretizes the n×d embedding `vectors`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty embedding, `ConvergenceFailure` when every
    /// restart is abandoned.
    pub fn fit(&self, vectors: &Matrix<f64>) -> Result<Discretization> {
        let (n, d) = vectors.shape();
        if n == 0 || d == 0 {
            return Err(DivclustError::invalid_input(format!(
                "Cannot discretize a {n}x{d} embedding"
            )));
        }

        let v = normalize(vectors);
        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut last_objective = 0.0;
        for restart in 0..self.max_restarts {
            let mut rotation = initial_rotation(&v, &mut rng);
            last_objective = 0.0;
            let mut n_iter = 0;

            loop {
                n_iter += 1;
                let projected = &v * &rotation;
                let labels = argmax_rows(&projected);

                let mut indicator = DMatrix::<f64>::zeros(n, d);
                for (i, &label) in labels.iter().enumerate() {
                    indicator[(i, label)] = 1.0;
                }
                let t_svd = indicator.transpose() * &v;

                let Some(svd) = SVD::try_new(t_svd, true, true, f64::EPSILON, SVD_MAX_SWEEPS) else {
                    warn!(restart, "SVD did not converge, randomizing and trying again");
                    break;
                };
                let objective = 2.0 * (n as f64 - svd.singular_values.sum());

                if (objective - last_objective).abs() < f64::EPSILON || n_iter >= self.max_iters {
                    debug!(n_iter, restarts = restart, objective, "discretization converged");
                    return Ok(Discretization {
                        labels,
                        objective,
                        n_iter,
                        n_restarts: restart,
                    });
                }
                last_objective = objective;

                let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
                    warn!(restart, "SVD returned no singular vectors, randomizing and trying again");
                    break;
                };
                rotation = v_t.transpose() * u.transpose();
            }
        }

        Err(DivclustError::ConvergenceFailure {
            iterations: self.max_restarts,
            final_loss: last_objective,
        })
    }
}

/// Columns scaled to norm √n with a non-negative first entry, then rows to unit length.
fn normalize(vectors: &Matrix<f64>) -> DMatrix<f64> {
    let (n, d) = vectors.shape();
    let mut v = vectors.to_dmatrix();
    let target = (n as f64).sqrt();

    for j in 0..d {
        let norm = vectors.column_norm(j);
        if norm == 0.0 {
            continue;
        }
        let sign = if v[(0, j)] < 0.0 { -1.0 } else { 1.0 };
        let factor = sign * target / norm;
        for i in 0..n {
            v[(i, j)] *= factor;
        }
    }

    for mut row in v.row_iter_mut() {
        let norm = row.norm();
        if norm > 0.0 {
            row /= norm;
        }
    }
    v
}

/// First column is a random row; each next column is the row least aligned
/// with the columns chosen so far.
fn initial_rotation(v: &DMatrix<f64>, rng: &mut StdRng) -> DMatrix<f64> {
    let (n, d) = v.shape();
    let mut rotation = DMatrix::<f64>::zeros(d, d);
    rotation.set_column(0, &v.row(rng.gen_range(0..n)).transpose());

    let mut cumulative = vec![0.0; n];
    for j in 1..d {
        let prev = v * rotation.column(j - 1);
        for (c, p) in cumulative.iter_mut().zip(prev.iter()) {
            *c += p.abs();
        }
        let pick = argmin(&cumulative);
        rotation.set_column(j, &v.row(pick).transpose());
    }
    rotation
}

fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in values.iter().enumerate() {
        if x < values[best] {
            best = i;
        }
    }
    best
}

fn argmax_rows(m: &DMatrix<f64>) -> Vec<usize> {
    m.row_iter()
        .map(|row| {
            let mut best = 0;
            for (j, &x) in row.iter().enumerate() {
                if x > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

/// Convenience wrapper around [`Discretizer::fit`] returning only labels.
///
/// # Errors
///
/// See [`Discretizer::fit`].
pub fn discretize(
    vectors: &Matrix<f64>,
    max_restarts: usize,
    max_iters: usize,
    seed: Option<u64>,
) -> Result<Vec<usize>> {
    Discretizer::new()
        .with_max_restarts(max_restarts)
        .with_max_iters(max_iters)
        .with_seed(seed)
        .fit(vectors)
        .map(|out| out.labels)
}
