//! K-Means clustering algorithm.
//!
//! Uses Lloyd's algorithm with k-means++ initialization, keeping the best
//! of several seeded restarts.

use crate::error::{DivclustError, Result};
use crate::metrics::inertia;
use crate::primitives::{squared_euclidean, Matrix};
use crate::traits::UnsupervisedEstimator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// K-Means clustering algorithm.
///
/// # Algorithm
///
/// 1. Initialize centroids using k-means++
/// 2. Assign each sample to nearest centroid
/// 3. Update centroids as mean of assigned samples
/// 4. Repeat until convergence or max iterations
/// 5. Keep the run with the lowest inertia out of `n_init`
///
/// # Examples
///
/// ```
/// use divclust::prelude::*;
///
/// let data = Matrix::from_vec(6, 2, vec![
///     1.0, 2.0,
///     1.5, 1.8,
///     5.0, 8.0,
///     8.0, 8.0,
///     1.0, 0.6,
///     9.0, 11.0,
/// ]).expect("Valid matrix dimensions and data length");
///
/// let mut kmeans = KMeans::new(2).with_random_state(0);
/// kmeans.fit(&data).expect("Fit succeeds with valid data");
///
/// let labels = kmeans.predict(&data);
/// assert_eq!(labels.len(), 6);
/// ```
///
/// # Performance
///
/// - Time complexity: O(nkdi) where n=samples, k=clusters, d=features, i=iterations
/// - Space complexity: O(nk)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    /// Number of clusters.
    n_clusters: usize,
    /// Maximum iterations.
    max_iter: usize,
    /// Number of seeded restarts.
    n_init: usize,
    /// Convergence tolerance.
    tol: f64,
    /// Random seed for initialization.
    random_state: Option<u64>,
    /// Cluster centroids after fitting.
    centroids: Option<Matrix<f64>>,
    /// Labels for training data.
    labels: Option<Vec<usize>>,
    /// Sum of squared distances (inertia).
    inertia: f64,
    /// Number of iterations run by the kept restart.
    n_iter: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(8)
    }
}

impl KMeans {
    /// Creates a new K-Means with the specified number of clusters.
    #[must_use]
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 300,
            n_init: 10,
            tol: 1e-4,
            random_state: None,
            centroids: None,
            labels: None,
            inertia: 0.0,
            n_iter: 0,
        }
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the number of seeded restarts.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
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

    /// Returns the cluster centroids, if fitted.
    #[must_use]
    pub fn centroids(&self) -> Option<&Matrix<f64>> {
        self.centroids.as_ref()
    }

    /// Labels assigned to the training rows.
    #[must_use]
    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    /// Returns the inertia (within-cluster sum of squares).
    #[must_use]
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Returns the number of iterations run.
    #[must_use]
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.centroids.is_some()
    }

    /// Initializes centroids using k-means++ (D² sampling).
    fn kmeans_plusplus_init(&self, x: &Matrix<f64>, rng: &mut StdRng) -> Vec<usize> {
        let n_samples = x.n_rows();
        let mut chosen = Vec::with_capacity(self.n_clusters);
        chosen.push(rng.gen_range(0..n_samples));

        let mut min_distances: Vec<f64> = (0..n_samples)
            .map(|i| squared_euclidean(x.row(i), x.row(chosen[0])))
            .collect();

        while chosen.len() < self.n_clusters {
            let total: f64 = min_distances.iter().sum();
            let next = if total > 0.0 {
                let target = rng.gen::<f64>() * total;
                let mut acc = 0.0;
                let mut pick = None;
                for (i, &dist) in min_distances.iter().enumerate() {
                    acc += dist;
                    if dist > 0.0 && acc >= target {
                        pick = Some(i);
                        break;
                    }
                }
                pick.or_else(|| min_distances.iter().rposition(|&d| d > 0.0))
            } else {
                None
            };
            // Every point coincides with a centroid: duplicate the first one.
            let next = next.unwrap_or(chosen[0]);
            chosen.push(next);

            for (i, min_dist) in min_distances.iter_mut().enumerate() {
                *min_dist = min_dist.min(squared_euclidean(x.row(i), x.row(next)));
            }
        }

        chosen
    }

    /// Assigns each sample to the nearest centroid.
    fn assign_labels(&self, x: &Matrix<f64>, centroids: &Matrix<f64>) -> Vec<usize> {
        x.rows()
            .map(|point| {
                let mut min_dist = f64::INFINITY;
                let mut min_cluster = 0;
                for (k, centroid) in centroids.rows().enumerate() {
                    let dist = squared_euclidean(point, centroid);
                    if dist < min_dist {
                        min_dist = dist;
                        min_cluster = k;
                    }
                }
                min_cluster
            })
            .collect()
    }

    /// Updates centroids as the mean of assigned samples; empty clusters keep their old centroid.
    fn update_centroids(&self, x: &Matrix<f64>, labels: &[usize], old: &Matrix<f64>) -> Matrix<f64> {
        let n_features = x.n_cols();
        let mut new_centroids = vec![0.0; self.n_clusters * n_features];
        let mut counts = vec![0usize; self.n_clusters];

        for (i, &label) in labels.iter().enumerate() {
            counts[label] += 1;
            for (j, v) in x.row(i).iter().enumerate() {
                new_centroids[label * n_features + j] += v;
            }
        }

        for k in 0..self.n_clusters {
            for j in 0..n_features {
                let idx = k * n_features + j;
                if counts[k] > 0 {
                    new_centroids[idx] /= counts[k] as f64;
                } else {
                    new_centroids[idx] = old.get(k, j);
                }
            }
        }

        let mut m = Matrix::zeros(self.n_clusters, n_features);
        for k in 0..self.n_clusters {
            for j in 0..n_features {
                m.set(k, j, new_centroids[k * n_features + j]);
            }
        }
        m
    }

    /// Checks if centroids have converged.
    fn centroids_converged(&self, old: &Matrix<f64>, new: &Matrix<f64>) -> bool {
        old.rows()
            .zip(new.rows())
            .all(|(a, b)| squared_euclidean(a, b) <= self.tol * self.tol)
    }

    /// One Lloyd run from a k-means++ seeding.
    fn single_run(&self, x: &Matrix<f64>, rng: &mut StdRng) -> (Matrix<f64>, Vec<usize>, f64, usize) {
        let seeds = self.kmeans_plusplus_init(x, rng);
        let mut centroids = x.select_rows(&seeds);
        let mut labels = self.assign_labels(x, &centroids);
        let mut n_iter = 0;

        for iter in 0..self.max_iter {
            n_iter = iter + 1;
            let new_centroids = self.update_centroids(x, &labels, &centroids);
            let converged = self.centroids_converged(&centroids, &new_centroids);
            centroids = new_centroids;
            labels = self.assign_labels(x, &centroids);
            if converged {
                break;
            }
        }

        let score = inertia(x, &centroids, &labels);
        (centroids, labels, score, n_iter)
    }
}

impl UnsupervisedEstimator for KMeans {
    type Labels = Vec<usize>;

    /// Fits the K-Means model to data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data is empty
    /// - `n_clusters` is 0 or exceeds the number of samples
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()> {
        let n_samples = x.n_rows();

        if n_samples == 0 {
            return Err(DivclustError::invalid_input("Cannot fit with zero samples"));
        }

        if self.n_clusters == 0 || n_samples < self.n_clusters {
            return Err(DivclustError::invalid_hyperparameter(
                "n_clusters",
                self.n_clusters,
                format!("1 <= n_clusters <= n_samples ({n_samples})"),
            ));
        }

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut best: Option<(Matrix<f64>, Vec<usize>, f64, usize)> = None;
        for _ in 0..self.n_init.max(1) {
            let run = self.single_run(x, &mut rng);
            if best.as_ref().map_or(true, |b| run.2 < b.2) {
                best = Some(run);
            }
        }

        if let Some((centroids, labels, score, n_iter)) = best {
            self.centroids = Some(centroids);
            self.labels = Some(labels);
            self.inertia = score;
            self.n_iter = n_iter;
        }

        Ok(())
    }

    /// Predicts cluster labels for new data.
    fn predict(&self, x: &Matrix<f64>) -> Vec<usize> {
        let centroids = self
            .centroids
            .as_ref()
            .expect("Model not fitted. Call fit() first.");

        self.assign_labels(x, centroids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> Matrix<f64> {
        // Two well-separated clusters
        Matrix::from_vec(
            6,
            2,
            vec![1.0, 2.0, 1.5, 1.8, 1.0, 0.6, 8.0, 8.0, 9.0, 11.0, 8.5, 9.0],
        )
        .unwrap()
    }

    #[test]
    fn test_new() {
        let kmeans = KMeans::new(3);
        assert_eq!(kmeans.n_clusters, 3);
        assert!(!kmeans.is_fitted());
    }

    #[test]
    fn test_fit_basic() {
        let data = sample_data();
        let mut kmeans = KMeans::new(2).with_random_state(1);
        kmeans.fit(&data).unwrap();

        assert!(kmeans.is_fitted());
        assert_eq!(kmeans.centroids().unwrap().shape(), (2, 2));
        assert!(kmeans.inertia() >= 0.0);
    }

    #[test]
    fn test_labels_consistency() {
        let data = sample_data();
        let mut kmeans = KMeans::new(2).with_random_state(42);
        kmeans.fit(&data).unwrap();

        let labels = kmeans.predict(&data);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(kmeans.labels().unwrap(), labels.as_slice());
    }

    #[test]
    fn test_builders() {
        let kmeans = KMeans::new(3)
            .with_max_iter(10)
            .with_tol(1e-6)
            .with_n_init(2)
            .with_random_state(42);
        assert_eq!(kmeans.max_iter, 10);
        assert!((kmeans.tol - 1e-6).abs() < 1e-15);
        assert_eq!(kmeans.n_init, 2);
        assert_eq!(kmeans.random_state, Some(42));
        assert_eq!(KMeans::new(3).with_seed(None).random_state, None);
    }

    #[test]
    fn test_empty_data_error() {
        let data = Matrix::zeros(0, 2);
        let mut kmeans = KMeans::new(2);
        assert!(kmeans.fit(&data).is_err());
    }

    #[test]
    fn test_too_many_clusters_error() {
        let data = Matrix::from_vec(3, 2, vec![1.0; 6]).unwrap();
        let mut kmeans = KMeans::new(5);
        assert!(kmeans.fit(&data).is_err());
        assert!(KMeans::new(0).fit(&data).is_err());
    }

    #[test]
    fn test_single_cluster() {
        let data = sample_data();
        let mut kmeans = KMeans::new(1).with_random_state(0);
        kmeans.fit(&data).unwrap();
        assert!(kmeans.predict(&data).iter().all(|&l| l == 0));
    }

    #[test]
    fn test_inertia_decreases_with_more_clusters() {
        let data = sample_data();

        let mut kmeans1 = KMeans::new(1).with_random_state(42);
        kmeans1.fit(&data).unwrap();

        let mut kmeans2 = KMeans::new(2).with_random_state(42);
        kmeans2.fit(&data).unwrap();

        assert!(kmeans2.inertia() <= kmeans1.inertia());
    }

    #[test]
    fn test_reproducibility() {
        let data = sample_data();

        let mut kmeans1 = KMeans::new(2).with_random_state(42);
        kmeans1.fit(&data).unwrap();

        let mut kmeans2 = KMeans::new(2).with_random_state(42);
        kmeans2.fit(&data).unwrap();

        assert_eq!(kmeans1.centroids(), kmeans2.centroids());
    }

    #[test]
    fn test_identical_points() {
        let data = Matrix::from_vec(5, 2, vec![1.0; 10]).unwrap();

        let mut kmeans = KMeans::new(2).with_random_state(42);
        kmeans.fit(&data).unwrap();

        let labels = kmeans.predict(&data);
        let first = labels[0];
        assert!(labels.iter().all(|&l| l == first));
        assert!(kmeans.inertia() < 1e-12);
    }

    #[test]
    fn test_exact_k_samples() {
        let data = Matrix::from_vec(3, 2, vec![0.0, 0.0, 5.0, 5.0, 10.0, 10.0]).unwrap();

        let mut kmeans = KMeans::new(3).with_random_state(42);
        kmeans.fit(&data).unwrap();

        let labels = kmeans.predict(&data);
        assert_ne!(labels[0], labels[1]);
        assert_ne!(labels[1], labels[2]);
        assert_ne!(labels[0], labels[2]);
        assert!(kmeans.inertia() < 1e-12);
    }

    #[test]
    fn test_max_iter_limit() {
        let data = sample_data();
        let mut kmeans = KMeans::new(2).with_max_iter(1).with_random_state(42);
        kmeans.fit(&data).unwrap();
        assert_eq!(kmeans.n_iter(), 1);
    }
}
