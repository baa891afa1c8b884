//! K-Medoids clustering (PAM).
//!
//! Medoids are actual rows of the data, so the algorithm only needs a
//! pairwise dissimilarity. The BUILD/k-medoids++ initialization is followed
//! by PAM SWAP iterations until no exchange lowers the total cost.

use crate::error::{DivclustError, Result};
use crate::primitives::{squared_euclidean, Matrix};
use crate::traits::UnsupervisedEstimator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Pairwise dissimilarity used by [`KMedoids`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dissimilarity {
    /// ||x - y||²
    #[default]
    SquaredEuclidean,
    /// ||x - y||
    Euclidean,
    /// Σ |x_i - y_i|
    Manhattan,
}

impl Dissimilarity {
    /// Dissimilarity between two rows.
    #[must_use]
    pub fn between(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Self::SquaredEuclidean => squared_euclidean(a, b),
            Self::Euclidean => squared_euclidean(a, b).sqrt(),
            Self::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
        }
    }

    /// Full n×n dissimilarity matrix, row-major.
    #[must_use]
    pub fn pairwise(self, x: &Matrix<f64>) -> Vec<f64> {
        let n = x.n_rows();
        let mut d = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let v = self.between(x.row(i), x.row(j));
                d[i * n + j] = v;
                d[j * n + i] = v;
            }
        }
        d
    }
}

/// Medoid initialization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KMedoidsInit {
    /// Deterministic greedy PAM BUILD phase.
    Build,
    /// Seeds sampled proportionally to the current dissimilarity, best of a few local trials.
    #[default]
    KMedoidsPlusPlus,
    /// k distinct rows drawn uniformly.
    Random,
}

/// K-Medoids clustering with the PAM swap algorithm.
///
/// # Algorithm
///
/// 1. Pick k initial medoids (BUILD, k-medoids++ or random)
/// 2. Assign each sample to its nearest medoid
/// 3. Apply the (medoid, non-medoid) swap that lowers the total
///    dissimilarity the most
/// 4. Repeat until no swap improves or `max_iter` is reached
///
/// Ties resolve deterministically: a sample equidistant to several medoids
/// goes to the earliest medoid, and equal-cost swap candidates resolve to the
/// lowest row index.
///
/// # Examples
///
/// ```
/// use divclust::prelude::*;
///
/// let data = Matrix::from_vec(6, 2, vec![
///     1.0, 1.0, 2.0, 1.0, 1.0, 0.0,
///     4.0, 7.0, 3.0, 5.0, 3.0, 6.0,
/// ]).expect("Valid matrix dimensions and data length");
///
/// let mut kmedoids = KMedoids::new(2).with_random_state(0);
/// kmedoids.fit(&data).expect("Fit succeeds with valid data");
///
/// let labels = kmedoids.labels().expect("fitted");
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[3]);
/// ```
///
/// # Performance
///
/// - Time complexity: O(k(n-k)n) per swap iteration, plus O(n²d) for the dissimilarities
/// - Space complexity: O(n²)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMedoids {
    /// Number of clusters.
    n_clusters: usize,
    /// Initialization strategy.
    init: KMedoidsInit,
    /// Dissimilarity between rows.
    metric: Dissimilarity,
    /// Maximum swap iterations.
    max_iter: usize,
    /// Random seed for initialization.
    random_state: Option<u64>,
    /// Row indices of the medoids after fitting.
    medoid_indices: Option<Vec<usize>>,
    /// Medoid rows after fitting (k × d).
    cluster_centers: Option<Matrix<f64>>,
    /// Labels for training data.
    labels: Option<Vec<usize>>,
    /// Total dissimilarity of samples to their medoid.
    inertia: f64,
    /// Number of swap iterations run.
    n_iter: usize,
}

impl Default for KMedoids {
    fn default() -> Self {
        Self::new(8)
    }
}

impl KMedoids {
    /// Creates a new K-Medoids with the specified number of clusters.
    #[must_use]
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            init: KMedoidsInit::default(),
            metric: Dissimilarity::default(),
            max_iter: 300,
            random_state: None,
            medoid_indices: None,
            cluster_centers: None,
            labels: None,
            inertia: 0.0,
            n_iter: 0,
        }
    }

    /// Sets the initialization strategy.
    #[must_use]
    pub fn with_init(mut self, init: KMedoidsInit) -> Self {
        self.init = init;
        self
    }

    /// Sets the dissimilarity.
    #[must_use]
    pub fn with_metric(mut self, metric: Dissimilarity) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the maximum number of swap iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
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

    /// Number of clusters.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Row indices of the fitted medoids, in cluster-label order.
    #[must_use]
    pub fn medoid_indices(&self) -> Option<&[usize]> {
        self.medoid_indices.as_deref()
    }

    /// Medoid rows, one per cluster.
    #[must_use]
    pub fn cluster_centers(&self) -> Option<&Matrix<f64>> {
        self.cluster_centers.as_ref()
    }

    /// Labels assigned to the training rows.
    #[must_use]
    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    /// Returns the total dissimilarity of the fitted solution.
    #[must_use]
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Returns the number of swap iterations run.
    #[must_use]
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.medoid_indices.is_some()
    }

    fn rng(&self) -> StdRng {
        match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Deterministic PAM BUILD: start from the most central row, then
    /// greedily add the row that lowers the total cost the most.
    fn build_init(&self, d: &[f64], n: usize) -> Vec<usize> {
        let mut medoids = Vec::with_capacity(self.n_clusters);

        let first = (0..n)
            .map(|j| (j, (0..n).map(|i| d[i * n + j]).sum::<f64>()))
            .fold((0, f64::INFINITY), |best, (j, cost)| {
                if cost < best.1 {
                    (j, cost)
                } else {
                    best
                }
            })
            .0;
        medoids.push(first);
        let mut nearest: Vec<f64> = (0..n).map(|i| d[i * n + first]).collect();

        while medoids.len() < self.n_clusters {
            let mut best = None;
            let mut best_gain = f64::NEG_INFINITY;
            for h in (0..n).filter(|h| !medoids.contains(h)) {
                let gain: f64 = (0..n)
                    .map(|j| (nearest[j] - d[j * n + h]).max(0.0))
                    .sum();
                if gain > best_gain {
                    best_gain = gain;
                    best = Some(h);
                }
            }
            let Some(h) = best else { break };
            medoids.push(h);
            for (j, near) in nearest.iter_mut().enumerate() {
                *near = near.min(d[j * n + h]);
            }
        }

        medoids
    }

    /// k-medoids++ seeding with greedy local trials.
    fn plusplus_init(&self, d: &[f64], n: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut medoids = Vec::with_capacity(self.n_clusters);
        let first = rng.gen_range(0..n);
        medoids.push(first);

        let mut closest: Vec<f64> = (0..n).map(|i| d[first * n + i]).collect();
        let n_local_trials = 2 + (self.n_clusters as f64).ln().floor() as usize;

        while medoids.len() < self.n_clusters {
            let potential: f64 = closest.iter().sum();
            let mut best: Option<(usize, f64)> = None;

            if potential > 0.0 {
                for _ in 0..n_local_trials {
                    let target = rng.gen::<f64>() * potential;
                    let mut acc = 0.0;
                    let mut candidate = None;
                    for (i, &c) in closest.iter().enumerate() {
                        acc += c;
                        if c > 0.0 && acc >= target {
                            candidate = Some(i);
                            break;
                        }
                    }
                    let Some(cand) = candidate else { continue };
                    if medoids.contains(&cand) {
                        continue;
                    }
                    let pot: f64 = (0..n).map(|i| closest[i].min(d[cand * n + i])).sum();
                    if best.map_or(true, |(_, p)| pot < p) {
                        best = Some((cand, pot));
                    }
                }
            }

            // All remaining rows coincide with a medoid: take the lowest free index.
            let chosen = match best {
                Some((cand, _)) => cand,
                None => match (0..n).find(|i| !medoids.contains(i)) {
                    Some(i) => i,
                    None => break,
                },
            };
            medoids.push(chosen);
            for (i, c) in closest.iter_mut().enumerate() {
                *c = c.min(d[chosen * n + i]);
            }
        }

        medoids
    }

    fn initial_medoids(&self, d: &[f64], n: usize) -> Vec<usize> {
        match self.init {
            KMedoidsInit::Build => self.build_init(d, n),
            KMedoidsInit::KMedoidsPlusPlus => {
                let mut rng = self.rng();
                self.plusplus_init(d, n, &mut rng)
            }
            KMedoidsInit::Random => {
                let mut rng = self.rng();
                rand::seq::index::sample(&mut rng, n, self.n_clusters).into_vec()
            }
        }
    }
}

/// Nearest and second-nearest medoid bookkeeping for the SWAP phase.
struct Assignment {
    /// Position (in the medoid list) of each row's nearest medoid.
    nearest: Vec<usize>,
    /// Dissimilarity to the nearest medoid.
    near_dist: Vec<f64>,
    /// Dissimilarity to the second-nearest medoid.
    second_dist: Vec<f64>,
}

impl Assignment {
    fn compute(d: &[f64], n: usize, medoids: &[usize]) -> Self {
        let mut nearest = vec![0; n];
        let mut near_dist = vec![f64::INFINITY; n];
        let mut second_dist = vec![f64::INFINITY; n];
        for j in 0..n {
            for (pos, &m) in medoids.iter().enumerate() {
                let dist = d[j * n + m];
                if dist < near_dist[j] {
                    second_dist[j] = near_dist[j];
                    near_dist[j] = dist;
                    nearest[j] = pos;
                } else if dist < second_dist[j] {
                    second_dist[j] = dist;
                }
            }
        }
        Self {
            nearest,
            near_dist,
            second_dist,
        }
    }

    fn cost(&self) -> f64 {
        self.near_dist.iter().sum()
    }

    /// Change in total cost if medoid `pos` is replaced by row `h`.
    fn swap_delta(&self, d: &[f64], n: usize, pos: usize, h: usize) -> f64 {
        let mut delta = 0.0;
        for j in 0..n {
            let d_jh = d[j * n + h];
            if self.nearest[j] == pos {
                delta += d_jh.min(self.second_dist[j]) - self.near_dist[j];
            } else if d_jh < self.near_dist[j] {
                delta += d_jh - self.near_dist[j];
            }
        }
        delta
    }
}

/// Relative improvement below which a swap is treated as a tie.
const SWAP_TOL: f64 = 1e-12;

impl UnsupervisedEstimator for KMedoids {
    type Labels = Vec<usize>;

    /// Fits the K-Medoids model to data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data is empty
    /// - `n_clusters` is 0 or exceeds the number of samples
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()> {
        let n = x.n_rows();

        if n == 0 {
            return Err(DivclustError::invalid_input("Cannot fit with zero samples"));
        }
        if self.n_clusters == 0 || self.n_clusters > n {
            return Err(DivclustError::invalid_hyperparameter(
                "n_clusters",
                self.n_clusters,
                format!("1 <= n_clusters <= n_samples ({n})"),
            ));
        }

        let d = self.metric.pairwise(x);
        let mut medoids = self.initial_medoids(&d, n);
        let mut assignment = Assignment::compute(&d, n, &medoids);

        self.n_iter = 0;
        for _ in 0..self.max_iter {
            self.n_iter += 1;

            let mut best: Option<(usize, usize)> = None;
            let mut best_delta = 0.0;
            for h in (0..n).filter(|h| !medoids.contains(h)) {
                for pos in 0..medoids.len() {
                    let delta = assignment.swap_delta(&d, n, pos, h);
                    if delta < best_delta {
                        best_delta = delta;
                        best = Some((pos, h));
                    }
                }
            }

            let cost = assignment.cost();
            match best {
                Some((pos, h)) if -best_delta > SWAP_TOL * cost.max(1.0) => {
                    medoids[pos] = h;
                    assignment = Assignment::compute(&d, n, &medoids);
                }
                _ => break,
            }
        }

        self.inertia = assignment.cost();
        self.cluster_centers = Some(x.select_rows(&medoids));
        self.labels = Some(assignment.nearest);
        self.medoid_indices = Some(medoids);

        Ok(())
    }

    /// Predicts the nearest fitted medoid for each row.
    fn predict(&self, x: &Matrix<f64>) -> Vec<usize> {
        let centers = self
            .cluster_centers
            .as_ref()
            .expect("Model not fitted. Call fit() first.");

        x.rows()
            .map(|row| {
                let mut best = 0;
                let mut best_dist = f64::INFINITY;
                for (k, center) in centers.rows().enumerate() {
                    let dist = self.metric.between(row, center);
                    if dist < best_dist {
                        best_dist = dist;
                        best = k;
                    }
                }
                best
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "kmedoids_tests.rs"]
mod tests;
