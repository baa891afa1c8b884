//! Spectral clustering with a pluggable label-assignment step.
//!
//! The affinity graph is embedded with the normalized Laplacian and the
//! embedding rows are then grouped by k-medoids, k-means or discretization.

use super::affinity::{affinity_matrix, Affinity, AffinityParams};
use super::discretize::Discretizer;
use super::embedding::spectral_embedding;
use super::kmeans::KMeans;
use super::kmedoids::KMedoids;
use crate::error::{DivclustError, Result};
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Strategy used to turn the spectral embedding into labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignLabels {
    /// PAM on the embedding rows; centers are embedding rows.
    #[default]
    KMedoids,
    /// Lloyd's k-means on the embedding rows.
    KMeans,
    /// Rotation search of [`Discretizer`]; no centers.
    Discretize,
}

impl AssignLabels {
    /// The configuration string of this strategy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KMedoids => "kmedoids",
            Self::KMeans => "kmeans",
            Self::Discretize => "discretize",
        }
    }
}

impl fmt::Display for AssignLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignLabels {
    type Err = DivclustError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kmedoids" => Ok(Self::KMedoids),
            "kmeans" => Ok(Self::KMeans),
            "discretize" => Ok(Self::Discretize),
            other => Err(DivclustError::invalid_hyperparameter(
                "assign_labels",
                other,
                "one of 'kmedoids', 'kmeans' or 'discretize'",
            )),
        }
    }
}

/// Output of [`spectral_clustering`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralOutput {
    /// Cluster label of every row.
    pub labels: Vec<usize>,
    /// The n×d spectral embedding the labels were assigned in.
    pub embedding: Matrix<f64>,
    /// Cluster centers in embedding space (absent for discretization).
    pub centers: Option<Matrix<f64>>,
    /// Rows chosen as medoids (k-medoids only).
    pub medoid_indices: Option<Vec<usize>>,
}

/// Clusters the nodes of an affinity graph.
///
/// `n_components` defaults to `n_clusters`. Discretization labels range over
/// the embedding dimension, so they only cover `0..n_clusters` when the two
/// agree.
///
/// # Errors
///
/// `InvalidHyperparameter` for `n_clusters` outside `1..=n`; errors of the
/// embedding and of the label-assignment step propagate unchanged.
pub fn spectral_clustering(
    affinity: &Matrix<f64>,
    n_clusters: usize,
    n_components: Option<usize>,
    assign_labels: AssignLabels,
    seed: Option<u64>,
) -> Result<SpectralOutput> {
    let n = affinity.n_rows();
    if n_clusters == 0 || n_clusters > n {
        return Err(DivclustError::invalid_hyperparameter(
            "n_clusters",
            n_clusters,
            format!("1 <= n_clusters <= n_samples ({n})"),
        ));
    }

    let n_components = n_components.unwrap_or(n_clusters);
    let embedding = spectral_embedding(affinity, n_components, true, false)?;
    debug!(n_clusters, n_components = embedding.n_cols(), %assign_labels, "assigning labels");

    let output = match assign_labels {
        AssignLabels::KMedoids => {
            let mut model = KMedoids::new(n_clusters).with_seed(seed);
            model.fit(&embedding)?;
            SpectralOutput {
                labels: model.labels().map(<[usize]>::to_vec).unwrap_or_default(),
                centers: model.cluster_centers().cloned(),
                medoid_indices: model.medoid_indices().map(<[usize]>::to_vec),
                embedding,
            }
        }
        AssignLabels::KMeans => {
            let mut model = KMeans::new(n_clusters).with_seed(seed);
            model.fit(&embedding)?;
            SpectralOutput {
                labels: model.labels().map(<[usize]>::to_vec).unwrap_or_default(),
                centers: model.centroids().cloned(),
                medoid_indices: None,
                embedding,
            }
        }
        AssignLabels::Discretize => {
            let out = Discretizer::new().with_seed(seed).fit(&embedding)?;
            SpectralOutput {
                labels: out.labels,
                centers: None,
                medoid_indices: None,
                embedding,
            }
        }
    };

    Ok(output)
}

/// Spectral clustering estimator.
///
/// # Examples
///
/// ```
/// use divclust::prelude::*;
///
/// let data = Matrix::from_vec(6, 2, vec![
///     0.0, 0.0, 0.1, 0.1, 0.2, 0.0,
///     5.0, 5.0, 5.1, 5.1, 5.2, 5.0,
/// ]).expect("valid");
///
/// let mut sc = SpectralClustering::new(2).with_gamma(0.5).with_random_state(0);
/// sc.fit(&data).expect("fit succeeds");
/// let labels = sc.labels().expect("fitted");
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[3]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralClustering {
    n_clusters: usize,
    affinity: Affinity,
    params: AffinityParams,
    assign_labels: AssignLabels,
    n_components: Option<usize>,
    random_state: Option<u64>,
    labels: Option<Vec<usize>>,
    #[serde(skip)]
    embedding: Option<Matrix<f64>>,
    #[serde(skip)]
    affinity_matrix: Option<Matrix<f64>>,
    #[serde(skip)]
    centers: Option<Matrix<f64>>,
    medoid_indices: Option<Vec<usize>>,
}

impl SpectralClustering {
    /// Creates a new spectral clustering with RBF affinity (γ = 1) and
    /// k-medoids label assignment.
    #[must_use]
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            affinity: Affinity::default(),
            params: AffinityParams::default(),
            assign_labels: AssignLabels::default(),
            n_components: None,
            random_state: None,
            labels: None,
            embedding: None,
            affinity_matrix: None,
            centers: None,
            medoid_indices: None,
        }
    }

    /// Sets how the affinity matrix is built.
    #[must_use]
    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }

    /// Sets the kernel coefficient.
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.params.gamma = gamma;
        self
    }

    /// Sets the neighbour count of the k-NN affinities.
    #[must_use]
    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.params.n_neighbors = n_neighbors;
        self
    }

    /// Sets the polynomial kernel degree and offset.
    #[must_use]
    pub fn with_polynomial(mut self, degree: f64, coef0: f64) -> Self {
        self.params.degree = degree;
        self.params.coef0 = coef0;
        self
    }

    /// Sets the label-assignment strategy.
    #[must_use]
    pub fn with_assign_labels(mut self, assign_labels: AssignLabels) -> Self {
        self.assign_labels = assign_labels;
        self
    }

    /// Sets the embedding dimension (defaults to `n_clusters`).
    #[must_use]
    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
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

    /// Labels of the training rows.
    #[must_use]
    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    /// Spectral embedding of the training rows.
    #[must_use]
    pub fn embedding(&self) -> Option<&Matrix<f64>> {
        self.embedding.as_ref()
    }

    /// Affinity matrix used for the last fit.
    #[must_use]
    pub fn affinity_matrix(&self) -> Option<&Matrix<f64>> {
        self.affinity_matrix.as_ref()
    }

    /// Medoid rows, when labels were assigned with k-medoids.
    #[must_use]
    pub fn medoid_indices(&self) -> Option<&[usize]> {
        self.medoid_indices.as_deref()
    }

    /// Cluster centers in embedding space, if the strategy produces any.
    #[must_use]
    pub fn centers(&self) -> Option<&Matrix<f64>> {
        self.centers.as_ref()
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.labels.is_some()
    }
}

impl UnsupervisedEstimator for SpectralClustering {
    type Labels = Vec<usize>;

    fn fit(&mut self, x: &Matrix<f64>) -> Result<()> {
        let affinity = affinity_matrix(x, self.affinity, &self.params)?;
        let out = spectral_clustering(
            &affinity,
            self.n_clusters,
            self.n_components,
            self.assign_labels,
            self.random_state,
        )?;

        self.labels = Some(out.labels);
        self.embedding = Some(out.embedding);
        self.centers = out.centers;
        self.medoid_indices = out.medoid_indices;
        self.affinity_matrix = Some(affinity);
        Ok(())
    }

    /// Spectral clustering is transductive: only the training rows have labels.
    fn predict(&self, _x: &Matrix<f64>) -> Vec<usize> {
        self.labels
            .clone()
            .expect("Model not fitted. Call fit() first.")
    }
}

#[cfg(test)]
#[path = "spectral_tests.rs"]
mod tests;
