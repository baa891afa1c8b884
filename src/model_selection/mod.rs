//! Model selection: choosing how many clusters a set of observations holds.
//!
//! This module provides:
//! - The [`ModelSelector`] trait consumed by the tree builder
//! - [`Pamk`]: silhouette-based selection of k with a Duda–Hart test for k = 1
//! - [`duda_hart_test`]: the 1-cluster vs 2-cluster ratio test on its own

use crate::cluster::{affinity_matrix, spectral_clustering, Affinity, AffinityParams, AssignLabels, KMedoids};
use crate::data::ObservationTable;
use crate::error::{DivclustError, Result};
use crate::metrics::{silhouette_score, within_cluster_sum_of_squares};
use crate::primitives::{squared_euclidean, Matrix};
use crate::stats::{inverse_normal_cdf, normal_cdf};
use crate::traits::UnsupervisedEstimator;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::debug;

/// Outcome of a model-selection run on one set of observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Chosen number of clusters; 1 means "do not split".
    pub n_clusters: usize,
    /// `(row id, cluster index)` for every row when `n_clusters > 1`.
    pub assignments: Vec<(String, usize)>,
    /// Row id of the medoid of each cluster, in cluster-index order.
    pub medoids: Vec<String>,
}

impl Selection {
    /// The "do not split" answer.
    #[must_use]
    pub fn single() -> Self {
        Self {
            n_clusters: 1,
            assignments: Vec::new(),
            medoids: Vec::new(),
        }
    }

    /// Returns true if the selection keeps the observations together.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.n_clusters == 1
    }
}

/// Chooses a number of clusters and a partition for a table.
///
/// Implementations must return `n_clusters` inside `k_range`. For
/// `n_clusters > 1` every row id appears exactly once in `assignments`, every
/// cluster index is below `n_clusters` and owns at least one row, and
/// `medoids` holds one row id per cluster.
pub trait ModelSelector {
    /// Selects k in `k_range` and partitions `table` accordingly.
    ///
    /// # Errors
    ///
    /// Implementation specific; errors abort the caller's build.
    fn select(
        &self,
        table: &ObservationTable,
        k_range: RangeInclusive<usize>,
        seed: Option<u64>,
    ) -> Result<Selection>;
}

impl<S: ModelSelector + ?Sized> ModelSelector for &S {
    fn select(
        &self,
        table: &ObservationTable,
        k_range: RangeInclusive<usize>,
        seed: Option<u64>,
    ) -> Result<Selection> {
        (**self).select(table, k_range, seed)
    }
}

/// Clustering run for each candidate k.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterMethod {
    /// PAM directly on the features.
    Pam,
    /// Spectral embedding, then PAM.
    #[default]
    SpectralPam,
    /// Spectral embedding, then k-means.
    SpectralKMeans,
    /// Spectral embedding, then discretization.
    SpectralDiscretize,
}

impl ClusterMethod {
    /// Label-assignment strategy of the spectral methods.
    #[must_use]
    pub fn assign_labels(self) -> Option<AssignLabels> {
        match self {
            Self::Pam => None,
            Self::SpectralPam => Some(AssignLabels::KMedoids),
            Self::SpectralKMeans => Some(AssignLabels::KMeans),
            Self::SpectralDiscretize => Some(AssignLabels::Discretize),
        }
    }

    /// Name used in configuration files and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pam => "pam",
            Self::SpectralPam => "spectral-pam",
            Self::SpectralKMeans => "spectral-kmeans",
            Self::SpectralDiscretize => "spectral-discretize",
        }
    }
}

impl fmt::Display for ClusterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterMethod {
    type Err = DivclustError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pam" => Ok(Self::Pam),
            "spectral-pam" => Ok(Self::SpectralPam),
            "spectral-kmeans" => Ok(Self::SpectralKMeans),
            "spectral-discretize" => Ok(Self::SpectralDiscretize),
            other => Err(DivclustError::invalid_hyperparameter(
                "method",
                other,
                "one of 'pam', 'spectral-pam', 'spectral-kmeans' or 'spectral-discretize'",
            )),
        }
    }
}

/// Result of the Duda–Hart test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DudaHart {
    /// Ratio of the 2-cluster to the 1-cluster within sum of squares.
    pub dh: f64,
    /// Critical value at the requested level.
    pub critical: f64,
    /// p-value of the single-cluster hypothesis.
    pub p_value: f64,
    /// True when the single-cluster hypothesis is not rejected.
    pub single_cluster: bool,
}

/// Duda–Hart test of one cluster against the 2-cluster partition `labels`.
///
/// With n rows and p features, `dh = W2 / W1` is compared to
/// `1 − 2/(πp) − z·sqrt(2(1 − 8/(π²p))/(np))` where `z = Φ⁻¹(1 − α)`.
/// The single-cluster hypothesis holds when `dh ≥ critical` or `W1 = 0`.
///
/// # Examples
///
/// ```
/// use divclust::model_selection::duda_hart_test;
/// use divclust::primitives::Matrix;
///
/// // two tight groups of 15 rows each
/// let values: Vec<f64> = (0..30)
///     .map(|i| if i < 15 { i as f64 * 0.01 } else { 10.0 + i as f64 * 0.01 })
///     .collect();
/// let x = Matrix::from_vec(30, 1, values).expect("valid");
/// let labels: Vec<usize> = (0..30).map(|i| usize::from(i >= 15)).collect();
///
/// let test = duda_hart_test(&x, &labels, 1e-3);
/// assert!(!test.single_cluster);
/// assert!(test.p_value < 1e-3);
/// ```
#[must_use]
pub fn duda_hart_test(x: &Matrix<f64>, labels: &[usize], alpha: f64) -> DudaHart {
    let (n, p) = x.shape();
    let (n, p) = (n as f64, p.max(1) as f64);

    let w1 = within_cluster_sum_of_squares(x, &vec![0; labels.len()]);
    let w2 = within_cluster_sum_of_squares(x, labels);

    let z = inverse_normal_cdf(1.0 - alpha);
    let spread = (2.0 * (1.0 - 8.0 / (PI * PI * p)) / (n * p)).sqrt();
    let critical = 1.0 - 2.0 / (PI * p) - z * spread;

    if w1 <= 0.0 {
        return DudaHart {
            dh: 1.0,
            critical,
            p_value: 1.0,
            single_cluster: true,
        };
    }

    let dh = w2 / w1;
    let qz = (-dh + 1.0 - 2.0 / (PI * p)) / spread;
    DudaHart {
        dh,
        critical,
        p_value: 1.0 - normal_cdf(qz),
        single_cluster: dh >= critical,
    }
}

/// Partition produced for one candidate k.
struct Candidate {
    labels: Vec<usize>,
    medoids: Vec<usize>,
}

/// Partitioning around medoids with automatic k: the silhouette picks the best
/// k ≥ 2 and the Duda–Hart test decides whether one cluster is enough.
///
/// # Examples
///
/// ```
/// use divclust::prelude::*;
///
/// let values: Vec<f64> = (0..30)
///     .map(|i| if i < 15 { i as f64 * 0.01 } else { 10.0 + i as f64 * 0.01 })
///     .collect();
/// let x = Matrix::from_vec(30, 1, values).expect("valid");
/// let ids = (0..30).map(|i| format!("r{i}")).collect();
/// let table = ObservationTable::from_matrix(ids, x).expect("valid table");
///
/// let selection = Pamk::new()
///     .with_method(ClusterMethod::Pam)
///     .select(&table, 1..=3, Some(0))
///     .expect("selection succeeds");
/// assert_eq!(selection.n_clusters, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pamk {
    method: ClusterMethod,
    n_components: usize,
    alpha: f64,
    gamma: f64,
}

impl Default for Pamk {
    fn default() -> Self {
        Self::new()
    }
}

impl Pamk {
    /// Spectral PAM with 10 components and α = 1e-3.
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: ClusterMethod::default(),
            n_components: 10,
            alpha: 1e-3,
            gamma: 1.0,
        }
    }

    /// Sets the clustering run for each candidate k.
    #[must_use]
    pub fn with_method(mut self, method: ClusterMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the spectral embedding dimension.
    #[must_use]
    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    /// Sets the Duda–Hart significance level.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the RBF kernel coefficient.
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Clustering method.
    #[must_use]
    pub fn method(&self) -> ClusterMethod {
        self.method
    }

    /// Duda–Hart significance level.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(DivclustError::invalid_hyperparameter("alpha", self.alpha, "0 < alpha < 1"));
        }
        if self.n_components == 0 {
            return Err(DivclustError::invalid_hyperparameter(
                "n_components",
                self.n_components,
                "n_components >= 1",
            ));
        }
        Ok(())
    }

    /// Clusters `x` into k groups, or `None` when a cluster comes back empty.
    fn partition(
        &self,
        x: &Matrix<f64>,
        affinity: Option<&Matrix<f64>>,
        k: usize,
        seed: Option<u64>,
    ) -> Result<Option<Candidate>> {
        let (labels, medoids) = match (self.method.assign_labels(), affinity) {
            (Some(assign), Some(affinity)) => {
                // never embed in more dimensions than clusters requested
                let n_components = match assign {
                    AssignLabels::Discretize => k,
                    _ => self.n_components.min(k).min(x.n_rows()),
                };
                let out = spectral_clustering(affinity, k, Some(n_components), assign, seed)?;
                (out.labels, out.medoid_indices)
            }
            _ => {
                let mut model = KMedoids::new(k).with_seed(seed);
                model.fit(x)?;
                (
                    model.labels().map(<[usize]>::to_vec).unwrap_or_default(),
                    model.medoid_indices().map(<[usize]>::to_vec),
                )
            }
        };

        let mut sizes = vec![0usize; k];
        for &label in &labels {
            if label >= k {
                return Ok(None);
            }
            sizes[label] += 1;
        }
        if labels.len() != x.n_rows() || sizes.contains(&0) {
            return Ok(None);
        }

        let medoids = match medoids {
            Some(m) if m.iter().enumerate().all(|(c, &i)| labels[i] == c) => m,
            _ => central_rows(x, &labels, k),
        };
        Ok(Some(Candidate { labels, medoids }))
    }
}

/// For each cluster, the member row minimizing the summed distance to the other members.
fn central_rows(x: &Matrix<f64>, labels: &[usize], k: usize) -> Vec<usize> {
    (0..k)
        .map(|c| {
            let members: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == c).collect();
            let mut best = members[0];
            let mut best_cost = f64::INFINITY;
            for &i in &members {
                let cost: f64 = members
                    .iter()
                    .map(|&j| squared_euclidean(x.row(i), x.row(j)).sqrt())
                    .sum();
                if cost < best_cost {
                    best_cost = cost;
                    best = i;
                }
            }
            best
        })
        .collect()
}

impl ModelSelector for Pamk {
    fn select(
        &self,
        table: &ObservationTable,
        k_range: RangeInclusive<usize>,
        seed: Option<u64>,
    ) -> Result<Selection> {
        self.validate()?;
        let n = table.n_rows();
        let (k_min, k_max) = (*k_range.start(), *k_range.end());
        if k_min == 0 || k_min > k_max || k_max > n {
            return Err(DivclustError::invalid_hyperparameter(
                "k_range",
                format!("{k_min}..={k_max}"),
                format!("1 <= start <= end <= n_samples ({n})"),
            ));
        }
        if k_max < 2 {
            return Ok(Selection::single());
        }

        let x = table.features();
        let affinity = match self.method.assign_labels() {
            Some(_) => {
                let params = AffinityParams {
                    gamma: self.gamma,
                    ..AffinityParams::default()
                };
                Some(affinity_matrix(x, Affinity::Rbf, &params)?)
            }
            None => None,
        };

        let mut best: Option<(usize, f64, Candidate)> = None;
        let mut two_clusters: Option<Vec<usize>> = None;
        for k in k_min.max(2)..=k_max {
            let Some(candidate) = self.partition(x, affinity.as_ref(), k, seed)? else {
                debug!(k, method = %self.method, "candidate produced an empty cluster, skipped");
                continue;
            };
            let score = silhouette_score(x, &candidate.labels);
            debug!(k, silhouette = score, "candidate scored");
            if k == 2 {
                two_clusters = Some(candidate.labels.clone());
            }
            if best.as_ref().map_or(true, |(_, s, _)| score > *s) {
                best = Some((k, score, candidate));
            }
        }

        // k = 2 is always a candidate here; without a usable 2-cluster
        // solution there is nothing to test against.
        if k_min == 1 {
            let Some(labels) = two_clusters else {
                return Ok(Selection::single());
            };
            let test = duda_hart_test(x, &labels, self.alpha);
            debug!(
                dh = test.dh,
                critical = test.critical,
                p_value = test.p_value,
                "Duda-Hart test"
            );
            if test.single_cluster {
                return Ok(Selection::single());
            }
        }

        let Some((k, _, candidate)) = best else {
            return Err(DivclustError::invalid_input(format!(
                "no k in {k_min}..={k_max} produced a partition without empty clusters"
            )));
        };

        let ids = table.ids();
        Ok(Selection {
            n_clusters: k,
            assignments: ids.iter().cloned().zip(candidate.labels).collect(),
            medoids: candidate.medoids.iter().map(|&i| ids[i].clone()).collect(),
        })
    }
}
