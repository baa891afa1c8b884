//! Clustering quality metrics.
//!
//! Silhouette width drives automatic k-selection; within-cluster sums of
//! squares feed the Duda–Hart split test.

use crate::primitives::{squared_euclidean, Matrix};

/// Computes the inertia (sum of squared distances to assigned centers).
///
/// Inertia = Σ ||x - center||²
///
/// # Examples
///
/// ```
/// use divclust::metrics::inertia;
/// use divclust::primitives::Matrix;
///
/// let data = Matrix::from_vec(4, 2, vec![
///     0.0, 0.0,
///     1.0, 0.0,
///     0.0, 1.0,
///     1.0, 1.0,
/// ]).expect("Matrix dimensions and data length are valid");
/// let centers = Matrix::from_vec(1, 2, vec![0.5, 0.5]).expect("Matrix dimensions and data length are valid");
/// let score = inertia(&data, &centers, &[0, 0, 0, 0]);
/// assert!((score - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn inertia(data: &Matrix<f64>, centers: &Matrix<f64>, labels: &[usize]) -> f64 {
    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| squared_euclidean(data.row(i), centers.row(label)))
        .sum()
}

/// Sum over clusters of squared distances to the cluster mean.
///
/// With all labels equal this is the total sum of squares of `data`.
#[must_use]
pub fn within_cluster_sum_of_squares(data: &Matrix<f64>, labels: &[usize]) -> f64 {
    let (_, n_features) = data.shape();
    let n_clusters = labels.iter().max().map_or(0, |&m| m + 1);

    let mut sums = vec![0.0; n_clusters * n_features];
    let mut counts = vec![0usize; n_clusters];
    for (i, &label) in labels.iter().enumerate() {
        counts[label] += 1;
        for (j, v) in data.row(i).iter().enumerate() {
            sums[label * n_features + j] += v;
        }
    }
    for (k, &count) in counts.iter().enumerate() {
        if count > 0 {
            for s in &mut sums[k * n_features..(k + 1) * n_features] {
                *s /= count as f64;
            }
        }
    }

    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            squared_euclidean(
                data.row(i),
                &sums[label * n_features..(label + 1) * n_features],
            )
        })
        .sum()
}

/// Computes the silhouette coefficient for a single point.
fn silhouette_coefficient(a_i: f64, b_i: f64) -> f64 {
    let max_ab = a_i.max(b_i);
    if max_ab == 0.0 {
        0.0
    } else {
        (b_i - a_i) / max_ab
    }
}

/// Computes the average silhouette width of a labelling.
///
/// s(i) = (b(i) - a(i)) / max(a(i), b(i))
///
/// where a(i) is the mean Euclidean distance to the other members of the
/// point's cluster and b(i) the smallest mean distance to another cluster.
/// Points in singleton clusters score 0. Labellings with fewer than two
/// clusters score 0.
///
/// # Examples
///
/// ```
/// use divclust::metrics::silhouette_score;
/// use divclust::primitives::Matrix;
///
/// let data = Matrix::from_vec(4, 2, vec![
///     0.0, 0.0,
///     0.1, 0.1,
///     5.0, 5.0,
///     5.1, 5.1,
/// ]).expect("Matrix dimensions and data length are valid");
/// let score = silhouette_score(&data, &[0, 0, 1, 1]);
/// assert!(score > 0.5);
/// ```
#[must_use]
pub fn silhouette_score(data: &Matrix<f64>, labels: &[usize]) -> f64 {
    let n_samples = data.n_rows();
    if n_samples < 2 {
        return 0.0;
    }

    let n_clusters = labels.iter().max().map_or(0, |&m| m + 1);
    let mut sizes = vec![0usize; n_clusters];
    for &label in labels {
        sizes[label] += 1;
    }
    if sizes.iter().filter(|&&s| s > 0).count() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut dist_sums = vec![0.0; n_clusters];
    for i in 0..n_samples {
        dist_sums.iter_mut().for_each(|d| *d = 0.0);
        for j in 0..n_samples {
            if i != j {
                dist_sums[labels[j]] += squared_euclidean(data.row(i), data.row(j)).sqrt();
            }
        }

        let own = labels[i];
        if sizes[own] <= 1 {
            continue;
        }
        let a_i = dist_sums[own] / (sizes[own] - 1) as f64;
        let b_i = (0..n_clusters)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| dist_sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);
        total += silhouette_coefficient(a_i, b_i);
    }

    total / n_samples as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inertia_zero_when_on_centers() {
        let data = Matrix::from_vec(2, 1, vec![1.0, 5.0]).expect("valid");
        let centers = Matrix::from_vec(2, 1, vec![1.0, 5.0]).expect("valid");
        assert_eq!(inertia(&data, &centers, &[0, 1]), 0.0);
    }

    #[test]
    fn test_within_ss_single_cluster_is_total_ss() {
        // mean 2, deviations -1, 0, 1
        let data = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("valid");
        assert!((within_cluster_sum_of_squares(&data, &[0, 0, 0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_within_ss_two_clusters() {
        let data = Matrix::from_vec(4, 1, vec![0.0, 2.0, 10.0, 12.0]).expect("valid");
        assert!((within_cluster_sum_of_squares(&data, &[0, 0, 1, 1]) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_silhouette_well_separated_close_to_one() {
        let data = Matrix::from_vec(4, 1, vec![0.0, 0.01, 100.0, 100.01]).expect("valid");
        let s = silhouette_score(&data, &[0, 0, 1, 1]);
        assert!(s > 0.99, "silhouette = {s}");
    }

    #[test]
    fn test_silhouette_bad_labelling_negative() {
        let data = Matrix::from_vec(4, 1, vec![0.0, 0.01, 100.0, 100.01]).expect("valid");
        let s = silhouette_score(&data, &[0, 1, 0, 1]);
        assert!(s < 0.0, "silhouette = {s}");
    }

    #[test]
    fn test_silhouette_degenerate() {
        let data = Matrix::from_vec(3, 1, vec![0.0, 1.0, 2.0]).expect("valid");
        assert_eq!(silhouette_score(&data, &[0, 0, 0]), 0.0);
        let one = Matrix::from_vec(1, 1, vec![0.0]).expect("valid");
        assert_eq!(silhouette_score(&one, &[0]), 0.0);
    }

    #[test]
    fn test_silhouette_singleton_scores_zero() {
        // The singleton contributes 0; the pair scores (b - a) / b each.
        let data = Matrix::from_vec(3, 1, vec![0.0, 1.0, 10.0]).expect("valid");
        let s = silhouette_score(&data, &[0, 0, 1]);
        let s0 = (10.0 - 1.0) / 10.0;
        let s1 = (9.0 - 1.0) / 9.0;
        assert!((s - (s0 + s1) / 3.0).abs() < 1e-12);
    }
}
