pub(crate) use super::*;

fn two_blobs() -> Matrix<f64> {
    Matrix::from_vec(
        8,
        2,
        vec![
            0.0, 0.0, 0.2, 0.1, 0.1, 0.3, 0.3, 0.2, //
            6.0, 6.0, 6.2, 6.1, 6.1, 6.3, 6.3, 6.2,
        ],
    )
    .expect("valid")
}

fn block_affinity() -> Matrix<f64> {
    let n = 6;
    let mut a = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            a.set(i, j, if (i < 3) == (j < 3) { 1.0 } else { 0.01 });
        }
    }
    a
}

fn assert_two_groups(labels: &[usize], split: usize) {
    assert!(labels[..split].iter().all(|&l| l == labels[0]));
    assert!(labels[split..].iter().all(|&l| l == labels[split]));
    assert_ne!(labels[0], labels[split]);
}

#[test]
fn test_assign_labels_parsing() {
    assert_eq!("kmedoids".parse::<AssignLabels>().expect("ok"), AssignLabels::KMedoids);
    assert_eq!("kmeans".parse::<AssignLabels>().expect("ok"), AssignLabels::KMeans);
    assert_eq!(
        "discretize".parse::<AssignLabels>().expect("ok"),
        AssignLabels::Discretize
    );
    assert_eq!(AssignLabels::KMeans.to_string(), "kmeans");
}

#[test]
fn test_invalid_assign_labels_rejected() {
    let err = "agglomerative".parse::<AssignLabels>().unwrap_err();
    assert!(matches!(err, DivclustError::InvalidHyperparameter { ref param, .. } if param == "assign_labels"));
}

#[test]
fn test_every_strategy_splits_blocks() {
    for strategy in [AssignLabels::KMedoids, AssignLabels::KMeans, AssignLabels::Discretize] {
        let out = spectral_clustering(&block_affinity(), 2, None, strategy, Some(0)).expect("clusters");
        assert_two_groups(&out.labels, 3);
        assert_eq!(out.embedding.shape(), (6, 2));
    }
}

#[test]
fn test_centers_per_strategy() {
    let a = block_affinity();
    let medoids = spectral_clustering(&a, 2, None, AssignLabels::KMedoids, Some(1)).expect("ok");
    let centers = medoids.centers.expect("medoid centers");
    let indices = medoids.medoid_indices.expect("medoid indices");
    for (k, &m) in indices.iter().enumerate() {
        assert_eq!(centers.row(k), medoids.embedding.row(m));
    }

    let means = spectral_clustering(&a, 2, None, AssignLabels::KMeans, Some(1)).expect("ok");
    assert_eq!(means.centers.expect("centroids").shape(), (2, 2));
    assert!(means.medoid_indices.is_none());

    let disc = spectral_clustering(&a, 2, None, AssignLabels::Discretize, Some(1)).expect("ok");
    assert!(disc.centers.is_none());
}

#[test]
fn test_n_components_override() {
    let out = spectral_clustering(&block_affinity(), 2, Some(4), AssignLabels::KMedoids, Some(0))
        .expect("ok");
    assert_eq!(out.embedding.n_cols(), 4);
    assert_two_groups(&out.labels, 3);
}

#[test]
fn test_invalid_cluster_count() {
    let a = block_affinity();
    assert!(matches!(
        spectral_clustering(&a, 0, None, AssignLabels::KMedoids, None),
        Err(DivclustError::InvalidHyperparameter { .. })
    ));
    assert!(matches!(
        spectral_clustering(&a, 7, None, AssignLabels::KMedoids, None),
        Err(DivclustError::InvalidHyperparameter { .. })
    ));
}

#[test]
fn test_non_square_affinity_rejected() {
    let a = Matrix::zeros(3, 2);
    assert!(matches!(
        spectral_clustering(&a, 1, None, AssignLabels::KMedoids, None),
        Err(DivclustError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_estimator_rbf() {
    let data = two_blobs();
    let mut sc = SpectralClustering::new(2).with_gamma(0.5).with_random_state(3);
    assert!(!sc.is_fitted());
    sc.fit(&data).expect("fit succeeds");

    assert_two_groups(sc.labels().expect("fitted"), 4);
    assert_eq!(sc.affinity_matrix().expect("fitted").shape(), (8, 8));
    assert_eq!(sc.embedding().expect("fitted").shape(), (8, 2));
    assert_eq!(sc.medoid_indices().expect("kmedoids").len(), 2);
    assert_eq!(sc.predict(&data), sc.labels().expect("fitted").to_vec());
}

#[test]
fn test_estimator_nearest_neighbors() {
    let data = two_blobs();
    let mut sc = SpectralClustering::new(2)
        .with_affinity(Affinity::NearestNeighbors)
        .with_n_neighbors(3)
        .with_assign_labels(AssignLabels::KMeans)
        .with_random_state(0);
    sc.fit(&data).expect("fit succeeds");
    assert_two_groups(sc.labels().expect("fitted"), 4);
    assert!(sc.medoid_indices().is_none());
}

#[test]
fn test_estimator_precomputed() {
    let mut sc = SpectralClustering::new(2)
        .with_affinity(Affinity::Precomputed)
        .with_assign_labels(AssignLabels::Discretize)
        .with_random_state(0);
    sc.fit(&block_affinity()).expect("fit succeeds");
    assert_two_groups(sc.labels().expect("fitted"), 3);
    assert!(sc.centers().is_none());
}

#[test]
fn test_estimator_reproducible() {
    let data = two_blobs();
    let mut a = SpectralClustering::new(2).with_random_state(9);
    let mut b = SpectralClustering::new(2).with_random_state(9);
    a.fit(&data).expect("fit");
    b.fit(&data).expect("fit");
    assert_eq!(a.labels(), b.labels());
}
