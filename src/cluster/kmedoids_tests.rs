pub(crate) use super::*;

fn two_triples() -> Matrix<f64> {
    Matrix::from_vec(
        6,
        2,
        vec![1.0, 1.0, 2.0, 1.0, 1.0, 0.0, 4.0, 7.0, 3.0, 5.0, 3.0, 6.0],
    )
    .expect("valid matrix")
}

fn assert_splits_triples(model: &KMedoids) {
    let labels = model.labels().expect("fitted");
    assert_eq!(labels.len(), 6);
    assert_eq!(labels[0], labels[1]);
    assert_eq!(labels[1], labels[2]);
    assert_eq!(labels[3], labels[4]);
    assert_eq!(labels[4], labels[5]);
    assert_ne!(labels[0], labels[3]);

    let medoids = model.medoid_indices().expect("fitted");
    assert_eq!(medoids.len(), 2);
    for (k, &m) in medoids.iter().enumerate() {
        // each medoid lies in the triple it labels
        assert_eq!(labels[m], k);
    }
}

#[test]
fn test_new() {
    let km = KMedoids::new(3);
    assert_eq!(km.n_clusters(), 3);
    assert!(!km.is_fitted());
    assert!(km.labels().is_none());
}

#[test]
fn test_default() {
    assert_eq!(KMedoids::default().n_clusters(), 8);
}

#[test]
fn test_two_triples_all_inits() {
    let data = two_triples();
    for init in [
        KMedoidsInit::Build,
        KMedoidsInit::KMedoidsPlusPlus,
        KMedoidsInit::Random,
    ] {
        for seed in 0..5 {
            let mut km = KMedoids::new(2).with_init(init).with_random_state(seed);
            km.fit(&data).expect("fit succeeds");
            assert_splits_triples(&km);
        }
    }
}

#[test]
fn test_two_triples_all_metrics() {
    let data = two_triples();
    for metric in [
        Dissimilarity::SquaredEuclidean,
        Dissimilarity::Euclidean,
        Dissimilarity::Manhattan,
    ] {
        let mut km = KMedoids::new(2).with_metric(metric).with_random_state(7);
        km.fit(&data).expect("fit succeeds");
        assert_splits_triples(&km);
    }
}

#[test]
fn test_build_picks_central_medoids() {
    let data = two_triples();
    let mut km = KMedoids::new(2).with_init(KMedoidsInit::Build);
    km.fit(&data).expect("fit succeeds");
    let mut medoids = km.medoid_indices().expect("fitted").to_vec();
    medoids.sort_unstable();
    // (1,1) is central in the first triple, (3,6) in the second
    assert_eq!(medoids, vec![0, 5]);
    // squared costs: 1 + 1 around (1,1), 2 + 1 around (3,6)
    let expected = 5.0;
    assert!((km.inertia() - expected).abs() < 1e-12, "inertia = {}", km.inertia());
}

#[test]
fn test_single_cluster() {
    let data = two_triples();
    let mut km = KMedoids::new(1).with_random_state(3);
    km.fit(&data).expect("fit succeeds");
    assert!(km.labels().expect("fitted").iter().all(|&l| l == 0));
    assert_eq!(km.medoid_indices().expect("fitted").len(), 1);
}

#[test]
fn test_single_cluster_medoid_is_most_central() {
    // squared costs: row 3 -> 63, row 2 -> 70, row 1 -> 87
    let data = Matrix::from_vec(5, 1, vec![0.0, 1.0, 2.0, 3.0, 10.0]).expect("valid");
    let mut km = KMedoids::new(1).with_random_state(11);
    km.fit(&data).expect("fit succeeds");
    assert_eq!(km.medoid_indices().expect("fitted"), &[3]);
}

#[test]
fn test_k_equals_n() {
    let data = Matrix::from_vec(3, 1, vec![0.0, 5.0, 10.0]).expect("valid");
    let mut km = KMedoids::new(3).with_random_state(1);
    km.fit(&data).expect("fit succeeds");
    let mut labels = km.labels().expect("fitted").to_vec();
    labels.sort_unstable();
    assert_eq!(labels, vec![0, 1, 2]);
    assert_eq!(km.inertia(), 0.0);
}

#[test]
fn test_medoids_are_distinct_with_duplicate_rows() {
    let data = Matrix::from_vec(4, 1, vec![1.0, 1.0, 1.0, 1.0]).expect("valid");
    for init in [
        KMedoidsInit::Build,
        KMedoidsInit::KMedoidsPlusPlus,
        KMedoidsInit::Random,
    ] {
        let mut km = KMedoids::new(3).with_init(init).with_random_state(5);
        km.fit(&data).expect("fit succeeds");
        let mut medoids = km.medoid_indices().expect("fitted").to_vec();
        medoids.sort_unstable();
        medoids.dedup();
        assert_eq!(medoids.len(), 3);
        // equidistant rows go to the first medoid
        assert!(km.labels().expect("fitted").iter().all(|&l| l == 0));
    }
}

#[test]
fn test_invalid_cluster_counts() {
    let data = two_triples();
    assert!(matches!(
        KMedoids::new(0).fit(&data),
        Err(DivclustError::InvalidHyperparameter { .. })
    ));
    assert!(matches!(
        KMedoids::new(7).fit(&data),
        Err(DivclustError::InvalidHyperparameter { .. })
    ));
}

#[test]
fn test_empty_data_error() {
    let data = Matrix::zeros(0, 2);
    assert!(KMedoids::new(1).fit(&data).is_err());
}

#[test]
fn test_max_iter_caps_swaps() {
    let data = two_triples();
    let mut km = KMedoids::new(2)
        .with_init(KMedoidsInit::Random)
        .with_random_state(2)
        .with_max_iter(1);
    km.fit(&data).expect("fit succeeds");
    assert_eq!(km.n_iter(), 1);
    assert_eq!(km.labels().expect("fitted").len(), 6);
}

#[test]
fn test_reproducible_with_seed() {
    let data = two_triples();
    let mut a = KMedoids::new(2).with_random_state(42);
    let mut b = KMedoids::new(2).with_random_state(42);
    a.fit(&data).expect("fit succeeds");
    b.fit(&data).expect("fit succeeds");
    assert_eq!(a.medoid_indices(), b.medoid_indices());
    assert_eq!(a.labels(), b.labels());
}

#[test]
fn test_predict_new_points() {
    let data = two_triples();
    let mut km = KMedoids::new(2).with_random_state(0);
    km.fit(&data).expect("fit succeeds");
    let train_labels = km.labels().expect("fitted").to_vec();

    let new = Matrix::from_vec(2, 2, vec![1.5, 0.5, 3.5, 6.5]).expect("valid");
    let labels = km.predict(&new);
    assert_eq!(labels[0], train_labels[0]);
    assert_eq!(labels[1], train_labels[3]);
}

#[test]
fn test_cluster_centers_are_medoid_rows() {
    let data = two_triples();
    let mut km = KMedoids::new(2).with_random_state(9);
    km.fit(&data).expect("fit succeeds");
    let centers = km.cluster_centers().expect("fitted");
    for (k, &m) in km.medoid_indices().expect("fitted").iter().enumerate() {
        assert_eq!(centers.row(k), data.row(m));
    }
}

#[test]
fn test_dissimilarity_values() {
    let a = [0.0, 0.0];
    let b = [3.0, 4.0];
    assert_eq!(Dissimilarity::SquaredEuclidean.between(&a, &b), 25.0);
    assert_eq!(Dissimilarity::Euclidean.between(&a, &b), 5.0);
    assert_eq!(Dissimilarity::Manhattan.between(&a, &b), 7.0);
}
