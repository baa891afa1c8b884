//! Property-based tests using proptest.
//!
//! These tests verify invariants of the clustering building blocks and of
//! the divisive tree.

use divclust::cluster::discretize;
use divclust::metrics::silhouette_score;
use divclust::model_selection::ClusterMethod;
use divclust::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;

// Strategy for generating small matrices
fn matrix_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Matrix<f64>> {
    proptest::collection::vec(-100.0f64..100.0, rows * cols).prop_map(move |data| {
        Matrix::from_vec(rows, cols, data).expect("Test data should be valid")
    })
}

fn table_strategy() -> impl Strategy<Value = ObservationTable> {
    (1usize..24).prop_flat_map(|rows| {
        matrix_strategy(rows, 2).prop_map(move |x| {
            let ids = (0..rows).map(|i| format!("id{i}")).collect();
            ObservationTable::from_matrix(ids, x).expect("Test data should be valid")
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn leaves_partition_the_input(table in table_strategy(), seed in 0u64..1000) {
        let config = TreeConfig::new().with_method(ClusterMethod::Pam).with_random_state(seed);
        let tree = TreeBuilder::new(config).build(&table).expect("build succeeds");

        let mut seen = HashSet::new();
        for leaf in tree.leaves() {
            for id in leaf.row_ids().expect("leaf has rows") {
                prop_assert!(seen.insert(id.clone()), "row {} in two leaves", id);
            }
        }
        prop_assert_eq!(seen.len(), table.n_rows());
    }

    #[test]
    fn level_queries_report_ancestors(table in table_strategy(), seed in 0u64..1000) {
        let config = TreeConfig::new().with_method(ClusterMethod::Pam).with_random_state(seed);
        let tree = TreeBuilder::new(config).build(&table).expect("build succeeds");

        for level in 0..tree.num_levels() {
            let clusters = tree.get_clusters(Some(level));
            prop_assert_eq!(clusters.len(), table.n_rows());
            for a in clusters {
                let cluster = tree.node(a.cluster).expect("cluster node exists");
                prop_assert!(cluster.depth() <= level);
            }
        }
    }

    #[test]
    fn builds_are_reproducible(table in table_strategy(), seed in 0u64..1000) {
        let config = TreeConfig::new().with_method(ClusterMethod::Pam).with_random_state(seed);
        let a = TreeBuilder::new(config.clone()).build(&table).expect("build succeeds");
        let b = TreeBuilder::new(config).build(&table).expect("build succeeds");
        prop_assert_eq!(a.get_clusters(None), b.get_clusters(None));
        prop_assert_eq!(a.medoids(), b.medoids());
    }

    #[test]
    fn kmedoids_labels_and_medoids_are_valid(x in matrix_strategy(12, 3), k in 1usize..6, seed in 0u64..1000) {
        let mut model = KMedoids::new(k).with_random_state(seed);
        model.fit(&x).expect("fit succeeds");

        let labels = model.labels().expect("fitted");
        prop_assert!(labels.iter().all(|&l| l < k));

        let medoids: HashSet<usize> = model.medoid_indices().expect("fitted").iter().copied().collect();
        prop_assert_eq!(medoids.len(), k);
        prop_assert!(model.inertia() >= 0.0);
    }

    #[test]
    fn silhouette_is_bounded(x in matrix_strategy(10, 2), labels in proptest::collection::vec(0usize..3, 10)) {
        let s = silhouette_score(&x, &labels);
        prop_assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&s));
    }

    #[test]
    fn discretize_labels_stay_below_dimension(x in matrix_strategy(9, 3), seed in 0u64..1000) {
        let labels = discretize(&x, 30, 20, Some(seed)).expect("discretization converges");
        prop_assert_eq!(labels.len(), 9);
        prop_assert!(labels.iter().all(|&l| l < 3));
    }

    #[test]
    fn scaler_output_is_centered(x in matrix_strategy(8, 3)) {
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).expect("fit succeeds");
        for j in 0..3 {
            let mean: f64 = scaled.column(j).iter().sum::<f64>() / 8.0;
            prop_assert!(mean.abs() < 1e-9);
        }
    }
}
