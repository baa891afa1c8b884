//! divclust: divisive hierarchical clustering in pure Rust.
//!
//! A table of identified observations is standardized once and then split
//! top-down. Each node asks a model-selection oracle how many clusters its
//! rows form (spectral clustering or PAM for every candidate k, silhouette
//! width to pick k, a Duda–Hart test to decide whether to split at all) and
//! becomes the parent of one child per cluster. The finished tree reports a
//! cluster id for every row at any depth.
//!
//! # Quick Start
//!
//! ```
//! use divclust::prelude::*;
//!
//! let mut values = Vec::new();
//! for i in 0..40 {
//!     let offset = if i < 20 { 0.0 } else { 8.0 };
//!     values.push(offset + (i % 5) as f64 * 0.1);
//!     values.push(offset + ((i / 5) % 4) as f64 * 0.1);
//! }
//! let ids = (0..40).map(|i| format!("obs{i}")).collect();
//! let features = Matrix::from_vec(40, 2, values).unwrap();
//! let table = ObservationTable::from_matrix(ids, features).unwrap();
//!
//! let config = TreeConfig::new()
//!     .with_method(ClusterMethod::Pam)
//!     .with_random_state(0);
//! let tree = TreeBuilder::new(config).build(&table).unwrap();
//!
//! for assignment in tree.get_clusters(None) {
//!     assert!(tree.node(assignment.cluster).is_some());
//! }
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Row-major [`Matrix`](primitives::Matrix)
//! - [`data`]: Observation tables keyed by row id
//! - [`preprocessing`]: Feature standardization
//! - [`cluster`]: K-Medoids, K-Means, spectral embedding, discretization and spectral clustering
//! - [`model_selection`]: Choosing k (silhouette + Duda–Hart)
//! - [`tree`]: The divisive tree builder and its query API
//! - [`metrics`]: Silhouette width, inertia and within-cluster sums of squares
//! - [`stats`]: Normal distribution helpers

pub mod cluster;
pub mod data;
pub mod error;
pub mod metrics;
pub mod model_selection;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod stats;
pub mod traits;
pub mod tree;

pub use error::{DivclustError, Result};
pub use traits::{Transformer, UnsupervisedEstimator};
