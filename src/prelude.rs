//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use divclust::prelude::*;
//! ```

pub use crate::cluster::{
    AssignLabels, Affinity, Discretizer, Dissimilarity, KMeans, KMedoids, KMedoidsInit,
    SpectralClustering,
};
pub use crate::data::ObservationTable;
pub use crate::error::DivclustError;
pub use crate::metrics::{inertia, silhouette_score};
pub use crate::model_selection::{ClusterMethod, ModelSelector, Pamk, Selection};
pub use crate::preprocessing::StandardScaler;
pub use crate::primitives::Matrix;
pub use crate::traits::{Transformer, UnsupervisedEstimator};
pub use crate::tree::{ClusterAssignment, ClusterTree, TreeBuilder, TreeConfig};
