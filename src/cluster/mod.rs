//! Clustering algorithms.
//!
//! - [`KMedoids`]: PAM with BUILD, k-medoids++ or random initialization
//! - [`KMeans`]: Lloyd's algorithm with k-means++ initialization
//! - [`SpectralClustering`]: normalized-Laplacian embedding followed by
//!   k-medoids, k-means or [`Discretizer`] label assignment

mod affinity;
mod discretize;
mod embedding;
mod kmeans;
mod kmedoids;
mod spectral;

pub use affinity::{affinity_matrix, Affinity, AffinityParams};
pub use discretize::{discretize, Discretization, Discretizer};
pub use embedding::spectral_embedding;
pub use kmeans::KMeans;
pub use kmedoids::{Dissimilarity, KMedoids, KMedoidsInit};
pub use spectral::{spectral_clustering, AssignLabels, SpectralClustering, SpectralOutput};
