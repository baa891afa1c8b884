//! Subcommand implementations and the tree options they share.

pub(crate) mod fit;
pub(crate) mod levels;

use crate::error::{CliError, Result};
use crate::loader;
use clap::{Args, ValueEnum};
use divclust::model_selection::ClusterMethod;
use divclust::tree::{ClusterTree, TreeBuilder, TreeConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options controlling how the tree is built.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct TreeOptions {
    /// JSON file holding a tree configuration; flags override its fields
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Largest number of clusters considered per split
    #[arg(long)]
    pub max_k: Option<usize>,

    /// Clustering run for each candidate k
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Significance level of the Duda-Hart test
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Eigenvectors kept by the spectral methods
    #[arg(long)]
    pub n_components: Option<usize>,
}

/// `--method` values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum MethodArg {
    /// k-medoids on the standardized features
    Pam,
    /// Spectral embedding, then k-medoids
    SpectralPam,
    /// Spectral embedding, then k-means
    #[value(name = "spectral-kmeans")]
    SpectralKMeans,
    /// Spectral embedding, then discretization
    SpectralDiscretize,
}

impl From<MethodArg> for ClusterMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Pam => ClusterMethod::Pam,
            MethodArg::SpectralPam => ClusterMethod::SpectralPam,
            MethodArg::SpectralKMeans => ClusterMethod::SpectralKMeans,
            MethodArg::SpectralDiscretize => ClusterMethod::SpectralDiscretize,
        }
    }
}

impl TreeOptions {
    /// Config file (or defaults) with flag overrides applied.
    pub(crate) fn resolve(&self) -> Result<TreeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                loader::validate_path(path)?;
                serde_json::from_str(&std::fs::read_to_string(path)?)?
            }
            None => TreeConfig::new(),
        };

        if let Some(max_k) = self.max_k {
            config.max_k = max_k;
        }
        if let Some(method) = self.method {
            config.method = method.into();
        }
        if let Some(seed) = self.seed {
            config.random_state = Some(seed);
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(n_components) = self.n_components {
            config.n_components = n_components;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Loads `path` and builds its tree.
pub(crate) fn build_tree(path: &Path, options: &TreeOptions) -> Result<ClusterTree> {
    let config = options.resolve()?;
    let table = loader::load_table(path)?;
    info!(method = %config.method, max_k = config.max_k, "building tree for {}", path.display());

    TreeBuilder::new(config).build(&table).map_err(CliError::from)
}
