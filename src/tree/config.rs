//! Tree building configuration.

use crate::error::{DivclustError, Result};
use crate::model_selection::ClusterMethod;
use serde::{Deserialize, Serialize};

/// Settings of a divisive tree build.
///
/// Missing fields take their defaults when deserializing, so a JSON file
/// only needs the values it overrides.
///
/// # Examples
///
/// ```
/// use divclust::model_selection::ClusterMethod;
/// use divclust::tree::TreeConfig;
///
/// let config: TreeConfig = serde_json::from_str(r#"{"max_k": 4, "method": "pam"}"#)
///     .expect("valid json");
/// assert_eq!(config.max_k, 4);
/// assert_eq!(config.method, ClusterMethod::Pam);
/// assert_eq!(config.min_split_rows, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Largest number of children per split.
    pub max_k: usize,
    /// Clustering used by the model-selection oracle.
    pub method: ClusterMethod,
    /// Seed threaded into every stochastic step; `None` draws from entropy.
    pub random_state: Option<u64>,
    /// Duda–Hart significance level.
    pub alpha: f64,
    /// Spectral embedding dimension.
    pub n_components: usize,
    /// Nodes with fewer rows never split.
    pub min_split_rows: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_k: 10,
            method: ClusterMethod::default(),
            random_state: None,
            alpha: 1e-3,
            n_components: 10,
            min_split_rows: 3,
        }
    }
}

impl TreeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest number of children per split.
    #[must_use]
    pub fn with_max_k(mut self, max_k: usize) -> Self {
        self.max_k = max_k;
        self
    }

    /// Sets the oracle's clustering method.
    #[must_use]
    pub fn with_method(mut self, method: ClusterMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Sets the Duda–Hart significance level.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the spectral embedding dimension.
    #[must_use]
    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    /// Sets the minimum row count of a splittable node.
    #[must_use]
    pub fn with_min_split_rows(mut self, min_split_rows: usize) -> Self {
        self.min_split_rows = min_split_rows;
        self
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// `InvalidHyperparameter` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.max_k == 0 {
            return Err(DivclustError::invalid_hyperparameter("max_k", self.max_k, "max_k >= 1"));
        }
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
        // a 2-row node has no candidate k other than 1
        if self.min_split_rows < 3 {
            return Err(DivclustError::invalid_hyperparameter(
                "min_split_rows",
                self.min_split_rows,
                "min_split_rows >= 3",
            ));
        }
        Ok(())
    }
}
