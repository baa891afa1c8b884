//! Divisive clustering trees.
//!
//! A [`TreeBuilder`] standardizes the observations once, then splits nodes
//! breadth-first: each node's rows are handed to a [`ModelSelector`], and an
//! answer of k > 1 creates k children holding the rows assigned to each
//! cluster. The resulting [`ClusterTree`] answers "which cluster is this row
//! in at depth L" for every level of the hierarchy.
//!
//! # Example
//!
//! ```
//! use divclust::prelude::*;
//!
//! // two groups of 16 rows, far apart
//! let mut values = Vec::new();
//! for i in 0..32 {
//!     let offset = if i < 16 { 0.0 } else { 10.0 };
//!     values.push(offset + (i % 4) as f64 * 0.1);
//!     values.push(offset + ((i / 4) % 4) as f64 * 0.1);
//! }
//! let ids = (0..32).map(|i| format!("row{i}")).collect();
//! let table = ObservationTable::from_matrix(ids, Matrix::from_vec(32, 2, values).unwrap())
//!     .expect("valid table");
//!
//! let config = TreeConfig::new()
//!     .with_method(ClusterMethod::Pam)
//!     .with_random_state(42);
//! let tree = TreeBuilder::new(config).build(&table).expect("build succeeds");
//!
//! let top = tree.get_clusters(Some(1));
//! assert_eq!(top.len(), 32);
//! assert_ne!(top[0].cluster, top[31].cluster);
//! ```

mod config;
mod node;

pub use config::TreeConfig;
pub use node::{ClusterAssignment, LevelIndex, MedoidRecord, TreeNode};

use crate::data::ObservationTable;
use crate::error::{DivclustError, Result};
use crate::model_selection::{ModelSelector, Pamk, Selection};
use crate::preprocessing::StandardScaler;
use crate::traits::Transformer;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info};

/// Builds a [`ClusterTree`] by recursive splitting.
#[derive(Debug, Clone)]
pub struct TreeBuilder<S = Pamk> {
    config: TreeConfig,
    selector: S,
}

impl TreeBuilder<Pamk> {
    /// Builder using [`Pamk`] configured from `config`.
    #[must_use]
    pub fn new(config: TreeConfig) -> Self {
        let selector = Pamk::new()
            .with_method(config.method)
            .with_alpha(config.alpha)
            .with_n_components(config.n_components);
        Self { config, selector }
    }
}

impl Default for TreeBuilder<Pamk> {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl<S: ModelSelector> TreeBuilder<S> {
    /// Builder using a custom model-selection oracle.
    #[must_use]
    pub fn with_selector(config: TreeConfig, selector: S) -> Self {
        Self { config, selector }
    }

    /// The build configuration.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The model-selection oracle.
    #[must_use]
    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Standardizes `table` and splits it into a tree.
    ///
    /// # Errors
    ///
    /// - `InvalidHyperparameter` for an invalid configuration
    /// - `InvalidInput` for a table without rows or features
    /// - `InvalidOutput` when the oracle breaks its contract
    /// - any error raised by the oracle
    pub fn build(&self, table: &ObservationTable) -> Result<ClusterTree> {
        self.config.validate()?;
        if table.is_empty() {
            return Err(DivclustError::invalid_input("Cannot build a tree from zero rows"));
        }
        if table.n_features() == 0 {
            return Err(DivclustError::invalid_input("Cannot build a tree without feature columns"));
        }

        let mut scaler = StandardScaler::new();
        let normalized = table.with_features(scaler.fit_transform(table.features())?)?;

        let mut nodes = vec![TreeNode::new(0, None, 0, normalized)];
        let mut levels = LevelIndex::default();
        levels.insert(0, 0);
        let mut medoids = Vec::new();
        let mut queue = VecDeque::from([0]);

        while let Some(id) = queue.pop_front() {
            let depth = nodes[id].depth;
            let Some(data) = nodes[id].data.as_ref() else {
                continue;
            };
            let n_rows = data.n_rows();
            if n_rows < self.config.min_split_rows {
                info!(node = id, rows = n_rows, "too few observations to split, node is a leaf");
                continue;
            }

            let k_max = (n_rows - 1).min(self.config.max_k);
            let selection = self.selector.select(data, 1..=k_max, self.config.random_state)?;
            validate_selection(&selection, data, k_max)?;

            if selection.is_single() {
                info!(node = id, rows = n_rows, "single cluster retained, node is a leaf");
                continue;
            }

            let children = partition(data, &selection);
            let k = children.len();
            for (child_data, medoid) in children.into_iter().zip(selection.medoids) {
                let child_id = nodes.len();
                debug!(node = child_id, parent = id, rows = child_data.n_rows(), %medoid, "child created");
                nodes.push(TreeNode::new(child_id, Some(id), depth + 1, child_data));
                nodes[id].children.push(child_id);
                levels.insert(child_id, depth + 1);
                medoids.push(MedoidRecord {
                    cluster: child_id,
                    id: medoid,
                });
                queue.push_back(child_id);
            }
            nodes[id].data = None;
            info!(node = id, depth, rows = n_rows, k, "node split");
        }

        let tree = ClusterTree {
            nodes,
            levels,
            medoids,
            scaler,
        };
        info!(
            nodes = tree.len(),
            leaves = tree.leaves().count(),
            levels = tree.num_levels(),
            "cluster tree built"
        );
        Ok(tree)
    }
}

/// Rejects oracle answers that break the [`ModelSelector`] contract.
fn validate_selection(selection: &Selection, data: &ObservationTable, k_max: usize) -> Result<()> {
    let k = selection.n_clusters;
    if k == 0 || k > k_max {
        return Err(DivclustError::invalid_output(format!(
            "selector chose {k} clusters outside 1..={k_max}"
        )));
    }
    if k == 1 {
        return Ok(());
    }

    if selection.medoids.len() != k {
        return Err(DivclustError::invalid_output(format!(
            "selector returned {} medoids for {k} clusters",
            selection.medoids.len()
        )));
    }

    let rows: HashSet<&str> = data.ids().iter().map(String::as_str).collect();
    if let Some(medoid) = selection.medoids.iter().find(|m| !rows.contains(m.as_str())) {
        return Err(DivclustError::invalid_output(format!(
            "medoid '{medoid}' is not a row of the node"
        )));
    }

    let mut seen = HashSet::with_capacity(rows.len());
    let mut sizes = vec![0usize; k];
    for (id, label) in &selection.assignments {
        if !rows.contains(id.as_str()) {
            return Err(DivclustError::invalid_output(format!(
                "assignment for unknown row '{id}'"
            )));
        }
        if !seen.insert(id.as_str()) {
            return Err(DivclustError::invalid_output(format!("row '{id}' assigned twice")));
        }
        if *label >= k {
            return Err(DivclustError::invalid_output(format!(
                "row '{id}' assigned to cluster {label}, expected < {k}"
            )));
        }
        sizes[*label] += 1;
    }
    if seen.len() != rows.len() {
        return Err(DivclustError::invalid_output(format!(
            "{} of {} rows left unassigned",
            rows.len() - seen.len(),
            rows.len()
        )));
    }
    if let Some(empty) = sizes.iter().position(|&s| s == 0) {
        return Err(DivclustError::invalid_output(format!("cluster {empty} has no rows")));
    }
    Ok(())
}

/// Child tables of a validated split, one per cluster, selected by id membership.
fn partition(data: &ObservationTable, selection: &Selection) -> Vec<ObservationTable> {
    let mut members: Vec<HashSet<&str>> = vec![HashSet::new(); selection.n_clusters];
    for (id, label) in &selection.assignments {
        members[*label].insert(id.as_str());
    }
    members.iter().map(|m| data.select_ids(m)).collect()
}

/// A divisive clustering hierarchy.
///
/// Nodes live in an arena indexed by id; the root is node 0 and children
/// always have larger ids than their parent.
#[derive(Debug, Clone)]
pub struct ClusterTree {
    nodes: Vec<TreeNode>,
    levels: LevelIndex,
    medoids: Vec<MedoidRecord>,
    scaler: StandardScaler,
}

impl ClusterTree {
    /// Cluster id of every row at depth `level` (deepest level when `None`).
    ///
    /// Leaves are visited in ascending id order; a leaf deeper than `level`
    /// reports its ancestor at that depth, a shallower leaf reports itself.
    #[must_use]
    pub fn get_clusters(&self, level: Option<usize>) -> Vec<ClusterAssignment> {
        let level = level.unwrap_or_else(|| self.num_levels().saturating_sub(1));
        let mut out = Vec::new();
        for leaf in self.leaves() {
            let mut node = leaf;
            while node.depth > level {
                match node.parent {
                    Some(parent) => node = &self.nodes[parent],
                    None => break,
                }
            }
            for id in leaf.row_ids().unwrap_or_default() {
                out.push(ClusterAssignment {
                    id: id.clone(),
                    cluster: node.id,
                });
            }
        }
        out
    }

    /// Cluster ids keyed by row id at depth `level`.
    #[must_use]
    pub fn cluster_map(&self, level: Option<usize>) -> HashMap<String, usize> {
        self.get_clusters(level)
            .into_iter()
            .map(|a| (a.id, a.cluster))
            .collect()
    }

    /// Number of distinct depths.
    #[must_use]
    pub fn num_levels(&self) -> usize {
        self.levels.num_levels()
    }

    /// All nodes, indexed by id.
    #[must_use]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Node `id`, if it exists.
    #[must_use]
    pub fn node(&self, id: usize) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Leaf nodes in ascending id order.
    pub fn leaves(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// Medoid of every cluster node, in creation order.
    #[must_use]
    pub fn medoids(&self) -> &[MedoidRecord] {
        &self.medoids
    }

    /// Depth bookkeeping.
    #[must_use]
    pub fn levels(&self) -> &LevelIndex {
        &self.levels
    }

    /// Scaler fitted on the full input.
    #[must_use]
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a built tree has a root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
