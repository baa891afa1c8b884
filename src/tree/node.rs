//! Arena nodes and the per-build bookkeeping tables.

use crate::data::ObservationTable;
use serde::{Deserialize, Serialize};

/// A node of a [`ClusterTree`](super::ClusterTree).
///
/// Relations are stored as node ids into the tree's arena. A node keeps its
/// rows only while it is a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub(crate) id: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) depth: usize,
    pub(crate) data: Option<ObservationTable>,
}

impl TreeNode {
    pub(crate) fn new(id: usize, parent: Option<usize>, depth: usize, data: ObservationTable) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            depth,
            data: Some(data),
        }
    }

    /// Node id (root = 0).
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Parent id, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Child ids in creation order.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Distance from the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The node's normalized rows; `None` once the node has been split.
    #[must_use]
    pub fn data(&self) -> Option<&ObservationTable> {
        self.data.as_ref()
    }

    /// Returns true if the node still owns its rows.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.data.is_some()
    }

    /// Row ids held by a leaf.
    #[must_use]
    pub fn row_ids(&self) -> Option<&[String]> {
        self.data.as_ref().map(ObservationTable::ids)
    }
}

/// Depth → node ids and node id → depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelIndex {
    by_depth: Vec<Vec<usize>>,
    depth_of: Vec<Option<usize>>,
}

impl LevelIndex {
    pub(crate) fn insert(&mut self, id: usize, depth: usize) {
        if self.by_depth.len() <= depth {
            self.by_depth.resize_with(depth + 1, Vec::new);
        }
        self.by_depth[depth].push(id);

        if self.depth_of.len() <= id {
            self.depth_of.resize(id + 1, None);
        }
        self.depth_of[id] = Some(depth);
    }

    /// Depth of node `id`.
    #[must_use]
    pub fn depth_of(&self, id: usize) -> Option<usize> {
        self.depth_of.get(id).copied().flatten()
    }

    /// Node ids at `depth`, in creation order.
    #[must_use]
    pub fn nodes_at(&self, depth: usize) -> &[usize] {
        self.by_depth.get(depth).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct depths.
    #[must_use]
    pub fn num_levels(&self) -> usize {
        self.by_depth.len()
    }

    /// `(depth, node ids)` from the root downwards.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.by_depth.iter().enumerate().map(|(d, ids)| (d, ids.as_slice()))
    }
}

/// Medoid row chosen for a cluster node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedoidRecord {
    /// Node id of the cluster.
    pub cluster: usize,
    /// Row id of its medoid.
    pub id: String,
}

/// Cluster membership of one row at a queried level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    /// Row id.
    pub id: String,
    /// Node id of the cluster holding the row.
    pub cluster: usize,
}
