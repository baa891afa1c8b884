//! Fit command: cluster assignments of every row at one level.

use super::{build_tree, TreeOptions};
use crate::error::Result;
use crate::output;
use divclust::tree::ClusterAssignment;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct FitResult {
    level: usize,
    num_levels: usize,
    clusters: Vec<ClusterAssignment>,
}

/// Run the fit command. `level = None` reports the leaves.
pub(crate) fn run(path: &Path, options: &TreeOptions, level: Option<usize>, json_output: bool) -> Result<()> {
    let tree = build_tree(path, options)?;
    let num_levels = tree.num_levels();
    let clusters = tree.get_clusters(level);

    if json_output {
        output::json(&FitResult {
            level: level.unwrap_or(num_levels - 1),
            num_levels,
            clusters,
        })
    } else {
        output::assignments_csv(std::io::stdout().lock(), &clusters)
    }
}
