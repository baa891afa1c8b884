//! Levels command: the shape of the tree.

use super::{build_tree, TreeOptions};
use crate::error::Result;
use crate::output;
use colored::Colorize;
use divclust::tree::{ClusterTree, MedoidRecord};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct LevelSummary {
    depth: usize,
    nodes: Vec<usize>,
}

#[derive(Serialize)]
struct LeafSummary {
    cluster: usize,
    depth: usize,
    size: usize,
}

#[derive(Serialize)]
struct LevelsResult {
    num_nodes: usize,
    num_levels: usize,
    levels: Vec<LevelSummary>,
    leaves: Vec<LeafSummary>,
    medoids: Vec<MedoidRecord>,
}

impl LevelsResult {
    fn from_tree(tree: &ClusterTree) -> Self {
        Self {
            num_nodes: tree.len(),
            num_levels: tree.num_levels(),
            levels: tree
                .levels()
                .iter()
                .map(|(depth, nodes)| LevelSummary { depth, nodes: nodes.to_vec() })
                .collect(),
            leaves: tree
                .leaves()
                .map(|leaf| LeafSummary {
                    cluster: leaf.id(),
                    depth: leaf.depth(),
                    size: leaf.row_ids().map_or(0, <[String]>::len),
                })
                .collect(),
            medoids: tree.medoids().to_vec(),
        }
    }
}

/// Run the levels command
pub(crate) fn run(path: &Path, options: &TreeOptions, json_output: bool) -> Result<()> {
    let tree = build_tree(path, options)?;
    let result = LevelsResult::from_tree(&tree);

    if json_output {
        return output::json(&result);
    }

    output::section("Tree");
    output::kv("Nodes", result.num_nodes);
    output::kv("Levels", result.num_levels);

    output::section("Levels");
    for level in &result.levels {
        output::kv(&format!("depth {}", level.depth), format!("{:?}", level.nodes));
    }

    output::section("Leaves");
    for leaf in &result.leaves {
        println!(
            "  {} depth {} ({} rows)",
            format!("#{}", leaf.cluster).green(),
            leaf.depth,
            leaf.size
        );
    }

    if !result.medoids.is_empty() {
        output::section("Medoids");
        for medoid in &result.medoids {
            output::kv(&format!("#{}", medoid.cluster), &medoid.id);
        }
    }
    Ok(())
}
