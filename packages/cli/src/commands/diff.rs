use super::read_vnode;
use anyhow::Result;
use arbor_reconciler::{diff as diff_vnodes, optimize_patches, LiveTree, Patch, VNode};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// VNode JSON document describing the current tree
    pub old: PathBuf,

    /// VNode JSON document describing the desired tree
    pub new: PathBuf,

    /// Print the batch as the optimizer would hand it to the applier
    #[arg(long)]
    pub optimize: bool,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

pub fn diff(args: DiffArgs, _cwd: &str) -> Result<()> {
    let old = read_vnode(&args.old)?;
    let new = read_vnode(&args.new)?;

    let patches = compute_patches(&old, &new, args.optimize);
    debug!(patches = patches.len(), optimize = args.optimize, "Computed diff");

    let json = if args.compact {
        serde_json::to_string(&patches)?
    } else {
        serde_json::to_string_pretty(&patches)?
    };
    println!("{}", json);

    eprintln!(
        "{} {} patch{}",
        "✓".green(),
        patches.len(),
        if patches.len() == 1 { "" } else { "es" }
    );
    Ok(())
}

/// Patches against a tree materialized from `old`; node ids follow
/// materialization order, so the root of `old` is `0`.
pub fn compute_patches(old: &VNode, new: &VNode, optimize: bool) -> Vec<Patch> {
    let mut tree = LiveTree::new();
    let node = tree.materialize_node(old);

    let patches = diff_vnodes(&tree, node, old, new);
    if optimize {
        optimize_patches(patches)
    } else {
        patches
    }
}
