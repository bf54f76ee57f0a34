use super::read_vnode;
use crate::config::load_config;
use anyhow::{anyhow, Result};
use arbor_reconciler::{LiveTree, RenderStats, Renderer, RendererConfig, VChild, VNode};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// VNode JSON document to mount first
    pub old: PathBuf,

    /// VNode JSON document to render over it
    pub new: PathBuf,

    /// Renderer config file (defaults to arbor.config.json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print stats as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub struct Outcome {
    pub tree: Option<VChild>,
    pub stats: RenderStats,
    pub matches: bool,
}

pub fn reconcile(args: ReconcileArgs, cwd: &str) -> Result<()> {
    let config = load_config(cwd, args.config.as_deref())?;
    let old = read_vnode(&args.old)?;
    let new = read_vnode(&args.new)?;

    let outcome = run(config, old, &new)?;

    println!("{}", serde_json::to_string_pretty(&outcome.tree)?);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.stats)?);
    } else {
        print_stats(&outcome.stats);
    }

    if !outcome.matches {
        eprintln!(
            "{} Reconciled tree differs from {}",
            "✗".red(),
            args.new.display()
        );
        std::process::exit(1);
    }

    eprintln!("{} Reconciled tree matches {}", "✓".green(), args.new.display());
    Ok(())
}

/// Mount `old`, render `new` through the full pipeline and compare the
/// result with a tree built straight from `new`.
pub fn run(config: RendererConfig, old: VNode, new: &VNode) -> Result<Outcome> {
    let mut renderer = Renderer::new(config)?;
    let body = renderer.tree_mut().create_root("body");

    let mount = renderer.mount(body, old)?;
    let queued = renderer.render(mount, new.clone())?;
    renderer.flush();
    info!(queued, "Rendered new tree");

    let root = renderer
        .mount_root(mount)
        .ok_or_else(|| anyhow!("Mount disappeared during render"))?;
    let tree = renderer.tree().to_vchild(root);
    let stats = renderer.stats();
    renderer.destroy();

    let mut expected = LiveTree::new();
    let expected_root = expected.materialize_node(new);
    let matches = tree == expected.to_vchild(expected_root);

    Ok(Outcome {
        tree,
        stats,
        matches,
    })
}

fn print_stats(stats: &RenderStats) {
    println!();
    println!("{}", "Render stats".bright_blue().bold());
    println!("   Patches:            {}", stats.total_patches);
    println!("   Batches:            {}", stats.batch_count);
    println!("   Average batch size: {:.2}", stats.average_batch_size);
    println!(
        "   Render time:        {:.3}ms",
        stats.total_render_time.as_secs_f64() * 1000.0
    );
    if stats.skipped_patches > 0 {
        println!("   {} {}", "Skipped:".yellow(), stats.skipped_patches);
    }
    if stats.failed_patches > 0 {
        println!("   {} {}", "Failed:".red(), stats.failed_patches);
    }
}
