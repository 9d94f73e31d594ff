//! `flowmap stats` — summary of the full, untruncated map.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use flowmap_core::{MapStats, normalize};
use serde::Serialize;

use super::input::{read_flow_graph, read_inventory};
use crate::output::{OutputMode, echo_warnings, fail, pretty_kv, pretty_section, render_mode};

/// Arguments for `flowmap stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Raw flow graph JSON file.
    pub file: PathBuf,

    /// Project key recorded on the map.
    #[arg(long = "project", value_name = "KEY")]
    pub project_key: String,

    /// Inventory JSON with folder names and entity name lists.
    #[arg(long, value_name = "FILE")]
    pub inventory: Option<PathBuf>,
}

/// Report payload for `flowmap stats`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub project_key: String,
    pub stats: MapStats,
    pub roots: Vec<String>,
    pub leaves: Vec<String>,
    pub warnings: Vec<String>,
    pub content_hash: String,
}

/// Execute `flowmap stats`.
pub fn run_stats(args: &StatsArgs, output: OutputMode, quiet: bool) -> anyhow::Result<()> {
    let raw = read_flow_graph(&args.file).or_else(|err| fail(output, &err))?;
    let options = read_inventory(args.inventory.as_deref()).or_else(|err| fail(output, &err))?;

    let map = normalize(&raw, &args.project_key, &options);
    let content_hash = map.content_hash();
    let report = StatsReport {
        project_key: map.project_key,
        stats: map.stats,
        roots: map.roots,
        leaves: map.leaves,
        warnings: map.warnings,
        content_hash,
    };

    echo_warnings(output, quiet, &report.warnings)?;
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    let s = &report.stats;
    writeln!(w, "project={}", report.project_key)?;
    writeln!(w, "nodes={}", s.node_count)?;
    writeln!(w, "edges={}", s.edge_count)?;
    writeln!(w, "datasets={}", s.datasets)?;
    writeln!(w, "recipes={}", s.recipes)?;
    writeln!(w, "roots={}", report.roots.join(","))?;
    writeln!(w, "leaves={}", report.leaves.join(","))?;
    writeln!(w, "warnings={}", report.warnings.len())?;
    writeln!(w, "hash={}", report.content_hash)
}

fn render_pretty(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    let s = &report.stats;
    pretty_section(w, &format!("Flow stats {}", report.project_key))?;
    pretty_kv(w, "Nodes", s.node_count.to_string())?;
    pretty_kv(w, "Edges", s.edge_count.to_string())?;
    pretty_kv(w, "Datasets", s.datasets.to_string())?;
    pretty_kv(w, "Recipes", s.recipes.to_string())?;
    pretty_kv(w, "Roots", format!("{} {:?}", s.roots, report.roots))?;
    pretty_kv(w, "Leaves", format!("{} {:?}", s.leaves, report.leaves))?;
    pretty_kv(w, "Warnings", report.warnings.len().to_string())?;
    pretty_kv(w, "Hash", &report.content_hash)
}
