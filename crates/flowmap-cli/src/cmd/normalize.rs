//! `flowmap normalize` — canonical map of one flow graph, bounded for transport.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use flowmap_core::config::{ConfigError, TruncateConfig};
use flowmap_core::error::ErrorCode;
use flowmap_core::{NormalizedMap, TruncationCaps, TruncationSummary, normalize, truncate};
use serde::Serialize;
use tracing::info;

use super::input::{read_flow_graph, read_inventory};
use crate::output::{
    CliError, OutputMode, echo_warnings, fail, pretty_kv, pretty_section, render_mode,
};

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Raw flow graph JSON file.
    pub file: PathBuf,

    /// Project key recorded on the map.
    #[arg(long = "project", value_name = "KEY")]
    pub project_key: String,

    /// Inventory JSON with folder names and entity name lists.
    #[arg(long, value_name = "FILE")]
    pub inventory: Option<PathBuf>,

    /// Maximum nodes to keep (overrides config).
    #[arg(long, value_name = "N")]
    pub max_nodes: Option<usize>,

    /// Maximum edges to keep (overrides config).
    #[arg(long, value_name = "M")]
    pub max_edges: Option<usize>,

    /// Return the full map regardless of caps.
    #[arg(long, conflicts_with_all = ["max_nodes", "max_edges"])]
    pub no_truncate: bool,
}

/// Payload for `flowmap normalize`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub map: NormalizedMap,
    pub truncation: TruncationSummary,
    /// Hash of the untruncated map, stable across cap changes.
    pub content_hash: String,
}

/// Merge CLI cap flags over the project truncation policy.
fn effective_caps(args: &NormalizeArgs, config: &TruncateConfig) -> Result<TruncationCaps, ConfigError> {
    let explicit = args.max_nodes.is_some() || args.max_edges.is_some();
    TruncateConfig {
        enabled: !args.no_truncate && (config.enabled || explicit),
        max_nodes: args.max_nodes.or(config.max_nodes),
        max_edges: args.max_edges.or(config.max_edges),
    }
    .caps()
}

pub fn run_normalize(
    args: &NormalizeArgs,
    truncate_config: &TruncateConfig,
    output: OutputMode,
    quiet: bool,
) -> anyhow::Result<()> {
    let caps = match effective_caps(args, truncate_config) {
        Ok(caps) => caps,
        Err(err) => {
            return fail(
                output,
                &CliError::from_code(ErrorCode::InvalidTruncationCap, err),
            );
        }
    };
    let raw = read_flow_graph(&args.file).or_else(|err| fail(output, &err))?;
    let options = read_inventory(args.inventory.as_deref()).or_else(|err| fail(output, &err))?;

    let map = normalize(&raw, &args.project_key, &options);
    let content_hash = map.content_hash();
    let bounded = truncate(&map, caps);
    info!(
        project_key = %args.project_key,
        nodes = bounded.map.stats.node_count,
        edges = bounded.map.stats.edge_count,
        truncated = bounded.truncation.truncated,
        "normalized flow graph"
    );

    let report = NormalizeReport {
        map: bounded.map,
        truncation: bounded.truncation,
        content_hash,
    };
    echo_warnings(output, quiet, &report.map.warnings)?;
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &NormalizeReport, w: &mut dyn Write) -> io::Result<()> {
    let map = &report.map;
    let t = &report.truncation;
    writeln!(
        w,
        "project={} nodes={} edges={} datasets={} recipes={} roots={} leaves={} warnings={}",
        map.project_key,
        map.stats.node_count,
        map.stats.edge_count,
        map.stats.datasets,
        map.stats.recipes,
        map.stats.roots,
        map.stats.leaves,
        map.warnings.len()
    )?;
    writeln!(
        w,
        "truncated={} kept_nodes={}/{} kept_edges={}/{} hash={}",
        t.truncated,
        t.node_count_after,
        t.node_count_before,
        t.edge_count_after,
        t.edge_count_before,
        report.content_hash
    )?;
    for node in &map.nodes {
        match &node.name {
            Some(name) if name != &node.id => writeln!(w, "node {} {} {name}", node.id, node.kind)?,
            _ => writeln!(w, "node {} {}", node.id, node.kind)?,
        }
    }
    for edge in &map.edges {
        writeln!(w, "edge {} {} {}", edge.from, edge.to, edge.relation)?;
    }
    Ok(())
}

fn render_pretty(report: &NormalizeReport, w: &mut dyn Write) -> io::Result<()> {
    let map = &report.map;
    let t = &report.truncation;

    pretty_section(w, &format!("Flow map {}", map.project_key))?;
    pretty_kv(
        w,
        "Nodes",
        format!(
            "{} ({} datasets, {} recipes)",
            map.stats.node_count, map.stats.datasets, map.stats.recipes
        ),
    )?;
    pretty_kv(w, "Edges", map.stats.edge_count.to_string())?;
    pretty_kv(w, "Roots", join_or_dash(&map.roots))?;
    pretty_kv(w, "Leaves", join_or_dash(&map.leaves))?;
    if t.truncated {
        pretty_kv(
            w,
            "Truncated",
            format!(
                "kept {} of {} nodes, {} of {} edges",
                t.node_count_after, t.node_count_before, t.edge_count_after, t.edge_count_before
            ),
        )?;
    } else {
        pretty_kv(w, "Truncated", "no")?;
    }
    pretty_kv(w, "Hash", &report.content_hash)?;

    if !map.nodes.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Nodes")?;
        for node in &map.nodes {
            let mut line = format!("  {:<32} {}", node.id, node.kind);
            if let Some(subtype) = &node.subtype {
                line.push_str(&format!(" ({subtype})"));
            }
            if let Some(name) = node.name.as_ref().filter(|name| *name != &node.id) {
                line.push_str(&format!("  \"{name}\""));
            }
            writeln!(w, "{line}")?;
        }
    }

    if !map.edges.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Edges")?;
        for edge in &map.edges {
            writeln!(w, "  {} → {}  [{}]", edge.from, edge.to, edge.relation)?;
        }
    }
    Ok(())
}

fn join_or_dash(ids: &[String]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}
