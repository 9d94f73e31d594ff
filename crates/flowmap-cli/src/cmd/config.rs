use anyhow::Result;
use clap::{Args, Subcommand};
use flowmap_core::config::EffectiveConfig;

use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show resolved configuration
    Show,
}

pub fn run_config(args: &ConfigArgs, effective: &EffectiveConfig, output: OutputMode) -> Result<()> {
    match &args.command {
        ConfigCommand::Show => print_effective(effective, output),
    }
}

fn cap_label(cap: Option<usize>) -> String {
    cap.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
}

fn print_effective(value: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let truncate = &value.project.truncate;
    match output {
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputMode::Text => {
            println!("resolved_output={}", value.resolved_output);
            println!("truncate.enabled={}", truncate.enabled);
            println!("truncate.max_nodes={}", cap_label(truncate.max_nodes));
            println!("truncate.max_edges={}", cap_label(truncate.max_edges));
            if let Some(out) = &value.user.output {
                println!("user.output={out}");
            }
        }
        OutputMode::Pretty => {
            println!("resolved_output = \"{}\"", value.resolved_output);
            println!();
            println!("[truncate]");
            println!("enabled = {}", truncate.enabled);
            if let Some(n) = truncate.max_nodes {
                println!("max_nodes = {n}");
            }
            if let Some(n) = truncate.max_edges {
                println!("max_edges = {n}");
            }
            println!();
            println!("[user]");
            if let Some(out) = &value.user.output {
                println!("output = \"{out}\"");
            }
        }
    }

    Ok(())
}
