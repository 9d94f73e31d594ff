#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use flowmap_core::config::resolve_config;
use flowmap_core::error::ErrorCode;
use output::{CliError, OutputMode};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "flowmap: canonical connectivity maps for pipeline flow graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json, FORMAT and user config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Normalize a raw flow graph",
        long_about = "Normalize a raw flow graph JSON document into a canonical map and bound it for transport.",
        after_help = "EXAMPLES:\n    # Normalize with default caps\n    flowmap normalize flow.json --project SALES\n\n    # Merge inventory lists and skip truncation\n    flowmap normalize flow.json --project SALES --inventory inventory.json --no-truncate --json"
    )]
    Normalize(cmd::normalize::NormalizeArgs),

    #[command(
        about = "Summarize a raw flow graph",
        long_about = "Report node/edge counts, roots, leaves and warnings for the full, untruncated map.",
        after_help = "EXAMPLES:\n    # Show stats\n    flowmap stats flow.json --project SALES\n\n    # Emit machine-readable output\n    flowmap stats flow.json --project SALES --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(about = "Inspect configuration")]
    Config(cmd::config::ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("FLOWMAP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "flowmap=debug,info"
        } else {
            "flowmap=info,warn"
        })
    });

    let format = env::var("FLOWMAP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let flag_mode = output::flag_output_mode(cli.format, cli.json);
    let effective = match resolve_config(&project_root, flag_mode.map(OutputMode::as_str)) {
        Ok(effective) => effective,
        Err(err) => {
            let mode = flag_mode.unwrap_or(OutputMode::Text);
            return output::fail(
                mode,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            );
        }
    };
    let output = output::resolve_output_mode(
        cli.format,
        cli.json,
        Some(effective.resolved_output.as_str()),
    );
    debug!(?output, root = %project_root.display(), "resolved configuration");

    match &cli.command {
        Commands::Normalize(args) => {
            cmd::normalize::run_normalize(args, &effective.project.truncate, output, cli.quiet)
        }
        Commands::Stats(args) => cmd::stats::run_stats(args, output, cli.quiet),
        Commands::Config(args) => cmd::config::run_config(args, &effective, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["flowmap", "stats", "flow.json", "--project", "P", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Stats(_)));
    }

    #[test]
    fn format_flag_parses_value_enum() {
        let cli = Cli::parse_from(["flowmap", "--format", "pretty", "config", "show"]);
        assert_eq!(cli.format, Some(OutputMode::Pretty));
    }

    #[test]
    fn normalize_parses_caps() {
        let cli = Cli::parse_from([
            "flowmap",
            "normalize",
            "flow.json",
            "--project",
            "SALES",
            "--max-nodes",
            "10",
            "--max-edges",
            "20",
        ]);
        let Commands::Normalize(args) = cli.command else {
            panic!("expected normalize");
        };
        assert_eq!(args.project_key, "SALES");
        assert_eq!(args.max_nodes, Some(10));
        assert_eq!(args.max_edges, Some(20));
        assert!(!args.no_truncate);
    }

    #[test]
    fn no_truncate_conflicts_with_caps() {
        let result = Cli::try_parse_from([
            "flowmap",
            "normalize",
            "flow.json",
            "--project",
            "P",
            "--no-truncate",
            "--max-nodes",
            "5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn project_is_required() {
        assert!(Cli::try_parse_from(["flowmap", "normalize", "flow.json"]).is_err());
    }

    #[test]
    fn quiet_and_verbose_flags_parse() {
        let cli = Cli::parse_from(["flowmap", "-q", "-v", "config", "show"]);
        assert!(cli.quiet);
        assert!(cli.verbose);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
