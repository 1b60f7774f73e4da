//! retrace - rebuild stored endpoint connections from cable paths
//!
//! Entry point for the retrace command line tool.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use cablepath_retrace::commands;
use cablepath_retrace::snapshot::{load_topology, read_snapshot, save_topology};
use cablepath_retrace::{RetraceConfig, DEFAULT_CONFIG_PATH};
use cablepath_trace::{NoProgress, ReconcileOptions};
use cablepath_types::NodeRef;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Cable path tracer and endpoint connection reconciler
#[derive(Parser, Debug)]
#[command(name = "retrace")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Trace every endpoint and write back changed connections
    Reconcile {
        /// Topology snapshot to read
        #[arg(short = 't', long)]
        topology: Option<PathBuf>,

        /// Where to write the updated snapshot (defaults to the input)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Report changes without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Trace a single node, e.g. `interface:12`
    Trace {
        node: NodeRef,

        /// Topology snapshot to read
        #[arg(short = 't', long)]
        topology: Option<PathBuf>,
    },

    /// Check topology wiring
    Check {
        /// Topology snapshot to read
        #[arg(short = 't', long)]
        topology: Option<PathBuf>,
    },
}

/// Initializes tracing/logging subsystem
fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level '{}'", level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {}", e))
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("retrace: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut config = RetraceConfig::load_or_default(&args.config)?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.logging.json |= args.json_logs;
    config.validate()?;

    init_logging(&config.logging.level, config.logging.json)?;

    let mut stdout = io::stdout().lock();

    let clean = match args.command {
        Command::Reconcile {
            topology,
            output,
            dry_run,
        } => {
            let input = topology_path(topology, &config);
            let dry_run = dry_run || config.reconcile.dry_run;
            let mut topo = load_topology(&input)?;
            info!(path = %input.display(), dry_run, "Starting reconciliation");

            let options = ReconcileOptions { dry_run };
            let report = if io::stderr().is_terminal() {
                let interval = config.reconcile.progress_interval;
                let report = commands::reconcile(
                    &mut topo,
                    options,
                    commands::progress_dots(interval, io::stderr()),
                    &mut stdout,
                )?;
                if report.examined >= interval {
                    eprintln!();
                }
                report
            } else {
                commands::reconcile(&mut topo, options, NoProgress, &mut stdout)?
            };

            if !dry_run {
                let target = output.as_deref().unwrap_or(input.as_path());
                save_topology(&topo, target)
                    .with_context(|| format!("saving {}", target.display()))?;
            }
            report.is_clean()
        }

        Command::Trace { node, topology } => {
            let topo = load_topology(&topology_path(topology, &config))?;
            commands::trace_node(&topo, node, &mut stdout)?
        }

        Command::Check { topology } => {
            let snapshot = read_snapshot(&topology_path(topology, &config))?;
            commands::check(snapshot, &mut stdout)?
        }
    };

    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn topology_path(flag: Option<PathBuf>, config: &RetraceConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.topology.path.clone())
}
