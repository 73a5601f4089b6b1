//! graph-growth: evolve K_k one vertex at a time and tabulate how its
//! structure changes.
//!
//! ```bash
//! # Oldest-first pruning, attach to every vertex, drop one edge per step
//! graph-growth --k 10 --policy old
//!
//! # Random pruning with random counts, reproducible
//! graph-growth --policy random --add 1..10 --remove 1..10 --seed 7
//!
//! # Exhaustive (add, remove) search, chromatic drift also rejected
//! graph-growth --exhaustive-limit 1000 --enforce-chromatic
//! ```
//!
//! Ctrl+C stops after the current step; the summary is still written.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use graph_growth_core::{
    CountSpec, EngineConfig, RemovalPolicy, Schedule, Simulation, SimulationConfig, SummaryReporter,
    DEFAULT_ARBORICITY_ALERT, DEFAULT_ARBORICITY_CEILING, DEFAULT_CLIQUE_SIZE,
    DEFAULT_MAX_CONSECUTIVE_REJECTIONS,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod signal;

#[derive(Parser, Debug)]
#[command(name = "graph-growth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Initial clique size
    #[arg(short, long, default_value_t = DEFAULT_CLIQUE_SIZE, value_parser = RangedU64ValueParser::<usize>::new().range(2..))]
    k: usize,

    /// Edge removal policy: old | random
    #[arg(short, long, default_value = "old")]
    policy: RemovalPolicy,

    /// Edges attached to each new vertex: all | N | LO..HI
    #[arg(long, default_value = "all")]
    add: CountSpec,

    /// Edges removed per step: N | LO..HI
    #[arg(long, default_value = "1")]
    remove: CountSpec,

    /// Try every (add, remove) pair in 1..=N instead of --add/--remove
    #[arg(long, value_name = "N")]
    exhaustive_limit: Option<usize>,

    /// Stop after this many steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Reject steps whose arboricity estimate exceeds this
    #[arg(long, default_value_t = DEFAULT_ARBORICITY_CEILING)]
    arboricity_ceiling: usize,

    /// Also reject steps that change the chromatic number
    #[arg(long)]
    enforce_chromatic: bool,

    /// Keep going after the chromatic number drifts from its initial value
    #[arg(long)]
    ignore_chromatic_change: bool,

    /// Stop at the first planar graph
    #[arg(long)]
    stop_on_planar: bool,

    /// Arboricity estimate that triggers an alert
    #[arg(long, default_value_t = DEFAULT_ARBORICITY_ALERT)]
    arboricity_alert: usize,

    /// Stop when the arboricity alert fires
    #[arg(long)]
    stop_on_arboricity_alert: bool,

    /// Give up after this many rejected attempts in a row
    #[arg(long, default_value_t = DEFAULT_MAX_CONSECUTIVE_REJECTIONS)]
    max_rejections: usize,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for the summary table and JSON
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Write a Graphviz file per recorded step into this directory
    #[arg(long)]
    render_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn simulation_config(&self) -> SimulationConfig {
        let schedule = match self.exhaustive_limit {
            Some(limit) => Schedule::Exhaustive { limit },
            None => Schedule::Fixed {
                add: self.add,
                remove: self.remove,
            },
        };
        SimulationConfig {
            k: self.k,
            engine: EngineConfig {
                removal: self.policy,
                arboricity_ceiling: self.arboricity_ceiling,
                enforce_chromatic: self.enforce_chromatic,
                seed: self.seed,
            },
            schedule,
            max_steps: self.max_steps,
            stop_on_planar: self.stop_on_planar,
            arboricity_alert: self.arboricity_alert,
            stop_on_arboricity_alert: self.stop_on_arboricity_alert,
            stop_on_chromatic_change: !self.ignore_chromatic_change,
            max_consecutive_rejections: self.max_rejections,
        }
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.simulation_config();
    let mut simulation = Simulation::new(config).context("invalid configuration")?;

    let interrupt = Arc::new(AtomicBool::new(false));
    signal::install_ctrl_c(Arc::clone(&interrupt)).context("failed to install Ctrl+C handler")?;

    let mut reporter = SummaryReporter::new(&cli.results_dir);
    if let Some(dir) = &cli.render_dir {
        reporter = reporter.with_render_dir(dir);
    }

    let summary = simulation.run(&mut reporter, &interrupt)?;

    if summary.interrupted() {
        info!("computation stopped by user");
    }
    info!(
        steps = summary.steps,
        records = summary.records.len(),
        rejections = summary.rejections,
        stop = ?summary.stop,
        "run finished"
    );
    if let Some(path) = &summary.outputs.table {
        println!("Summary saved to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["graph-growth"]);
        let config = cli.simulation_config();
        assert_eq!(config.k, 10);
        assert_eq!(config.engine.removal, RemovalPolicy::OldestFirst);
        assert_eq!(config.engine.arboricity_ceiling, 9);
        assert!(!config.engine.enforce_chromatic);
        assert!(config.stop_on_chromatic_change);
        assert_eq!(
            config.schedule,
            Schedule::Fixed {
                add: CountSpec::All,
                remove: CountSpec::Exactly(1)
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_exhaustive() {
        let cli = Cli::parse_from([
            "graph-growth",
            "--policy",
            "random",
            "--exhaustive-limit",
            "50",
            "--enforce-chromatic",
            "--seed",
            "3",
        ]);
        let config = cli.simulation_config();
        assert_eq!(config.schedule, Schedule::Exhaustive { limit: 50 });
        assert_eq!(config.engine.removal, RemovalPolicy::RandomSample);
        assert!(config.engine.enforce_chromatic);
        assert_eq!(config.engine.seed, Some(3));
    }

    #[test]
    fn test_cli_ranges() {
        let cli = Cli::parse_from(["graph-growth", "--add", "1..10", "--remove", "2..5"]);
        assert_eq!(cli.add, CountSpec::Between(1, 10));
        assert_eq!(cli.remove, CountSpec::Between(2, 5));
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["graph-growth", "--policy", "newest"]).is_err());
        assert!(Cli::try_parse_from(["graph-growth", "--k", "1"]).is_err());
        assert!(Cli::try_parse_from(["graph-growth", "--remove", "-3"]).is_err());
        assert!(Cli::try_parse_from(["graph-growth", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_remove_all_rejected_at_config_time() {
        let cli = Cli::parse_from(["graph-growth", "--remove", "all"]);
        assert!(Simulation::new(cli.simulation_config()).is_err());
    }
}
