//! Command-line argument parsing (§6), grouped with `next_help_heading`
//! per argument group.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "hsa-engine", about = "Hierarchical schedulability analysis and simulation")]
pub struct Cli {
    /// Directory containing tasks.csv, architecture.csv, budgets.csv, and
    /// an optional comm_links.csv.
    pub input_dir: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub simulation: SimulationArgs,

    #[command(flatten)]
    pub passes: PassArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

#[derive(clap::Args, Debug)]
#[command(next_help_heading = "Output")]
pub struct OutputArgs {
    /// Where to write the solution table (default: solution.csv inside the
    /// input directory).
    #[arg(short, long, value_name = "FILE")]
    pub path: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
#[command(next_help_heading = "Simulation")]
pub struct SimulationArgs {
    /// Simulation horizon in seconds (default: 2 * lcm of all periods).
    #[arg(long, value_name = "SECONDS")]
    pub sim_time: Option<f64>,

    /// Simulation time step in seconds.
    #[arg(long, default_value_t = 0.1, value_name = "SECONDS")]
    pub dt: f64,
}

#[derive(clap::Args, Debug)]
#[command(next_help_heading = "Pre-passes")]
pub struct PassArgs {
    /// Run the BDR auto-tuner before analysis.
    #[arg(long)]
    pub tune: bool,

    /// Run the greedy core-assignment heuristic for components with an
    /// unresolved core_id.
    #[arg(long)]
    pub assign_cores: bool,
}

#[derive(clap::Args, Debug)]
#[command(next_help_heading = "Logging")]
pub struct LoggingArgs {
    /// Suppress the human-readable summary.
    #[arg(short, long)]
    pub quiet: bool,

    /// Raise log verbosity.
    #[arg(short, long)]
    pub verbose: bool,
}
