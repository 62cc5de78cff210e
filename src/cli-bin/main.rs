//! CLI entry point (§6): loads a test-case directory, optionally runs the
//! core-assignment heuristic and the BDR auto-tuner, analyzes and
//! simulates the resulting model, writes the solution table, and maps the
//! outcome onto the exit-code contract (0 = schedulable, 1 =
//! unschedulable, 2 = error).

mod args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use args::Cli;
use hsa_engine::analysis::analyze_system;
use hsa_engine::heuristics::tune_system;
use hsa_engine::io::{load_system_model, write_solution};
use hsa_engine::model::{Component, Seconds, SystemModel};
use hsa_engine::simulator::{simulate_system, SimulationConfig};
use hsa_engine::utils::lcm_seconds;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(true) => ExitCode::from(0),
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.logging.verbose {
        "debug"
    } else if cli.logging.quiet {
        "error"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Runs the pipeline end to end. Returns `Ok(true)` when every component
/// and every task came out schedulable, `Ok(false)` otherwise; any
/// `Err` is an abort-before-or-during-analysis condition (§7 kind 1/2).
fn run(cli: &Cli) -> Result<bool> {
    let mut model = load_system_model(&cli.input_dir, cli.passes.assign_cores)
        .with_context(|| format!("loading model from {}", cli.input_dir.display()))?;

    if cli.passes.tune {
        info!("running BDR auto-tuner");
        tune_system(&mut model);
    }

    let analysis = analyze_system(&model);

    let sim_time = cli
        .simulation
        .sim_time
        .map(Seconds)
        .unwrap_or_else(|| default_sim_time(&model));
    let config = SimulationConfig::new(sim_time, Seconds(cli.simulation.dt));
    let simulation = simulate_system(&model, &config);

    let output_path = cli
        .output
        .path
        .clone()
        .unwrap_or_else(|| cli.input_dir.join("solution.csv"));
    write_solution(&output_path, &model, &analysis, &simulation)
        .with_context(|| format!("writing solution to {}", output_path.display()))?;

    let all_schedulable =
        analysis.components.values().all(|c| c.schedulable()) && simulation.tasks.values().all(|t| t.schedulable);

    if !cli.logging.quiet {
        for (component_id, component_analysis) in &analysis.components {
            if component_analysis.schedulable() {
                info!("component '{component_id}' schedulable");
            } else {
                warn!("component '{component_id}' NOT schedulable");
            }
        }
        info!(
            "{}: solution written to {}",
            if all_schedulable { "schedulable" } else { "unschedulable" },
            output_path.display()
        );
    }

    Ok(all_schedulable)
}

fn default_sim_time(model: &SystemModel) -> Seconds {
    let periods = model.cores.iter().flat_map(|c| &c.components).flat_map(task_periods);
    lcm_seconds(periods) * 2.0
}

fn task_periods(component: &Component) -> Vec<Seconds> {
    let mut periods: Vec<Seconds> = component.tasks.iter().map(|t| t.period).collect();
    for sub in &component.subcomponents {
        periods.extend(task_periods(sub));
    }
    periods
}
