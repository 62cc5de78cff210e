//! Solution writer (§4.8): renders the analysis + simulation results as
//! `solution.csv`, one row per task, using `csv::Writer` with
//! `serde::Serialize` on an output row struct — mirroring the reader's
//! struct-per-table idiom.

use std::path::Path;

use serde::Serialize;

use crate::analysis::SystemAnalysis;
use crate::error::ModelError;
use crate::model::{CoreId, SystemModel};
use crate::simulator::SimulationResult;

#[derive(Debug, Serialize)]
struct SolutionRow {
    task_name: String,
    component_id: String,
    task_schedulable: u8,
    avg_response_time: f64,
    max_response_time: f64,
    wcrt: f64,
    violates_deadline: u8,
    component_schedulable: u8,
}

/// Build and write `solution.csv` (or `path`) from the analyzer and
/// simulator outputs.
pub fn write_solution(
    path: &Path,
    model: &SystemModel,
    analysis: &SystemAnalysis,
    simulation: &SimulationResult,
) -> Result<(), ModelError> {
    let file = std::fs::File::create(path).map_err(|e| ModelError::Io { path: path.display().to_string(), source: e })?;
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);

    for core in &model.cores {
        let core_id = core.id.clone();
        for top in &core.components {
            write_component_rows(&mut writer, &core_id, top, analysis, simulation)?;
        }
    }

    writer.flush().map_err(|e| ModelError::Io { path: path.display().to_string(), source: e })?;
    Ok(())
}

fn write_component_rows(
    writer: &mut csv::Writer<std::fs::File>,
    core_id: &CoreId,
    component: &crate::model::Component,
    analysis: &SystemAnalysis,
    simulation: &SimulationResult,
) -> Result<(), ModelError> {
    let component_analysis = analysis.components.get(&component.id);
    let component_schedulable = analysis.component_schedulable(core_id, &component.id);

    for task in &component.tasks {
        let sim = simulation.tasks.get(&task.id);
        let wcrt = component_analysis
            .and_then(|c| c.bdr.wcrt.get(&task.id))
            .and_then(|r| *r)
            .map(|r| r.0)
            .unwrap_or(f64::INFINITY);
        let violates_deadline = wcrt > task.deadline.0;

        let row = SolutionRow {
            task_name: task.id.to_string(),
            component_id: component.id.to_string(),
            task_schedulable: sim.map(|s| s.schedulable as u8).unwrap_or(0),
            avg_response_time: sim.map(|s| s.avg_resp_time.0).unwrap_or(0.0),
            max_response_time: sim.map(|s| s.max_resp_time.0).unwrap_or(0.0),
            wcrt,
            violates_deadline: violates_deadline as u8,
            component_schedulable: component_schedulable as u8,
        };
        writer
            .serialize(&row)
            .map_err(|source| ModelError::Csv { table: "solution.csv", source })?;
    }

    for sub in &component.subcomponents {
        write_component_rows(writer, core_id, sub, analysis, simulation)?;
    }
    Ok(())
}

