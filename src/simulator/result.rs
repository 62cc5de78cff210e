//! Simulation output (§3: "Simulation result per task").

use std::collections::HashMap;

use crate::model::{Seconds, TaskId};

use super::state::TaskStats;

#[derive(Debug, Clone, Copy)]
pub struct TaskSimResult {
    pub max_resp_time: Seconds,
    pub avg_resp_time: Seconds,
    pub missed_deadlines: u64,
    pub completed_jobs: u64,
    pub schedulable: bool,
}

impl From<&TaskStats> for TaskSimResult {
    fn from(stats: &TaskStats) -> Self {
        let avg_resp_time = if stats.completed_jobs > 0 {
            stats.total_resp_time / (stats.completed_jobs as f64)
        } else {
            Seconds::ZERO
        };
        TaskSimResult {
            max_resp_time: stats.max_resp_time,
            avg_resp_time,
            missed_deadlines: stats.missed_deadlines,
            completed_jobs: stats.completed_jobs,
            schedulable: stats.missed_deadlines == 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    pub tasks: HashMap<TaskId, TaskSimResult>,
}
