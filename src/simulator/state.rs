//! Per-task and per-server runtime state carried across simulation steps.

use crate::model::{Scheduler, Seconds, Task, TaskId};

/// A single released, not-yet-completed job.
#[derive(Debug, Clone)]
pub struct Job {
    pub remaining: Seconds,
    pub deadline: Seconds,
    pub release: Seconds,
}

/// Accumulated per-task statistics, built up as jobs complete or miss.
#[derive(Debug, Clone, Default)]
pub struct TaskStats {
    pub max_resp_time: Seconds,
    pub total_resp_time: Seconds,
    pub completed_jobs: u64,
    pub missed_deadlines: u64,
}

impl TaskStats {
    pub fn record_completion(&mut self, response: Seconds) {
        self.max_resp_time = self.max_resp_time.max(response);
        self.total_resp_time = self.total_resp_time + response;
        self.completed_jobs += 1;
    }

    pub fn record_miss(&mut self, response: Seconds) {
        self.max_resp_time = self.max_resp_time.max(response);
        self.missed_deadlines += 1;
    }
}

/// Runtime state for one task: its release schedule and its current job,
/// if any (§4.6 phase 1).
pub struct TaskRuntime {
    pub task: Task,
    pub next_release: Seconds,
    pub job: Option<Job>,
    pub stats: TaskStats,
}

impl TaskRuntime {
    pub fn new(task: Task) -> Self {
        TaskRuntime { task, next_release: Seconds::ZERO, job: None, stats: TaskStats::default() }
    }

    pub fn id(&self) -> &TaskId {
        &self.task.id
    }
}

/// Runtime state for one component-server: its BDR-governed budget and
/// the tasks it hosts (§4.6 phase 2–4).
pub struct ServerRuntime {
    pub scheduler: Scheduler,
    pub alpha: f64,
    pub delta: Seconds,
    pub budget: Seconds,
    pub period: Seconds,
    pub budget_remaining: Seconds,
    pub next_period_start: Seconds,
    pub tasks: Vec<TaskRuntime>,
}

impl ServerRuntime {
    pub fn has_ready_job(&self) -> bool {
        self.tasks.iter().any(|t| matches!(&t.job, Some(j) if j.remaining.is_positive()))
    }
}
