//! The hierarchical data model: cores own top-level components, components
//! own tasks and (optionally) nested subcomponents.
//!
//! The tree is built once by the loader (or by hand in tests) and is
//! immutable thereafter except for the auto-tuner, which holds exclusive
//! access while it rewrites a component's supply interface (§9 "Mutable
//! graph").

pub mod ids;
pub mod time;

pub use ids::{ComponentId, CoreId, TaskId};
pub use time::{Seconds, EPSILON};

use crate::error::ModelError;

/// The scheduling policy used either at a core's top level or inside a
/// component. Dispatch on this enum is by `match`, never by string
/// comparison (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduler {
    Edf,
    /// Fixed-priority scheduling; rate-monotonic is FPS with priorities
    /// assigned by ascending period, which the loader does automatically
    /// when a priority column is absent (§6).
    Fps,
}

impl Scheduler {
    pub fn parse(raw: &str) -> Option<Scheduler> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "EDF" => Some(Scheduler::Edf),
            "FPS" | "RM" => Some(Scheduler::Fps),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    Hard,
    Soft,
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Hard
    }
}

/// A periodic task inside a component.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub wcet: Seconds,
    pub period: Seconds,
    pub deadline: Seconds,
    pub priority: Option<u32>,
    pub kind: TaskType,
    /// Release jitter accumulated from the optional comm-links table (§6).
    pub jitter: Seconds,
}

impl Task {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.wcet.is_positive() || !self.period.is_positive() || !self.deadline.is_positive() {
            return Err(ModelError::NonPositiveTaskParameter { task: self.id.to_string() });
        }
        if self.deadline.0 > self.period.0 + EPSILON {
            return Err(ModelError::DeadlineExceedsPeriod {
                task: self.id.to_string(),
                deadline: self.deadline.0,
                period: self.period.0,
            });
        }
        Ok(())
    }

    /// `C / speed_factor`, the WCET as consumed by a core running below
    /// unit speed (§3).
    pub fn effective_wcet(&self, speed_factor: f64) -> Seconds {
        self.wcet / speed_factor
    }
}

/// The BDR/PRM supply interface of a component, carried as a tagged pair
/// rather than two free-floating numbers so that `α ∈ [0,1)` and `Q ≤ P`
/// are enforced wherever the interface is constructed (§9).
#[derive(Debug, Clone, Copy)]
pub struct SupplyInterface {
    pub alpha: f64,
    pub delta: Seconds,
    pub budget: Seconds,
    pub period: Seconds,
}

impl SupplyInterface {
    /// Construct directly from a PRM pair (Q, P), deriving (α, Δ) via
    /// half-half (§4.2).
    pub fn from_prm(budget: Seconds, period: Seconds, component: &str) -> Result<Self, ModelError> {
        if budget.0 > period.0 + EPSILON {
            return Err(ModelError::BudgetExceedsPeriod {
                component: component.to_owned(),
                budget: budget.0,
                period: period.0,
            });
        }
        let (alpha, delta) = crate::numeric::mapper::prm_to_bdr(budget, period);
        Ok(SupplyInterface { alpha, delta, budget, period })
    }

    /// Construct directly from a BDR pair (α, Δ), deriving (Q, P) via
    /// half-half (§4.2).
    pub fn from_bdr(alpha: f64, delta: Seconds) -> Result<Self, ModelError> {
        let (budget, period) = crate::numeric::mapper::bdr_to_prm(alpha, delta)?;
        Ok(SupplyInterface { alpha, delta, budget, period })
    }
}

/// One server (component) hosting a set of tasks and, optionally, a set of
/// nested subcomponents.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: ComponentId,
    pub scheduler: Scheduler,
    pub tasks: Vec<Task>,
    pub subcomponents: Vec<Component>,
    pub interface: SupplyInterface,
    /// Priority among sibling components on an FPS/RM core.
    pub priority: Option<u32>,
}

impl Component {
    /// All tasks directly in this component, in insertion order.
    pub fn local_tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Assign FPS priorities by ascending period wherever a task in this
    /// component (and its subcomponents) is missing one (§6).
    pub fn assign_missing_priorities(&mut self) {
        if self.scheduler == Scheduler::Fps {
            let mut order: Vec<usize> = (0..self.tasks.len()).collect();
            order.sort_by(|&a, &b| {
                self.tasks[a].period.0.partial_cmp(&self.tasks[b].period.0).unwrap()
            });
            let mut next_priority = self
                .tasks
                .iter()
                .filter_map(|t| t.priority)
                .max()
                .map(|p| p + 1)
                .unwrap_or(0);
            for &idx in &order {
                if self.tasks[idx].priority.is_none() {
                    self.tasks[idx].priority = Some(next_priority);
                    next_priority += 1;
                }
            }
        }
        for sub in &mut self.subcomponents {
            sub.assign_missing_priorities();
        }
    }
}

/// A CPU core, hosting a set of top-level components exclusively.
#[derive(Debug, Clone)]
pub struct Core {
    pub id: CoreId,
    pub scheduler: Scheduler,
    pub speed_factor: f64,
    pub components: Vec<Component>,
}

/// The whole system: a set of cores. Keys (core_id, component_id, task_id)
/// are globally unique across the model.
#[derive(Debug, Clone, Default)]
pub struct SystemModel {
    pub cores: Vec<Core>,
}

impl SystemModel {
    pub fn new(cores: Vec<Core>) -> Self {
        SystemModel { cores }
    }

    pub fn find_core(&self, id: &CoreId) -> Option<&Core> {
        self.cores.iter().find(|c| &c.id == id)
    }
}
