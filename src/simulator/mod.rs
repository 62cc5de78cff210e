//! The discrete-time hierarchical simulator (§4.6): enforces per-server
//! BDR budget replenishment, dispatches tasks under each component's
//! inner scheduler, and arbitrates a core across its (possibly several)
//! active servers.
//!
//! Time advances in fixed steps of `dt`. Within one step, the five phases
//! of §4.6 run in order — release, replenishment, arbitration, dispatch,
//! deadline check — and ties within a phase are broken by insertion
//! order, making the whole simulation deterministic (§5).

pub mod result;
pub mod state;

pub use result::{SimulationResult, TaskSimResult};

use crate::model::{Core, Scheduler, Seconds, SystemModel};
use state::{Job, ServerRuntime, TaskRuntime};

/// Default simulation step (§4.6).
pub const DEFAULT_DT: Seconds = Seconds(0.1);

pub struct SimulationConfig {
    pub horizon: Seconds,
    pub dt: Seconds,
}

impl SimulationConfig {
    pub fn new(horizon: Seconds, dt: Seconds) -> Self {
        SimulationConfig { horizon, dt }
    }
}

struct CoreRuntime {
    scheduler: Scheduler,
    speed_factor: f64,
    servers: Vec<ServerRuntime>,
}

fn build_core_runtime(core: &Core) -> CoreRuntime {
    fn collect(component: &crate::model::Component, speed_factor: f64, out: &mut Vec<ServerRuntime>) {
        let tasks = component
            .tasks
            .iter()
            .map(|t| {
                let mut scaled = t.clone();
                scaled.wcet = t.effective_wcet(speed_factor);
                TaskRuntime::new(scaled)
            })
            .collect();
        out.push(ServerRuntime {
            scheduler: component.scheduler,
            alpha: component.interface.alpha,
            delta: component.interface.delta,
            budget: component.interface.budget,
            period: component.interface.period,
            budget_remaining: Seconds::ZERO,
            next_period_start: component.interface.delta,
            tasks,
        });
        for sub in &component.subcomponents {
            collect(sub, speed_factor, out);
        }
    }

    let mut servers = Vec::new();
    for top in &core.components {
        collect(top, core.speed_factor, &mut servers);
    }
    CoreRuntime { scheduler: core.scheduler, speed_factor: core.speed_factor, servers }
}

/// Run the simulation over the whole system for `config.horizon` seconds,
/// in steps of `config.dt`, and return per-task statistics.
pub fn simulate_system(model: &SystemModel, config: &SimulationConfig) -> SimulationResult {
    let mut cores: Vec<CoreRuntime> = model.cores.iter().map(build_core_runtime).collect();

    let steps = (config.horizon.0 / config.dt.0).round().max(0.0) as u64;
    for step in 0..=steps {
        let t = Seconds(step as f64 * config.dt.0);
        for core in &mut cores {
            release_phase(core, t);
            replenish_phase(core, t);
            let quanta = arbitration_phase(core, config.dt);
            dispatch_phase(core, t, config.dt, &quanta);
            deadline_check_phase(core, t);
        }
    }

    let mut result = SimulationResult::default();
    for core in &cores {
        for server in &core.servers {
            for task in &server.tasks {
                result.tasks.insert(task.id().clone(), TaskSimResult::from(&task.stats));
            }
        }
    }
    result
}

/// Phase 1: release new jobs, flagging an overrun (previous job still
/// outstanding at the next release) as a missed deadline.
fn release_phase(core: &mut CoreRuntime, t: Seconds) {
    for server in &mut core.servers {
        for task_rt in &mut server.tasks {
            while t.0 + 1e-12 >= task_rt.next_release.0 {
                if let Some(job) = &task_rt.job {
                    task_rt.stats.record_miss(t - job.release);
                    task_rt.job = None;
                }
                task_rt.job = Some(Job {
                    remaining: task_rt.task.wcet,
                    deadline: t + task_rt.task.deadline,
                    release: t,
                });
                task_rt.next_release = task_rt.next_release + task_rt.task.period;
            }
        }
    }
}

/// Phase 2: budget replenishment, gated by the component's initial delay Δ.
fn replenish_phase(core: &mut CoreRuntime, t: Seconds) {
    for server in &mut core.servers {
        if t.0 + 1e-12 < server.delta.0 {
            continue;
        }
        while server.next_period_start.0 <= t.0 + 1e-12 {
            server.budget_remaining = server.budget;
            server.next_period_start = server.next_period_start + server.period;
        }
    }
}

/// Phase 3: distribute the core's capacity across active servers in
/// proportion to their reserved bandwidth, scaling down if oversubscribed.
fn arbitration_phase(core: &CoreRuntime, dt: Seconds) -> Vec<Seconds> {
    let active: Vec<bool> = core
        .servers
        .iter()
        .map(|s| s.budget_remaining.0 > 0.0 && s.has_ready_job())
        .collect();

    let sum_alpha: f64 = core
        .servers
        .iter()
        .zip(&active)
        .filter(|(_, &is_active)| is_active)
        .map(|(s, _)| s.alpha)
        .sum();
    let scale = if sum_alpha <= 1.0 { 1.0 } else { 1.0 / sum_alpha };

    core.servers
        .iter()
        .zip(&active)
        .map(|(s, &is_active)| {
            if is_active {
                (s.alpha * scale * dt.0).min(s.budget_remaining.0).max(0.0).into()
            } else {
                Seconds::ZERO
            }
        })
        .collect()
}

/// Phase 4: within each server's quantum, serve ready jobs in scheduler
/// order, one to completion (or quantum exhaustion) before the next.
fn dispatch_phase(core: &mut CoreRuntime, t: Seconds, dt: Seconds, quanta: &[Seconds]) {
    for (server, &quantum) in core.servers.iter_mut().zip(quanta) {
        let mut remaining_quantum = quantum;
        if remaining_quantum.0 <= 0.0 {
            continue;
        }

        let mut order: Vec<usize> = (0..server.tasks.len())
            .filter(|&i| matches!(&server.tasks[i].job, Some(j) if j.remaining.is_positive()))
            .collect();
        match server.scheduler {
            Scheduler::Edf => order.sort_by(|&a, &b| {
                let da = server.tasks[a].job.as_ref().unwrap().deadline.0;
                let db = server.tasks[b].job.as_ref().unwrap().deadline.0;
                da.partial_cmp(&db).unwrap()
            }),
            Scheduler::Fps => order.sort_by_key(|&i| server.tasks[i].task.priority.unwrap_or(u32::MAX)),
        }

        for idx in order {
            if remaining_quantum.0 <= 0.0 {
                break;
            }
            let task_rt = &mut server.tasks[idx];
            let job = task_rt.job.as_mut().unwrap();
            let amount = remaining_quantum.min(job.remaining);
            job.remaining = job.remaining - amount;
            remaining_quantum = remaining_quantum - amount;
            server.budget_remaining = server.budget_remaining - amount;

            if job.remaining.0 <= 1e-12 {
                let response = (t + dt) - job.release;
                task_rt.stats.record_completion(response);
                task_rt.job = None;
            }
        }
    }
}

/// Phase 5: any job still outstanding at its deadline is a miss.
fn deadline_check_phase(core: &mut CoreRuntime, t: Seconds) {
    for server in &mut core.servers {
        for task_rt in &mut server.tasks {
            let misses = matches!(&task_rt.job, Some(j) if t.0 + 1e-12 >= j.deadline.0);
            if misses {
                let release = task_rt.job.as_ref().unwrap().release;
                task_rt.stats.record_miss(t - release);
                task_rt.job = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, ComponentId, CoreId, SupplyInterface, Task, TaskId, TaskType};

    fn task(id: &str, c: f64, p: f64) -> Task {
        Task {
            id: TaskId::from(id),
            wcet: Seconds(c),
            period: Seconds(p),
            deadline: Seconds(p),
            priority: None,
            kind: TaskType::Hard,
            jitter: Seconds::ZERO,
        }
    }

    #[test]
    fn scenario_6_cross_check_against_analytical_schedulability() {
        let component = Component {
            id: ComponentId::from("s1"),
            scheduler: Scheduler::Edf,
            tasks: vec![task("t1", 1.0, 4.0), task("t2", 2.0, 8.0)],
            subcomponents: vec![],
            interface: SupplyInterface::from_bdr(0.5, Seconds(1.0)).unwrap(),
            priority: None,
        };
        let core = Core {
            id: CoreId::from("c1"),
            scheduler: Scheduler::Edf,
            speed_factor: 1.0,
            components: vec![component],
        };
        let model = SystemModel::new(vec![core]);
        let config = SimulationConfig::new(Seconds(40.0), Seconds(0.1));
        let result = simulate_system(&model, &config);

        let t1 = result.tasks[&TaskId::from("t1")];
        let t2 = result.tasks[&TaskId::from("t2")];
        assert_eq!(t1.missed_deadlines, 0);
        assert_eq!(t2.missed_deadlines, 0);
        assert!(t1.avg_resp_time.0 <= 4.0 + 1e-6);
        assert!(t2.max_resp_time.0 <= 8.0 + 1e-6);
    }

    #[test]
    fn overloaded_component_reports_missed_deadlines() {
        let component = Component {
            id: ComponentId::from("s1"),
            scheduler: Scheduler::Edf,
            tasks: vec![task("t1", 3.0, 4.0)],
            subcomponents: vec![],
            interface: SupplyInterface::from_bdr(0.5, Seconds(0.0)).unwrap(),
            priority: None,
        };
        let core = Core {
            id: CoreId::from("c1"),
            scheduler: Scheduler::Edf,
            speed_factor: 1.0,
            components: vec![component],
        };
        let model = SystemModel::new(vec![core]);
        let config = SimulationConfig::new(Seconds(20.0), Seconds(0.1));
        let result = simulate_system(&model, &config);
        let t1 = result.tasks[&TaskId::from("t1")];
        assert!(t1.missed_deadlines > 0);
        assert!(!t1.schedulable);
        assert!(t1.max_resp_time.0 > 0.0);
    }
}
