//! The component analyzer (§4.3): the BDR and PRM schedulability tests for
//! one component's task set, plus per-task worst-case response times.

use std::collections::HashMap;

use crate::model::{Component, Scheduler, Seconds, Task, TaskId};
use crate::numeric::{dbf, sbf_bdr, sbf_prm};
use crate::utils::{bounded_fixpoint_search, component_horizon};

/// The per-task WCRT, or `None` for `R = ∞` (the fixed point diverged past
/// the task's deadline, or the iteration cap was hit — §7 kind 4).
pub type WcrtTable = HashMap<TaskId, Option<Seconds>>;

#[derive(Debug, Clone)]
pub struct SupplyVerdict {
    pub schedulable: bool,
    pub wcrt: WcrtTable,
}

#[derive(Debug, Clone)]
pub struct ComponentAnalysis {
    pub alpha: f64,
    pub delta: Seconds,
    pub budget: Seconds,
    pub period: Seconds,
    pub bdr: SupplyVerdict,
    pub prm: SupplyVerdict,
}

impl ComponentAnalysis {
    pub fn schedulable(&self) -> bool {
        self.bdr.schedulable
    }
}

/// Run the full component analysis: BDR test, PRM test, and per-task WCRT
/// (computed once under the BDR supply — the PRM verdict is an
/// independent pass/fail, and shares the same WCRT table; see DESIGN.md).
pub fn analyze_component(component: &Component, speed_factor: f64) -> ComponentAnalysis {
    let interface = component.interface;
    let tasks = scaled_tasks(&component.tasks, speed_factor);

    let bdr_schedulable = bdr_test(component.scheduler, &tasks, interface.alpha, interface.delta);
    let prm_schedulable = prm_test(component.scheduler, &tasks, interface.budget, interface.period);

    let wcrt = compute_wcrt(component.scheduler, &tasks, interface.alpha, interface.delta);

    ComponentAnalysis {
        alpha: interface.alpha,
        delta: interface.delta,
        budget: interface.budget,
        period: interface.period,
        bdr: SupplyVerdict { schedulable: bdr_schedulable, wcrt: wcrt.clone() },
        prm: SupplyVerdict { schedulable: prm_schedulable, wcrt },
    }
}

/// Tasks with `C` replaced by `effective_wcet` for this core's speed
/// factor (§3).
fn scaled_tasks(tasks: &[Task], speed_factor: f64) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            let mut scaled = t.clone();
            scaled.wcet = t.effective_wcet(speed_factor);
            scaled
        })
        .collect()
}

fn bdr_test(scheduler: Scheduler, tasks: &[Task], alpha: f64, delta: Seconds) -> bool {
    if tasks.is_empty() {
        return true;
    }
    let horizon = component_horizon(tasks);
    integer_range(horizon).all(|t| {
        dbf(scheduler, tasks, t).le_eps(sbf_bdr(alpha, delta, t))
    })
}

fn prm_test(scheduler: Scheduler, tasks: &[Task], budget: Seconds, period: Seconds) -> bool {
    if tasks.is_empty() {
        return true;
    }
    let horizon = component_horizon(tasks);
    integer_range(horizon).all(|t| {
        dbf(scheduler, tasks, t).le_eps(sbf_prm(budget, period, t))
    })
}

fn integer_range(horizon: Seconds) -> impl Iterator<Item = Seconds> {
    let h = horizon.0.round().max(0.0) as u64;
    (0..=h).map(|t| Seconds(t as f64))
}

fn compute_wcrt(scheduler: Scheduler, tasks: &[Task], alpha: f64, delta: Seconds) -> WcrtTable {
    match scheduler {
        Scheduler::Fps => wcrt_fps(tasks, delta),
        Scheduler::Edf => wcrt_edf(tasks, alpha, delta),
    }
}

/// FPS/RM WCRT (§4.3): sort by priority ascending, fixed-point per task
/// over the higher-priority interference.
fn wcrt_fps(tasks: &[Task], delta: Seconds) -> WcrtTable {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|t| t.priority.unwrap_or(u32::MAX));

    let mut table = WcrtTable::new();
    for (i, task) in sorted.iter().enumerate() {
        let higher_priority = &sorted[..i];
        let init = task.wcet + delta + task.jitter;
        let result = bounded_fixpoint_search(init, task.deadline, |r| {
            let interference: Seconds = higher_priority
                .iter()
                .map(|hp| hp.wcet * r.div_ceil(hp.period))
                .sum();
            task.wcet + delta + task.jitter + interference
        });
        table.insert(task.id.clone(), result);
    }
    table
}

/// EDF WCRT (§4.3): for each task, search the smallest integer `t` at
/// which the cumulative demand of tasks with deadline ≤ this task's
/// deadline is covered by the BDR supply.
fn wcrt_edf(tasks: &[Task], alpha: f64, delta: Seconds) -> WcrtTable {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| a.deadline.0.partial_cmp(&b.deadline.0).unwrap());

    let mut table = WcrtTable::new();
    for (i, task) in sorted.iter().enumerate() {
        let interfering: Vec<Task> = sorted[..=i].iter().map(|t| (**t).clone()).collect();
        let max_deadline = sorted[..=i]
            .iter()
            .map(|t| t.deadline)
            .fold(Seconds::ZERO, Seconds::max);
        let upper = max_deadline * 2.0;
        let lower = (task.deadline + task.jitter).0.ceil() as u64;
        let upper_ticks = upper.0.ceil() as u64;

        let mut found = None;
        for t_ticks in lower..=upper_ticks.max(lower) {
            let t = Seconds(t_ticks as f64);
            let demand = dbf(Scheduler::Edf, &interfering, t - task.jitter);
            let supply = sbf_bdr(alpha, delta, t);
            if demand.le_eps(supply) {
                found = Some(t);
                break;
            }
        }
        table.insert(task.id.clone(), found);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, ComponentId, SupplyInterface, TaskType};
    use assert_approx_eq::assert_approx_eq;

    fn task(id: &str, c: f64, p: f64, d: f64, prio: Option<u32>) -> Task {
        Task {
            id: TaskId::from(id),
            wcet: Seconds(c),
            period: Seconds(p),
            deadline: Seconds(d),
            priority: prio,
            kind: TaskType::Hard,
            jitter: Seconds::ZERO,
        }
    }

    fn component(scheduler: Scheduler, tasks: Vec<Task>, alpha: f64, delta: Seconds) -> Component {
        Component {
            id: ComponentId::from("s1"),
            scheduler,
            tasks,
            subcomponents: vec![],
            interface: SupplyInterface::from_bdr(alpha, delta).unwrap(),
            priority: None,
        }
    }

    #[test]
    fn scenario_1_edf_trivially_schedulable() {
        // Tasks {(C=1,P=D=4), (C=2,P=D=8)}, alpha=0.5, delta=1: both the
        // BDR and the PRM-equivalent supply cover the demand at every
        // checkpoint in the horizon, so the component is schedulable and
        // every task has a finite response time within its deadline.
        let comp = component(
            Scheduler::Edf,
            vec![task("t1", 1.0, 4.0, 4.0, None), task("t2", 2.0, 8.0, 8.0, None)],
            0.5,
            Seconds(1.0),
        );
        let result = analyze_component(&comp, 1.0);
        assert!(result.bdr.schedulable);
        assert!(result.bdr.wcrt[&TaskId::from("t1")].is_some());
        assert!(result.bdr.wcrt[&TaskId::from("t2")].is_some());
    }

    #[test]
    fn scenario_2_overutilized_is_not_schedulable() {
        let comp = component(Scheduler::Edf, vec![task("t1", 3.0, 4.0, 4.0, None)], 0.5, Seconds(0.0));
        let result = analyze_component(&comp, 1.0);
        assert!(!result.bdr.schedulable);
    }

    #[test]
    fn scenario_3_rm_wcrt() {
        let comp = component(
            Scheduler::Fps,
            vec![task("t1", 1.0, 5.0, 5.0, Some(1)), task("t2", 2.0, 10.0, 10.0, Some(2))],
            0.9,
            Seconds(0.0),
        );
        let result = analyze_component(&comp, 1.0);
        assert_approx_eq!(result.bdr.wcrt[&TaskId::from("t1")].unwrap().0, 1.0, 1e-4);
        assert_approx_eq!(result.bdr.wcrt[&TaskId::from("t2")].unwrap().0, 3.0, 1e-4);
    }
}
