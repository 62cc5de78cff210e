//! BDR auto-tuner (§4.10), grounded on `original_source/bdr_auto_generator.py`'s
//! `compute_optimal_bdr` (global α/Δ sweep) and
//! `original_source/resource_tuner.py`'s `tune_system`/`_candidate_periods`
//! (period-shrinking refinement). Both strategies only ever replace a
//! component's `(Q, P)` with a still-feasible, tighter pair, and run in
//! that order: sweep first for a feasible baseline, then refine.
//!
//! Only invoked behind the CLI's `--tune` flag (§6); never run implicitly.

use crate::analysis::analyze_component;
use crate::model::{Component, Core, Scheduler, Seconds, SupplyInterface, SystemModel, Task, EPSILON};
use crate::numeric::dbf;

/// Run the auto-tuner over every component in the model, mutating supply
/// interfaces in place.
pub fn tune_system(model: &mut SystemModel) {
    for core in &mut model.cores {
        let speed = core.speed_factor;
        let paths = collect_paths(&core.components);
        for path in &paths {
            tune_one_component(core, path, speed);
        }
    }
}

fn collect_paths(components: &[Component]) -> Vec<Vec<usize>> {
    fn walk(components: &[Component], prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        for (i, c) in components.iter().enumerate() {
            prefix.push(i);
            out.push(prefix.clone());
            walk(&c.subcomponents, prefix, out);
            prefix.pop();
        }
    }
    let mut out = Vec::new();
    walk(components, &mut Vec::new(), &mut out);
    out
}

fn component_at<'a>(core: &'a Core, path: &[usize]) -> &'a Component {
    let mut comp = &core.components[path[0]];
    for &idx in &path[1..] {
        comp = &comp.subcomponents[idx];
    }
    comp
}

fn component_at_mut<'a>(core: &'a mut Core, path: &[usize]) -> &'a mut Component {
    let mut comp = &mut core.components[path[0]];
    for &idx in &path[1..] {
        comp = &mut comp.subcomponents[idx];
    }
    comp
}

fn tune_one_component(core: &mut Core, path: &[usize], speed: f64) {
    let (tasks, scheduler) = {
        let comp = component_at(core, path);
        (comp.tasks.clone(), comp.scheduler)
    };
    if tasks.is_empty() {
        return;
    }

    let alpha0 = component_at(core, path).interface.alpha;
    let (swept_alpha, swept_delta) = compute_optimal_bdr(&tasks, scheduler, None, 0.1);
    if swept_alpha < alpha0 - EPSILON {
        if let Ok(interface) = SupplyInterface::from_bdr(swept_alpha, swept_delta) {
            component_at_mut(core, path).interface = interface;
        }
    }

    refine_period(core, path, speed);
}

/// Repeatedly halve/third/... the component's current period while
/// holding `α` fixed, re-checking both the local BDR test and the full
/// core-level re-check, per `resource_tuner.py`'s `tune_system`.
fn refine_period(core: &mut Core, path: &[usize], speed: f64) {
    let (alpha, period0, budget0) = {
        let interface = component_at(core, path).interface;
        (interface.alpha, interface.period, interface.budget)
    };
    let p0_ticks = period0.0.round().max(1.0) as u64;

    let mut best = (budget0, period0);

    for p_ticks in candidate_periods(p0_ticks) {
        let period = Seconds(p_ticks as f64);
        let budget = period * alpha;
        let interface = match SupplyInterface::from_prm(budget, period, component_at(core, path).id.as_str()) {
            Ok(i) => i,
            Err(_) => continue,
        };
        component_at_mut(core, path).interface = interface;

        let comp_ok = analyze_component(component_at(core, path), speed).schedulable();
        if !comp_ok {
            continue;
        }

        if core_fully_schedulable(core, speed) {
            best = (budget, period);
        } else {
            break;
        }
    }

    if let Ok(interface) = SupplyInterface::from_prm(best.0, best.1, component_at(core, path).id.as_str()) {
        component_at_mut(core, path).interface = interface;
    }
}

fn core_fully_schedulable(core: &Core, speed: f64) -> bool {
    let paths = collect_paths(&core.components);
    let all_local_ok = paths
        .iter()
        .all(|p| analyze_component(component_at(core, p), speed).schedulable());
    if !all_local_ok {
        return false;
    }
    crate::analysis::core::analyze_core(core).schedulable
}

fn candidate_periods(p0: u64) -> impl Iterator<Item = u64> {
    let mut seen = std::collections::HashSet::new();
    let mut k = 2u64;
    std::iter::from_fn(move || loop {
        let p = p0 / k;
        k += 1;
        if p < 1 {
            return None;
        }
        if seen.insert(p) {
            return Some(p);
        }
        if k > p0 + 2 {
            return None;
        }
    })
}

/// Binary search on `α` at each swept `Δ` candidate for the smallest
/// feasible bandwidth, mirroring `bdr_auto_generator.py`'s
/// `compute_optimal_bdr`.
pub fn compute_optimal_bdr(
    tasks: &[Task],
    scheduler: Scheduler,
    horizon: Option<Seconds>,
    step: f64,
) -> (f64, Seconds) {
    let horizon = horizon.unwrap_or_else(|| {
        let sum: f64 = tasks.iter().map(|t| t.period.0).sum();
        Seconds(sum.ceil())
    });
    let horizon_ticks = horizon.0.ceil().max(1.0) as u64;
    let steps = (horizon.0 / step).floor() as u64;

    let mut best_alpha = 1.0f64;
    let mut best_delta = Seconds::ZERO;

    for i in 0..=steps {
        let delta = Seconds(i as f64 * step);
        let mut alpha_low = 0.0f64;
        let mut alpha_high = 1.0f64;
        let mut feasible_alpha: Option<f64> = None;

        while alpha_high - alpha_low > 1e-4 {
            let alpha_mid = (alpha_low + alpha_high) / 2.0;
            let mut feasible = true;
            for t_ticks in 1..=horizon_ticks {
                let t = Seconds(t_ticks as f64);
                let demand = dbf(scheduler, tasks, t);
                let supply = alpha_mid * (t.0 - delta.0).max(0.0);
                if demand.0 > supply + EPSILON {
                    feasible = false;
                    break;
                }
            }
            if feasible {
                feasible_alpha = Some(alpha_mid);
                alpha_high = alpha_mid;
            } else {
                alpha_low = alpha_mid;
            }
        }

        if let Some(alpha) = feasible_alpha {
            if alpha < best_alpha {
                best_alpha = alpha;
                best_delta = delta;
            }
        }
    }

    (best_alpha, best_delta)
}
