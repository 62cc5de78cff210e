//! The core analyzer (§4.4): verifies that the component-servers on a
//! core fit together under the core's top-level scheduler, given that
//! every component already passed its own local BDR test.

use crate::model::{Component, Core, Scheduler, Seconds};
use crate::numeric::dbf_server;
use crate::utils::{bounded_fixpoint_search, core_horizon};

#[derive(Debug, Clone)]
pub struct CoreAnalysis {
    pub schedulable: bool,
}

/// Flatten a core's component tree into the flat server set used for
/// core-level arbitration (§4.5: nested components are treated as direct
/// core clients, an explicit over-approximation — see §9).
pub fn flatten_servers(core: &Core) -> Vec<&Component> {
    fn collect<'a>(component: &'a Component, out: &mut Vec<&'a Component>) {
        out.push(component);
        for sub in &component.subcomponents {
            collect(sub, out);
        }
    }
    let mut servers = Vec::new();
    for top in &core.components {
        collect(top, &mut servers);
    }
    servers
}

/// Run the core-level test, given that the caller has already checked the
/// precondition (every server passed its local BDR test) — this function
/// does not re-check it, so the caller must gate the call per §4.4.
pub fn analyze_core(core: &Core) -> CoreAnalysis {
    let servers = flatten_servers(core);
    let schedulable = match core.scheduler {
        Scheduler::Edf => edf_core_test(&servers),
        Scheduler::Fps => fps_core_test(&servers),
    };
    CoreAnalysis { schedulable }
}

fn edf_core_test(servers: &[&Component]) -> bool {
    if servers.is_empty() {
        return true;
    }
    let horizon = core_horizon(servers.iter().map(|s| s.interface.period));
    let h_ticks = horizon.0.round().max(0.0) as u64;
    for t_ticks in 0..=h_ticks {
        let t = Seconds(t_ticks as f64);
        let demand: Seconds = servers
            .iter()
            .map(|s| dbf_server(s.interface.budget, s.interface.period, s.interface.delta, t))
            .sum();
        if !demand.le_eps(t) {
            return false;
        }
    }
    true
}

fn fps_core_test(servers: &[&Component]) -> bool {
    let mut sorted: Vec<&Component> = servers.to_vec();
    sorted.sort_by_key(|c| c.priority.unwrap_or(u32::MAX));

    for (i, server) in sorted.iter().enumerate() {
        let higher_priority = &sorted[..i];
        let budget = server.interface.budget;
        let period = server.interface.period;
        let converged = bounded_fixpoint_search(budget, period, |r| {
            let interference: Seconds = higher_priority
                .iter()
                .map(|hp| hp.interface.budget * (r + hp.interface.delta).div_ceil(hp.interface.period))
                .sum();
            interference + budget
        });
        if converged.is_none() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentId, CoreId, SupplyInterface};

    fn server(id: &str, budget: f64, period: f64, prio: Option<u32>) -> Component {
        Component {
            id: ComponentId::from(id),
            scheduler: Scheduler::Edf,
            tasks: vec![],
            subcomponents: vec![],
            interface: SupplyInterface::from_prm(Seconds(budget), Seconds(period), id).unwrap(),
            priority: prio,
        }
    }

    fn server_with_jitter(id: &str, budget: f64, period: f64, jitter: f64) -> Component {
        let mut s = server(id, budget, period, None);
        s.interface.delta = Seconds(jitter);
        s
    }

    #[test]
    fn scenario_5_edf_core_with_two_servers() {
        let s1 = server_with_jitter("s1", 2.0, 5.0, 1.0);
        let s2 = server_with_jitter("s2", 1.0, 10.0, 2.0);
        let core = Core {
            id: CoreId::from("c1"),
            scheduler: Scheduler::Edf,
            speed_factor: 1.0,
            components: vec![s1, s2],
        };
        let result = analyze_core(&core);
        assert!(result.schedulable);
    }

    #[test]
    fn flatten_includes_nested_subcomponents() {
        let mut parent = server("parent", 3.0, 5.0, None);
        parent.subcomponents.push(server("child", 1.0, 5.0, None));
        let core = Core {
            id: CoreId::from("c1"),
            scheduler: Scheduler::Edf,
            speed_factor: 1.0,
            components: vec![parent],
        };
        assert_eq!(flatten_servers(&core).len(), 2);
    }

    #[test]
    fn overloaded_fps_core_is_rejected() {
        let s1 = server("s1", 4.0, 5.0, Some(0));
        let s2 = server("s2", 4.0, 5.0, Some(1));
        let core = Core {
            id: CoreId::from("c1"),
            scheduler: Scheduler::Fps,
            speed_factor: 1.0,
            components: vec![s1, s2],
        };
        let result = analyze_core(&core);
        assert!(!result.schedulable);
    }
}
