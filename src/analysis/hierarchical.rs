//! The hierarchical analyzer (§4.5): orchestrates the component analyzer
//! and the core analyzer over a whole [`SystemModel`].

use std::collections::HashMap;

use crate::model::{Component, ComponentId, CoreId, SystemModel};

use super::component::{analyze_component, ComponentAnalysis};
use super::core::analyze_core;

/// The core-level verdict for one core. `computed = false` means the
/// precondition of §4.4 was not met (some component on the core failed
/// its local BDR test), so the core analyzer did not run and every
/// component on that core keeps only its local verdict.
#[derive(Debug, Clone, Copy)]
pub struct CoreVerdict {
    pub computed: bool,
    pub schedulable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SystemAnalysis {
    pub components: HashMap<ComponentId, ComponentAnalysis>,
    pub cores: HashMap<CoreId, CoreVerdict>,
}

impl SystemAnalysis {
    /// The final, combined schedulability of a component (§7): local BDR
    /// schedulability AND, when the core-level test actually ran, the
    /// core-level verdict.
    pub fn component_schedulable(&self, core_id: &CoreId, component_id: &ComponentId) -> bool {
        let local = self
            .components
            .get(component_id)
            .map(|c| c.schedulable())
            .unwrap_or(false);
        let core_ok = self
            .cores
            .get(core_id)
            .map(|v| !v.computed || v.schedulable)
            .unwrap_or(true);
        local && core_ok
    }
}

fn collect_components<'a>(component: &'a Component, out: &mut Vec<&'a Component>) {
    out.push(component);
    for sub in &component.subcomponents {
        collect_components(sub, out);
    }
}

/// Run the component analyzer on every component of the system (recursing
/// into subcomponents), then the core analyzer on every core whose
/// components all passed locally (§4.4's precondition).
pub fn analyze_system(model: &SystemModel) -> SystemAnalysis {
    let mut analysis = SystemAnalysis::default();

    for core in &model.cores {
        let mut all_components = Vec::new();
        for top in &core.components {
            collect_components(top, &mut all_components);
        }

        for component in &all_components {
            let result = analyze_component(component, core.speed_factor);
            analysis.components.insert(component.id.clone(), result);
        }

        let precondition_met = all_components
            .iter()
            .all(|c| analysis.components[&c.id].schedulable());

        let verdict = if precondition_met {
            CoreVerdict { computed: true, schedulable: analyze_core(core).schedulable }
        } else {
            CoreVerdict { computed: false, schedulable: false }
        };
        analysis.cores.insert(core.id.clone(), verdict);
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Core, Scheduler, SupplyInterface, Seconds, Task, TaskId, TaskType};

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
    fn core_verdict_not_computed_when_a_component_fails_locally() {
        let bad = Component {
            id: ComponentId::from("bad"),
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
            components: vec![bad],
        };
        let model = SystemModel::new(vec![core]);
        let analysis = analyze_system(&model);
        let verdict = analysis.cores[&CoreId::from("c1")];
        assert!(!verdict.computed);
        assert!(!analysis.component_schedulable(&CoreId::from("c1"), &ComponentId::from("bad")));
    }
}
