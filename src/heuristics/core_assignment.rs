//! Greedy core-assignment heuristic (§4.9), grounded on
//! `original_source/greedy_core_assigner.py`'s `assign_components_to_cores`:
//! components are placed by descending bandwidth demand onto the core
//! that stays least loaded after placement, falling back to the
//! least-loaded core when none keeps the load at or below capacity.

use std::collections::HashMap;

use crate::model::{ComponentId, CoreId, EPSILON};

/// Assign each `(component, alpha)` pair in `demands` to one of the cores
/// in `speeds` (keyed by core id, valued by speed factor). Returns the
/// chosen core for every component in `demands`.
pub fn assign_cores(
    demands: &[(ComponentId, f64)],
    speeds: &HashMap<CoreId, f64>,
) -> HashMap<ComponentId, CoreId> {
    let mut ordered: Vec<&(ComponentId, f64)> = demands.iter().collect();
    ordered.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    let mut loads: HashMap<CoreId, f64> = speeds.keys().cloned().map(|id| (id, 0.0)).collect();
    let mut assignments = HashMap::new();

    for (component, alpha) in ordered {
        let mut best: Option<(CoreId, f64)> = None;
        for (core_id, speed) in speeds {
            let eff_alpha = alpha / speed;
            let projected = loads[core_id] + eff_alpha;
            if projected <= 1.0 + EPSILON {
                if best.as_ref().map(|(_, load)| projected < *load).unwrap_or(true) {
                    best = Some((core_id.clone(), projected));
                }
            }
        }

        let chosen = match best {
            Some((core_id, _)) => core_id,
            None => loads
                .iter()
                .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .map(|(id, _)| id.clone())
                .expect("speeds is non-empty"),
        };

        let speed = speeds[&chosen];
        *loads.get_mut(&chosen).unwrap() += alpha / speed;
        assignments.insert(component.clone(), chosen);
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_heaviest_component_first_on_the_fastest_fit() {
        let speeds: HashMap<CoreId, f64> =
            [(CoreId::from("c1"), 1.0), (CoreId::from("c2"), 1.0)].into_iter().collect();
        let demands = vec![
            (ComponentId::from("heavy"), 0.8),
            (ComponentId::from("light"), 0.3),
        ];
        let assignment = assign_cores(&demands, &speeds);
        assert_ne!(assignment[&ComponentId::from("heavy")], assignment[&ComponentId::from("light")]);
    }

    #[test]
    fn falls_back_to_least_loaded_core_when_none_fit() {
        let speeds: HashMap<CoreId, f64> = [(CoreId::from("c1"), 1.0)].into_iter().collect();
        let demands = vec![(ComponentId::from("a"), 0.9), (ComponentId::from("b"), 0.9)];
        let assignment = assign_cores(&demands, &speeds);
        assert_eq!(assignment.len(), 2);
    }
}
