//! Hyper-period and analysis-horizon computation.
//!
//! Periods are rounded to the nearest integer time unit before taking the
//! least common multiple, as mandated by §4.3 ("`H`... integer-rounded"),
//! folding `num::integer::lcm` over a task set's periods.

use crate::model::{Seconds, Task};

fn round_to_u64(value: Seconds) -> u64 {
    value.0.round().max(1.0) as u64
}

/// LCM of a set of period-like quantities, rounded to the nearest integer
/// time unit each, returned back as `Seconds`.
pub fn lcm_seconds(periods: impl Iterator<Item = Seconds>) -> Seconds {
    let lcm = periods
        .map(round_to_u64)
        .fold(1u64, num::integer::lcm);
    Seconds(lcm as f64)
}

/// The hyper-period of a task set (§4.1, "Contract: priorities must be
/// assigned" note aside — this is the plain period hyper-period).
pub fn hyperperiod(tasks: &[Task]) -> Seconds {
    lcm_seconds(tasks.iter().map(|t| t.period))
}

/// `H = max(lcm(periods), 2·max(deadlines))`, the horizon for the
/// component-level DBF≤SBF test (§4.3).
pub fn component_horizon(tasks: &[Task]) -> Seconds {
    let lcm = hyperperiod(tasks);
    let max_deadline = tasks
        .iter()
        .map(|t| t.deadline)
        .fold(Seconds::ZERO, Seconds::max);
    lcm.max(max_deadline * 2.0)
}

/// `H_core = lcm(P_k)` over the servers (components) on a core (§4.4).
pub fn core_horizon(periods: impl Iterator<Item = Seconds>) -> Seconds {
    lcm_seconds(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskId;
    use crate::model::TaskType;

    fn task(c: f64, p: f64, d: f64) -> Task {
        Task {
            id: TaskId::from("t"),
            wcet: Seconds(c),
            period: Seconds(p),
            deadline: Seconds(d),
            priority: None,
            kind: TaskType::Hard,
            jitter: Seconds::ZERO,
        }
    }

    #[test]
    fn horizon_picks_the_larger_of_lcm_and_twice_max_deadline() {
        let tasks = vec![task(1.0, 4.0, 4.0), task(2.0, 8.0, 8.0)];
        // lcm(4,8)=8, 2*max(deadline)=16 -> horizon = 16
        assert_eq!(component_horizon(&tasks).0, 16.0);
    }
}
