//! Generic helpers shared by the analyzer and the simulator: the
//! fixed-point search driver (§4.3, §4.4) and hyper-period / horizon
//! arithmetic (§4.3, §4.4).

pub mod fixpoint;
pub mod horizon;

pub use fixpoint::{bounded_fixpoint_search, fixpoint_search_with_limit};
pub use horizon::{component_horizon, core_horizon, hyperperiod, lcm_seconds};
