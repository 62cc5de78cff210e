//! Optional pre-pass heuristics (§4.9, §4.10): greedy core assignment and
//! BDR auto-tuning. Both are ambient, opt-in concerns gated behind CLI
//! flags; neither runs implicitly.

pub mod core_assignment;
pub mod tuner;

pub use core_assignment::assign_cores;
pub use tuner::tune_system;
