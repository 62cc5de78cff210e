//! Crate-wide error types.
//!
//! [`ModelError`] covers the fatal, abort-before-analysis input-shape and
//! domain-range errors (§7 kinds 1–2). Analysis outcomes (§7 kinds 3–4) are
//! never exceptions — an infeasible or non-converging result is just a
//! value, expressed as a plain `bool`/`Option<Seconds>` on
//! [`ComponentAnalysis`](crate::analysis::ComponentAnalysis) and
//! [`CoreVerdict`](crate::analysis::hierarchical::CoreVerdict).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{table} row references unknown {kind} id '{id}'")]
    UnknownReference { table: &'static str, kind: &'static str, id: String },

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("task '{task}' has non-positive wcet, period, or deadline")]
    NonPositiveTaskParameter { task: String },

    #[error("task '{task}' has deadline {deadline} greater than period {period}")]
    DeadlineExceedsPeriod { task: String, deadline: f64, period: f64 },

    #[error("component '{component}' has budget {budget} greater than period {period}")]
    BudgetExceedsPeriod { component: String, budget: f64, period: f64 },

    #[error("invalid BDR bandwidth alpha={alpha}, must be in [0, 1)")]
    InvalidBandwidth { alpha: f64 },

    #[error("{context}: unrecognized scheduler '{value}' (expected EDF, FPS, or RM)")]
    InvalidScheduler { context: String, value: String },

    #[error("io error reading '{path}': {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("csv error in '{table}': {source}")]
    Csv { table: &'static str, #[source] source: csv::Error },
}
