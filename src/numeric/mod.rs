//! Pure numeric primitives: demand-bound functions, supply-bound functions,
//! and the half-half interface mapper. Nothing in this module touches the
//! model tree or performs I/O; everything here is a free function over
//! plain numbers and task slices, keeping "analysis" (which interprets
//! results) separate from "algorithm" (which computes them).

pub mod dbf;
pub mod mapper;
pub mod sbf;

pub use dbf::{dbf_edf, dbf_fps, dbf_server};
pub use sbf::{sbf_bdr, sbf_prm};
