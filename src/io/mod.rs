//! Ambient CSV I/O (§4.7, §4.8): the model loader and the solution writer.

pub mod loader;
pub mod writer;

pub use loader::load_system_model;
pub use writer::write_solution;
