//! Application-level configuration.
//!
//! - [`ExecutionParams`]: agent loop bounds (steps, wall-clock budget)

pub mod execution_params;

pub use execution_params::ExecutionParams;
