//! Build planning and execution.
//!
//! Platform rules are compiled into a [`CompiledPlan`], which the
//! [`BuildExecutor`] runs once per variant.

pub mod executor;
pub mod plan;
pub mod rules;

pub use executor::{BuildExecutor, BuildFailure};
pub use plan::{compile, CompiledPlan};
