//! ohbuild - CI build orchestrator for ohNet
//!
//! This crate turns a platform identifier plus a handful of CI parameters
//! into concrete build, test, packaging and publishing commands, and runs
//! them in order.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for ohbuild unit tests.
///
/// This module is only available when running tests. It provides a mock
/// for every external collaborator and a temporary workspace.
#[cfg(test)]
pub mod test_support;

pub use builder::plan::{compile, CompiledPlan};
pub use core::configuration::{BuildConfiguration, CliOptions, ConfigurationError};
pub use core::platform::{lookup, PlatformAttributes, UnknownPlatformError};
pub use core::variant::BuildVariant;
pub use ops::pipeline::{prepare, run, PipelineError, PreparedRun};
