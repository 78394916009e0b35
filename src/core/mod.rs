//! Core data structures for ohbuild.
//!
//! - Build configuration resolved from the CLI and the environment
//! - The platform registry
//! - Build variants

pub mod configuration;
pub mod platform;
pub mod variant;

pub use configuration::{BuildConfiguration, CliOptions, ConfigurationError};
pub use platform::{Architecture, OsFamily, PlatformAttributes, UnknownPlatformError};
pub use variant::BuildVariant;
