//! High-level operations.
//!
//! This module contains the orchestrator pipeline and the post-build steps
//! it drives.

pub mod context;
pub mod pipeline;
pub mod post_actions;
pub mod release;

pub use context::{OpsContext, SystemCollaborators};
pub use pipeline::{prepare, run, PipelineError, PreparedRun};
pub use post_actions::{dispatch, PostActionFailure};
pub use release::{release, ReleaseFailure};
