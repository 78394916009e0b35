//! The orchestrator pipeline.
//!
//! Stages run strictly in order: platform lookup, argument compilation,
//! build, post-build actions. Everything that can be checked without
//! running a command is checked before the first build starts.

use serde::Serialize;
use thiserror::Error;

use crate::builder::executor::{BuildExecutor, BuildFailure};
use crate::builder::plan::{compile, CompiledPlan};
use crate::core::configuration::{BuildConfiguration, ConfigurationError};
use crate::core::platform::{lookup, PlatformAttributes, UnknownPlatformError};
use crate::core::variant::BuildVariant;
use crate::ops::context::OpsContext;
use crate::ops::post_actions::{dispatch, PostActionFailure};
use crate::ops::release::ReleaseFailure;

/// Exit code for a failed external command.
pub const EXTERNAL_FAILURE_EXIT_CODE: i32 = 10;

/// Exit code for configuration and setup errors.
pub const SETUP_FAILURE_EXIT_CODE: i32 = 1;

/// Any failure of an orchestrator run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    UnknownPlatform(#[from] UnknownPlatformError),

    #[error(transparent)]
    Build(#[from] BuildFailure),

    #[error(transparent)]
    PostAction(#[from] PostActionFailure),
}

impl PipelineError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Configuration(_)
            | PipelineError::UnknownPlatform(_)
            | PipelineError::PostAction(PostActionFailure::Release(
                ReleaseFailure::Configuration(_),
            )) => SETUP_FAILURE_EXIT_CODE,
            PipelineError::Build(_) | PipelineError::PostAction(_) => EXTERNAL_FAILURE_EXIT_CODE,
        }
    }
}

/// A validated run: the platform and its compiled plan.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedRun {
    pub platform: String,
    pub attributes: &'static PlatformAttributes,
    pub configuration: BuildConfiguration,
    pub variants: Vec<BuildVariant>,
    pub plan: CompiledPlan,
    /// Whether the release packager will run after the build.
    pub publishes: bool,
}

impl PreparedRun {
    /// Build-tool command lines, one per variant.
    pub fn commands(&self) -> Vec<String> {
        self.variants
            .iter()
            .map(|&variant| self.plan.build_command(variant).join(" "))
            .collect()
    }
}

/// Look up the platform, validate the configuration and compile the plan.
pub fn prepare(cfg: &BuildConfiguration) -> Result<PreparedRun, PipelineError> {
    let platform = cfg.platform_id()?;
    let attributes = lookup(platform)?;

    // The version only matters once something is packaged.
    let publishes = attributes.publishable && cfg.release;
    if publishes {
        cfg.version()?;
    }

    let plan = compile(attributes, cfg);
    tracing::debug!("compiled plan for {}: {:?}", platform, plan);

    Ok(PreparedRun {
        platform: platform.to_string(),
        attributes,
        configuration: cfg.clone(),
        variants: BuildVariant::build_set(cfg.release),
        plan,
        publishes,
    })
}

/// Run the whole pipeline.
pub fn run(ctx: &OpsContext<'_>, cfg: &BuildConfiguration) -> Result<(), PipelineError> {
    let prepared = prepare(cfg)?;

    tracing::info!(
        "building {} ({}{})",
        prepared.platform,
        if cfg.nightly { "nightly" } else { "commit" },
        if prepared.publishes { ", publishing" } else { "" }
    );

    BuildExecutor::new(ctx.runner).execute(&prepared.plan, &prepared.variants)?;
    dispatch(ctx, prepared.attributes, cfg, &prepared.plan)?;

    tracing::info!("{} finished", prepared.platform);
    Ok(())
}
