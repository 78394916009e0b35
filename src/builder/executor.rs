//! Build executor.
//!
//! Runs the compiled build-tool command once per variant, stopping at the
//! first failure.

use std::io;

use thiserror::Error;

use crate::builder::plan::CompiledPlan;
use crate::core::variant::BuildVariant;
use crate::util::process::{CommandRunner, Invocation};

/// A build-tool invocation failed.
#[derive(Debug, Error)]
pub enum BuildFailure {
    #[error("{variant} build failed with exit code {exit_code}")]
    Exit { variant: BuildVariant, exit_code: i32 },

    #[error("failed to start {variant} build")]
    Spawn {
        variant: BuildVariant,
        #[source]
        source: io::Error,
    },
}

/// Build executor over a command runner.
pub struct BuildExecutor<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> BuildExecutor<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        BuildExecutor { runner }
    }

    /// Build every variant in order. A failed variant aborts the rest.
    pub fn execute(&self, plan: &CompiledPlan, variants: &[BuildVariant]) -> Result<(), BuildFailure> {
        for &variant in variants {
            let invocation =
                Invocation::new(plan.build_command(variant)).with_env(&plan.environment_mutations);

            tracing::info!("building {}: {}", variant, invocation.display_command());

            let exit_code = self
                .runner
                .run(&invocation)
                .map_err(|source| BuildFailure::Spawn { variant, source })?;

            if exit_code != 0 {
                tracing::error!("{} build exited with {}", variant, exit_code);
                return Err(BuildFailure::Exit { variant, exit_code });
            }
        }

        Ok(())
    }
}
