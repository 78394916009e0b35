//! Post-build actions.
//!
//! Which actions run depends on the platform and mode:
//!
//! | condition                               | action                          |
//! |-----------------------------------------|---------------------------------|
//! | always                                  | stub memory-check report        |
//! | nightly, Linux x86                      | parse report, publish docs      |
//! | Linux ARM (armel/armhf)                 | remote test suite               |
//! | publishable platform, publishing        | release packaging               |

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::builder::plan::CompiledPlan;
use crate::core::configuration::BuildConfiguration;
use crate::core::platform::{Architecture, OsFamily, PlatformAttributes};
use crate::ops::context::OpsContext;
use crate::ops::release::{release, ReleaseFailure};
use crate::util::remote::contents_of;

/// Local directory pushed to the test board.
const TEST_BUILD_DIR: &str = "Build";
/// Build outputs the test board never needs.
const TEST_EXCLUDES: [&str; 3] = ["*.o", "*.a", "Bundles"];
/// Test driver pushed alongside the build.
const TEST_DRIVER: &str = "AllTests.py";

/// A post-build action failed.
#[derive(Debug, Error)]
pub enum PostActionFailure {
    #[error("failed to write the stub report to {dir}")]
    Report {
        dir: String,
        #[source]
        source: io::Error,
    },

    #[error("`{action}` failed with exit code {exit_code}")]
    Exit { action: String, exit_code: i32 },

    #[error("failed to run `{action}`")]
    Spawn {
        action: String,
        #[source]
        source: io::Error,
    },

    #[error("release packaging failed")]
    Release(#[from] ReleaseFailure),
}

/// Run the post-build actions for a successful build.
///
/// The stub report is written before anything else; every later action
/// aborts the dispatch on its first failure.
pub fn dispatch(
    ctx: &OpsContext<'_>,
    attrs: &PlatformAttributes,
    cfg: &BuildConfiguration,
    plan: &CompiledPlan,
) -> Result<(), PostActionFailure> {
    let report_dir = ctx.path(&ctx.settings.report_dir);
    ctx.report
        .emit_stub(&report_dir)
        .map_err(|source| PostActionFailure::Report {
            dir: report_dir.display().to_string(),
            source,
        })?;

    let arm_linux = attrs.os_family == OsFamily::Linux && attrs.architecture.is_arm_class();

    if cfg.nightly {
        if attrs.is(OsFamily::Linux, Architecture::X86) {
            parse_report(ctx)?;
            publish_docs(ctx)?;
        }
        if arm_linux {
            remote_tests(ctx, cfg)?;
        }
    } else if arm_linux {
        remote_tests(ctx, cfg)?;
    }

    if attrs.publishable && cfg.release {
        release(ctx, attrs, cfg, plan)?;
    } else {
        tracing::debug!("not publishing {}", attrs.system_label);
    }

    Ok(())
}

/// Remote test suite command line run on the board.
pub fn remote_test_command(cfg: &BuildConfiguration) -> String {
    let mut line = format!("python {} -t", TEST_DRIVER);
    if cfg.nightly {
        line.push_str(" -f");
    }
    if !cfg.release {
        line.push_str(" --debug");
    }
    line
}

fn parse_report(ctx: &OpsContext<'_>) -> Result<(), PostActionFailure> {
    let dir = ctx.path(&ctx.settings.report_dir);
    tracing::info!("parsing memory-check report in {}", dir.display());
    check("parse report", ctx.report.parse_and_emit(&dir))
}

fn publish_docs(ctx: &OpsContext<'_>) -> Result<(), PostActionFailure> {
    check("generate docs", ctx.docs.generate())?;

    let endpoint = &ctx.settings.docs_host;
    let local = contents_of(ctx.docs.output_dir());
    check(
        &format!("sync {} to {}", local.display(), endpoint.host),
        ctx.sync.sync_push(&local, &endpoint.host, &endpoint.path, &[]),
    )
}

fn remote_tests(ctx: &OpsContext<'_>, cfg: &BuildConfiguration) -> Result<(), PostActionFailure> {
    let endpoint = &ctx.settings.test_host;
    tracing::info!("running remote tests on {}", endpoint.host);

    let excludes: Vec<String> = TEST_EXCLUDES.iter().map(|s| s.to_string()).collect();
    check(
        &format!("sync {} to {}", TEST_BUILD_DIR, endpoint.host),
        ctx.sync.sync_push(
            Path::new(TEST_BUILD_DIR),
            &endpoint.host,
            &endpoint.path,
            &excludes,
        ),
    )?;
    check(
        &format!("sync {} to {}", TEST_DRIVER, endpoint.host),
        ctx.sync
            .sync_push(Path::new(TEST_DRIVER), &endpoint.host, &endpoint.path, &[]),
    )?;

    let command_line = remote_test_command(cfg);
    check(
        &command_line,
        ctx.shell.run_remote(&endpoint.host, &command_line),
    )
}

fn check(action: &str, result: io::Result<i32>) -> Result<(), PostActionFailure> {
    match result {
        Ok(0) => Ok(()),
        Ok(exit_code) => Err(PostActionFailure::Exit {
            action: action.to_string(),
            exit_code,
        }),
        Err(source) => Err(PostActionFailure::Spawn {
            action: action.to_string(),
            source,
        }),
    }
}
