//! Release packaging: bundle each variant, version the archive, upload.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::builder::plan::CompiledPlan;
use crate::core::configuration::{BuildConfiguration, ConfigurationError};
use crate::core::platform::PlatformAttributes;
use crate::core::variant::BuildVariant;
use crate::ops::context::OpsContext;
use crate::util::fs::replace_file;
use crate::util::process::Invocation;
use crate::util::remote::contents_of;

/// Release packaging failed. Already uploaded files are left in place.
#[derive(Debug, Error)]
pub enum ReleaseFailure {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("`{command}` failed with exit code {exit_code}")]
    Exit { command: String, exit_code: i32 },

    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to move bundle {} to {}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Name of the archive `make bundle` produces for a variant.
pub fn bundle_name(
    product: &str,
    attrs: &PlatformAttributes,
    variant: BuildVariant,
) -> String {
    format!(
        "{}-{}-{}-{}.tar.gz",
        product,
        attrs.system_label,
        attrs.architecture,
        variant.title()
    )
}

/// Name the archive is published under.
pub fn versioned_bundle_name(
    product: &str,
    version: &str,
    attrs: &PlatformAttributes,
    variant: BuildVariant,
) -> String {
    format!(
        "{}-{}-{}-{}-{}.tar.gz",
        product,
        version,
        attrs.system_label,
        attrs.architecture,
        variant.title()
    )
}

/// Package and upload the Release and Debug bundles.
///
/// Callers only invoke this for publishable platforms with publishing
/// enabled.
pub fn release(
    ctx: &OpsContext<'_>,
    attrs: &PlatformAttributes,
    cfg: &BuildConfiguration,
    plan: &CompiledPlan,
) -> Result<(), ReleaseFailure> {
    let version = cfg.version()?;
    let settings = ctx.settings;

    for variant in BuildVariant::release_set() {
        tracing::info!("packaging {} {} bundle", version, variant);

        run(ctx, plan, vec![settings.make.clone(), "tt".into(), "uset4=yes".into()])?;

        let mut bundle = vec![
            settings.make.clone(),
            "bundle".to_string(),
            "uset4=yes".to_string(),
            format!("openhome_system={}", attrs.system_label),
            format!("openhome_architecture={}", attrs.architecture),
            format!("openhome_configuration={}", variant.title()),
        ];
        bundle.extend(plan.make_variable_args());
        run(ctx, plan, bundle)?;

        let bundle_dir = ctx.path(&settings.bundle_dir);
        let from = bundle_dir.join(bundle_name(&settings.bundle_product, attrs, variant));
        let to = bundle_dir.join(versioned_bundle_name(
            &settings.bundle_product,
            version,
            attrs,
            variant,
        ));
        replace_file(&from, &to).map_err(|source| ReleaseFailure::Rename {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        tracing::info!("bundled {}", to.display());

        upload(ctx, &settings.bundle_dir)?;
    }

    Ok(())
}

fn run(ctx: &OpsContext<'_>, plan: &CompiledPlan, command: Vec<String>) -> Result<(), ReleaseFailure> {
    let invocation = Invocation::new(plan.with_prefix(command)).with_env(&plan.environment_mutations);
    let command = invocation.display_command();
    tracing::debug!("running `{}`", command);

    match ctx.runner.run(&invocation) {
        Ok(0) => Ok(()),
        Ok(exit_code) => Err(ReleaseFailure::Exit { command, exit_code }),
        Err(source) => Err(ReleaseFailure::Spawn { command, source }),
    }
}

fn upload(ctx: &OpsContext<'_>, bundle_dir: &Path) -> Result<(), ReleaseFailure> {
    let endpoint = &ctx.settings.release_host;
    let command = format!(
        "sync {} to {}",
        bundle_dir.display(),
        endpoint.host.location(&endpoint.path)
    );

    match ctx
        .sync
        .sync_push(&contents_of(bundle_dir), &endpoint.host, &endpoint.path, &[])
    {
        Ok(0) => Ok(()),
        Ok(exit_code) => Err(ReleaseFailure::Exit { command, exit_code }),
        Err(source) => Err(ReleaseFailure::Spawn { command, source }),
    }
}
