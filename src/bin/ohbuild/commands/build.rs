//! Default command: build, test and publish one platform.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::Cli;
use ohbuild::core::configuration::resolve_from_process;
use ohbuild::ops::context::SystemCollaborators;
use ohbuild::ops::pipeline::{self, prepare, PipelineError};
use ohbuild::util::config::{global_config_path, load_config, Config, Settings, PROJECT_CONFIG_FILE};
use ohbuild::util::process::find_executable;

pub fn execute(cli: &Cli) -> Result<()> {
    let root = working_directory(cli.directory.as_deref())?;
    let cfg = resolve_from_process(&cli.options()).map_err(PipelineError::from)?;

    if cli.plan {
        let prepared = prepare(&cfg)?;
        println!("{}", serde_json::to_string_pretty(&prepared)?);
        return Ok(());
    }

    let settings = load_settings(&root, cli.config.as_deref())?;
    check_tools(&settings);

    let collaborators = SystemCollaborators::new(&root, &settings);
    pipeline::run(&collaborators.context(&settings, &root), &cfg)?;
    Ok(())
}

fn working_directory(directory: Option<&Path>) -> Result<PathBuf> {
    let dir = match directory {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("failed to determine current directory")?,
    };
    dir.canonicalize()
        .with_context(|| format!("working directory {} does not exist", dir.display()))
}

/// Global settings, then the project file (an explicit `--config` must
/// exist and parse).
fn load_settings(root: &Path, explicit: Option<&Path>) -> Result<Settings> {
    let global = global_config_path();
    let config = match explicit {
        Some(path) => {
            let mut config = global
                .as_deref()
                .map(Config::load_or_default)
                .unwrap_or_default();
            config.merge(Config::load(path)?);
            config
        }
        None => load_config(global.as_deref(), &root.join(PROJECT_CONFIG_FILE)),
    };
    Ok(config.settings())
}

fn check_tools(settings: &Settings) {
    for tool in [&settings.make, &settings.rsync, &settings.ssh] {
        match find_executable(tool) {
            Some(path) => tracing::debug!("using {}", path.display()),
            None => tracing::debug!("`{}` not found on PATH", tool),
        }
    }
}
