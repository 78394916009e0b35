//! Build configuration resolution.
//!
//! The CI server passes its job parameters through environment variables,
//! while developers running the orchestrator by hand use command-line flags.
//! When both are present the environment wins.

use std::ffi::OsString;

use serde::Serialize;
use thiserror::Error;

/// Environment variable naming the platform.
pub const ENV_PLATFORM: &str = "PLATFORM";
/// Environment variable enabling nightly mode (`"true"` enables).
pub const ENV_NIGHTLY: &str = "NIGHTLY";
/// Environment variable enabling release publishing (`"true"` enables).
pub const ENV_PUBLISH: &str = "PUBLISH";
/// Environment variable carrying the release version.
pub const ENV_PUBLISH_VERSION: &str = "PUBLISH_VERSION";

/// Options as given on the command line, before merging with the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub platform: Option<String>,
    pub nightly: bool,
    pub publish: bool,
    pub version: Option<String>,
    pub parallel: bool,
}

/// The resolved configuration for one orchestrator run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    pub platform_id: Option<String>,
    pub nightly: bool,
    pub release: bool,
    pub version: Option<String>,
    pub parallel: bool,
}

/// Malformed orchestrator input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("environment variable `{name}` is not valid UTF-8")]
    NotUnicode { name: &'static str },

    #[error("platform identifier is empty")]
    EmptyPlatform,

    #[error("no platform given; set `PLATFORM` or pass `--platform`")]
    MissingPlatform,

    #[error("invalid release version `{version}`: {reason}")]
    InvalidVersion { version: String, reason: &'static str },

    #[error("publishing requires a version; set `PUBLISH_VERSION` or pass `--version`")]
    MissingVersion,
}

impl BuildConfiguration {
    /// The platform identifier, required from the registry lookup onwards.
    pub fn platform_id(&self) -> Result<&str, ConfigurationError> {
        self.platform_id
            .as_deref()
            .ok_or(ConfigurationError::MissingPlatform)
    }

    /// The release version, required and validated only when packaging.
    pub fn version(&self) -> Result<&str, ConfigurationError> {
        let version = self
            .version
            .as_deref()
            .ok_or(ConfigurationError::MissingVersion)?;
        validate_version(version)?;
        Ok(version)
    }
}

/// Merge command-line options with environment variables.
///
/// `env` looks up a single variable; pass `std::env::var_os` for the real
/// process environment. Absent optional fields never cause an error.
pub fn resolve<F>(cli: &CliOptions, env: F) -> Result<BuildConfiguration, ConfigurationError>
where
    F: Fn(&str) -> Option<OsString>,
{
    let var = |name: &'static str| -> Result<Option<String>, ConfigurationError> {
        env(name)
            .map(|value| {
                value
                    .into_string()
                    .map_err(|_| ConfigurationError::NotUnicode { name })
            })
            .transpose()
    };

    let platform_id = var(ENV_PLATFORM)?.or_else(|| cli.platform.clone());
    if platform_id.as_deref() == Some("") {
        return Err(ConfigurationError::EmptyPlatform);
    }

    let nightly = var(ENV_NIGHTLY)?.as_deref() == Some("true") || cli.nightly;
    let release = var(ENV_PUBLISH)?.as_deref() == Some("true") || cli.publish;

    // CI jobs pass an empty version on commit builds.
    let version = var(ENV_PUBLISH_VERSION)?
        .filter(|v| !v.is_empty())
        .or_else(|| cli.version.clone().filter(|v| !v.is_empty()));

    let config = BuildConfiguration {
        platform_id,
        nightly,
        release,
        version,
        parallel: cli.parallel,
    };

    tracing::debug!(
        "resolved configuration: platform={:?} nightly={} release={} version={:?} parallel={}",
        config.platform_id,
        config.nightly,
        config.release,
        config.version,
        config.parallel
    );

    Ok(config)
}

/// Resolve against the current process environment.
pub fn resolve_from_process(cli: &CliOptions) -> Result<BuildConfiguration, ConfigurationError> {
    resolve(cli, |name| std::env::var_os(name))
}

// The version is spliced into a bundle file name.
fn validate_version(version: &str) -> Result<(), ConfigurationError> {
    let reason = if version.is_empty() {
        "version is empty"
    } else if version.contains(['/', '\\']) {
        "version contains a path separator"
    } else if version.chars().any(char::is_whitespace) {
        "version contains whitespace"
    } else {
        return Ok(());
    };

    Err(ConfigurationError::InvalidVersion {
        version: version.to_string(),
        reason,
    })
}
