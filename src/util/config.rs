//! Configuration file support for ohbuild.
//!
//! The platform rules are compiled in; the settings file only describes the
//! environment the orchestrator runs in: where the remote hosts are, which
//! programs to call, and where the build tool leaves its output.
//!
//! Two locations are read:
//! - Global: `~/.ohbuild/config.toml` - build-host defaults
//! - Project: `ohbuild.toml` in the working directory (or `--config`)
//!
//! Project config takes precedence over global config, and anything left
//! unset falls back to the built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::remote::RemoteHost;

/// Default project settings file name.
pub const PROJECT_CONFIG_FILE: &str = "ohbuild.toml";

/// ohbuild configuration, as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote hosts
    pub remote: RemoteConfig,

    /// External programs
    pub tools: ToolsConfig,

    /// Memory-check report
    pub report: ReportConfig,

    /// Release bundles
    pub bundle: BundleConfig,

    /// API documentation
    pub docs: DocsConfig,
}

/// Remote host settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// ARM board running the remote test suite
    pub tests: EndpointConfig,

    /// Documentation web host
    pub docs: EndpointConfig,

    /// Release artifact host
    pub releases: EndpointConfig,
}

/// A remote `user@host:path` location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub user: Option<String>,
    pub host: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub make: Option<String>,
    pub rsync: Option<String>,
    pub ssh: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory the report is written to
    pub dir: Option<PathBuf>,

    /// Parser command line; the report directory is appended
    pub parser: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Directory `make bundle` writes archives to
    pub dir: Option<PathBuf>,

    /// Product name at the start of every archive name
    pub product: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub command: Option<Vec<String>>,

    /// Directory the generated documentation lands in
    pub dir: Option<PathBuf>,
}

impl EndpointConfig {
    fn merge(&mut self, other: EndpointConfig) {
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.path.is_some() {
            self.path = other.path;
        }
    }

    fn resolve(&self, user: &str, host: &str, path: &str) -> Endpoint {
        Endpoint {
            host: RemoteHost::new(
                self.user.as_deref().unwrap_or(user),
                self.host.as_deref().unwrap_or(host),
            ),
            path: self.path.clone().unwrap_or_else(|| path.to_string()),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.remote.tests.merge(other.remote.tests);
        self.remote.docs.merge(other.remote.docs);
        self.remote.releases.merge(other.remote.releases);

        if other.tools.make.is_some() {
            self.tools.make = other.tools.make;
        }
        if other.tools.rsync.is_some() {
            self.tools.rsync = other.tools.rsync;
        }
        if other.tools.ssh.is_some() {
            self.tools.ssh = other.tools.ssh;
        }

        if other.report.dir.is_some() {
            self.report.dir = other.report.dir;
        }
        if other.report.parser.is_some() {
            self.report.parser = other.report.parser;
        }

        if other.bundle.dir.is_some() {
            self.bundle.dir = other.bundle.dir;
        }
        if other.bundle.product.is_some() {
            self.bundle.product = other.bundle.product;
        }

        if other.docs.command.is_some() {
            self.docs.command = other.docs.command;
        }
        if other.docs.dir.is_some() {
            self.docs.dir = other.docs.dir;
        }
    }

    /// Fill in built-in defaults for everything left unset.
    pub fn settings(&self) -> Settings {
        Settings {
            test_host: self
                .remote
                .tests
                .resolve("root", "sheeva010.linn.co.uk", "~/"),
            docs_host: self
                .remote
                .docs
                .resolve("hudson-rsync", "openhome.org", "~/build/nightly/docs"),
            release_host: self.remote.releases.resolve(
                "releases",
                "www.openhome.org",
                "~/www/artifacts/ohNet/",
            ),
            make: self.tools.make.clone().unwrap_or_else(|| "make".to_string()),
            rsync: self.tools.rsync.clone().unwrap_or_else(|| "rsync".to_string()),
            ssh: self.tools.ssh.clone().unwrap_or_else(|| "ssh".to_string()),
            report_dir: self
                .report
                .dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("vgout")),
            report_parser: self.report.parser.clone().unwrap_or_else(|| {
                vec![
                    "python".to_string(),
                    "Helpers/valgrind_parser.py".to_string(),
                ]
            }),
            bundle_dir: self
                .bundle
                .dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("Build/Bundles")),
            bundle_product: self
                .bundle
                .product
                .clone()
                .unwrap_or_else(|| "ohNet".to_string()),
            docs_command: self
                .docs
                .command
                .clone()
                .unwrap_or_else(|| vec!["make".to_string(), "docs".to_string()]),
            docs_dir: self
                .docs
                .dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("Build/Docs/")),
        }
    }
}

/// A remote location with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: RemoteHost,
    pub path: String,
}

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub test_host: Endpoint,
    pub docs_host: Endpoint,
    pub release_host: Endpoint,
    pub make: String,
    pub rsync: String,
    pub ssh: String,
    pub report_dir: PathBuf,
    pub report_parser: Vec<String>,
    pub bundle_dir: PathBuf,
    pub bundle_product: String,
    pub docs_command: Vec<String>,
    pub docs_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().settings()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (ohbuild.toml)
/// 2. Global config (~/.ohbuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global ohbuild config directory (~/.ohbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".ohbuild"))
}

/// Get the global config path (~/.ohbuild/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}
