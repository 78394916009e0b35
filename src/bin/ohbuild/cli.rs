//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use ohbuild::core::configuration::CliOptions;

/// ohbuild - CI build orchestrator for ohNet
///
/// CI jobs pass PLATFORM, NIGHTLY, PUBLISH and PUBLISH_VERSION through the
/// environment; these take precedence over the matching flags.
#[derive(Parser)]
#[command(name = "ohbuild")]
#[command(author, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Platform identifier (e.g. Linux-x64)
    #[arg(short, long, value_name = "ID")]
    pub platform: Option<String>,

    /// Nightly build: full test set, memory checks and docs
    #[arg(short, long)]
    pub nightly: bool,

    /// Build the Release variant and publish bundles
    #[arg(short = 'r', long)]
    pub publish: bool,

    /// Version stamped into published bundles
    #[arg(short = 'v', long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Let the build tool run tests in parallel
    #[arg(short = 'j', long)]
    pub parallel: bool,

    /// Run in this directory instead of the current one
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Settings file (defaults to ohbuild.toml in the working directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the compiled plan as JSON and exit without building
    #[arg(long)]
    pub plan: bool,

    /// List the known platform identifiers and exit
    #[arg(long, conflicts_with = "plan")]
    pub list_platforms: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub fn options(&self) -> CliOptions {
        CliOptions {
            platform: self.platform.clone(),
            nightly: self.nightly,
            publish: self.publish,
            version: self.version.clone(),
            parallel: self.parallel,
        }
    }
}
