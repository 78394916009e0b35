//! Build variants.

use std::fmt;

use serde::Serialize;

/// A build configuration producing a distinct set of artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    Debug,
    Release,
}

impl BuildVariant {
    /// Variants built by the build step: Debug always, Release only when
    /// publishing.
    pub fn build_set(release: bool) -> Vec<BuildVariant> {
        let mut variants = vec![BuildVariant::Debug];
        if release {
            variants.push(BuildVariant::Release);
        }
        variants
    }

    /// Variants packaged by the release step, in packaging order.
    pub fn release_set() -> [BuildVariant; 2] {
        [BuildVariant::Release, BuildVariant::Debug]
    }

    /// Flag appended to the build-tool invocation for this variant.
    pub fn build_flag(&self) -> &'static str {
        match self {
            BuildVariant::Debug => "--debug",
            BuildVariant::Release => "--incremental",
        }
    }

    /// Title-cased name, as used in `openhome_configuration` and bundle names.
    pub fn title(&self) -> &'static str {
        match self {
            BuildVariant::Debug => "Debug",
            BuildVariant::Release => "Release",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildVariant::Debug => f.write_str("debug"),
            BuildVariant::Release => f.write_str("release"),
        }
    }
}
