//! Platform registry.
//!
//! Maps the platform identifiers used by the CI job labels (e.g. `Linux-x64`)
//! onto the attributes the rest of the pipeline branches on. The table is
//! compiled into the binary and cannot be extended at runtime.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Operating system family of a build platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsFamily {
    Linux,
    Windows,
    Macos,
    Ios,
    /// The embedded RTOS targets, labelled `Core` by the CI jobs.
    #[serde(rename = "core")]
    EmbeddedRtos,
    Android,
}

impl OsFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::Windows => "windows",
            OsFamily::Macos => "macos",
            OsFamily::Ios => "ios",
            OsFamily::EmbeddedRtos => "core",
            OsFamily::Android => "android",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture token.
///
/// The token text is significant: it is spliced into bundle names and
/// `make` variables, so `as_str` must stay in sync with the artifact names
/// produced by the build tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    X64,
    Armel,
    Armhf,
    Armv5,
    Armv6,
    Armv7,
    Ppc32,
    Anycpu,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Armel => "armel",
            Architecture::Armhf => "armhf",
            Architecture::Armv5 => "armv5",
            Architecture::Armv6 => "armv6",
            Architecture::Armv7 => "armv7",
            Architecture::Ppc32 => "ppc32",
            Architecture::Anycpu => "anycpu",
        }
    }

    /// Architectures whose tests run on a remote ARM board rather than locally.
    pub fn is_arm_class(&self) -> bool {
        matches!(self, Architecture::Armel | Architecture::Armhf)
    }

    /// Cross-compiled architectures that can be built but not tested on the
    /// build host.
    pub fn is_build_only(&self) -> bool {
        matches!(
            self,
            Architecture::Armel | Architecture::Armhf | Architecture::Armv7 | Architecture::Armv6
        )
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of a registered build platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformAttributes {
    pub os_family: OsFamily,
    pub architecture: Architecture,
    /// Whether release bundles for this platform may be published.
    pub publishable: bool,
    /// System name used in bundle file names (`ohNet-<system>-...`).
    pub system_label: &'static str,
}

impl PlatformAttributes {
    const fn new(
        os_family: OsFamily,
        architecture: Architecture,
        publishable: bool,
        system_label: &'static str,
    ) -> Self {
        PlatformAttributes {
            os_family,
            architecture,
            publishable,
            system_label,
        }
    }

    /// Check for an exact `(os, arch)` pair.
    pub fn is(&self, os_family: OsFamily, architecture: Architecture) -> bool {
        self.os_family == os_family && self.architecture == architecture
    }
}

/// Error returned when a platform identifier is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform `{id}` (known platforms: {known})", known = known_ids())]
pub struct UnknownPlatformError {
    pub id: String,
}

use Architecture::*;
use OsFamily::*;

// Legacy job labels (`Macos-x64`, `iOs-ARM`) are kept as separate keys even
// where they duplicate a newer entry; downstream jobs still reference them.
static PLATFORMS: &[(&str, PlatformAttributes)] = &[
    ("Linux-x86", PlatformAttributes::new(Linux, X86, true, "Linux")),
    ("Linux-x64", PlatformAttributes::new(Linux, X64, true, "Linux")),
    ("Linux-ppc32", PlatformAttributes::new(Linux, Ppc32, true, "Linux")),
    ("Windows-x86", PlatformAttributes::new(Windows, X86, true, "Windows")),
    ("Windows-x64", PlatformAttributes::new(Windows, X64, true, "Windows")),
    ("Macos-x64", PlatformAttributes::new(Macos, X86, false, "Mac")),
    ("Mac-x64", PlatformAttributes::new(Macos, X64, true, "Mac")),
    ("Mac-x86", PlatformAttributes::new(Macos, X86, true, "Mac")),
    ("Linux-ARM", PlatformAttributes::new(Linux, Armel, true, "Linux")),
    ("iOs-ARM", PlatformAttributes::new(Ios, Armv7, true, "iOs")),
    ("iOs-x86", PlatformAttributes::new(Ios, X86, true, "iOs")),
    ("iOs-armv7", PlatformAttributes::new(Ios, Armv7, true, "iOs")),
    ("Core-ppc32", PlatformAttributes::new(EmbeddedRtos, Ppc32, true, "Core")),
    ("Core-armv5", PlatformAttributes::new(EmbeddedRtos, Armv5, true, "Core")),
    ("Core-armv6", PlatformAttributes::new(EmbeddedRtos, Armv6, true, "Core")),
    ("Android-anycpu", PlatformAttributes::new(Android, Anycpu, true, "Android")),
];

/// Look up a platform by identifier. Matching is exact and case-sensitive.
pub fn lookup(id: &str) -> Result<&'static PlatformAttributes, UnknownPlatformError> {
    PLATFORMS
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, attrs)| attrs)
        .ok_or_else(|| UnknownPlatformError { id: id.to_string() })
}

/// All registered platform identifiers, in registry order.
pub fn ids() -> impl Iterator<Item = &'static str> {
    PLATFORMS.iter().map(|(key, _)| *key)
}

fn known_ids() -> String {
    ids().collect::<Vec<_>>().join(", ")
}
