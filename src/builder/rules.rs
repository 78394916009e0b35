//! Platform rule tables.
//!
//! Every platform-specific decision the argument compiler makes lives here
//! as an ordered list of `(predicate, contribution)` rules. The compiler
//! walks the tables in a fixed order; the tables themselves carry no logic
//! beyond their predicates.
//!
//! The build tool parses its arguments positionally, so both the order of
//! the tables and the order of rules within a table are significant.

use crate::core::platform::Architecture::*;
use crate::core::platform::OsFamily::*;
use crate::core::platform::PlatformAttributes;

/// Predicate selecting the platforms a rule applies to.
pub type Predicate = fn(&PlatformAttributes) -> bool;

/// A toolchain-activation rule.
#[derive(Clone, Copy)]
pub struct ToolchainRule {
    pub name: &'static str,
    pub applies: Predicate,
    /// Command run before the build tool, joined to it with `&&`.
    pub prefix: &'static [&'static str],
    /// Environment variables set for every build and bundle invocation.
    pub env: &'static [(&'static str, &'static str)],
}

/// A rule contributing build-tool toggles and bundling variables.
#[derive(Clone, Copy)]
pub struct ToggleRule {
    pub name: &'static str,
    pub applies: Predicate,
    pub toggles: &'static [&'static str],
    /// `make` variables passed to the bundle step only.
    pub make_variables: &'static [(&'static str, &'static str)],
}

/// How a toggle table is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Only the first matching rule contributes.
    FirstMatch,
    /// Every matching rule contributes, in table order.
    AllMatches,
}

/// A stage of the toggle list.
#[derive(Clone, Copy)]
pub struct ToggleTable {
    pub stage: &'static str,
    pub selection: Selection,
    pub rules: &'static [ToggleRule],
}

impl ToggleTable {
    /// Rules of this table that apply to the platform, honouring `selection`.
    pub fn matching<'a>(
        &'a self,
        attrs: &'a PlatformAttributes,
    ) -> impl Iterator<Item = &'static ToggleRule> + 'a {
        let limit = match self.selection {
            Selection::FirstMatch => 1,
            Selection::AllMatches => usize::MAX,
        };
        let rules: &'static [ToggleRule] = self.rules;
        rules
            .iter()
            .filter(move |rule| (rule.applies)(attrs))
            .take(limit)
    }
}

/// The build-tool invocation every plan starts from.
pub const BUILD_TOOL: &[&str] = &["python", "AllTests.py", "--silent"];

/// Toggle requesting parallel execution inside the build tool.
pub const PARALLEL_TOGGLE: &str = "--parallel";

const ARM_GCC_2011: &str = "/usr/local/arm-2011.09/bin/arm-none-linux-gnueabi-";
const RTEMS_PPC: &str = "/opt/rtems-4.11/bin/powerpc-rtems4.11-";
const RTEMS_ARM: &str = "/opt/rtems-4.11/bin/arm-rtemseabi4.11-";

pub static TOOLCHAIN_RULES: &[ToolchainRule] = &[
    ToolchainRule {
        name: "msvc-x86",
        applies: |p| p.is(Windows, X86),
        prefix: &["vcvarsall.bat"],
        env: &[],
    },
    ToolchainRule {
        name: "msvc-x64",
        applies: |p| p.is(Windows, X64),
        prefix: &["vcvarsall.bat", "amd64"],
        env: &[("CS_PLATFORM", "x64")],
    },
    ToolchainRule {
        name: "linux-armel-cross",
        applies: |p| p.is(Linux, Armel),
        prefix: &[],
        env: &[("CROSS_COMPILE", ARM_GCC_2011)],
    },
    ToolchainRule {
        name: "rtems-ppc32-cross",
        applies: |p| p.is(EmbeddedRtos, Ppc32),
        prefix: &[],
        env: &[("CROSS_COMPILE", RTEMS_PPC)],
    },
    ToolchainRule {
        name: "rtems-arm-cross",
        applies: |p| {
            p.os_family == EmbeddedRtos && matches!(p.architecture, Armv5 | Armv6)
        },
        prefix: &[],
        env: &[("CROSS_COMPILE", RTEMS_ARM)],
    },
];

/// Baseline test mode. Cross-built targets only compile; native 64-bit
/// hosts run the native test set; everything else uses the tool default.
pub static MODE_TABLE: ToggleTable = ToggleTable {
    stage: "mode",
    selection: Selection::FirstMatch,
    rules: &[
        ToggleRule {
            name: "build-only",
            applies: |p| {
                p.architecture.is_build_only()
                    || p.is(EmbeddedRtos, Ppc32)
                    || p.os_family == Android
            },
            toggles: &["--buildonly"],
            make_variables: &[],
        },
        ToggleRule {
            name: "native-64",
            applies: |p| p.architecture == X64,
            toggles: &["--native"],
            make_variables: &[],
        },
    ],
};

pub static LANGUAGE_TABLE: ToggleTable = ToggleTable {
    stage: "language",
    selection: Selection::AllMatches,
    rules: &[
        ToggleRule {
            name: "windows-x86-bindings",
            applies: |p| p.is(Windows, X86),
            toggles: &["--js", "--java"],
            make_variables: &[],
        },
        ToggleRule {
            name: "linux-x86-bindings",
            applies: |p| p.is(Linux, X86),
            toggles: &["--java"],
            make_variables: &[],
        },
    ],
};

pub static FAMILY_TABLE: ToggleTable = ToggleTable {
    stage: "family",
    selection: Selection::AllMatches,
    rules: &[
        ToggleRule {
            name: "mac-64",
            applies: |p| p.is(Macos, X64),
            toggles: &["--mac-64"],
            make_variables: &[("mac-64", "1")],
        },
        ToggleRule {
            name: "ios-x86",
            applies: |p| p.is(Ios, X86),
            toggles: &["--iOs-x86"],
            make_variables: &[("iOs-x86", "1")],
        },
        ToggleRule {
            name: "ios-armv7",
            applies: |p| p.is(Ios, Armv7),
            toggles: &["--iOs-armv7"],
            make_variables: &[("iOs-armv7", "1")],
        },
        // The 32 and 64-bit iOS jobs share a build host and their test runs
        // interfere, so no iOS variant runs tests. This repeats `--buildonly`
        // for armv7, which already got it from the mode table.
        // TODO: drop once the iOS jobs get dedicated hosts and tests no longer hang.
        ToggleRule {
            name: "ios-build-only",
            applies: |p| p.os_family == Ios,
            toggles: &["--buildonly"],
            make_variables: &[],
        },
        ToggleRule {
            name: "android",
            applies: |p| p.os_family == Android,
            toggles: &["--Android-anycpu"],
            make_variables: &[("Android-anycpu", "1")],
        },
        ToggleRule {
            name: "core",
            applies: |p| p.os_family == EmbeddedRtos,
            toggles: &["--core"],
            make_variables: &[],
        },
    ],
};

/// Extra coverage for nightly runs; memory checking only on Linux x86.
pub static NIGHTLY_TABLE: ToggleTable = ToggleTable {
    stage: "nightly",
    selection: Selection::AllMatches,
    rules: &[
        ToggleRule {
            name: "full",
            applies: |_| true,
            toggles: &["--full"],
            make_variables: &[],
        },
        ToggleRule {
            name: "valgrind",
            applies: |p| p.is(Linux, X86),
            toggles: &["--valgrind"],
            make_variables: &[],
        },
    ],
};

/// Platform toggle tables in argument order. The nightly table is applied
/// separately since it depends on the configuration.
pub static PLATFORM_TABLES: &[&ToggleTable] = &[&MODE_TABLE, &LANGUAGE_TABLE, &FAMILY_TABLE];
