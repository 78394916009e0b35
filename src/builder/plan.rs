//! Compiled build plans.
//!
//! A [`CompiledPlan`] is everything platform-specific the executor, the
//! release packager and the post-actions need: environment overrides, the
//! toolchain prefix command, the build-tool argument list and the bundling
//! variables. It is a pure function of the platform and the configuration.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::builder::rules::{
    ToggleTable, BUILD_TOOL, NIGHTLY_TABLE, PARALLEL_TOGGLE, PLATFORM_TABLES, TOOLCHAIN_RULES,
};
use crate::core::configuration::BuildConfiguration;
use crate::core::platform::PlatformAttributes;
use crate::core::variant::BuildVariant;

/// Token joining the toolchain prefix to the command that follows it; the
/// command only runs if the prefix succeeded.
pub const AND_THEN: &str = "&&";

/// The concrete invocations for one orchestrator run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledPlan {
    /// Environment overrides applied to every build and bundle invocation.
    pub environment_mutations: BTreeMap<String, String>,
    /// Toolchain activation command, possibly empty.
    pub prefix_arguments: Vec<String>,
    /// Build-tool argument list, without the variant flag.
    pub build_tool_arguments: Vec<String>,
    /// Variables passed to `make bundle` only.
    pub make_variables: BTreeMap<String, String>,
}

impl CompiledPlan {
    /// Prepend the toolchain prefix (if any) to a command.
    pub fn with_prefix<I, S>(&self, command: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = Vec::new();
        if !self.prefix_arguments.is_empty() {
            argv.extend(self.prefix_arguments.iter().cloned());
            argv.push(AND_THEN.to_string());
        }
        argv.extend(command.into_iter().map(Into::into));
        argv
    }

    /// Full build command for one variant.
    pub fn build_command(&self, variant: BuildVariant) -> Vec<String> {
        let mut argv = self.with_prefix(self.build_tool_arguments.iter().cloned());
        argv.push(variant.build_flag().to_string());
        argv
    }

    /// Bundling variables rendered as `name=value` tokens.
    pub fn make_variable_args(&self) -> Vec<String> {
        self.make_variables
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect()
    }
}

/// Compile a platform and configuration into a plan.
///
/// Toggle order: mode, secondary languages, platform family, nightly,
/// parallel.
pub fn compile(attrs: &PlatformAttributes, cfg: &BuildConfiguration) -> CompiledPlan {
    let mut plan = CompiledPlan::default();

    for rule in TOOLCHAIN_RULES.iter().filter(|rule| (rule.applies)(attrs)) {
        tracing::debug!("toolchain rule `{}` applies", rule.name);
        plan.prefix_arguments
            .extend(rule.prefix.iter().map(|s| s.to_string()));
        for (name, value) in rule.env {
            plan.environment_mutations
                .insert(name.to_string(), value.to_string());
        }
    }

    plan.build_tool_arguments
        .extend(BUILD_TOOL.iter().map(|s| s.to_string()));

    for table in PLATFORM_TABLES {
        apply_table(&mut plan, table, attrs);
    }

    if cfg.nightly {
        apply_table(&mut plan, &NIGHTLY_TABLE, attrs);
    }

    if cfg.parallel {
        plan.build_tool_arguments.push(PARALLEL_TOGGLE.to_string());
    }

    plan
}

fn apply_table(plan: &mut CompiledPlan, table: &ToggleTable, attrs: &PlatformAttributes) {
    for rule in table.matching(attrs) {
        tracing::debug!("{} rule `{}` applies", table.stage, rule.name);
        plan.build_tool_arguments
            .extend(rule.toggles.iter().map(|s| s.to_string()));
        for (name, value) in rule.make_variables {
            plan.make_variables
                .insert(name.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{self, lookup};

    fn config(nightly: bool, release: bool, parallel: bool) -> BuildConfiguration {
        BuildConfiguration {
            platform_id: None,
            nightly,
            release,
            version: None,
            parallel,
        }
    }

    fn args(id: &str, cfg: &BuildConfiguration) -> Vec<String> {
        compile(lookup(id).unwrap(), cfg).build_tool_arguments
    }

    fn position(args: &[String], token: &str) -> usize {
        args.iter()
            .position(|a| a == token)
            .unwrap_or_else(|| panic!("`{}` missing from {:?}", token, args))
    }

    #[test]
    fn test_linux_x64_commit_build() {
        let args = args("Linux-x64", &config(false, false, false));
        assert_eq!(args, ["python", "AllTests.py", "--silent", "--native"]);
        assert!(!args.iter().any(|a| a == "--full" || a == "--parallel"));
    }

    #[test]
    fn test_linux_x86_nightly() {
        let args = args("Linux-x86", &config(true, false, false));
        assert_eq!(
            args,
            ["python", "AllTests.py", "--silent", "--java", "--full", "--valgrind"]
        );
        assert!(position(&args, "--java") < position(&args, "--full"));
        assert!(position(&args, "--full") < position(&args, "--valgrind"));
    }

    #[test]
    fn test_ios_armv7_forces_build_only() {
        for cfg in [config(false, false, false), config(true, true, false)] {
            let plan = compile(lookup("iOs-armv7").unwrap(), &cfg);
            assert_eq!(
                &plan.build_tool_arguments[..6],
                ["python", "AllTests.py", "--silent", "--buildonly", "--iOs-armv7", "--buildonly"]
            );
            assert_eq!(plan.make_variable_args(), ["iOs-armv7=1"]);
        }
    }

    #[test]
    fn test_ios_x86_is_build_only() {
        let plan = compile(lookup("iOs-x86").unwrap(), &config(false, false, false));
        assert_eq!(
            plan.build_tool_arguments,
            ["python", "AllTests.py", "--silent", "--iOs-x86", "--buildonly"]
        );
        assert_eq!(plan.make_variable_args(), ["iOs-x86=1"]);
    }

    #[test]
    fn test_windows_x64_toolchain() {
        let plan = compile(lookup("Windows-x64").unwrap(), &config(false, true, true));
        assert_eq!(plan.prefix_arguments, ["vcvarsall.bat", "amd64"]);
        assert_eq!(
            plan.environment_mutations.get("CS_PLATFORM").map(String::as_str),
            Some("x64")
        );
        assert_eq!(
            plan.build_command(BuildVariant::Release),
            [
                "vcvarsall.bat",
                "amd64",
                "&&",
                "python",
                "AllTests.py",
                "--silent",
                "--native",
                "--parallel",
                "--incremental"
            ]
        );
    }

    #[test]
    fn test_windows_x86_full_order() {
        let args = args("Windows-x86", &config(true, false, true));
        assert_eq!(
            args,
            ["python", "AllTests.py", "--silent", "--js", "--java", "--full", "--parallel"]
        );
    }

    #[test]
    fn test_cross_compile_prefixes() {
        let plan = compile(lookup("Linux-ARM").unwrap(), &config(false, false, false));
        assert!(plan.prefix_arguments.is_empty());
        assert_eq!(
            plan.environment_mutations.get("CROSS_COMPILE").map(String::as_str),
            Some("/usr/local/arm-2011.09/bin/arm-none-linux-gnueabi-")
        );

        let plan = compile(lookup("Core-armv5").unwrap(), &config(false, false, false));
        assert_eq!(
            plan.environment_mutations.get("CROSS_COMPILE").map(String::as_str),
            Some("/opt/rtems-4.11/bin/arm-rtemseabi4.11-")
        );
        assert_eq!(plan.build_tool_arguments, ["python", "AllTests.py", "--silent", "--core"]);
    }

    #[test]
    fn test_mac_and_android_bundling_variables() {
        let plan = compile(lookup("Mac-x64").unwrap(), &config(false, false, false));
        assert_eq!(
            plan.build_tool_arguments,
            ["python", "AllTests.py", "--silent", "--native", "--mac-64"]
        );
        assert_eq!(plan.make_variable_args(), ["mac-64=1"]);

        let plan = compile(lookup("Android-anycpu").unwrap(), &config(false, false, false));
        assert_eq!(
            plan.build_tool_arguments,
            ["python", "AllTests.py", "--silent", "--buildonly", "--Android-anycpu"]
        );
        assert_eq!(plan.make_variable_args(), ["Android-anycpu=1"]);
    }

    #[test]
    fn test_build_command_without_prefix() {
        let plan = compile(lookup("Linux-x64").unwrap(), &config(false, false, false));
        assert_eq!(
            plan.build_command(BuildVariant::Debug),
            ["python", "AllTests.py", "--silent", "--native", "--debug"]
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        for id in platform::ids() {
            let attrs = lookup(id).unwrap();
            for cfg in [config(false, false, false), config(true, true, true)] {
                assert_eq!(compile(attrs, &cfg), compile(attrs, &cfg));
            }
        }
    }

    #[test]
    fn test_release_flag_does_not_change_arguments() {
        for id in platform::ids() {
            let attrs = lookup(id).unwrap();
            assert_eq!(
                compile(attrs, &config(true, false, true)),
                compile(attrs, &config(true, true, true))
            );
        }
    }
}
