//! Test utilities and mocks for ohbuild unit tests.
//!
//! [`MockHost`] stands in for every external collaborator at once (child
//! processes, `rsync`, `ssh`, the report parser and the documentation
//! generator) and records every call in a single ordered log, so tests can
//! assert on the exact sequence of side effects.
//!
//! # Example
//!
//! ```rust,ignore
//! let ws = TestWorkspace::new();
//! let mock = MockHost::new();
//! mock.fail_matching("make bundle", 2);
//!
//! let err = release(&ws.context(&mock), attrs, &cfg, &plan).unwrap_err();
//! assert_eq!(mock.commands(), ["make tt uset4=yes", "make bundle ..."]);
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::core::platform::PlatformAttributes;
use crate::core::variant::BuildVariant;
use crate::ops::context::OpsContext;
use crate::ops::release::bundle_name;
use crate::util::config::Settings;
use crate::util::docs::DocsCollaborator;
use crate::util::fs::write_string;
use crate::util::process::{CommandRunner, Invocation};
use crate::util::remote::{RemoteHost, RemoteShell, RemoteSync};
use crate::util::report::ReportCollaborator;

/// A recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Run(Invocation),
    Sync {
        local: PathBuf,
        destination: String,
        excludes: Vec<String>,
    },
    Remote {
        host: String,
        command_line: String,
    },
    ReportStub(PathBuf),
    ReportParse(PathBuf),
    DocsGenerate,
}

impl Call {
    /// One-line rendering used for matching and assertions.
    pub fn display(&self) -> String {
        match self {
            Call::Run(invocation) => invocation.display_command(),
            Call::Sync {
                local,
                destination,
                excludes,
            } => {
                let mut line = format!("sync {} -> {}", local.display(), destination);
                if !excludes.is_empty() {
                    line.push_str(&format!(" (exclude {})", excludes.join(", ")));
                }
                line
            }
            Call::Remote { host, command_line } => format!("remote {}: {}", host, command_line),
            Call::ReportStub(dir) => format!("report stub {}", dir.display()),
            Call::ReportParse(dir) => format!("report parse {}", dir.display()),
            Call::DocsGenerate => "docs generate".to_string(),
        }
    }
}

/// What a matched call does.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Completes with the given exit code.
    Exit(i32),
    /// Cannot be started.
    SpawnError,
    /// Succeeds after writing a file, like a build step producing an artifact.
    CreateFile(PathBuf),
}

#[derive(Debug, Clone)]
struct Expectation {
    /// Substring of the rendered call.
    pattern: String,
    outcome: Outcome,
}

/// Mock for every external collaborator.
///
/// Unmatched calls succeed with exit code 0. The first registered
/// expectation matching a call decides its outcome.
#[derive(Debug, Default)]
pub struct MockHost {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<Call>>,
}

impl MockHost {
    pub fn new() -> Self {
        MockHost::default()
    }

    /// Register an outcome for calls containing `substring`.
    pub fn expect(&self, substring: &str, outcome: Outcome) -> &Self {
        self.expectations.lock().unwrap().push(Expectation {
            pattern: substring.to_string(),
            outcome,
        });
        self
    }

    /// Calls containing `substring` exit with `exit_code`.
    pub fn fail_matching(&self, substring: &str, exit_code: i32) -> &Self {
        self.expect(substring, Outcome::Exit(exit_code))
    }

    /// Calls containing `substring` cannot be started.
    pub fn spawn_error_matching(&self, substring: &str) -> &Self {
        self.expect(substring, Outcome::SpawnError)
    }

    /// Calls containing `substring` write `path` and succeed.
    pub fn creates_file(&self, substring: &str, path: impl Into<PathBuf>) -> &Self {
        self.expect(substring, Outcome::CreateFile(path.into()))
    }

    /// Every recorded call, rendered, in order.
    pub fn commands(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(Call::display).collect()
    }

    /// The command runner invocations only.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                Call::Run(invocation) => Some(invocation.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> io::Result<i32> {
        let rendered = call.display();
        self.calls.lock().unwrap().push(call);

        let outcome = self
            .expectations
            .lock()
            .unwrap()
            .iter()
            .find(|exp| rendered.contains(&exp.pattern))
            .map(|exp| exp.outcome.clone());

        match outcome {
            None => Ok(0),
            Some(Outcome::Exit(code)) => Ok(code),
            Some(Outcome::SpawnError) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock: cannot start `{}`", rendered),
            )),
            Some(Outcome::CreateFile(path)) => {
                write_string(&path, &rendered)?;
                Ok(0)
            }
        }
    }
}

impl CommandRunner for MockHost {
    fn run(&self, invocation: &Invocation) -> io::Result<i32> {
        self.record(Call::Run(invocation.clone()))
    }
}

impl RemoteSync for MockHost {
    fn sync_push(
        &self,
        local: &Path,
        host: &RemoteHost,
        remote_path: &str,
        excludes: &[String],
    ) -> io::Result<i32> {
        self.record(Call::Sync {
            local: local.to_path_buf(),
            destination: host.location(remote_path),
            excludes: excludes.to_vec(),
        })
    }
}

impl RemoteShell for MockHost {
    fn run_remote(&self, host: &RemoteHost, command_line: &str) -> io::Result<i32> {
        self.record(Call::Remote {
            host: host.to_string(),
            command_line: command_line.to_string(),
        })
    }
}

impl ReportCollaborator for MockHost {
    fn emit_stub(&self, dir: &Path) -> io::Result<()> {
        self.record(Call::ReportStub(dir.to_path_buf())).map(|_| ())
    }

    fn parse_and_emit(&self, dir: &Path) -> io::Result<i32> {
        self.record(Call::ReportParse(dir.to_path_buf()))
    }
}

impl DocsCollaborator for MockHost {
    fn generate(&self) -> io::Result<i32> {
        self.record(Call::DocsGenerate)
    }

    fn output_dir(&self) -> &Path {
        Path::new("Build/Docs/")
    }
}

/// A temporary working directory with default settings.
#[derive(Debug)]
pub struct TestWorkspace {
    dir: TempDir,
    settings: Settings,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        TestWorkspace {
            dir: TempDir::new().unwrap(),
            settings,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Context routing every collaborator to `mock`.
    pub fn context<'a>(&'a self, mock: &'a MockHost) -> OpsContext<'a> {
        OpsContext {
            runner: mock,
            sync: mock,
            shell: mock,
            report: mock,
            docs: mock,
            settings: &self.settings,
            root: self.dir.path(),
        }
    }

    /// Make `make bundle` write the archive it would produce for `attrs`.
    pub fn produce_bundles(&self, mock: &MockHost, attrs: &PlatformAttributes) {
        let bundle_dir = self.root().join(&self.settings.bundle_dir);
        for variant in BuildVariant::release_set() {
            mock.creates_file(
                &format!("openhome_configuration={}", variant.title()),
                bundle_dir.join(bundle_name(&self.settings.bundle_product, attrs, variant)),
            );
        }
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_expectation_wins() {
        let mock = MockHost::new();
        mock.fail_matching("make bundle", 2).fail_matching("make", 3);

        assert_eq!(mock.run(&Invocation::new(["make", "bundle"])).unwrap(), 2);
        assert_eq!(mock.run(&Invocation::new(["make", "tt"])).unwrap(), 3);
        assert_eq!(mock.run(&Invocation::new(["python"])).unwrap(), 0);
    }

    #[test]
    fn test_single_ordered_log() {
        let mock = MockHost::new();
        let host = RemoteHost::new("root", "board");

        mock.emit_stub(Path::new("vgout")).unwrap();
        mock.sync_push(Path::new("Build"), &host, "~/", &["*.o".to_string()])
            .unwrap();
        mock.run_remote(&host, "python AllTests.py -t").unwrap();
        mock.generate().unwrap();

        assert_eq!(
            mock.commands(),
            [
                "report stub vgout",
                "sync Build -> root@board:~/ (exclude *.o)",
                "remote root@board: python AllTests.py -t",
                "docs generate",
            ]
        );
        assert!(mock.invocations().is_empty());
    }

    #[test]
    fn test_spawn_error_and_create_file() {
        let ws = TestWorkspace::new();
        let mock = MockHost::new();
        let artifact = ws.root().join("out/artifact.tar.gz");
        mock.spawn_error_matching("missing-tool")
            .creates_file("make bundle", &artifact);

        assert!(mock.run(&Invocation::new(["missing-tool"])).is_err());
        assert_eq!(mock.run(&Invocation::new(["make", "bundle"])).unwrap(), 0);
        assert!(artifact.exists());
    }
}
