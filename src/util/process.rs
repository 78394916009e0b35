//! Subprocess execution.
//!
//! Every external tool the orchestrator drives (the test runner, `make`,
//! `rsync`, `ssh`, the report parser) goes through the [`CommandRunner`]
//! seam so the pipeline can be exercised without spawning processes.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::builder::plan::AND_THEN;

/// Exit code reported for a process that was terminated by a signal.
pub const TERMINATED_BY_SIGNAL: i32 = -1;

/// A single external command: argument vector plus environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            argv: argv.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
        }
    }

    /// Attach environment overrides.
    pub fn with_env(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Whether the command chains several programs with `&&`.
    pub fn is_chained(&self) -> bool {
        self.argv.iter().any(|arg| arg == AND_THEN)
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        self.argv.join(" ")
    }
}

/// Runs external commands synchronously and reports their exit code.
pub trait CommandRunner {
    /// Run the command to completion.
    ///
    /// `Err` means the command could not be started at all; a command that
    /// ran and failed is `Ok` with a non-zero code.
    fn run(&self, invocation: &Invocation) -> io::Result<i32>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &Invocation) -> io::Result<i32> {
        (**self).run(invocation)
    }
}

/// Runs commands as child processes of the orchestrator.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    cwd: PathBuf,
}

impl SystemRunner {
    /// Create a runner executing every command in `cwd`.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        SystemRunner {
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    fn builder_for(&self, invocation: &Invocation) -> io::Result<ProcessBuilder> {
        // A chained command needs a shell to interpret `&&`.
        let pb = if invocation.is_chained() {
            shell_builder(&invocation.argv)
        } else {
            let (program, args) = invocation.argv.split_first().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "empty command line")
            })?;
            ProcessBuilder::new(program).args(args)
        };

        Ok(pb.envs(&invocation.env).cwd(&self.cwd))
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<i32> {
        let pb = self.builder_for(invocation)?;
        tracing::debug!("running `{}`", pb.display_command());

        let status = pb.status()?;
        Ok(status.code().unwrap_or(TERMINATED_BY_SIGNAL))
    }
}

#[cfg(windows)]
fn shell_builder(argv: &[String]) -> ProcessBuilder {
    let line = argv
        .iter()
        .map(|arg| cmd_quote(arg))
        .collect::<Vec<_>>()
        .join(" ");
    ProcessBuilder::new("cmd").arg("/C").arg(line)
}

#[cfg(not(windows))]
fn shell_builder(argv: &[String]) -> ProcessBuilder {
    let line = argv
        .iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ");
    ProcessBuilder::new("sh").arg("-c").arg(line)
}

/// Quote a token for `sh`, leaving plain words and the `&&` joiner alone.
#[cfg_attr(windows, allow(dead_code))]
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain || arg == AND_THEN {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Quote a token for `cmd`, leaving plain words and the `&&` joiner alone.
/// Embedded double quotes are doubled.
#[cfg_attr(not(windows), allow(dead_code))]
fn cmd_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./\\=:,+@".contains(c));
    if plain || arg == AND_THEN {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('"', "\"\""))
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set several environment variables.
    pub fn envs(mut self, vars: &BTreeMap<String, String>) -> Self {
        for (key, value) in vars {
            self = self.env(key, value);
        }
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute with inherited stdio and wait for the exit status.
    pub fn status(&self) -> io::Result<ExitStatus> {
        self.build_command().status().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to execute `{}`: {}", self.program.display(), e),
            )
        })
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
