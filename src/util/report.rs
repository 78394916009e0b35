//! Memory-check report collaborator.
//!
//! Downstream report aggregation expects a report file from every run, so a
//! stub is always written first; nightly Linux x86 runs then replace it with
//! the parsed valgrind output.

use std::io;
use std::path::Path;

use crate::util::fs::write_string;
use crate::util::process::{CommandRunner, Invocation};

/// File name of the report inside the report directory.
pub const REPORT_FILE: &str = "valgrind.xml";

const STUB_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites name="valgrind" tests="0" failures="0" errors="0">
  <testsuite name="valgrind" tests="0" failures="0" errors="0"/>
</testsuites>
"#;

/// Produces the memory-check report.
pub trait ReportCollaborator {
    /// Write an empty report into `dir`.
    fn emit_stub(&self, dir: &Path) -> io::Result<()>;

    /// Parse the raw valgrind output in `dir`, overwriting the stub.
    fn parse_and_emit(&self, dir: &Path) -> io::Result<i32>;
}

/// Writes the stub itself and delegates parsing to an external command.
#[derive(Debug, Clone)]
pub struct ValgrindReport<R> {
    runner: R,
    parser: Vec<String>,
}

impl<R: CommandRunner> ValgrindReport<R> {
    /// `parser` is the parser command line; the report directory is
    /// appended as its last argument.
    pub fn new(runner: R, parser: Vec<String>) -> Self {
        ValgrindReport { runner, parser }
    }
}

impl<R: CommandRunner> ReportCollaborator for ValgrindReport<R> {
    fn emit_stub(&self, dir: &Path) -> io::Result<()> {
        let path = dir.join(REPORT_FILE);
        tracing::debug!("writing stub report to {}", path.display());
        write_string(&path, STUB_REPORT)
    }

    fn parse_and_emit(&self, dir: &Path) -> io::Result<i32> {
        let mut argv = self.parser.clone();
        argv.push(dir.display().to_string());
        self.runner.run(&Invocation::new(argv))
    }
}
