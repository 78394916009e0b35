//! API documentation generator collaborator.

use std::io;
use std::path::{Path, PathBuf};

use crate::util::process::{CommandRunner, Invocation};

/// Generates the API documentation.
pub trait DocsCollaborator {
    fn generate(&self) -> io::Result<i32>;

    /// Directory the generated documentation lands in, relative to the
    /// working directory.
    fn output_dir(&self) -> &Path;
}

/// Runs the documentation target of the build (`make docs`).
#[derive(Debug, Clone)]
pub struct MakeDocs<R> {
    runner: R,
    command: Vec<String>,
    output_dir: PathBuf,
}

impl<R: CommandRunner> MakeDocs<R> {
    pub fn new(runner: R, command: Vec<String>, output_dir: impl Into<PathBuf>) -> Self {
        MakeDocs {
            runner,
            command,
            output_dir: output_dir.into(),
        }
    }
}

impl<R: CommandRunner> DocsCollaborator for MakeDocs<R> {
    fn generate(&self) -> io::Result<i32> {
        tracing::info!("generating documentation");
        self.runner.run(&Invocation::new(self.command.iter().cloned()))
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
