//! Operation context - external collaborators and effective settings.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::util::config::Settings;
use crate::util::docs::{DocsCollaborator, MakeDocs};
use crate::util::process::{CommandRunner, SystemRunner};
use crate::util::remote::{RemoteShell, RemoteSync, SshTransport};
use crate::util::report::{ReportCollaborator, ValgrindReport};

/// Everything the post-build operations need to reach the outside world.
pub struct OpsContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub sync: &'a dyn RemoteSync,
    pub shell: &'a dyn RemoteShell,
    pub report: &'a dyn ReportCollaborator,
    pub docs: &'a dyn DocsCollaborator,

    /// Effective settings
    pub settings: &'a Settings,

    /// Working directory; relative settings paths resolve against it
    pub root: &'a Path,
}

impl fmt::Debug for OpsContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsContext")
            .field("settings", &self.settings)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<'a> OpsContext<'a> {
    /// Resolve a settings path against the working directory.
    pub fn path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

/// The real collaborators: child processes, `rsync` and `ssh`.
#[derive(Debug, Clone)]
pub struct SystemCollaborators {
    pub runner: SystemRunner,
    pub transport: SshTransport<SystemRunner>,
    pub report: ValgrindReport<SystemRunner>,
    pub docs: MakeDocs<SystemRunner>,
}

impl SystemCollaborators {
    pub fn new(root: &Path, settings: &Settings) -> Self {
        let runner = SystemRunner::new(root);
        SystemCollaborators {
            transport: SshTransport::new(runner.clone(), &settings.rsync, &settings.ssh),
            report: ValgrindReport::new(runner.clone(), settings.report_parser.clone()),
            docs: MakeDocs::new(
                runner.clone(),
                settings.docs_command.clone(),
                &settings.docs_dir,
            ),
            runner,
        }
    }

    pub fn context<'a>(&'a self, settings: &'a Settings, root: &'a Path) -> OpsContext<'a> {
        OpsContext {
            runner: &self.runner,
            sync: &self.transport,
            shell: &self.transport,
            report: &self.report,
            docs: &self.docs,
            settings,
            root,
        }
    }
}
