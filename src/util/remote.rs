//! Remote hosts: file sync and remote shell.
//!
//! The transport itself is `rsync` and `ssh`; the orchestrator only builds
//! their command lines and checks the exit codes.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::process::{CommandRunner, Invocation};

/// A `user@host` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHost {
    pub user: String,
    pub host: String,
}

impl RemoteHost {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        RemoteHost {
            user: user.into(),
            host: host.into(),
        }
    }

    /// `rsync` destination for a path on this host.
    pub fn location(&self, remote_path: &str) -> String {
        format!("{}:{}", self, remote_path)
    }
}

impl fmt::Display for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

/// Source path that makes `rsync` copy the contents of `dir` rather than
/// the directory itself.
pub fn contents_of(dir: &Path) -> PathBuf {
    let mut path = OsString::from(dir.as_os_str());
    if !path.to_string_lossy().ends_with('/') {
        path.push("/");
    }
    PathBuf::from(path)
}

/// Pushes local files to a remote host.
pub trait RemoteSync {
    fn sync_push(
        &self,
        local: &Path,
        host: &RemoteHost,
        remote_path: &str,
        excludes: &[String],
    ) -> io::Result<i32>;
}

/// Runs a command line on a remote host.
pub trait RemoteShell {
    fn run_remote(&self, host: &RemoteHost, command_line: &str) -> io::Result<i32>;
}

/// `rsync`/`ssh` transport on top of a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct SshTransport<R> {
    runner: R,
    rsync: String,
    ssh: String,
}

impl<R: CommandRunner> SshTransport<R> {
    pub fn new(runner: R, rsync: impl Into<String>, ssh: impl Into<String>) -> Self {
        SshTransport {
            runner,
            rsync: rsync.into(),
            ssh: ssh.into(),
        }
    }

    fn rsync_invocation(
        &self,
        local: &Path,
        host: &RemoteHost,
        remote_path: &str,
        excludes: &[String],
    ) -> Invocation {
        let mut argv = vec![self.rsync.clone(), "-az".to_string()];
        argv.extend(excludes.iter().map(|pattern| format!("--exclude={}", pattern)));
        argv.push(local.display().to_string());
        argv.push(host.location(remote_path));
        Invocation::new(argv)
    }

    fn ssh_invocation(&self, host: &RemoteHost, command_line: &str) -> Invocation {
        Invocation::new([self.ssh.clone(), host.to_string(), command_line.to_string()])
    }
}

impl<R: CommandRunner> RemoteSync for SshTransport<R> {
    fn sync_push(
        &self,
        local: &Path,
        host: &RemoteHost,
        remote_path: &str,
        excludes: &[String],
    ) -> io::Result<i32> {
        tracing::info!("syncing {} to {}", local.display(), host.location(remote_path));
        self.runner
            .run(&self.rsync_invocation(local, host, remote_path, excludes))
    }
}

impl<R: CommandRunner> RemoteShell for SshTransport<R> {
    fn run_remote(&self, host: &RemoteHost, command_line: &str) -> io::Result<i32> {
        tracing::info!("running `{}` on {}", command_line, host);
        self.runner.run(&self.ssh_invocation(host, command_line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockHost;

    #[test]
    fn test_remote_host_display() {
        let host = RemoteHost::new("root", "sheeva010.linn.co.uk");
        assert_eq!(host.to_string(), "root@sheeva010.linn.co.uk");
        assert_eq!(host.location("~/"), "root@sheeva010.linn.co.uk:~/");
    }

    #[test]
    fn test_contents_of() {
        assert_eq!(contents_of(Path::new("Build/Bundles")), Path::new("Build/Bundles/"));
        assert_eq!(contents_of(Path::new("Build/Docs/")), Path::new("Build/Docs/"));
    }

    #[test]
    fn test_rsync_command_line() {
        let mock = MockHost::new();
        let transport = SshTransport::new(&mock, "rsync", "ssh");
        let host = RemoteHost::new("root", "board");

        let code = transport
            .sync_push(
                Path::new("Build"),
                &host,
                "~/",
                &["*.o".to_string(), "Bundles".to_string()],
            )
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(
            mock.commands(),
            ["rsync -az --exclude=*.o --exclude=Bundles Build root@board:~/"]
        );
    }

    #[test]
    fn test_ssh_command_line() {
        let mock = MockHost::new();
        mock.fail_matching("ssh", 255);
        let transport = SshTransport::new(&mock, "rsync", "ssh");

        let code = transport
            .run_remote(&RemoteHost::new("root", "board"), "python AllTests.py -t")
            .unwrap();

        assert_eq!(code, 255);
        let calls = mock.invocations();
        assert_eq!(calls[0].argv, ["ssh", "root@board", "python AllTests.py -t"]);
    }
}
