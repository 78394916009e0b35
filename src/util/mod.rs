//! Shared utilities

pub mod config;
pub mod docs;
pub mod fs;
pub mod process;
pub mod remote;
pub mod report;

pub use config::{Config, Settings};
pub use process::{CommandRunner, Invocation, SystemRunner};
pub use remote::RemoteHost;
