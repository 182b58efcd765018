//! Error types for the deployment pipeline.

use std::path::PathBuf;

use crate::process::CommandError;

/// Result alias used across the crate.
pub type Result<T, E = DeployError> = std::result::Result<T, E>;

/// Every way a deployment can fail.
///
/// Each variant names the step that failed. None of them is recovered from:
/// the binary logs the error chain and exits.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// `-c` was given without `-h`.
    #[error("context flag can be used only with host flag: -h. Usage: -c=./path/to/context.xml -h rc")]
    ContextWithoutHost,

    /// The host alias is not one of the known environments.
    #[error("unknown host {0:?}, host must be one of: auto, alpha, rc, dev")]
    UnknownHost(String),

    /// Neither a host nor kubernetes mode was requested.
    #[error("nothing to deploy: pass a host with -h or enable kubernetes mode with -k")]
    NoDeploymentTarget,

    /// The configured build command is empty.
    #[error("the build command is empty")]
    EmptyBuildCommand,

    /// The build tool could not be run or exited unsuccessfully.
    #[error("build failed")]
    Build(#[source] CommandError),

    /// The artifact glob pattern is malformed.
    #[error("invalid artifact pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// No file matched the artifact glob pattern.
    #[error("no files found matching pattern: {pattern}")]
    NoArtifact { pattern: String },

    /// A matched path could not be read while expanding the glob.
    #[error("failed to read artifact candidate")]
    Glob(#[source] glob::GlobError),

    /// The working directory could not be determined.
    #[error("failed to resolve the current working directory")]
    CurrentDir(#[source] std::io::Error),

    /// The working directory has no usable base name.
    #[error("cannot derive a service name from {}", .0.display())]
    ServiceName(PathBuf),

    /// The located artifact could not be renamed.
    #[error("failed to rename {} to {}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The login identity is missing from the environment.
    #[error("environment variable {0} is not set, cannot determine the SSH user")]
    MissingUsername(String),

    /// The password prompt failed.
    #[error("error reading password")]
    Password(#[source] dialoguer::Error),

    /// The TCP connection to the remote host could not be opened.
    #[error("couldn't establish a connection to {host}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// An SSH protocol operation failed.
    #[error("ssh error on {host} while trying to {action}")]
    Ssh {
        host: String,
        action: &'static str,
        #[source]
        source: ssh2::Error,
    },

    /// Reading from or writing to a remote command failed.
    #[error("i/o error while talking to a remote command on {host}")]
    RemoteIo {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The server rejected the credentials.
    #[error("authentication failed for {user}@{host}")]
    Authentication { host: String, user: String },

    /// Streaming the local file to the remote host failed.
    #[error("failed to copy {} to {host}:{remote}", local.display())]
    Upload {
        local: PathBuf,
        host: String,
        remote: String,
        #[source]
        source: std::io::Error,
    },

    /// A remote command ran but exited unsuccessfully.
    #[error("remote command `{command}` on {host} exited with status {status}: {stderr}")]
    RemoteCommand {
        host: String,
        command: String,
        status: i32,
        stderr: String,
    },

    /// `kubectl get pods` could not be run or failed.
    #[error("failed to query pods with selector {selector}")]
    PodLookup {
        selector: String,
        #[source]
        source: CommandError,
    },

    /// No pod matched the label selector.
    #[error("failed to get pod with selector {selector}. Check if the pod is running")]
    PodNotFound { selector: String },

    /// `kubectl cp` could not be run or failed.
    #[error("failed to deploy {} to k8s pod {pod}", local.display())]
    PodCopy {
        local: PathBuf,
        pod: String,
        #[source]
        source: CommandError,
    },

    /// The deploy settings could not be loaded.
    #[error("failed to load deploy settings")]
    Config(#[source] Box<figment::Error>),
}

impl From<figment::Error> for DeployError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
