//! warship-deploy - Build and ship Tomcat web archives.
//!
//! This crate builds a project's web archive, gives it its canonical name and
//! delivers it either to a Tomcat volume on a remote Docker host (SCP upload,
//! then a `sudo mv` over SSH) or into a running kubernetes pod (`kubectl cp`).

mod artifact;
pub use artifact::{Artifact, ArtifactLocator, ServiceName};

mod build;
pub use build::{ArtifactBuilder, BuildTool};

mod credentials;
pub use credentials::{CredentialProvider, Credentials, PromptCredentials, USERNAME_ENV};

mod deployer;
pub use deployer::{DeploymentReport, Deployer, remote_join};

mod docker;
pub use docker::{HostDeployment, HostTransport, SshTransport, sudo_move_command};

mod error;
pub use error::{DeployError, Result};

mod kubernetes;
pub use kubernetes::{
    KubectlCmdBuilder, KubectlTransport, PodDeployment, PodTransport, app_selector,
    pod_destination,
};

mod options;
pub use options::{DeployMode, DeployOptions, Environment};

pub mod process;
pub use process::{CommandError, CommandLine, CommandRunner, SystemRunner};

mod settings;
pub use settings::{
    DeployConfig, DockerConfig, KubernetesConfig, SETTINGS_ENV_PREFIX, SETTINGS_FILENAME,
};

mod ssh;
pub use ssh::{RemoteHost, RemoteOutput, SshSession, shell_quote};
