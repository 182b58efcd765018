//! Orchestration of one deployment.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{
    ArtifactBuilder, ArtifactLocator, DeployConfig, DeployMode, DeployOptions, Environment,
    HostDeployment, HostTransport, PodDeployment, PodTransport, RemoteHost, ServiceName,
    error::Result,
};

/// Where a deployment ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentReport {
    /// A file was moved into a Docker volume.
    Host { host: RemoteHost, target_path: String },
    /// A file was copied into a pod.
    Pod { pod: String, target_path: String },
}

impl fmt::Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host { host, target_path } => write!(f, "{host}:{target_path}"),
            Self::Pod { pod, target_path } => write!(f, "pod {pod}:{target_path}"),
        }
    }
}

/// Runs one deployment: build, locate and rename the archive, then ship it.
pub struct Deployer<B, H, P> {
    config: DeployConfig,
    options: DeployOptions,
    /// Project directory; relative paths are resolved against it.
    workdir: PathBuf,
    builder: B,
    hosts: H,
    pods: P,
}

impl<B, H, P> Deployer<B, H, P>
where
    B: ArtifactBuilder,
    H: HostTransport,
    P: PodTransport,
{
    pub fn new(
        config: DeployConfig,
        options: DeployOptions,
        workdir: impl Into<PathBuf>,
        builder: B,
        hosts: H,
        pods: P,
    ) -> Self {
        Self {
            config,
            options,
            workdir: workdir.into(),
            builder,
            hosts,
            pods,
        }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    /// Run the whole deployment.
    pub fn deploy(&self) -> Result<DeploymentReport> {
        let mode = self.options.mode()?;

        self.build()?;

        match mode {
            DeployMode::ContextFile { host, path } => self.deploy_context(host, path),
            DeployMode::Webapp { host } => self.deploy_webapp(host),
            DeployMode::Kubernetes => self.deploy_to_pod(),
        }
    }

    fn build(&self) -> Result<()> {
        if self.options.should_build() {
            return self.builder.build();
        }
        if self.options.build {
            tracing::info!("Skip building maven project because context flag is used");
        } else {
            tracing::debug!("Build disabled, deploying the existing archive");
        }
        Ok(())
    }

    fn remote_host(&self, env: Environment) -> RemoteHost {
        RemoteHost::new(env.hostname(&self.config.docker), self.config.docker.ssh_port)
    }

    fn locator(&self) -> Result<ArtifactLocator> {
        let service = ServiceName::from_dir(&self.workdir, &self.config.service_prefix)?;
        Ok(ArtifactLocator::new(
            &self.workdir,
            &self.config.artifact_pattern,
            service,
        ))
    }

    fn deploy_context(&self, env: Environment, path: &Path) -> Result<DeploymentReport> {
        let docker = &self.config.docker;
        let local = self.workdir.join(path);
        let deployment = HostDeployment {
            host: self.remote_host(env),
            local: &local,
            tmp_path: remote_join(&docker.tmp_dir, &docker.context_name),
            target_path: remote_join(&docker.context_dir, &docker.context_name),
        };

        deployment.run(&self.hosts)?;

        Ok(DeploymentReport::Host {
            host: deployment.host,
            target_path: deployment.target_path,
        })
    }

    fn deploy_webapp(&self, env: Environment) -> Result<DeploymentReport> {
        if self.options.kubernetes {
            tracing::warn!(host = %env, "Host flag takes precedence, kubernetes flag is ignored");
        }

        let artifact = self.locator()?.locate_and_rename()?;
        let file_name = artifact.file_name();

        let docker = &self.config.docker;
        let deployment = HostDeployment {
            host: self.remote_host(env),
            local: &artifact.canonical,
            tmp_path: remote_join(&docker.tmp_dir, &file_name),
            target_path: remote_join(&docker.webapps_dir, &file_name),
        };

        deployment.run(&self.hosts)?;

        Ok(DeploymentReport::Host {
            host: deployment.host,
            target_path: deployment.target_path,
        })
    }

    fn deploy_to_pod(&self) -> Result<DeploymentReport> {
        let artifact = self.locator()?.locate_and_rename()?;

        // kubectl splits `cp` operands on ':', so a drive letter would read as a pod name.
        let local = artifact
            .canonical
            .strip_prefix(&self.workdir)
            .unwrap_or(artifact.canonical.as_path());

        let kubernetes = &self.config.kubernetes;
        let deployment = PodDeployment {
            app_name: &kubernetes.app_name,
            local,
            dir: &kubernetes.webapps_dir,
        };

        let pod = deployment.run(&self.pods)?;

        Ok(DeploymentReport::Pod {
            pod,
            target_path: remote_join(&kubernetes.webapps_dir, &artifact.file_name()),
        })
    }
}

/// Join a remote directory and a file name with exactly one `/`.
pub fn remote_join(dir: &str, file_name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), file_name)
}
