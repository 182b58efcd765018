//! Delivery into a running kubernetes pod through `kubectl`.

use std::path::Path;

use crate::{
    DeployError,
    error::Result,
    process::{CommandLine, CommandRunner},
};

/// Builder for the `kubectl` invocations used by the deployment.
#[derive(Debug, Clone)]
pub struct KubectlCmdBuilder {
    kubectl: String,
}

impl KubectlCmdBuilder {
    pub fn new(kubectl: impl Into<String>) -> Self {
        Self {
            kubectl: kubectl.into(),
        }
    }

    /// List the names of pods matching `selector`, one per line, no header.
    pub fn pod_names(&self, selector: &str) -> CommandLine {
        CommandLine::new(&self.kubectl).args([
            "get",
            "pods",
            "-l",
            selector,
            "-o",
            "custom-columns=:metadata.name",
            "--no-headers",
        ])
    }

    /// Copy a local file to `<pod>:<path>`.
    pub fn copy(&self, src: &Path, destination: &str) -> CommandLine {
        CommandLine::new(&self.kubectl)
            .arg("cp")
            .arg(src.display().to_string())
            .arg(destination)
    }
}

/// Label selector matching the pods of `app_name`.
pub fn app_selector(app_name: &str) -> String {
    format!("app={app_name}")
}

/// Resolves pods and copies files into them.
pub trait PodTransport {
    /// Name of the pod running `app_name`.
    fn resolve_pod(&self, app_name: &str) -> Result<String>;

    /// Copy `local` into `dir` inside `pod`, keeping its base name.
    fn copy_into_pod(&self, local: &Path, pod: &str, dir: &str) -> Result<()>;
}

/// [`PodTransport`] shelling out to `kubectl`.
#[derive(Debug, Clone)]
pub struct KubectlTransport<R> {
    commands: KubectlCmdBuilder,
    runner: R,
}

impl<R: CommandRunner> KubectlTransport<R> {
    pub fn new(kubectl: impl Into<String>, runner: R) -> Self {
        Self {
            commands: KubectlCmdBuilder::new(kubectl),
            runner,
        }
    }
}

impl<R: CommandRunner> PodTransport for KubectlTransport<R> {
    fn resolve_pod(&self, app_name: &str) -> Result<String> {
        let selector = app_selector(app_name);
        let output = self
            .runner
            .capture(&self.commands.pod_names(&selector))
            .map_err(|source| DeployError::PodLookup {
                selector: selector.clone(),
                source,
            })?;

        let mut pods = output.lines().map(str::trim).filter(|line| !line.is_empty());
        let Some(pod) = pods.next() else {
            return Err(DeployError::PodNotFound { selector });
        };

        let others: Vec<&str> = pods.collect();
        if !others.is_empty() {
            tracing::warn!(selector = %selector, chosen = pod, ?others, "Several pods match, using the first one");
        }

        Ok(pod.to_string())
    }

    fn copy_into_pod(&self, local: &Path, pod: &str, dir: &str) -> Result<()> {
        let destination = pod_destination(local, pod, dir);
        tracing::info!(destination = %destination, "Destination");

        self.runner
            .run(&self.commands.copy(local, &destination))
            .map_err(|source| DeployError::PodCopy {
                local: local.to_path_buf(),
                pod: pod.to_string(),
                source,
            })
    }
}

/// `<pod>:<dir>/<base name of local>`.
pub fn pod_destination(local: &Path, pod: &str, dir: &str) -> String {
    let file_name = local
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{pod}:{}/{file_name}", dir.trim_end_matches('/'))
}

/// One copy of a local file into the pod running an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodDeployment<'a> {
    pub app_name: &'a str,
    pub local: &'a Path,
    pub dir: &'a str,
}

impl PodDeployment<'_> {
    /// Resolve the pod, then copy into it. Nothing is copied when no pod is found.
    pub fn run(&self, transport: &impl PodTransport) -> Result<String> {
        tracing::debug!(
            app_name = self.app_name,
            local = %self.local.display(),
            dir = self.dir,
            "Kubernetes deployment details"
        );
        tracing::info!("Deployment to a kubernetes pod has been started...");

        let pod = transport.resolve_pod(self.app_name)?;
        tracing::info!(pod = %pod, "Pod was found");

        transport.copy_into_pod(self.local, &pod, self.dir)?;
        tracing::info!(pod = %pod, local = %self.local.display(), "Successfully deployed file to k8s pod");

        Ok(pod)
    }
}
