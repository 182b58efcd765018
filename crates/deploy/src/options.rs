//! Per-invocation deployment options and their validation.

use std::path::{Path, PathBuf};

use crate::{DeployError, error::Result, settings::DockerConfig};

/// Known deployment environments. Each maps to a remote Docker host.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    Auto,
    Alpha,
    Rc,
    Dev,
}

impl Environment {
    /// Fully qualified host name of this environment's Docker host.
    pub fn hostname(&self, docker: &DockerConfig) -> String {
        format!("{}.{}", self, docker.domain)
    }
}

/// Options for one deployment, fixed once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Docker host to deploy to.
    pub host: Option<Environment>,
    /// Context file to push instead of the web archive. Requires `host`.
    pub context_path: Option<PathBuf>,
    /// Run the build tool before deploying.
    pub build: bool,
    /// Deploy into the kubernetes pod instead of a Docker host.
    pub kubernetes: bool,
    /// Debug flag as given. Log verbosity is set by the binary when it
    /// installs the subscriber; here it only shows up in logged options.
    pub debug: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            host: None,
            context_path: None,
            build: true,
            kubernetes: false,
            debug: false,
        }
    }
}

/// What a validated set of options asks for. The first matching branch wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode<'a> {
    /// Push a context file to the Docker host.
    ContextFile { host: Environment, path: &'a Path },
    /// Push the web archive to the Docker host.
    Webapp { host: Environment },
    /// Copy the web archive into the kubernetes pod.
    Kubernetes,
}

impl DeployOptions {
    /// Validate raw flag values.
    ///
    /// An empty host or context path counts as absent.
    pub fn validate(
        host: Option<&str>,
        context_path: Option<PathBuf>,
        build: bool,
        kubernetes: bool,
        debug: bool,
    ) -> Result<Self> {
        let host = host.filter(|h| !h.is_empty());
        let context_path = context_path.filter(|p| !p.as_os_str().is_empty());

        if context_path.is_some() && host.is_none() {
            return Err(DeployError::ContextWithoutHost);
        }

        let host = host
            .map(|h| {
                h.parse::<Environment>()
                    .map_err(|_| DeployError::UnknownHost(h.to_string()))
            })
            .transpose()?;

        let options = Self {
            host,
            context_path,
            build,
            kubernetes,
            debug,
        };

        options.mode()?;

        Ok(options)
    }

    /// Select the deployment branch.
    pub fn mode(&self) -> Result<DeployMode<'_>> {
        match (self.host, self.context_path.as_deref()) {
            (Some(host), Some(path)) => Ok(DeployMode::ContextFile { host, path }),
            (Some(host), None) => Ok(DeployMode::Webapp { host }),
            (None, Some(_)) => Err(DeployError::ContextWithoutHost),
            (None, None) if self.kubernetes => Ok(DeployMode::Kubernetes),
            (None, None) => Err(DeployError::NoDeploymentTarget),
        }
    }

    /// Whether the build tool should run. A context-only push never builds.
    pub fn should_build(&self) -> bool {
        self.build && self.context_path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_environment_round_trip() {
        for env in Environment::iter() {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
        assert_eq!(Environment::Rc.to_string(), "rc");
    }

    #[test]
    fn test_hostname() {
        let docker = DockerConfig::default();
        assert_eq!(Environment::Dev.hostname(&docker), "dev.erp.sperasoft.com");
    }

    #[test]
    fn test_context_requires_host() {
        let err = DeployOptions::validate(
            None,
            Some(PathBuf::from("./conf/context.xml")),
            true,
            true,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, DeployError::ContextWithoutHost));

        let err = DeployOptions::validate(
            Some(""),
            Some(PathBuf::from("./conf/context.xml")),
            true,
            false,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, DeployError::ContextWithoutHost));
    }

    #[test]
    fn test_rejects_unknown_hosts() {
        for host in ["prod", "RC", "staging", " rc", "localhost"] {
            let err = DeployOptions::validate(Some(host), None, true, false, false).unwrap_err();
            assert!(
                matches!(&err, DeployError::UnknownHost(h) if h == host),
                "host {host:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_accepts_known_hosts() {
        for host in ["auto", "alpha", "rc", "dev"] {
            let options = DeployOptions::validate(Some(host), None, true, false, false).unwrap();
            assert_eq!(options.host.unwrap().to_string(), host);
        }
    }

    #[test]
    fn test_empty_host_with_kubernetes() {
        let options = DeployOptions::validate(Some(""), None, true, true, false).unwrap();
        assert_eq!(options.host, None);
        assert_eq!(options.mode().unwrap(), DeployMode::Kubernetes);
    }

    #[test]
    fn test_no_target_is_rejected() {
        let err = DeployOptions::validate(None, None, true, false, true).unwrap_err();
        assert!(matches!(err, DeployError::NoDeploymentTarget));
    }

    #[test]
    fn test_mode_first_match_wins() {
        let options = DeployOptions::validate(
            Some("rc"),
            Some(PathBuf::from("./conf/context.xml")),
            true,
            true,
            false,
        )
        .unwrap();
        assert_eq!(
            options.mode().unwrap(),
            DeployMode::ContextFile {
                host: Environment::Rc,
                path: Path::new("./conf/context.xml"),
            }
        );
        assert!(!options.should_build());

        let options = DeployOptions::validate(Some("alpha"), None, true, true, false).unwrap();
        assert_eq!(
            options.mode().unwrap(),
            DeployMode::Webapp {
                host: Environment::Alpha
            }
        );
        assert!(options.should_build());
    }

    #[test]
    fn test_build_flag_disabled() {
        let options = DeployOptions::validate(None, None, false, true, false).unwrap();
        assert!(!options.should_build());
    }
}
