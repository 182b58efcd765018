//! Deploy settings: remote paths, host naming and external tool names.
//!
//! Settings are layered with [`figment`]: built-in defaults, then the user's
//! `Warship.toml`, then the project's `Warship.toml`, then an explicit file,
//! then `WARSHIP_CFG_*` environment variables.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The default name for the settings file.
pub const SETTINGS_FILENAME: &str = "Warship.toml";

/// Prefix of environment variables overriding settings. `__` separates nested keys.
pub const SETTINGS_ENV_PREFIX: &str = "WARSHIP_CFG_";

/// Settings for the Docker host transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Domain appended to the environment alias to form the host name.
    pub domain: String,
    /// SSH port of the Docker hosts.
    pub ssh_port: u16,
    /// Remote directory the upload lands in before the privileged move.
    pub tmp_dir: String,
    /// Tomcat webapps volume on the Docker host.
    pub webapps_dir: String,
    /// Tomcat conf volume on the Docker host.
    pub context_dir: String,
    /// File name the context file is deployed as.
    pub context_name: String,
    /// Permission bits of the uploaded file.
    pub file_mode: i32,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            domain: "erp.sperasoft.com".to_string(),
            ssh_port: 22,
            tmp_dir: "/tmp".to_string(),
            webapps_dir: "/var/lib/docker/volumes/docker_tomcat_webapps/_data".to_string(),
            context_dir: "/var/lib/docker/volumes/docker_tomcat_conf/_data".to_string(),
            context_name: "context.xml".to_string(),
            file_mode: 0o644,
        }
    }
}

/// Settings for the kubernetes transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// kubectl executable.
    pub kubectl: String,
    /// Value of the `app` label the target pod carries.
    pub app_name: String,
    /// Tomcat webapps directory inside the pod.
    pub webapps_dir: String,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            app_name: "tomcat".to_string(),
            webapps_dir: "/usr/local/tomcat/webapps".to_string(),
        }
    }
}

/// All settings that do not change between deployments of the same project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Glob matching the built web archive, relative to the working directory.
    pub artifact_pattern: String,
    /// Prefix stripped from the working directory name to get the service name.
    pub service_prefix: String,
    /// Build tool invocation, program first.
    pub build_command: Vec<String>,
    pub docker: DockerConfig,
    pub kubernetes: KubernetesConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            artifact_pattern: "target/*.war".to_string(),
            service_prefix: "wa-".to_string(),
            build_command: vec![
                "mvn".to_string(),
                "clean".to_string(),
                "package".to_string(),
            ],
            docker: DockerConfig::default(),
            kubernetes: KubernetesConfig::default(),
        }
    }
}

impl DeployConfig {
    /// Settings layers for a project rooted at `workdir`.
    ///
    /// Missing optional files are skipped.
    pub fn figment(workdir: &Path, explicit: Option<&Path>) -> Figment {
        Self::layered(Self::user_settings_path().as_deref(), workdir, explicit)
    }

    fn layered(user: Option<&Path>, workdir: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(user) = user {
            figment = figment.merge(Toml::file(user));
        }

        figment = figment.merge(Toml::file(workdir.join(SETTINGS_FILENAME)));

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(SETTINGS_ENV_PREFIX).split("__"))
    }

    /// Load the settings for a project rooted at `workdir`.
    ///
    /// An explicitly requested file must exist.
    pub fn load(workdir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit.filter(|p| !p.is_file()) {
            return Err(figment::Error::from(format!(
                "settings file not found: {}",
                path.display()
            ))
            .into());
        }

        let config: Self = Self::figment(workdir, explicit).extract()?;
        tracing::debug!(?config, "Deploy settings loaded");
        Ok(config)
    }

    /// `<config dir>/warship/Warship.toml`, if the platform has a config dir.
    pub fn user_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("warship").join(SETTINGS_FILENAME))
    }

    /// Render the settings as TOML.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
