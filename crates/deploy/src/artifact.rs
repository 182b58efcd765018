//! Locating and renaming the built web archive.

use std::path::{Path, PathBuf};

use derive_more::{Deref, Display};

use crate::{DeployError, error::Result};

/// Logical name of the service being deployed, e.g. `billing` for `wa-billing`.
#[derive(Debug, Clone, PartialEq, Eq, Deref, Display)]
pub struct ServiceName(String);

impl ServiceName {
    /// Derive the service name from a project directory.
    ///
    /// The first occurrence of `prefix` in the directory's base name is removed.
    pub fn from_dir(dir: &Path, prefix: &str) -> Result<Self> {
        let base = dir
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DeployError::ServiceName(dir.to_path_buf()))?;

        let name = if prefix.is_empty() {
            base.to_string()
        } else {
            base.replacen(prefix, "", 1)
        };

        if name.is_empty() {
            return Err(DeployError::ServiceName(dir.to_path_buf()));
        }

        Ok(Self(name))
    }

    /// Archive file name Tomcat deploys the service under.
    pub fn war_file_name(&self) -> String {
        format!("{}.war", self.0)
    }
}

/// The archive found on disk and the canonical name it is deployed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path produced by the build.
    pub found: PathBuf,
    /// `target/<service>.war` under the project directory.
    pub canonical: PathBuf,
}

impl Artifact {
    /// Base name of the canonical archive.
    pub fn file_name(&self) -> String {
        self.canonical
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Move the archive to its canonical name. Does nothing if it is already there.
    pub fn rename(&self) -> Result<&Path> {
        if self.found == self.canonical {
            tracing::debug!(path = %self.canonical.display(), "Artifact already has its canonical name");
            return Ok(&self.canonical);
        }

        std::fs::rename(&self.found, &self.canonical).map_err(|source| DeployError::Rename {
            from: self.found.clone(),
            to: self.canonical.clone(),
            source,
        })?;

        tracing::info!(path = %self.canonical.display(), "File was renamed to a new name");
        Ok(&self.canonical)
    }
}

/// Finds the built archive of the project rooted at `root`.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    root: PathBuf,
    pattern: String,
    service: ServiceName,
}

impl ArtifactLocator {
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>, service: ServiceName) -> Self {
        Self {
            root: root.into(),
            pattern: pattern.into(),
            service,
        }
    }

    pub fn service(&self) -> &ServiceName {
        &self.service
    }

    /// The canonical archive path, `<root>/target/<service>.war`.
    pub fn canonical_path(&self) -> PathBuf {
        self.root.join("target").join(self.service.war_file_name())
    }

    /// Expand the pattern and pick the archive to deploy.
    ///
    /// When several files match, the first one in sorted order is used.
    pub fn locate(&self) -> Result<Artifact> {
        let full_pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&self.root.to_string_lossy()),
            self.pattern
        );

        let matches = glob::glob(&full_pattern)
            .map_err(|source| DeployError::Pattern {
                pattern: self.pattern.clone(),
                source,
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DeployError::Glob)?;

        let Some(found) = matches.first().cloned() else {
            return Err(DeployError::NoArtifact {
                pattern: self.pattern.clone(),
            });
        };

        if matches.len() > 1 {
            tracing::warn!(
                pattern = %self.pattern,
                candidates = ?matches,
                chosen = %found.display(),
                "Several files match the artifact pattern, deploying the first one"
            );
        }

        tracing::info!(pattern = %self.pattern, file = %found.display(), "Files found matching pattern");

        Ok(Artifact {
            found,
            canonical: self.canonical_path(),
        })
    }

    /// Locate the archive and give it its canonical name.
    pub fn locate_and_rename(&self) -> Result<Artifact> {
        let artifact = self.locate()?;
        artifact.rename()?;
        Ok(artifact)
    }
}
