//! Delivery to a Tomcat volume on a remote Docker host.
//!
//! The file is uploaded to a temporary directory the login user can write to,
//! then moved into the (root owned) volume with `sudo`.

use std::path::Path;

use crate::{
    DeployError,
    credentials::CredentialProvider,
    error::Result,
    ssh::{RemoteHost, SshSession, shell_quote},
};

/// Moves files onto a Docker host.
pub trait HostTransport {
    /// Upload `local` to `remote` with the login user's privileges.
    fn upload(&self, host: &RemoteHost, local: &Path, remote: &str) -> Result<()>;

    /// Move `src` to `dest` on the host with elevated privileges.
    fn privileged_move(&self, host: &RemoteHost, src: &str, dest: &str) -> Result<()>;
}

/// Remote command moving `src` to `dest` as root.
///
/// `sudo -S` reads the password from standard input, so the secret never
/// appears on the remote command line.
pub fn sudo_move_command(src: &str, dest: &str) -> String {
    format!(
        "sudo -S -p '' mv {} {}",
        shell_quote(src),
        shell_quote(dest)
    )
}

/// [`HostTransport`] over SSH. Each call opens and closes its own session.
#[derive(Debug, Clone)]
pub struct SshTransport<C> {
    credentials: C,
    file_mode: i32,
}

impl<C: CredentialProvider> SshTransport<C> {
    pub fn new(credentials: C, file_mode: i32) -> Self {
        Self {
            credentials,
            file_mode,
        }
    }
}

impl<C: CredentialProvider> HostTransport for SshTransport<C> {
    fn upload(&self, host: &RemoteHost, local: &Path, remote: &str) -> Result<()> {
        let credentials = self.credentials.credentials()?;
        let session = SshSession::connect(host, &credentials)?;
        session.upload(local, remote, self.file_mode)
    }

    fn privileged_move(&self, host: &RemoteHost, src: &str, dest: &str) -> Result<()> {
        let credentials = self.credentials.credentials()?;
        let session = SshSession::connect(host, &credentials)?;

        let command = sudo_move_command(src, dest);
        let stdin = format!("{}\n", credentials.password);
        let output = session.exec(&command, Some(stdin.as_bytes()))?;

        if output.status != 0 {
            return Err(DeployError::RemoteCommand {
                host: host.to_string(),
                command,
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

/// One push of a local file to a Docker host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDeployment<'a> {
    pub host: RemoteHost,
    pub local: &'a Path,
    pub tmp_path: String,
    pub target_path: String,
}

impl HostDeployment<'_> {
    /// Upload to the temporary path, then move into place.
    ///
    /// Nothing is moved when the upload fails, and the temporary file is left
    /// behind when the move fails.
    pub fn run(&self, transport: &impl HostTransport) -> Result<()> {
        let file_name = self
            .local
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!(
            host = %self.host,
            local = %self.local.display(),
            tmp_path = %self.tmp_path,
            target_path = %self.target_path,
            "Docker deployment details"
        );
        tracing::info!(host = %self.host, "Deployment to a docker container has been started...");

        transport.upload(&self.host, self.local, &self.tmp_path)?;
        tracing::info!(file = %file_name, host = %self.host, "Successfully copied file to directory on host");

        transport.privileged_move(&self.host, &self.tmp_path, &self.target_path)?;
        tracing::info!(file = %file_name, host = %self.host, "Successfully deployed file to docker tomcat volume");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sudo_move_command_keeps_secret_off_command_line() {
        let cmd = sudo_move_command(
            "/tmp/billing.war",
            "/var/lib/docker/volumes/docker_tomcat_webapps/_data/billing.war",
        );
        assert_eq!(
            cmd,
            "sudo -S -p '' mv '/tmp/billing.war' '/var/lib/docker/volumes/docker_tomcat_webapps/_data/billing.war'"
        );
        assert!(!cmd.contains("echo"));
    }
}
