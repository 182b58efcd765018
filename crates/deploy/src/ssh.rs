//! SSH and SCP sessions to a Docker host.
//!
//! Sessions authenticate with a password and do not verify the server's
//! host key. Every session is disconnected when dropped.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::Path;

use ssh2::Session;

use crate::{DeployError, credentials::Credentials, error::Result};

/// Address of a remote SSH server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHost {
    pub name: String,
    pub port: u16,
}

impl RemoteHost {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
        }
    }
}

impl fmt::Display for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.port)
    }
}

/// Outcome of a remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// An authenticated SSH session.
pub struct SshSession {
    host: String,
    session: Session,
}

impl SshSession {
    /// Open a TCP connection, run the handshake and authenticate with a password.
    pub fn connect(host: &RemoteHost, credentials: &Credentials) -> Result<Self> {
        let tcp = TcpStream::connect((host.name.as_str(), host.port)).map_err(|source| {
            DeployError::Connect {
                host: host.to_string(),
                source,
            }
        })?;

        let name = host.to_string();
        let mut session = Session::new().map_err(ssh_error(&name, "create a session"))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(ssh_error(&name, "handshake"))?;

        if let Err(err) = session.userauth_password(&credentials.username, &credentials.password) {
            tracing::debug!(host = %host, err = %err, "Password authentication rejected");
        }
        if !session.authenticated() {
            return Err(DeployError::Authentication {
                host: host.to_string(),
                user: credentials.username.clone(),
            });
        }

        tracing::info!(host = %host, "Connected");

        Ok(Self {
            host: name,
            session,
        })
    }

    /// Upload a local file over SCP with the given permission bits.
    pub fn upload(&self, local: &Path, remote: &str, mode: i32) -> Result<()> {
        let upload_err = |source: io::Error| DeployError::Upload {
            local: local.to_path_buf(),
            host: self.host.clone(),
            remote: remote.to_string(),
            source,
        };

        let mut file = File::open(local).map_err(upload_err)?;
        let size = file.metadata().map_err(upload_err)?.len();

        let mut channel = self
            .session
            .scp_send(Path::new(remote), mode, size, None)
            .map_err(ssh_error(&self.host, "open an scp channel"))?;

        io::copy(&mut file, &mut channel).map_err(upload_err)?;

        channel.send_eof().map_err(ssh_error(&self.host, "finish the upload"))?;
        channel.wait_eof().map_err(ssh_error(&self.host, "finish the upload"))?;
        channel.close().map_err(ssh_error(&self.host, "close the scp channel"))?;
        channel
            .wait_close()
            .map_err(ssh_error(&self.host, "close the scp channel"))?;

        Ok(())
    }

    /// Run a command, optionally feeding `stdin`, and wait for it to exit.
    pub fn exec(&self, command: &str, stdin: Option<&[u8]>) -> Result<RemoteOutput> {
        let mut channel = self
            .session
            .channel_session()
            .map_err(ssh_error(&self.host, "open a channel"))?;
        channel
            .exec(command)
            .map_err(ssh_error(&self.host, "execute a command"))?;

        let io_err = |source: io::Error| DeployError::RemoteIo {
            host: self.host.clone(),
            source,
        };

        if let Some(input) = stdin {
            channel.write_all(input).map_err(io_err)?;
            channel.flush().map_err(io_err)?;
        }
        channel.send_eof().map_err(ssh_error(&self.host, "close stdin"))?;

        let mut stdout = String::new();
        channel.read_to_string(&mut stdout).map_err(io_err)?;
        let mut stderr = String::new();
        channel.stderr().read_to_string(&mut stderr).map_err(io_err)?;

        channel
            .wait_close()
            .map_err(ssh_error(&self.host, "close the channel"))?;
        let status = channel
            .exit_status()
            .map_err(ssh_error(&self.host, "read the exit status"))?;

        Ok(RemoteOutput {
            status,
            stdout,
            stderr,
        })
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if let Err(err) = self.session.disconnect(None, "deployment step finished", None) {
            tracing::debug!(host = %self.host, err = %err, "Failed to disconnect cleanly");
        }
    }
}

fn ssh_error(host: &str, action: &'static str) -> impl FnOnce(ssh2::Error) -> DeployError {
    let host = host.to_string();
    move |source| DeployError::Ssh {
        host,
        action,
        source,
    }
}

/// Quote a string for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
