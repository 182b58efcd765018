//! SSH login credentials.

use std::fmt;

use crate::{DeployError, error::Result};

/// Environment variable holding the SSH login name.
pub const USERNAME_ENV: &str = "USERNAME";

/// A login name and password, held for a single SSH step.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials each time a connection is opened.
pub trait CredentialProvider {
    fn credentials(&self) -> Result<Credentials>;
}

/// Reads the user from the environment and prompts for the password on the terminal.
#[derive(Debug, Clone)]
pub struct PromptCredentials {
    username_var: String,
}

impl Default for PromptCredentials {
    fn default() -> Self {
        Self {
            username_var: USERNAME_ENV.to_string(),
        }
    }
}

impl PromptCredentials {
    /// Read the login name from `var` instead of `USERNAME`.
    pub fn with_username_var(var: impl Into<String>) -> Self {
        Self {
            username_var: var.into(),
        }
    }

    fn username(&self) -> Result<String> {
        std::env::var(&self.username_var)
            .ok()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DeployError::MissingUsername(self.username_var.clone()))
    }
}

impl CredentialProvider for PromptCredentials {
    fn credentials(&self) -> Result<Credentials> {
        let username = self.username()?;

        let password = dialoguer::Password::new()
            .with_prompt("Enter password")
            .allow_empty_password(true)
            .interact()
            .map_err(DeployError::Password)?;

        Ok(Credentials { username, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            username: "jdoe".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("jdoe"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_missing_username() {
        let provider = PromptCredentials::with_username_var("WARSHIP_TEST_UNSET_USER_31337");
        let err = provider.credentials().unwrap_err();
        assert!(matches!(err, DeployError::MissingUsername(var) if var == "WARSHIP_TEST_UNSET_USER_31337"));
    }
}
