//! Builder for connecting to a PDU.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::Pdu;
use super::registry::ModelRegistry;
use crate::error::{ConfigError, Result};
use crate::session::{SessionConfig, ShellSession};
use crate::transport::{AuthMethod, HostKeyVerification, SshConfig};

/// Builder for connecting to a PDU.
///
/// # Example
///
/// ```rust,no_run
/// use epductl::PduBuilder;
///
/// # async fn example() -> Result<(), epductl::Error> {
/// let mut pdu = PduBuilder::new("192.168.1.10")
///     .username("admin")
///     .password("admin")
///     .connect()
///     .await?;
///
/// pdu.power_on(3).await?;
/// pdu.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct PduBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: Option<AuthMethod>,
    timeout: Duration,
    session: SessionConfig,
    terminal_width: u32,
    terminal_height: u32,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    models: ModelRegistry,
}

impl PduBuilder {
    /// Create a new builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        let session = SessionConfig::default();
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: None,
            timeout: session.prompt_timeout,
            session,
            terminal_width: 200,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            models: ModelRegistry::builtin(),
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = Some(AuthMethod::Password(SecretString::from(password.into())));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        });
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        });
        self
    }

    /// Set the connection timeout, which also bounds the wait for the first prompt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.session.prompt_timeout = timeout;
        self
    }

    /// Set how long each command may take.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.session.command_timeout = timeout;
        self
    }

    /// Set terminal dimensions.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a known_hosts file other than `~/.ssh/known_hosts`.
    pub fn known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Replace the set of supported models.
    pub fn models(mut self, models: ModelRegistry) -> Self {
        self.models = models;
        self
    }

    /// Accept an additional part number on top of the current set.
    pub fn support_part_number(mut self, part_number: impl Into<String>) -> Self {
        self.models.register(part_number);
        self
    }

    /// Validate the settings and split them into connection parts.
    fn into_parts(self) -> Result<(SshConfig, SessionConfig, ModelRegistry)> {
        let username = self.username.ok_or(ConfigError::Missing("username"))?;
        let auth = self.auth.ok_or(ConfigError::Missing("password or private key"))?;

        let ssh = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth,
            timeout: self.timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        Ok((ssh, self.session, self.models))
    }

    /// Connect, log in, and discover the device identity.
    ///
    /// Fails with a connection error if the SSH session cannot be set up,
    /// and with a validation error (after logging out) if the device is not
    /// a supported, well-formed PDU.
    pub async fn connect(self) -> Result<Pdu> {
        let (ssh, session_config, models) = self.into_parts()?;
        let session = ShellSession::open(&ssh, session_config).await?;
        Pdu::start(session, &models).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use secrecy::ExposeSecret;

    #[test]
    fn test_missing_username() {
        let err = PduBuilder::new("pdu").password("admin").into_parts().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Missing("username"))));
    }

    #[test]
    fn test_missing_credential() {
        let err = PduBuilder::new("pdu").username("admin").into_parts().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Missing(_))));
    }

    #[test]
    fn test_defaults() {
        let (ssh, session, models) = PduBuilder::new("10.0.0.5")
            .username("admin")
            .password("secret")
            .into_parts()
            .unwrap();

        assert_eq!(ssh.socket_addr(), "10.0.0.5:22");
        assert_eq!(ssh.host_key_verification, HostKeyVerification::AcceptNew);
        assert_eq!(session.prompt_timeout, ssh.timeout);
        assert_eq!(models.len(), 5);
        match ssh.auth {
            AuthMethod::Password(password) => assert_eq!(password.expose_secret(), "secret"),
            other => panic!("unexpected auth: {:?}", other),
        }
    }

    #[test]
    fn test_timeouts_and_models() {
        let (ssh, session, models) = PduBuilder::new("pdu")
            .port(2222)
            .username("admin")
            .private_key("/tmp/id_ed25519")
            .timeout(Duration::from_secs(5))
            .command_timeout(Duration::from_secs(2))
            .support_part_number("EMAB07")
            .into_parts()
            .unwrap();

        assert_eq!(ssh.port, 2222);
        assert_eq!(ssh.timeout, Duration::from_secs(5));
        assert_eq!(session.prompt_timeout, Duration::from_secs(5));
        assert_eq!(session.command_timeout, Duration::from_secs(2));
        assert!(models.contains("EMAB07"));
        assert!(matches!(ssh.auth, AuthMethod::PrivateKey { .. }));
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let (ssh, _, _) = PduBuilder::new("pdu")
            .username("admin")
            .password("hunter2")
            .into_parts()
            .unwrap();
        assert!(!format!("{:?}", ssh).contains("hunter2"));
    }
}
