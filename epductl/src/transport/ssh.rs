//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, info, trace, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::{HashAlg, PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::channel::ShellChannel;
use crate::error::{ConnectError, Result, SessionError};

/// Authenticated SSH connection to a device.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    /// Where we are connected to, for logging.
    target: String,
}

impl SshTransport {
    /// Connect to the SSH server and authenticate.
    ///
    /// The configured timeout covers TCP connect, key exchange and
    /// authentication together.
    pub async fn connect(config: &SshConfig) -> Result<Self> {
        let host_key_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification,
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        info!("connecting to {}", config.socket_addr());

        let session = tokio::time::timeout(config.timeout, async {
            let ssh_config = Arc::new(client::Config::default());
            let mut session =
                client::connect(ssh_config, (config.host.as_str(), config.port), handler)
                    .await
                    .map_err(|e| match take_host_key_error(&host_key_error) {
                        // check_server_key stored a detailed reason; prefer it over
                        // the generic russh::Error::UnknownKey
                        Some(reason) => ConnectError::HostKeyRejected {
                            host: config.host.clone(),
                            port: config.port,
                            reason,
                        },
                        None => ConnectError::Transport(e),
                    })?;

            Self::authenticate(&mut session, config).await?;
            Ok::<_, crate::Error>(session)
        })
        .await
        .map_err(|_| ConnectError::Timeout {
            host: config.host.clone(),
            port: config.port,
            after: config.timeout,
        })??;

        info!("authenticated to {} as '{}'", config.socket_addr(), config.username);

        Ok(Self {
            session,
            target: config.socket_addr(),
        })
    }

    /// Open a PTY channel and start an interactive shell on it.
    pub async fn open_shell(self, config: &SshConfig) -> Result<SshShell> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(ConnectError::Transport)?;

        channel
            .request_pty(
                true,
                "vt100",
                config.terminal_width,
                config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(ConnectError::Transport)?;

        channel
            .request_shell(true)
            .await
            .map_err(ConnectError::Transport)?;

        debug!("interactive shell requested on {}", self.target);

        Ok(SshShell {
            transport: self,
            channel,
        })
    }

    /// Authenticate with the server.
    async fn authenticate(session: &mut Handle<SshHandler>, config: &SshConfig) -> Result<()> {
        let success = match &config.auth {
            AuthMethod::Password(password) => session
                .authenticate_password(&config.username, password.expose_secret())
                .await
                .map_err(ConnectError::Transport)?
                .success(),
            AuthMethod::PrivateKey { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                    .map_err(|e| ConnectError::InvalidKey(format!("{}: {}", path.display(), e)))?;

                // Get the best RSA hash algorithm supported by the server
                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .map_err(ConnectError::Transport)?
                    .flatten();

                session
                    .authenticate_publickey(
                        &config.username,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await
                    .map_err(ConnectError::Transport)?
                    .success()
            }
        };

        if !success {
            return Err(ConnectError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Close the connection.
    pub async fn close(self) -> Result<()> {
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(SessionError::Channel)?;
        info!("disconnected from {}", self.target);
        Ok(())
    }
}

fn take_host_key_error(slot: &Mutex<Option<String>>) -> Option<String> {
    slot.lock().ok().and_then(|mut reason| reason.take())
}

/// Interactive shell channel on an SSH connection.
///
/// Owns both the channel and the connection it runs on, so shutting the
/// shell down also disconnects.
pub struct SshShell {
    transport: SshTransport,
    channel: Channel<Msg>,
}

impl ShellChannel for SshShell {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.channel
            .data(data)
            .await
            .map_err(SessionError::Channel)?;
        Ok(())
    }

    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => return Ok(Some(data.to_vec())),
                Some(ChannelMsg::ExtendedData { data, .. }) => return Ok(Some(data.to_vec())),
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    debug!("shell channel on {} closed", self.transport.target);
                    return Ok(None);
                }
                Some(other) => trace!("ignoring channel message: {:?}", other),
            }
        }
    }

    async fn shutdown(self) -> Result<()> {
        if let Err(e) = self.channel.eof().await {
            debug!("eof on closing channel failed: {}", e);
        }
        if let Err(e) = self.channel.close().await {
            debug!("closing channel failed: {}", e);
        }
        self.transport.close().await
    }
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Stores a detailed host-key rejection reason so connect() can surface it
    /// instead of the generic russh::Error::UnknownKey.
    host_key_error: Arc<Mutex<Option<String>>>,
}

impl SshHandler {
    /// Check the host key against known_hosts.
    ///
    /// Returns `Ok(true)` if matched, `Ok(false)` if the host is not listed,
    /// `Err(reason)` if the key changed or known_hosts could not be read.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> std::result::Result<bool, String> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::check_known_hosts(&self.host, self.port, pubkey)
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(format!(
                "key does not match known_hosts entry on line {}",
                line
            )),
            Err(e) => Err(format!("known_hosts lookup failed: {}", e)),
        }
    }

    /// Save a new host key to known_hosts.
    fn learn_host_key(&self, pubkey: &PublicKey) -> std::result::Result<(), String> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey)
        };

        result.map_err(|e| e.to_string())
    }

    fn reject(&self, reason: String) -> bool {
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(reason);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        debug!(
            "host key for {}:{} is {}",
            self.host,
            self.port,
            server_public_key.fingerprint(HashAlg::Sha256)
        );

        let accepted = match self.host_key_verification {
            HostKeyVerification::Disabled => true,

            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => {
                    if let Err(e) = self.learn_host_key(server_public_key) {
                        warn!("Failed to save host key: {}", e);
                    }
                    true
                }
                Err(reason) => self.reject(reason),
            },

            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => self.reject("host is not in known_hosts".to_string()),
                Err(reason) => self.reject(reason),
            },
        };

        Ok(accepted)
    }
}
