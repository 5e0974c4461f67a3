//! The shell session itself.

use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio::time::Instant;

use super::SessionConfig;
use super::framing::strip_reply;
use super::response::Response;
use crate::channel::{Prompt, PromptBuffer, ShellChannel};
use crate::error::{Result, SessionError};
use crate::transport::{SshConfig, SshShell, SshTransport};

/// Line terminator the device shell expects after each command.
const LINE_TERMINATOR: u8 = b'\r';

/// Command that ends the device's CLI session.
const QUIT: &str = "quit";

/// A shell session over SSH.
pub type SshSession = ShellSession<SshShell>;

/// Request/response session on an interactive device shell.
///
/// Holds the channel exclusively from login until [`close`](Self::close).
/// All operations take `&mut self`, so only one command can be in flight.
pub struct ShellSession<C: ShellChannel> {
    /// The shell channel (`None` once closed).
    channel: Option<C>,

    /// Prompt captured at login.
    prompt: Prompt,

    /// Reply accumulation buffer.
    buffer: PromptBuffer,

    /// Timing and size limits.
    config: SessionConfig,
}

impl ShellSession<SshShell> {
    /// Connect over SSH, start an interactive shell and capture its prompt.
    pub async fn open(ssh: &SshConfig, config: SessionConfig) -> Result<Self> {
        let transport = SshTransport::connect(ssh).await?;
        let shell = transport.open_shell(ssh).await?;
        Self::start(shell, config).await
    }
}

impl<C: ShellChannel> ShellSession<C> {
    /// Start a session on an already opened shell channel.
    ///
    /// Waits for the login banner and takes its last line as the prompt. On
    /// failure the channel is shut down before the error is returned.
    pub async fn start(mut channel: C, config: SessionConfig) -> Result<Self> {
        let mut buffer = PromptBuffer::new();

        match capture_prompt(&mut channel, &mut buffer, &config).await {
            Ok(prompt) => {
                info!("shell ready, prompt {:?}", prompt.to_string());
                Ok(Self {
                    channel: Some(channel),
                    prompt,
                    buffer,
                    config,
                })
            }
            Err(e) => {
                if let Err(close_err) = channel.shutdown().await {
                    debug!("shutdown after failed login: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// The prompt captured at login.
    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// Check if the session still holds its channel.
    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Get the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Set the per-command timeout.
    pub fn set_command_timeout(&mut self, timeout: Duration) {
        self.config.command_timeout = timeout;
    }

    /// Send a command and return the stripped, single-line reply.
    pub async fn execute(&mut self, command: &str) -> Result<String> {
        Ok(self.execute_response(command).await?.reply)
    }

    /// Send a command and return the full [`Response`].
    ///
    /// If the exchange does not complete (timeout, channel failure) the
    /// session closes itself: whatever the device sends afterwards could not
    /// be matched to a command.
    pub async fn execute_response(&mut self, command: &str) -> Result<Response> {
        if command.contains(['\r', '\n']) {
            return Err(SessionError::InvalidCommand {
                command: command.to_string(),
            }
            .into());
        }

        let timeout = self.config.command_timeout;
        let channel = self.channel.as_mut().ok_or(SessionError::NotConnected)?;
        let buffer = &mut self.buffer;
        let prompt = &self.prompt;

        buffer.clear();
        let start = Instant::now();
        debug!("send: {}", command);

        let exchange = async {
            channel.write(&command_line(command)).await?;
            read_until_prompt(channel, buffer, prompt).await
        };

        let outcome = tokio::time::timeout(timeout, exchange).await;
        let raw = match outcome {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                self.abandon().await;
                return Err(e);
            }
            Err(_) => {
                self.abandon().await;
                return Err(SessionError::ResponseTimeout {
                    command: command.to_string(),
                    after: timeout,
                }
                .into());
            }
        };

        let elapsed = start.elapsed();
        let reply = strip_reply(&raw, command.as_bytes(), &self.prompt);
        debug!("recv ({:?}): {:?}", elapsed, reply);

        Ok(Response {
            command: command.to_string(),
            reply,
            raw: String::from_utf8_lossy(&raw).into_owned(),
            elapsed,
        })
    }

    /// Log out and release the channel.
    ///
    /// Sends `quit` without waiting for a reply, then shuts the channel down.
    /// Closing a session that is not open does nothing.
    pub async fn close(&mut self) -> Result<()> {
        let Some(mut channel) = self.channel.take() else {
            info!("close: session is not open");
            return Ok(());
        };

        debug!("send: {}", QUIT);
        if let Err(e) = channel.write(&command_line(QUIT)).await {
            debug!("quit not delivered: {}", e);
        }
        channel.shutdown().await
    }

    /// Drop the channel after an incomplete exchange.
    async fn abandon(&mut self) {
        if let Some(channel) = self.channel.take() {
            warn!("closing session after an incomplete exchange");
            if let Err(e) = channel.shutdown().await {
                debug!("shutdown after incomplete exchange: {}", e);
            }
        }
    }
}

impl<C: ShellChannel> Drop for ShellSession<C> {
    fn drop(&mut self) {
        if self.channel.is_some() {
            warn!("shell session dropped without close(); device session left logged in");
        }
    }
}

fn command_line(command: &str) -> Vec<u8> {
    let mut line = Vec::with_capacity(command.len() + 1);
    line.extend_from_slice(command.as_bytes());
    line.push(LINE_TERMINATOR);
    line
}

/// Collect the login banner and extract the prompt from it.
///
/// Reads until the output has been quiet for the settle interval. Only the
/// last `banner_limit` bytes are kept, so a long login message still ends
/// with the prompt line.
async fn capture_prompt<C: ShellChannel>(
    channel: &mut C,
    buffer: &mut PromptBuffer,
    config: &SessionConfig,
) -> Result<Prompt> {
    let deadline = Instant::now() + config.prompt_timeout;

    let first = tokio::time::timeout_at(deadline, channel.read_chunk())
        .await
        .map_err(|_| SessionError::PromptTimeout(config.prompt_timeout))??
        .ok_or(SessionError::Closed)?;
    buffer.extend(&first);

    loop {
        buffer.keep_tail(config.banner_limit);

        let now = Instant::now();
        if now >= deadline {
            warn!("login banner still arriving after {:?}", config.prompt_timeout);
            break;
        }

        let quiet = (now + config.settle_interval).min(deadline);
        match tokio::time::timeout_at(quiet, channel.read_chunk()).await {
            Ok(chunk) => buffer.extend(&chunk?.ok_or(SessionError::Closed)?),
            Err(_) => break,
        }
    }

    let banner = buffer.take();
    trace!("banner tail: {:?}", String::from_utf8_lossy(&banner));

    Prompt::from_banner(&banner).ok_or_else(|| SessionError::NoPrompt.into())
}

/// Read chunks until the prompt is the last line of the buffer.
async fn read_until_prompt<C: ShellChannel>(
    channel: &mut C,
    buffer: &mut PromptBuffer,
    prompt: &Prompt,
) -> Result<Vec<u8>> {
    loop {
        let chunk = channel.read_chunk().await?.ok_or(SessionError::Closed)?;
        trace!("recv chunk: {} bytes", chunk.len());
        buffer.extend(&chunk);

        if buffer.ends_with_prompt(prompt) {
            return Ok(buffer.take());
        }
    }
}
