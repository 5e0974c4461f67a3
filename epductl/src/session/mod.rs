//! Shell session: request/response framing over an interactive shell.
//!
//! The device shell echoes every typed line and re-displays its prompt when
//! it is done. The session captures that prompt at login and uses it as the
//! reply terminator, so each [`ShellSession::execute`] returns exactly the
//! reply to the command it sent.

mod framing;
mod response;
mod shell;

pub use framing::strip_reply;
pub use response::Response;
pub use shell::{ShellSession, SshSession};

use std::time::Duration;

/// Timing and size limits for a shell session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long login may take, from requesting the shell until the banner
    /// has gone quiet.
    pub prompt_timeout: Duration,

    /// Quiet period that ends login banner collection.
    pub settle_interval: Duration,

    /// Number of trailing banner bytes kept for prompt extraction.
    pub banner_limit: usize,

    /// How long a command may take until the prompt reappears.
    pub command_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt_timeout: Duration::from_secs(30),
            settle_interval: Duration::from_millis(250),
            banner_limit: 4096,
            command_timeout: Duration::from_secs(10),
        }
    }
}
