//! SSH transport layer wrapping russh.
//!
//! Connection setup, authentication, host key verification and the
//! interactive shell channel the session layer runs on.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::{SshShell, SshTransport};
