//! Channel layer: the byte stream under a shell session.
//!
//! [`ShellChannel`] is the seam between the session protocol and the SSH
//! transport. Everything above it only sees "write bytes" and "await the next
//! chunk", so a scripted device can stand in for a real PDU.

mod buffer;
mod filter;
mod prompt;

pub use buffer::PromptBuffer;
pub use filter::EscapeFilter;
pub use prompt::Prompt;

use std::future::Future;

use crate::error::Result;

/// An interactive shell byte stream.
///
/// Bytes arrive in arbitrary chunk sizes with no message framing.
pub trait ShellChannel: Send {
    /// Write all of `data` to the shell.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the next chunk of output.
    ///
    /// Returns `Ok(None)` once the remote end has closed the channel.
    /// Implementations must be cancel-safe: dropping the future before it
    /// completes must not lose data.
    fn read_chunk(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Close the channel and release the underlying connection.
    fn shutdown(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}
