//! One completed request/reply exchange.

use std::fmt;
use std::time::Duration;

/// The device's answer to one command.
#[derive(Debug, Clone)]
pub struct Response {
    /// Command line as sent, without the terminator.
    pub command: String,

    /// Payload on a single line: echo, prompt and line breaks removed.
    pub reply: String,

    /// Everything received for this command, escapes already filtered.
    pub raw: String,

    /// Time from sending the command until the prompt came back.
    pub elapsed: Duration,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reply)
    }
}
