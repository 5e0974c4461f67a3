//! Scripted stand-in for a PDU shell.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use epductl::error::Result;
use epductl::{ShellChannel, ShellSession, SessionConfig};

pub const PROMPT: &str = "pdu#0>";

pub const BANNER: &str = "\r\nEaton ePDU\r\nWelcome admin\r\n\r\npdu#0>";

/// What the device saw, shared with the test after the device moves into a session.
#[derive(Debug, Default)]
pub struct DeviceLog {
    /// Every line received, in order, without the terminator.
    pub commands: Vec<String>,
    /// Raw bytes received.
    pub written: Vec<u8>,
    /// Set once the channel was shut down.
    pub shutdown: bool,
}

/// A device shell that echoes each line and answers from a table.
pub struct FakeDevice {
    banner: String,
    prompt: String,
    replies: HashMap<String, String>,
    silent: HashSet<String>,
    hangups: HashSet<String>,
    chunk_size: usize,
    line: Vec<u8>,
    pending: VecDeque<Vec<u8>>,
    closed: bool,
    log: Arc<Mutex<DeviceLog>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            banner: BANNER.to_string(),
            prompt: PROMPT.to_string(),
            replies: HashMap::new(),
            silent: HashSet::new(),
            hangups: HashSet::new(),
            chunk_size: usize::MAX,
            line: Vec::new(),
            pending: VecDeque::new(),
            closed: false,
            log: Arc::new(Mutex::new(DeviceLog::default())),
        }
    }

    /// A device answering the four identity objects.
    pub fn with_identity(serial: &str, part: &str, version: &str, count: &str) -> Self {
        Self::new()
            .reply("get PDU.PowerSummary.iSerialNumber", serial)
            .reply("get PDU.PowerSummary.iPartNumber", part)
            .reply("get PDU.PowerSummary.iVersion", version)
            .reply("get PDU.OutletSystem.Outlet.Count", count)
    }

    pub fn banner(mut self, banner: &str) -> Self {
        self.banner = banner.to_string();
        self
    }

    pub fn reply(mut self, command: &str, reply: &str) -> Self {
        self.replies.insert(command.to_string(), reply.to_string());
        self
    }

    /// Never answer `command`.
    pub fn silent_on(mut self, command: &str) -> Self {
        self.silent.insert(command.to_string());
        self
    }

    /// Close the channel when `command` arrives.
    pub fn hangup_on(mut self, command: &str) -> Self {
        self.hangups.insert(command.to_string());
        self
    }

    /// Deliver output in chunks of at most `size` bytes.
    pub fn chunked(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn log(&self) -> Arc<Mutex<DeviceLog>> {
        Arc::clone(&self.log)
    }

    /// Start a session with default timing.
    pub async fn start(self) -> Result<(ShellSession<FakeDevice>, Arc<Mutex<DeviceLog>>)> {
        let log = self.log();
        let session = ShellSession::start(self, SessionConfig::default()).await?;
        Ok((session, log))
    }

    fn queue(&mut self, output: &[u8]) {
        for chunk in output.chunks(self.chunk_size.max(1)) {
            self.pending.push_back(chunk.to_vec());
        }
    }

    fn handle_line(&mut self, line: String) {
        self.log.lock().unwrap().commands.push(line.clone());

        if line == "quit" || self.hangups.contains(&line) {
            self.closed = true;
            return;
        }
        if self.silent.contains(&line) {
            return;
        }

        let mut output = format!("{}\r\n", line);
        match self.replies.get(&line) {
            Some(reply) if reply.is_empty() => {}
            Some(reply) => output.push_str(&format!("{}\r\n", reply)),
            None => output.push_str("Error: unknown command\r\n"),
        }
        output.push_str(&self.prompt);
        self.queue(output.as_bytes());
    }
}

impl ShellChannel for FakeDevice {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.log.lock().unwrap().written.extend_from_slice(data);
        for &byte in data {
            if byte == b'\r' {
                let line = String::from_utf8_lossy(&self.line).into_owned();
                self.line.clear();
                self.handle_line(line);
            } else {
                self.line.push(byte);
            }
        }
        Ok(())
    }

    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.banner.is_empty() {
            let banner = std::mem::take(&mut self.banner);
            self.queue(banner.as_bytes());
        }
        if let Some(chunk) = self.pending.pop_front() {
            return Ok(Some(chunk));
        }
        if self.closed {
            return Ok(None);
        }
        std::future::pending().await
    }

    async fn shutdown(self) -> Result<()> {
        self.log.lock().unwrap().shutdown = true;
        Ok(())
    }
}
