//! Object protocol: `get`/`set` on the device's object tree.
//!
//! The PDU exposes its management data as dotted paths such as
//! `PDU.OutletSystem.Outlet[3].DelayBeforeStartup`. Reading one is
//! `get <path>`, writing one is `set <path> <value>`; the reply is whatever
//! the device prints. Paths are not interpreted here: an unknown path simply
//! produces the device's own error text as the reply.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;

use crate::channel::ShellChannel;
use crate::error::Result;
use crate::session::ShellSession;

/// Path of an object in the device's management tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath(Cow<'static, str>);

impl ObjectPath {
    /// Serial number of the unit.
    pub const SERIAL_NUMBER: Self = Self::from_static("PDU.PowerSummary.iSerialNumber");

    /// Part (model) number of the unit.
    pub const PART_NUMBER: Self = Self::from_static("PDU.PowerSummary.iPartNumber");

    /// Firmware version.
    pub const FIRMWARE_VERSION: Self = Self::from_static("PDU.PowerSummary.iVersion");

    /// Number of switchable outlets.
    pub const OUTLET_COUNT: Self = Self::from_static("PDU.OutletSystem.Outlet.Count");

    /// Create a path from any string.
    pub fn new(path: impl Into<String>) -> Self {
        Self(Cow::Owned(path.into()))
    }

    /// Create a path from a string literal.
    pub const fn from_static(path: &'static str) -> Self {
        Self(Cow::Borrowed(path))
    }

    /// Delay before the outlet switches on. Writing `0` switches it on now.
    pub fn outlet_startup_delay(outlet: u32) -> Self {
        Self::new(format!("PDU.OutletSystem.Outlet[{}].DelayBeforeStartup", outlet))
    }

    /// Delay before the outlet switches off. Writing `0` switches it off now.
    pub fn outlet_shutdown_delay(outlet: u32) -> Self {
        Self::new(format!("PDU.OutletSystem.Outlet[{}].DelayBeforeShutdown", outlet))
    }

    /// The path text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// A single object protocol request, formatted as the command line sent.
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    Get(&'a ObjectPath),
    Set(&'a ObjectPath, &'a str),
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Get(path) => write!(f, "get {}", path),
            Command::Set(path, value) => write!(f, "set {} {}", path, value),
        }
    }
}

/// Read/write access to device objects.
///
/// One round trip per call, no retries. Implemented by [`ShellSession`];
/// anything else that can answer gets and sets (an in-memory table in tests)
/// can stand in for a device.
pub trait ObjectStore: Send {
    /// Read an object. Returns the device's reply verbatim.
    fn get(&mut self, path: &ObjectPath) -> impl Future<Output = Result<String>> + Send;

    /// Write an object. Returns the device's reply (usually empty or an ack).
    fn set(
        &mut self,
        path: &ObjectPath,
        value: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

impl<C: ShellChannel> ObjectStore for ShellSession<C> {
    async fn get(&mut self, path: &ObjectPath) -> Result<String> {
        self.execute(&Command::Get(path).to_string()).await
    }

    async fn set(&mut self, path: &ObjectPath, value: &str) -> Result<String> {
        self.execute(&Command::Set(path, value).to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_command_format() {
        let cmd = Command::Get(&ObjectPath::OUTLET_COUNT);
        assert_eq!(cmd.to_string(), "get PDU.OutletSystem.Outlet.Count");
    }

    #[test]
    fn test_set_command_format() {
        let path = ObjectPath::outlet_startup_delay(7);
        let cmd = Command::Set(&path, "0");
        assert_eq!(
            cmd.to_string(),
            "set PDU.OutletSystem.Outlet[7].DelayBeforeStartup 0"
        );
    }

    #[test]
    fn test_outlet_paths() {
        assert_eq!(
            ObjectPath::outlet_shutdown_delay(12).as_str(),
            "PDU.OutletSystem.Outlet[12].DelayBeforeShutdown"
        );
        assert_eq!(
            ObjectPath::outlet_startup_delay(1).as_str(),
            "PDU.OutletSystem.Outlet[1].DelayBeforeStartup"
        );
    }

    #[test]
    fn test_identity_paths() {
        assert_eq!(ObjectPath::SERIAL_NUMBER.as_str(), "PDU.PowerSummary.iSerialNumber");
        assert_eq!(ObjectPath::PART_NUMBER.as_str(), "PDU.PowerSummary.iPartNumber");
        assert_eq!(ObjectPath::FIRMWARE_VERSION.as_str(), "PDU.PowerSummary.iVersion");
        assert_eq!(ObjectPath::from("Custom.Path").to_string(), "Custom.Path");
    }
}
